use super::{parse_id, write_mode};
use crate::error::AppError;
use crate::extractors::{CurrentUser, JsonBody};
use crate::query::{Page, PageRequest, Params};
use crate::serializers::blog::{BlogPostOut, BLOG_RULES};
use crate::serializers::{assignments, parse_input};
use crate::service::{fetch_page, Mode, Repository};
use crate::sql::SqlParam;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    Json,
};

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("blog post {}", id))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<Page<BlogPostOut>>, AppError> {
    let page = PageRequest::from_params(&params)?;
    let found = fetch_page(&state.blog_posts(), &(), &page).await?;
    Ok(Json(found.map(|p| BlogPostOut::from(&p))))
}

/// The caller becomes the author.
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let input = parse_input(body, BLOG_RULES, Mode::Full, &[])?;
    let mut values = assignments(&input, BLOG_RULES, &[])?;
    values.push(("author_id", SqlParam::from(user.id)));
    let post = state.blog_posts().create(&values).await?;
    Ok((StatusCode::CREATED, Json(BlogPostOut::from(&post))))
}

pub async fn retrieve(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<BlogPostOut>, AppError> {
    let id = parse_id(&id)?;
    let post = state.blog_posts().get(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(BlogPostOut::from(&post)))
}

pub async fn update(
    State(state): State<AppState>,
    method: Method,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<BlogPostOut>, AppError> {
    let id = parse_id(&id)?;
    let input = parse_input(body, BLOG_RULES, write_mode(&method), &[])?;
    let post = state
        .blog_posts()
        .update(id, &assignments(&input, BLOG_RULES, &[])?)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(BlogPostOut::from(&post)))
}

pub async fn destroy(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    if !state.blog_posts().remove(id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
