use super::{parse_id, write_mode};
use crate::error::{AppError, FieldErrors};
use crate::extractors::{require_moderator, CurrentUser, JsonBody, MaybeUser};
use crate::query::{Page, PageRequest, Params, ReviewQuery};
use crate::serializers::review::{ReviewOut, REVIEW_READ_ONLY, REVIEW_RENAMES, REVIEW_RULES};
use crate::serializers::{assignments, parse_input};
use crate::service::{fetch_page, Mode, Repository};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("review {}", id))
}

/// The referenced airline must exist and be active.
async fn check_airline(state: &AppState, input: &Map<String, Value>) -> Result<(), AppError> {
    let Some(airline_id) = input.get("airline").and_then(Value::as_i64) else {
        return Ok(());
    };
    if state.airlines().exists_active(airline_id).await? {
        return Ok(());
    }
    Err(AppError::Validation(FieldErrors::single(
        "airline",
        format!("Invalid pk \"{}\" - object does not exist.", airline_id),
    )))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<Page<ReviewOut>>, AppError> {
    let filter = ReviewQuery::from_params(&params)?;
    let page = PageRequest::from_params(&params)?;
    let found = fetch_page(&state.reviews(), &filter, &page).await?;
    Ok(Json(found.map(|r| ReviewOut::from(&r))))
}

/// Anyone may submit a review; it starts unverified.
pub async fn create(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let input = parse_input(body, REVIEW_RULES, Mode::Full, REVIEW_READ_ONLY)?;
    check_airline(&state, &input).await?;
    let review = state
        .reviews()
        .create(&assignments(&input, REVIEW_RULES, REVIEW_RENAMES)?)
        .await?;
    tracing::debug!(review_id = review.id, submitted_by = ?user.map(|u| u.id), "review submitted");
    Ok((StatusCode::CREATED, Json(ReviewOut::from(&review))))
}

pub async fn retrieve(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<ReviewOut>, AppError> {
    let id = parse_id(&id)?;
    let review = state.reviews().get(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(ReviewOut::from(&review)))
}

pub async fn update(
    State(state): State<AppState>,
    method: Method,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<ReviewOut>, AppError> {
    require_moderator(&user)?;
    let id = parse_id(&id)?;
    let input = parse_input(body, REVIEW_RULES, write_mode(&method), REVIEW_READ_ONLY)?;
    check_airline(&state, &input).await?;
    let review = state
        .reviews()
        .update(id, &assignments(&input, REVIEW_RULES, REVIEW_RENAMES)?)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ReviewOut::from(&review)))
}

pub async fn destroy(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    require_moderator(&user)?;
    let id = parse_id(&id)?;
    if !state.reviews().remove(id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn verify(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ReviewOut>, AppError> {
    require_moderator(&user)?;
    let id = parse_id(&id)?;
    let review = state.reviews().verify(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(ReviewOut::from(&review)))
}
