//! Airline collection, detail and derived views.

use super::{parse_id, write_mode};
use crate::error::AppError;
use crate::extractors::{require_admin, CurrentUser, JsonBody};
use crate::query::{text_param, AirlineQuery, Page, PageRequest, Params};
use crate::serializers::airline::{AirlineDetail, AirlineFull, AirlineSummary, AIRLINE_RULES};
use crate::serializers::review::ReviewOut;
use crate::serializers::{assignments, parse_input};
use crate::service::validation::parse_bool;
use crate::service::{fetch_page, AirlineStats, Mode, Repository};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header::ORIGIN, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("airline {}", id))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<Page<AirlineSummary>>, AppError> {
    let filter = AirlineQuery::from_params(&params)?;
    let page = PageRequest::from_params(&params)?;
    let found = fetch_page(&state.airlines(), &filter, &page).await?;
    Ok(Json(found.map(|a| AirlineSummary::from(&a))))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&user)?;
    let input = parse_input(body, AIRLINE_RULES, Mode::Full, &[])?;
    let airline = state.airlines().create(&assignments(&input, AIRLINE_RULES, &[])?).await?;
    Ok((StatusCode::CREATED, Json(AirlineFull::from(&airline))))
}

pub async fn retrieve(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<AirlineDetail>, AppError> {
    let id = parse_id(&id)?;
    let airline = state.airlines().get(id).await?.ok_or_else(|| not_found(id))?;
    let reviews = state.reviews().for_airline(id).await?;
    Ok(Json(AirlineDetail::new(&airline, &reviews)))
}

/// PUT and PATCH.
pub async fn update(
    State(state): State<AppState>,
    method: Method,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<AirlineFull>, AppError> {
    require_admin(&user)?;
    let id = parse_id(&id)?;
    let input = parse_input(body, AIRLINE_RULES, write_mode(&method), &[])?;
    let airline = state
        .airlines()
        .update(id, &assignments(&input, AIRLINE_RULES, &[])?)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(AirlineFull::from(&airline)))
}

/// Deactivates by default; `?hard=true` removes the airline and its reviews.
pub async fn destroy(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Result<StatusCode, AppError> {
    require_admin(&user)?;
    let id = parse_id(&id)?;
    let hard = text_param(&params, "hard").and_then(parse_bool).unwrap_or(false);
    let removed = if hard {
        state.airlines().hard_delete(id).await?
    } else {
        state.airlines().remove(id).await?
    };
    if !removed {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn hiring(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<Vec<AirlineSummary>>, AppError> {
    let filter = AirlineQuery::from_params(&params)?.hiring_only();
    let rows = state.airlines().list_all(&filter).await?;
    Ok(Json(rows.iter().map(AirlineSummary::from).collect()))
}

pub async fn by_country(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<Vec<AirlineSummary>>, AppError> {
    let country = text_param(&params, "country")
        .ok_or_else(|| AppError::BadRequest("country parameter required".into()))?
        .to_string();
    let filter = AirlineQuery::from_params(&params)?.in_country(&country);
    let rows = state.airlines().list_all(&filter).await?;
    Ok(Json(rows.iter().map(AirlineSummary::from).collect()))
}

pub async fn reviews(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Vec<ReviewOut>>, AppError> {
    let id = parse_id(&id)?;
    if !state.airlines().exists_active(id).await? {
        return Err(not_found(id));
    }
    let rows = state.reviews().for_airline(id).await?;
    Ok(Json(rows.iter().map(ReviewOut::from).collect()))
}

pub async fn stats(State(state): State<AppState>, Query(params): Query<Params>) -> Result<Json<AirlineStats>, AppError> {
    let filter = AirlineQuery::from_params(&params)?;
    Ok(Json(state.airlines().stats(&filter).await?))
}

#[derive(Debug, Serialize)]
pub struct DirectoryHealth {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub airline_count: i64,
    pub message: &'static str,
    pub cors_origin: String,
}

pub async fn health(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<DirectoryHealth>, AppError> {
    let cors_origin = headers
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("No origin header")
        .to_string();
    Ok(Json(DirectoryHealth {
        status: "ok",
        timestamp: Utc::now(),
        airline_count: state.airlines().count_active().await?,
        message: "Airlines API is working",
        cors_origin,
    }))
}
