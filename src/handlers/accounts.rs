//! Registration, profiles, settings and token login.

use super::{parse_id, write_mode};
use crate::error::{AppError, FieldErrors};
use crate::extractors::{require_self_or_admin, CurrentUser, JsonBody, MaybeUser};
use crate::model::{Role, User};
use crate::query::{Page, PageRequest, Params};
use crate::serializers::user::{
    account_assignments, LoginRequest, SettingsOut, TokenResponse, UserPublic, UserSelf, ACCOUNT_RULES,
    LOGIN_RULES, PASSWORD_OPTIONAL, PASSWORD_REQUIRED, SETTINGS_RULES,
};
use crate::serializers::{assignments, into_object, parse_input};
use crate::service::{fetch_page, Mode, Repository, RequestValidator};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("user {}", id))
}

/// Account fields and the password rule checked together.
fn account_input(body: Value, mode: Mode, password_required: bool) -> Result<Map<String, Value>, AppError> {
    let mut map = into_object(body)?;
    let mut errors = RequestValidator::check(&mut map, ACCOUNT_RULES, mode);
    let password = if password_required { PASSWORD_REQUIRED } else { PASSWORD_OPTIONAL };
    errors.merge(RequestValidator::check(&mut map, password, mode));
    errors.into_result()?;
    Ok(map)
}

/// Only admins may set a role other than the one the account already has.
fn check_role_change(caller: Option<&User>, input: &Map<String, Value>, current: Role) -> Result<(), AppError> {
    let Some(requested) = input.get("role").and_then(Value::as_str) else {
        return Ok(());
    };
    if requested == current.as_str() || caller.is_some_and(User::is_admin) {
        return Ok(());
    }
    tracing::warn!(caller = ?caller.map(|u| u.id), requested, "role change refused");
    Err(AppError::Forbidden("only an admin may change role".into()))
}

async fn self_view(state: &AppState, user: &User) -> Result<UserSelf, AppError> {
    let settings = state.users().settings(user.id).await?;
    Ok(UserSelf::new(user, settings.as_ref()))
}

pub async fn register(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let input = account_input(body, Mode::Full, true)?;
    check_role_change(caller.as_ref(), &input, Role::default())?;
    let user = state.users().create(&account_assignments(&input)?).await?;
    Ok((StatusCode::CREATED, Json(self_view(&state, &user).await?)))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<Page<UserPublic>>, AppError> {
    let page = PageRequest::from_params(&params)?;
    let found = fetch_page(&state.users(), &(), &page).await?;
    Ok(Json(found.map(|u| UserPublic::from(&u))))
}

pub async fn retrieve(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<UserPublic>, AppError> {
    let id = parse_id(&id)?;
    let user = state.users().get(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(UserPublic::from(&user)))
}

pub async fn update(
    State(state): State<AppState>,
    method: Method,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<UserSelf>, AppError> {
    let id = parse_id(&id)?;
    require_self_or_admin(&caller, id)?;
    let current = state.users().get(id).await?.ok_or_else(|| not_found(id))?;
    let input = account_input(body, write_mode(&method), false)?;
    check_role_change(Some(&caller), &input, current.role)?;
    let user = state
        .users()
        .update(id, &account_assignments(&input)?)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(self_view(&state, &user).await?))
}

pub async fn destroy(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    require_self_or_admin(&caller, id)?;
    if !state.users().remove(id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn settings(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<SettingsOut>, AppError> {
    let id = parse_id(&id)?;
    require_self_or_admin(&caller, id)?;
    let settings = state.users().settings(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(SettingsOut::from(&settings)))
}

pub async fn update_settings(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<SettingsOut>, AppError> {
    let id = parse_id(&id)?;
    require_self_or_admin(&caller, id)?;
    let input = parse_input(body, SETTINGS_RULES, Mode::Partial, &[])?;
    let settings = state
        .users()
        .update_settings(id, &assignments(&input, SETTINGS_RULES, &[])?)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(SettingsOut::from(&settings)))
}

/// Exchanges username and password for the user's API token.
pub async fn obtain_token(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<Json<TokenResponse>, AppError> {
    let input = parse_input(body, LOGIN_RULES, Mode::Full, &[])?;
    let login: LoginRequest =
        serde_json::from_value(Value::Object(input)).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let Some(user) = state.users().authenticate(&login.username, &login.password).await? else {
        tracing::warn!(username = %login.username, "failed login");
        return Err(AppError::Validation(FieldErrors::single(
            "non_field_errors",
            "Unable to log in with provided credentials.",
        )));
    };
    let token = state.users().token_for(user.id).await?;
    Ok(Json(TokenResponse { token: token.key }))
}

pub async fn me(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> Result<Json<UserSelf>, AppError> {
    Ok(Json(self_view(&state, &user).await?))
}
