//! Token authentication from the `Authorization` header.

use crate::error::AppError;
use crate::model::User;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

/// Key from `Authorization: Token <key>` or `Authorization: Bearer <key>`.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, key) = value.split_once(' ')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    if scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer") {
        Some(key.to_string())
    } else {
        None
    }
}

async fn resolve(parts: &Parts, state: &AppState) -> Result<Option<User>, AppError> {
    let Some(key) = token_from_headers(&parts.headers) else {
        return Ok(None);
    };
    match state.users().by_token(&key).await? {
        Some(user) => Ok(Some(user)),
        None => {
            tracing::warn!("request with unknown auth token");
            Err(AppError::Unauthorized)
        }
    }
}

/// Authenticated caller; 401 when missing or invalid.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve(parts, state).await?.map(CurrentUser).ok_or(AppError::Unauthorized)
    }
}

/// Caller if a token was sent. A token that does not resolve is still a 401.
#[derive(Clone, Debug)]
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(resolve(parts, state).await?))
    }
}

pub fn require_admin(user: &User) -> Result<(), AppError> {
    if user.is_admin() {
        return Ok(());
    }
    tracing::warn!(user_id = user.id, role = %user.role, "admin role required");
    Err(AppError::Forbidden("admin role required".into()))
}

/// Moderators and admins.
pub fn require_moderator(user: &User) -> Result<(), AppError> {
    if user.is_moderator() {
        return Ok(());
    }
    tracing::warn!(user_id = user.id, role = %user.role, "moderator role required");
    Err(AppError::Forbidden("moderator role required".into()))
}

/// Owners act on their own account; admins on any.
pub fn require_self_or_admin(user: &User, account_id: i64) -> Result<(), AppError> {
    if user.id == account_id || user.is_admin() {
        return Ok(());
    }
    tracing::warn!(user_id = user.id, account_id, "not the account owner");
    Err(AppError::Forbidden("you may only change your own account".into()))
}
