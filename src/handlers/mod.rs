//! HTTP handlers: parse, authorize, call the repository, project the result.

pub mod accounts;
pub mod airline;
pub mod blog;
pub mod review;

use crate::error::AppError;
use crate::service::Mode;
use axum::http::Method;

/// Path ids are positive integers; anything else cannot name a row.
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::NotFound(raw.to_string()))
}

/// PUT replaces (required fields enforced), PATCH changes only what is sent.
pub fn write_mode(method: &Method) -> Mode {
    if method == Method::PATCH {
        Mode::Partial
    } else {
        Mode::Full
    }
}
