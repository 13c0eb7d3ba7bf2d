//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
    #[error("{key} must be a plain identifier, got '{value}'")]
    Identifier { key: &'static str, value: String },
}

/// Field name to messages, reported together for one request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        FieldErrors(BTreeMap::new())
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// `Ok(())` when empty, otherwise a validation error carrying every field.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("database: {0}")]
    Db(sqlx::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("authentication credentials were not provided")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("internal: {0}")]
    Internal(String),
}

/// Constraint name -> (field, message) for violations raised by the store.
const CONSTRAINT_FIELDS: &[(&str, &str, &str)] = &[
    ("airlines_iata_code_key", "iata_code", "airline with this iata code already exists."),
    ("airlines_icao_code_key", "icao_code", "airline with this icao code already exists."),
    ("airlines_founded_year_check", "founded_year", "Ensure this value is between 1900 and 2030."),
    ("airlines_destinations_check", "destinations", "Ensure this value is greater than or equal to 0."),
    ("airlines_fleet_size_check", "fleet_size", "Ensure this value is greater than or equal to 0."),
    ("airline_reviews_airline_id_fkey", "airline", "Invalid pk - object does not exist."),
    ("airline_reviews_overall_rating_check", "overall_rating", "Ensure this value is between 1 and 5."),
    ("airline_reviews_years_experience_check", "years_experience", "Ensure this value is between 0 and 50."),
    ("users_username_key", "username", "A user with that username already exists."),
    ("blog_posts_author_id_fkey", "author", "Invalid pk - object does not exist."),
];

fn constraint_violation(constraint: &str) -> FieldErrors {
    match CONSTRAINT_FIELDS.iter().find(|(name, _, _)| *name == constraint) {
        Some((_, field, message)) => FieldErrors::single(field, *message),
        None => FieldErrors::single("non_field_errors", format!("constraint {} violated", constraint)),
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            let code = db.code().map(|c| c.into_owned()).unwrap_or_default();
            // unique, foreign key, check
            if matches!(code.as_str(), "23505" | "23503" | "23514") {
                let constraint = db.constraint().unwrap_or_default();
                tracing::debug!(code = %code, constraint = %constraint, "constraint violation");
                return AppError::Validation(constraint_violation(constraint));
            }
        }
        AppError::Db(e)
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "not_authenticated"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "permission_denied"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let (message, details) = match &self {
            AppError::Validation(fields) => (self.to_string(), serde_json::to_value(fields).ok()),
            AppError::Db(e) if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(error = %e, "database error");
                ("database error".to_string(), None)
            }
            AppError::Config(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "internal error");
                ("internal error".to_string(), None)
            }
            AppError::BadRequest(m) | AppError::Forbidden(m) => (m.clone(), None),
            _ => (self.to_string(), None),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(AppError::NotFound("7".into()).status_and_code().0, StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Validation(FieldErrors::single("x", "bad")).status_and_code().0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::BadRequest("x".into()).status_and_code().0, StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthorized.status_and_code().0, StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("no".into()).status_and_code().0, StatusCode::FORBIDDEN);
        assert_eq!(AppError::Db(sqlx::Error::RowNotFound).status_and_code().0, StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Db(sqlx::Error::PoolTimedOut).status_and_code().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn field_errors_accumulate_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("founded_year", "too small");
        errors.add("founded_year", "again");
        errors.add("name", "required");
        assert_eq!(errors.get("founded_year").map(<[String]>::len), Some(2));
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["name"][0], "required");
        assert!(errors.into_result().is_err());
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[tokio::test]
    async fn bad_request_message_is_verbatim() {
        let response = AppError::BadRequest("country parameter required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "error": { "code": "bad_request", "message": "country parameter required" } })
        );
    }

    #[tokio::test]
    async fn validation_details_carry_fields() {
        let response = AppError::Validation(FieldErrors::single("founded_year", "too early")).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(body["error"]["details"]["founded_year"][0], "too early");
    }

    #[test]
    fn known_constraints_map_to_fields() {
        let errors = constraint_violation("airlines_iata_code_key");
        assert!(errors.contains("iata_code"));
        let errors = constraint_violation("something_else");
        assert!(errors.contains("non_field_errors"));
    }
}
