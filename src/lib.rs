//! Airline directory: a JSON REST backend for airlines, anonymous employee reviews, a small blog and user
//! accounts, on PostgreSQL.

pub mod config;
pub mod country;
pub mod derived;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod model;
pub mod openapi;
pub mod query;
pub mod routes;
pub mod serializers;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, ConfigError, FieldErrors};
pub use routes::app;
pub use state::AppState;
pub use store::{drop_schema, ensure_database_exists, ensure_tables, Tables};
