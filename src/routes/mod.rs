//! Router assembly.

mod accounts;
mod blog;
mod common;
mod directory;

pub use accounts::account_routes;
pub use blog::blog_routes;
pub use common::common_routes;
pub use directory::directory_routes;

use crate::config::AppConfig;
use crate::state::AppState;
use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Every JSON API route, unprefixed.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(directory_routes())
        .merge(blog_routes())
        .merge(account_routes())
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }
    let allow = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(origin = %o, "ignoring unparsable CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };
    Some(CorsLayer::new().allow_origin(allow).allow_methods(Any).allow_headers(Any))
}

/// The full application: API under `config.api_prefix`, operational routes at the root.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let api = if config.api_prefix.is_empty() {
        api_routes()
    } else {
        Router::new().nest(&config.api_prefix, api_routes())
    };
    let router = api
        .merge(common_routes())
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(TraceLayer::new_for_http());
    let router = match cors_layer(&config.cors_allowed_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    };
    router.with_state(state)
}
