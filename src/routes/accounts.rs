use crate::handlers::accounts;
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

/// Users, settings and token auth.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/users/", get(accounts::list).post(accounts::register))
        .route(
            "/users/:id/",
            get(accounts::retrieve)
                .put(accounts::update)
                .patch(accounts::update)
                .delete(accounts::destroy),
        )
        .route(
            "/users/:id/settings/",
            get(accounts::settings).patch(accounts::update_settings),
        )
        .route("/auth/token/", post(accounts::obtain_token))
        .route("/auth/me/", get(accounts::me))
}
