use crate::handlers::{airline, review};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

/// Airlines and their reviews.
pub fn directory_routes() -> Router<AppState> {
    Router::new()
        .route("/airlines/", get(airline::list).post(airline::create))
        .route("/airlines/hiring/", get(airline::hiring))
        .route("/airlines/by_country/", get(airline::by_country))
        .route("/airlines/stats/", get(airline::stats))
        .route("/airlines/health/", get(airline::health))
        .route(
            "/airlines/:id/",
            get(airline::retrieve)
                .put(airline::update)
                .patch(airline::update)
                .delete(airline::destroy),
        )
        .route("/airlines/:id/reviews/", get(airline::reviews))
        .route("/reviews/", get(review::list).post(review::create))
        .route(
            "/reviews/:id/",
            get(review::retrieve)
                .put(review::update)
                .patch(review::update)
                .delete(review::destroy),
        )
        .route("/reviews/:id/verify/", post(review::verify))
}
