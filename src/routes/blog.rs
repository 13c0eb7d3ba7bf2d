use crate::handlers::blog;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/blogposts/", get(blog::list).post(blog::create))
        .route(
            "/blogposts/:id/",
            get(blog::retrieve).put(blog::update).patch(blog::update).delete(blog::destroy),
        )
}
