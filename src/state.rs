//! Shared application state for all routes.

use crate::service::{AirlineRepo, BlogRepo, ReviewRepo, UserRepo};
use crate::store::Tables;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub tables: Arc<Tables>,
}

impl AppState {
    pub fn new(pool: PgPool, schema: &str) -> Self {
        AppState {
            pool,
            tables: Arc::new(Tables::in_schema(schema)),
        }
    }

    pub fn airlines(&self) -> AirlineRepo<'_> {
        AirlineRepo::new(&self.pool, &self.tables)
    }

    pub fn reviews(&self) -> ReviewRepo<'_> {
        ReviewRepo::new(&self.pool, &self.tables)
    }

    pub fn blog_posts(&self) -> BlogRepo<'_> {
        BlogRepo::new(&self.pool, &self.tables)
    }

    pub fn users(&self) -> UserRepo<'_> {
        UserRepo::new(&self.pool, &self.tables)
    }
}
