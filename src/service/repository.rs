use crate::error::AppError;
use crate::query::{Page, PageRequest};
use crate::sql::SqlParam;
use async_trait::async_trait;

/// Column assignments for an INSERT or UPDATE, already validated.
pub type Assignments = Vec<(&'static str, SqlParam)>;

/// Data access for one entity table.
#[async_trait]
pub trait Repository: Sync {
    type Record: Send;
    type Filter: Send + Sync;

    async fn create(&self, values: &Assignments) -> Result<Self::Record, AppError>;

    /// `None` for unknown ids and for soft-deleted rows.
    async fn get(&self, id: i64) -> Result<Option<Self::Record>, AppError>;

    /// One window of matching rows plus the total number of matches.
    async fn list(&self, filter: &Self::Filter, page: &PageRequest) -> Result<(Vec<Self::Record>, i64), AppError>;

    /// Partial update; `None` when the row does not exist or is inactive.
    async fn update(&self, id: i64, values: &Assignments) -> Result<Option<Self::Record>, AppError>;

    /// Deactivates or deletes the row; `false` when there was nothing to remove.
    async fn remove(&self, id: i64) -> Result<bool, AppError>;
}

/// Runs [`Repository::list`] and packages the window.
pub async fn fetch_page<R: Repository>(
    repo: &R,
    filter: &R::Filter,
    page: &PageRequest,
) -> Result<Page<R::Record>, AppError> {
    let (rows, count) = repo.list(filter, page).await?;
    Ok(Page::new(page, count, rows))
}
