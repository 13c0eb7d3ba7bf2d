//! Execution of built statements against PostgreSQL: binds every [`SqlParam`] in order and logs the SQL.

use crate::error::AppError;
use crate::sql::{QueryBuf, SqlParam};
use sqlx::postgres::PgRow;
use sqlx::{Executor, FromRow, Postgres};

pub struct CrudService;

impl CrudService {
    pub async fn fetch_all<'c, T, E>(executor: E, q: &QueryBuf) -> Result<Vec<T>, AppError>
    where
        E: Executor<'c, Database = Postgres>,
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, T>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.fetch_all(executor).await?)
    }

    pub async fn fetch_optional<'c, T, E>(executor: E, q: &QueryBuf) -> Result<Option<T>, AppError>
    where
        E: Executor<'c, Database = Postgres>,
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, T>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.fetch_optional(executor).await?)
    }

    /// Single-row statements that must produce a row (INSERT ... RETURNING).
    pub async fn fetch_one<'c, T, E>(executor: E, q: &QueryBuf) -> Result<T, AppError>
    where
        E: Executor<'c, Database = Postgres>,
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        Self::fetch_optional(executor, q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    pub async fn count<'c, E>(executor: E, q: &QueryBuf) -> Result<i64, AppError>
    where
        E: Executor<'c, Database = Postgres>,
    {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_scalar::<_, i64>(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        Ok(query.fetch_one(executor).await?)
    }

    /// Returns the number of rows affected.
    pub async fn execute<'c, E>(executor: E, sql: &str, params: &[SqlParam]) -> Result<u64, AppError>
    where
        E: Executor<'c, Database = Postgres>,
    {
        tracing::debug!(sql = %sql, params = ?params, "execute");
        let mut query = sqlx::query(sql);
        for p in params {
            query = query.bind(p.clone());
        }
        Ok(query.execute(executor).await?.rows_affected())
    }
}
