use super::crud::CrudService;
use super::repository::{Assignments, Repository};
use crate::error::AppError;
use crate::model::AirlineReview;
use crate::query::{PageRequest, ReviewQuery};
use crate::sql::{self, column_list, quoted, Conditions, QueryBuf, SqlParam};
use crate::store::Tables;
use async_trait::async_trait;
use sqlx::PgPool;

const ACTIVE: &str = "\"is_active\" IS TRUE";

/// Wraps a write that returns the stored row so the result comes back joined to its airline.
fn joined(airlines: &str, write: QueryBuf) -> QueryBuf {
    QueryBuf {
        sql: format!(
            "WITH w AS ({}) SELECT {} FROM w JOIN {} a ON a.{} = w.{}",
            write.sql,
            ReviewRepo::columns("w"),
            airlines,
            quoted("id"),
            quoted("airline_id")
        ),
        params: write.params,
    }
}

/// Reviews are always read joined to their airline for `airline_name`.
pub struct ReviewRepo<'a> {
    pool: &'a PgPool,
    tables: &'a Tables,
}

impl<'a> ReviewRepo<'a> {
    pub fn new(pool: &'a PgPool, tables: &'a Tables) -> Self {
        ReviewRepo { pool, tables }
    }

    fn from_clause(&self) -> String {
        format!(
            "{} r JOIN {} a ON a.{} = r.{}",
            self.tables.airline_reviews,
            self.tables.airlines,
            quoted("id"),
            quoted("airline_id")
        )
    }

    fn columns(alias: &str) -> String {
        format!(
            "{}, a.{} AS {}",
            column_list(Some(alias), AirlineReview::COLUMNS),
            quoted("name"),
            quoted("airline_name")
        )
    }

    fn returning() -> String {
        column_list(None, AirlineReview::COLUMNS)
    }

    /// Active reviews of one airline, newest first, for embedding in the airline detail.
    pub async fn for_airline(&self, airline_id: i64) -> Result<Vec<AirlineReview>, AppError> {
        let filter = ReviewQuery::for_airline(airline_id);
        let q = sql::select(
            &Self::columns("r"),
            &self.from_clause(),
            &filter.conditions(),
            &filter.order_by(),
            None,
            None,
        );
        CrudService::fetch_all(self.pool, &q).await
    }

    /// Marks an active review as verified.
    pub async fn verify(&self, id: i64) -> Result<Option<AirlineReview>, AppError> {
        let write = sql::update(
            &self.tables.airline_reviews,
            id,
            &[("is_verified", SqlParam::from(true))],
            false,
            &[ACTIVE],
            &Self::returning(),
        );
        let review: Option<AirlineReview> = CrudService::fetch_optional(self.pool, &joined(&self.tables.airlines, write)).await?;
        if review.is_some() {
            tracing::info!(review_id = id, "review verified");
        }
        Ok(review)
    }
}

#[async_trait]
impl Repository for ReviewRepo<'_> {
    type Record = AirlineReview;
    type Filter = ReviewQuery;

    async fn create(&self, values: &Assignments) -> Result<AirlineReview, AppError> {
        let write = sql::insert(&self.tables.airline_reviews, values, &Self::returning());
        let review: AirlineReview = CrudService::fetch_one(self.pool, &joined(&self.tables.airlines, write)).await?;
        tracing::info!(review_id = review.id, airline_id = review.airline_id, "review created");
        Ok(review)
    }

    async fn get(&self, id: i64) -> Result<Option<AirlineReview>, AppError> {
        let mut c = Conditions::with_alias("r");
        c.is_true("is_active").eq("id", id);
        let q = sql::select(&Self::columns("r"), &self.from_clause(), &c, "", None, None);
        CrudService::fetch_optional(self.pool, &q).await
    }

    async fn list(&self, filter: &ReviewQuery, page: &PageRequest) -> Result<(Vec<AirlineReview>, i64), AppError> {
        let conditions = filter.conditions();
        let count = CrudService::count(self.pool, &sql::count(&self.from_clause(), &conditions)).await?;
        let q = sql::select(
            &Self::columns("r"),
            &self.from_clause(),
            &conditions,
            &filter.order_by(),
            Some(page.limit()),
            Some(page.offset()),
        );
        let rows = CrudService::fetch_all(self.pool, &q).await?;
        Ok((rows, count))
    }

    async fn update(&self, id: i64, values: &Assignments) -> Result<Option<AirlineReview>, AppError> {
        let write = sql::update(&self.tables.airline_reviews, id, values, false, &[ACTIVE], &Self::returning());
        CrudService::fetch_optional(self.pool, &joined(&self.tables.airlines, write)).await
    }

    async fn remove(&self, id: i64) -> Result<bool, AppError> {
        let q = sql::update(
            &self.tables.airline_reviews,
            id,
            &[("is_active", SqlParam::from(false))],
            false,
            &[ACTIVE],
            &quoted("id"),
        );
        let n = CrudService::execute(self.pool, &q.sql, &q.params).await?;
        if n > 0 {
            tracing::info!(review_id = id, "review deactivated");
        }
        Ok(n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_come_back_joined_to_the_airline() {
        let tables = Tables::in_schema("s");
        let q = joined(
            &tables.airlines,
            sql::insert(&tables.airline_reviews, &[("title", SqlParam::from("Great"))], "*"),
        );
        assert!(q.sql.starts_with("WITH w AS (INSERT INTO \"s\".\"airline_reviews\""));
        assert!(q.sql.contains("w.\"airline_id\", "));
        assert!(q.sql.ends_with("JOIN \"s\".\"airlines\" a ON a.\"id\" = w.\"airline_id\""));
        assert_eq!(q.params.len(), 1);
    }
}
