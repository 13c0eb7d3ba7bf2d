use super::crud::CrudService;
use super::repository::{Assignments, Repository};
use crate::error::AppError;
use crate::model::Airline;
use crate::query::{AirlineQuery, PageRequest};
use crate::sql::{self, column_list, quoted, Conditions, SqlParam};
use crate::store::Tables;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use utoipa::ToSchema;

/// Aggregates over the active, filtered airline set.
#[derive(Clone, Debug, PartialEq, FromRow, Serialize, ToSchema)]
pub struct AirlineStats {
    pub total_airlines: i64,
    pub hiring_airlines: i64,
    pub countries: i64,
    pub total_fleet_size: i64,
    /// `null` when no airline matches.
    pub average_fleet_size: Option<f64>,
    pub total_destinations: i64,
}

const ACTIVE: &str = "\"is_active\" IS TRUE";

pub struct AirlineRepo<'a> {
    pool: &'a PgPool,
    tables: &'a Tables,
}

impl<'a> AirlineRepo<'a> {
    pub fn new(pool: &'a PgPool, tables: &'a Tables) -> Self {
        AirlineRepo { pool, tables }
    }

    fn from_clause(&self) -> String {
        format!("{} a", self.tables.airlines)
    }

    fn columns() -> String {
        column_list(Some("a"), Airline::COLUMNS)
    }

    fn returning() -> String {
        column_list(None, Airline::COLUMNS)
    }

    /// Every match without paging (hiring and by-country views).
    pub async fn list_all(&self, filter: &AirlineQuery) -> Result<Vec<Airline>, AppError> {
        let q = sql::select(
            &Self::columns(),
            &self.from_clause(),
            &filter.conditions(),
            &filter.order_by(),
            None,
            None,
        );
        CrudService::fetch_all(self.pool, &q).await
    }

    pub async fn stats(&self, filter: &AirlineQuery) -> Result<AirlineStats, AppError> {
        let columns = [
            "COUNT(*) AS total_airlines",
            "COUNT(*) FILTER (WHERE a.\"is_hiring\") AS hiring_airlines",
            "COUNT(DISTINCT a.\"country\") AS countries",
            "COALESCE(SUM(a.\"fleet_size\"), 0)::BIGINT AS total_fleet_size",
            "AVG(a.\"fleet_size\")::FLOAT8 AS average_fleet_size",
            "COALESCE(SUM(a.\"destinations\"), 0)::BIGINT AS total_destinations",
        ]
        .join(", ");
        let q = sql::select(&columns, &self.from_clause(), &filter.conditions(), "", None, None);
        CrudService::fetch_one(self.pool, &q).await
    }

    pub async fn count_active(&self) -> Result<i64, AppError> {
        let mut c = Conditions::with_alias("a");
        c.is_true("is_active");
        CrudService::count(self.pool, &sql::count(&self.from_clause(), &c)).await
    }

    pub async fn exists_active(&self, id: i64) -> Result<bool, AppError> {
        let mut c = Conditions::with_alias("a");
        c.is_true("is_active").eq("id", id);
        Ok(CrudService::count(self.pool, &sql::count(&self.from_clause(), &c)).await? > 0)
    }

    /// Physically deletes the airline and its reviews in one transaction.
    pub async fn hard_delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        let reviews = CrudService::execute(
            &mut *tx,
            &format!("DELETE FROM {} WHERE {} = $1", self.tables.airline_reviews, quoted("airline_id")),
            &[SqlParam::from(id)],
        )
        .await?;
        let q = sql::delete(&self.tables.airlines, id);
        let deleted = CrudService::execute(&mut *tx, &q.sql, &q.params).await?;
        tx.commit().await?;
        if deleted > 0 {
            tracing::info!(airline_id = id, reviews, "airline deleted");
        }
        Ok(deleted > 0)
    }
}

#[async_trait]
impl Repository for AirlineRepo<'_> {
    type Record = Airline;
    type Filter = AirlineQuery;

    async fn create(&self, values: &Assignments) -> Result<Airline, AppError> {
        let q = sql::insert(&self.tables.airlines, values, &Self::returning());
        let airline: Airline = CrudService::fetch_one(self.pool, &q).await?;
        tracing::info!(airline_id = airline.id, iata = %airline.iata_code, "airline created");
        Ok(airline)
    }

    async fn get(&self, id: i64) -> Result<Option<Airline>, AppError> {
        let mut c = Conditions::with_alias("a");
        c.is_true("is_active").eq("id", id);
        let q = sql::select(&Self::columns(), &self.from_clause(), &c, "", None, None);
        CrudService::fetch_optional(self.pool, &q).await
    }

    async fn list(&self, filter: &AirlineQuery, page: &PageRequest) -> Result<(Vec<Airline>, i64), AppError> {
        let conditions = filter.conditions();
        let count = CrudService::count(self.pool, &sql::count(&self.from_clause(), &conditions)).await?;
        let q = sql::select(
            &Self::columns(),
            &self.from_clause(),
            &conditions,
            &filter.order_by(),
            Some(page.limit()),
            Some(page.offset()),
        );
        let rows = CrudService::fetch_all(self.pool, &q).await?;
        Ok((rows, count))
    }

    async fn update(&self, id: i64, values: &Assignments) -> Result<Option<Airline>, AppError> {
        let q = sql::update(&self.tables.airlines, id, values, true, &[ACTIVE], &Self::returning());
        let airline: Option<Airline> = CrudService::fetch_optional(self.pool, &q).await?;
        if airline.is_some() {
            tracing::info!(airline_id = id, fields = values.len(), "airline updated");
        }
        Ok(airline)
    }

    /// Soft delete: the row stays, every read path stops seeing it.
    async fn remove(&self, id: i64) -> Result<bool, AppError> {
        let q = sql::update(
            &self.tables.airlines,
            id,
            &[("is_active", SqlParam::from(false))],
            true,
            &[ACTIVE],
            &quoted("id"),
        );
        let n = CrudService::execute(self.pool, &q.sql, &q.params).await?;
        if n > 0 {
            tracing::info!(airline_id = id, "airline deactivated");
        }
        Ok(n > 0)
    }
}
