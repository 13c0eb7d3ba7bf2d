//! Table DDL and database bootstrap. Every table lives in one schema named by `DIRECTORY_SCHEMA` (default `directory`).

use crate::error::{AppError, ConfigError};
use crate::sql::{qualified_table, quoted};
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

/// Schema-qualified names of every table.
#[derive(Clone, Debug)]
pub struct Tables {
    pub schema: String,
    pub users: String,
    pub user_settings: String,
    pub auth_tokens: String,
    pub blog_posts: String,
    pub airlines: String,
    pub airline_reviews: String,
}

impl Tables {
    pub fn in_schema(schema: &str) -> Self {
        Tables {
            schema: schema.to_string(),
            users: qualified_table(schema, "users"),
            user_settings: qualified_table(schema, "user_settings"),
            auth_tokens: qualified_table(schema, "auth_tokens"),
            blog_posts: qualified_table(schema, "blog_posts"),
            airlines: qualified_table(schema, "airlines"),
            airline_reviews: qualified_table(schema, "airline_reviews"),
        }
    }
}

fn choice_list(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("'{}'", v.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(", ")
}

/// CREATE TABLE statements in dependency order.
pub fn table_ddl(t: &Tables) -> Vec<String> {
    use crate::model::{EmploymentStatus, Position, Role};

    vec![
        format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(&t.schema)),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {users} (
                id BIGSERIAL PRIMARY KEY,
                username VARCHAR(150) NOT NULL CONSTRAINT users_username_key UNIQUE,
                email VARCHAR(254) NOT NULL DEFAULT '',
                password_hash TEXT NOT NULL,
                role VARCHAR(50) NOT NULL DEFAULT 'user' CONSTRAINT users_role_check CHECK (role IN ({roles})),
                bio TEXT,
                avatar VARCHAR(100),
                website VARCHAR(200),
                country VARCHAR(2),
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                date_joined TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            users = t.users,
            roles = choice_list(Role::CHOICES),
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {settings} (
                id BIGSERIAL PRIMARY KEY,
                user_id BIGINT NOT NULL CONSTRAINT user_settings_user_id_key UNIQUE
                    REFERENCES {users} (id) ON DELETE CASCADE,
                receive_newsletter BOOLEAN NOT NULL DEFAULT TRUE,
                dark_mode BOOLEAN NOT NULL DEFAULT FALSE
            )
            "#,
            settings = t.user_settings,
            users = t.users,
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {tokens} (
                key VARCHAR(64) PRIMARY KEY,
                user_id BIGINT NOT NULL CONSTRAINT auth_tokens_user_id_key UNIQUE
                    REFERENCES {users} (id) ON DELETE CASCADE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            tokens = t.auth_tokens,
            users = t.users,
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {posts} (
                id BIGSERIAL PRIMARY KEY,
                topic VARCHAR(100) NOT NULL,
                description TEXT NOT NULL,
                author_id BIGINT NOT NULL CONSTRAINT blog_posts_author_id_fkey
                    REFERENCES {users} (id) ON DELETE CASCADE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            posts = t.blog_posts,
            users = t.users,
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {airlines} (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(200) NOT NULL,
                iata_code VARCHAR(3) NOT NULL CONSTRAINT airlines_iata_code_key UNIQUE,
                icao_code VARCHAR(4) NOT NULL CONSTRAINT airlines_icao_code_key UNIQUE,
                callsign VARCHAR(50) NOT NULL,
                country VARCHAR(3) NOT NULL,
                headquarters VARCHAR(200) NOT NULL,
                hub_airports TEXT NOT NULL DEFAULT '',
                destinations INTEGER NOT NULL DEFAULT 0 CONSTRAINT airlines_destinations_check CHECK (destinations >= 0),
                fleet_size INTEGER NOT NULL DEFAULT 0 CONSTRAINT airlines_fleet_size_check CHECK (fleet_size >= 0),
                fleet_types TEXT NOT NULL DEFAULT '',
                founded_year INTEGER NOT NULL
                    CONSTRAINT airlines_founded_year_check CHECK (founded_year BETWEEN 1900 AND 2030),
                website VARCHAR(200),
                logo_url VARCHAR(200),
                is_hiring BOOLEAN NOT NULL DEFAULT FALSE,
                hiring_regions TEXT NOT NULL DEFAULT '',
                pilot_requirements TEXT NOT NULL DEFAULT '',
                pilot_salary_min NUMERIC(10, 2),
                pilot_salary_max NUMERIC(10, 2),
                cabin_crew_requirements TEXT NOT NULL DEFAULT '',
                cabin_crew_salary_min NUMERIC(10, 2),
                cabin_crew_salary_max NUMERIC(10, 2),
                benefits TEXT NOT NULL DEFAULT '',
                training_programs TEXT NOT NULL DEFAULT '',
                contact_hr VARCHAR(254),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                is_active BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
            airlines = t.airlines,
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {reviews} (
                id BIGSERIAL PRIMARY KEY,
                airline_id BIGINT NOT NULL CONSTRAINT airline_reviews_airline_id_fkey
                    REFERENCES {airlines} (id) ON DELETE CASCADE,
                position VARCHAR(20) NOT NULL CONSTRAINT airline_reviews_position_check CHECK (position IN ({positions})),
                title VARCHAR(200) NOT NULL,
                content TEXT NOT NULL,
                overall_rating INTEGER NOT NULL
                    CONSTRAINT airline_reviews_overall_rating_check CHECK (overall_rating BETWEEN 1 AND 5),
                work_life_balance INTEGER CHECK (work_life_balance BETWEEN 1 AND 5),
                compensation INTEGER CHECK (compensation BETWEEN 1 AND 5),
                management INTEGER CHECK (management BETWEEN 1 AND 5),
                career_growth INTEGER CHECK (career_growth BETWEEN 1 AND 5),
                years_experience INTEGER NOT NULL
                    CONSTRAINT airline_reviews_years_experience_check CHECK (years_experience BETWEEN 0 AND 50),
                employment_status VARCHAR(20) NOT NULL
                    CONSTRAINT airline_reviews_employment_status_check CHECK (employment_status IN ({statuses})),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                is_verified BOOLEAN NOT NULL DEFAULT FALSE,
                is_active BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
            reviews = t.airline_reviews,
            airlines = t.airlines,
            positions = choice_list(Position::CHOICES),
            statuses = choice_list(EmploymentStatus::CHOICES),
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS airline_reviews_airline_id_idx ON {} (airline_id)",
            t.airline_reviews
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS blog_posts_created_at_idx ON {} (created_at DESC)",
            t.blog_posts
        ),
    ]
}

/// Create the schema and every table if missing. Idempotent.
pub async fn ensure_tables(pool: &PgPool, tables: &Tables) -> Result<(), AppError> {
    for ddl in table_ddl(tables) {
        sqlx::query(&ddl).execute(pool).await?;
    }
    tracing::info!(schema = %tables.schema, "tables ready");
    Ok(())
}

/// Drop the schema and everything in it. Used by tests that work in throwaway schemas.
pub async fn drop_schema(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    sqlx::query(&format!("DROP SCHEMA IF EXISTS {} CASCADE", quoted(schema)))
        .execute(pool)
        .await?;
    Ok(())
}

/// Connects to the server's `postgres` database and creates the target database when it does not exist.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|_| ConfigError::Invalid {
            key: "DATABASE_URL",
            value: database_url.to_string(),
        })?;
    let mut conn: sqlx::PgConnection = opts.connect().await.map_err(AppError::Db)?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await
        .map_err(AppError::Db)?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quoted(&db_name)))
            .execute(&mut conn)
            .await
            .map_err(AppError::Db)?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url.rfind('/').ok_or_else(|| ConfigError::Invalid {
        key: "DATABASE_URL",
        value: url.to_string(),
    })? + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_schema_qualified() {
        let t = Tables::in_schema("directory");
        assert_eq!(t.airlines, "\"directory\".\"airlines\"");
        assert_eq!(t.airline_reviews, "\"directory\".\"airline_reviews\"");
    }

    #[test]
    fn ddl_carries_named_constraints() {
        let ddl = table_ddl(&Tables::in_schema("s")).join("\n");
        for name in [
            "airlines_iata_code_key",
            "airlines_icao_code_key",
            "airlines_founded_year_check",
            "airline_reviews_airline_id_fkey",
            "users_username_key",
        ] {
            assert!(ddl.contains(name), "missing {}", name);
        }
        assert!(ddl.contains("'CABIN_CREW'"));
        assert!(ddl.contains("ON DELETE CASCADE"));
    }

    #[test]
    fn database_name_is_split_from_url() {
        let (admin, db) = parse_db_name_from_url("postgres://u:p@localhost:5432/airlines?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(db, "airlines");
    }
}
