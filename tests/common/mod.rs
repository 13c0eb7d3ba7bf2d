#![allow(dead_code)]

use airline_directory::model::{Airline, AirlineReview, Role, User};
use airline_directory::serializers::airline::AIRLINE_RULES;
use airline_directory::serializers::review::{REVIEW_READ_ONLY, REVIEW_RENAMES, REVIEW_RULES};
use airline_directory::serializers::user::account_assignments;
use airline_directory::serializers::{assignments, parse_input};
use airline_directory::service::{Mode, Repository};
use airline_directory::sql::SqlParam;
use airline_directory::{drop_schema, ensure_tables, AppState};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;

/// Tables in a throwaway schema; `None` when `DATABASE_URL` is not set.
pub struct TestContext {
    pub state: AppState,
    pub schema: String,
}

impl TestContext {
    pub async fn new(name: &str) -> Option<TestContext> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping {}", name);
            return None;
        };
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("connect to DATABASE_URL");
        let schema = format!("t_{}_{}", name, uuid::Uuid::new_v4().simple());
        let state = AppState::new(pool, &schema);
        ensure_tables(&state.pool, &state.tables).await.expect("create tables");
        Some(TestContext { state, schema })
    }

    pub async fn delete(self) {
        drop_schema(&self.state.pool, &self.schema).await.expect("drop schema");
    }
}

pub fn airline_body(iata: &str, icao: &str) -> Value {
    json!({
        "name": format!("{} Airways", iata),
        "iata_code": iata,
        "icao_code": icao,
        "callsign": "TESTER",
        "country": "GB",
        "headquarters": "London",
        "hub_airports": "LHR, LGW",
        "fleet_types": "A320, B777",
        "fleet_size": 120,
        "destinations": 80,
        "founded_year": 1985,
        "is_hiring": true,
        "hiring_regions": "GB, IE",
    })
}

pub async fn create_airline(state: &AppState, body: Value) -> Airline {
    let input = parse_input(body, AIRLINE_RULES, Mode::Full, &[]).expect("valid airline");
    let values = assignments(&input, AIRLINE_RULES, &[]).expect("assignments");
    state.airlines().create(&values).await.expect("insert airline")
}

pub async fn create_review(state: &AppState, airline_id: i64, rating: i64) -> AirlineReview {
    let body = json!({
        "airline": airline_id,
        "position": "PILOT",
        "title": "Solid employer",
        "content": "Predictable rosters.",
        "overall_rating": rating,
        "years_experience": 4,
        "employment_status": "CURRENT",
    });
    let input = parse_input(body, REVIEW_RULES, Mode::Full, REVIEW_READ_ONLY).expect("valid review");
    let values = assignments(&input, REVIEW_RULES, REVIEW_RENAMES).expect("assignments");
    state.reviews().create(&values).await.expect("insert review")
}

pub async fn create_user(state: &AppState, username: &str, role: Role) -> User {
    let body = json!({ "username": username, "password": "a long password", "email": "crew@example.com" });
    let input = match body {
        Value::Object(m) => m,
        _ => unreachable!(),
    };
    let mut values = account_assignments(&input).expect("assignments");
    values.push(("role", SqlParam::from(role.as_str())));
    state.users().create(&values).await.expect("insert user")
}
