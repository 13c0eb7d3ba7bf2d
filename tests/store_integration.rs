//! Repository behavior against PostgreSQL. Runs only when `DATABASE_URL` is set; each test works in its own schema.

mod common;

use airline_directory::model::Role;
use airline_directory::query::{AirlineQuery, PageRequest, ReviewQuery};
use airline_directory::service::Repository;
use airline_directory::sql::SqlParam;
use airline_directory::AppError;
use common::{airline_body, create_airline, create_review, create_user, TestContext};
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::HashMap;

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[tokio::test]
async fn hard_delete_removes_reviews() {
    let Some(ctx) = TestContext::new("hard_delete").await else { return };
    let state = &ctx.state;
    let airline = create_airline(state, airline_body("BA", "BAW")).await;
    let review = create_review(state, airline.id, 4).await;
    assert_eq!(review.airline_name, "BA Airways");

    assert!(state.airlines().hard_delete(airline.id).await.unwrap());
    assert!(state.reviews().get(review.id).await.unwrap().is_none());
    let remaining: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", state.tables.airline_reviews))
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
    assert!(!state.airlines().hard_delete(airline.id).await.unwrap());
    ctx.delete().await;
}

#[tokio::test]
async fn codes_stay_unique_across_inactive_rows() {
    let Some(ctx) = TestContext::new("unique_codes").await else { return };
    let state = &ctx.state;
    let first = create_airline(state, airline_body("EK", "UAE")).await;
    assert!(state.airlines().remove(first.id).await.unwrap());

    let values = vec![
        ("name", SqlParam::from("Copycat")),
        ("iata_code", SqlParam::from("EK")),
        ("icao_code", SqlParam::from("CPY")),
        ("callsign", SqlParam::from("COPY")),
        ("country", SqlParam::from("AE")),
        ("headquarters", SqlParam::from("Dubai")),
        ("founded_year", SqlParam::from(2000i32)),
    ];
    match state.airlines().create(&values).await {
        Err(AppError::Validation(fields)) => assert!(fields.contains("iata_code")),
        other => panic!("expected unique violation, got {:?}", other.map(|a| a.id)),
    }
    ctx.delete().await;
}

#[tokio::test]
async fn inactive_airlines_are_hidden_everywhere() {
    let Some(ctx) = TestContext::new("inactive_hidden").await else { return };
    let state = &ctx.state;
    let keep = create_airline(state, airline_body("QR", "QTR")).await;
    let gone = create_airline(state, airline_body("GF", "GFA")).await;
    assert!(state.airlines().remove(gone.id).await.unwrap());

    let all = AirlineQuery::default();
    let (rows, count) = state.airlines().list(&all, &PageRequest::default()).await.unwrap();
    assert_eq!(count, 1);
    assert_eq!(rows[0].id, keep.id);
    assert!(state.airlines().get(gone.id).await.unwrap().is_none());
    assert_eq!(state.airlines().list_all(&all.clone().hiring_only()).await.unwrap().len(), 1);
    assert_eq!(state.airlines().list_all(&all.clone().in_country("GB")).await.unwrap().len(), 1);
    let in_region = AirlineQuery::from_params(&params(&[("region", "GB")])).unwrap();
    let found = state.airlines().list_all(&in_region).await.unwrap();
    assert_eq!(found.iter().map(|a| a.id).collect::<Vec<_>>(), vec![keep.id]);
    let by_code = AirlineQuery::from_params(&params(&[("search", "GF")])).unwrap();
    let (rows, count) = state.airlines().list(&by_code, &PageRequest::default()).await.unwrap();
    assert_eq!(count, 0);
    assert!(rows.is_empty());

    let stats = state.airlines().stats(&all).await.unwrap();
    assert_eq!(stats.total_airlines, 1);
    assert_eq!(stats.hiring_airlines, 1);
    assert_eq!(stats.countries, 1);
    assert_eq!(stats.total_fleet_size, 120);
    assert_eq!(stats.average_fleet_size, Some(120.0));
    assert_eq!(state.airlines().count_active().await.unwrap(), 1);
    assert!(state.airlines().update(gone.id, &vec![("name", SqlParam::from("x"))]).await.unwrap().is_none());
    ctx.delete().await;
}

#[tokio::test]
async fn updates_refresh_updated_at_only() {
    let Some(ctx) = TestContext::new("updated_at").await else { return };
    let state = &ctx.state;
    let created = create_airline(state, airline_body("SQ", "SIA")).await;
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let updated = state
        .airlines()
        .update(created.id, &vec![("fleet_size", SqlParam::from(150i32))])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.fleet_size, 150);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);

    let reread = state.airlines().get(created.id).await.unwrap().unwrap();
    assert_eq!(reread.updated_at, updated.updated_at);
    ctx.delete().await;
}

#[tokio::test]
async fn lowercase_country_is_found_by_country_filters() {
    let Some(ctx) = TestContext::new("country_case").await else { return };
    let state = &ctx.state;
    let mut body = airline_body("KL", "KLM");
    body["country"] = json!("nl");
    let airline = create_airline(state, body).await;
    assert_eq!(airline.country, "NL");

    for spelling in ["nl", "NL"] {
        let filter = AirlineQuery::default().in_country(spelling);
        assert_eq!(state.airlines().list_all(&filter).await.unwrap().len(), 1, "{}", spelling);
        let filter = AirlineQuery::from_params(&params(&[("country", spelling)])).unwrap();
        let (_, count) = state.airlines().list(&filter, &PageRequest::default()).await.unwrap();
        assert_eq!(count, 1, "{}", spelling);
    }
    ctx.delete().await;
}

#[tokio::test]
async fn stats_over_empty_set() {
    let Some(ctx) = TestContext::new("empty_stats").await else { return };
    let stats = ctx.state.airlines().stats(&AirlineQuery::default()).await.unwrap();
    assert_eq!(stats.total_airlines, 0);
    assert_eq!(stats.average_fleet_size, None);
    assert_eq!(stats.total_destinations, 0);
    ctx.delete().await;
}

#[tokio::test]
async fn pilot_salary_filter() {
    let Some(ctx) = TestContext::new("salary_filter").await else { return };
    let state = &ctx.state;
    let mut low = airline_body("LH", "DLH");
    low["pilot_salary_min"] = json!("85000");
    let mut high = airline_body("LX", "SWR");
    high["pilot_salary_min"] = json!(95000);
    create_airline(state, low).await;
    let high = create_airline(state, high).await;
    assert_eq!(high.pilot_salary_min, Some(Decimal::new(9_500_000, 2)));

    let filter = AirlineQuery::from_params(&params(&[("min_pilot_salary", "90000")])).unwrap();
    let (rows, count) = state.airlines().list(&filter, &PageRequest::default()).await.unwrap();
    assert_eq!(count, 1);
    assert_eq!(rows[0].iata_code, "LX");
    ctx.delete().await;
}

#[tokio::test]
async fn search_region_and_paging() {
    let Some(ctx) = TestContext::new("search_paging").await else { return };
    let state = &ctx.state;
    for (iata, icao) in [("AA", "AAL"), ("AB", "ABB"), ("AC", "ACA")] {
        create_airline(state, airline_body(iata, icao)).await;
    }
    let mut other = airline_body("NH", "ANA");
    other["country"] = json!("JP");
    other["hiring_regions"] = json!("JP");
    create_airline(state, other).await;

    let filter = AirlineQuery::from_params(&params(&[("search", "airways ab")])).unwrap();
    let (rows, _) = state.airlines().list(&filter, &PageRequest::default()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].iata_code, "AB");

    let filter = AirlineQuery::from_params(&params(&[("region", "jp")])).unwrap();
    assert_eq!(state.airlines().list_all(&filter).await.unwrap().len(), 1);

    let page = PageRequest::from_params(&params(&[("page", "2"), ("page_size", "2")])).unwrap();
    let (rows, count) = state.airlines().list(&AirlineQuery::default(), &page).await.unwrap();
    assert_eq!(count, 4);
    assert_eq!(rows.len(), 2);
    let page = PageRequest::from_params(&params(&[("page", "9")])).unwrap();
    let (rows, _) = state.airlines().list(&AirlineQuery::default(), &page).await.unwrap();
    assert!(rows.is_empty());
    ctx.delete().await;
}

#[tokio::test]
async fn founded_year_check_constraint_maps_to_field() {
    let Some(ctx) = TestContext::new("founded_check").await else { return };
    let values = vec![
        ("name", SqlParam::from("Too Early")),
        ("iata_code", SqlParam::from("TE")),
        ("icao_code", SqlParam::from("TER")),
        ("callsign", SqlParam::from("EARLY")),
        ("country", SqlParam::from("US")),
        ("headquarters", SqlParam::from("Dayton")),
        ("founded_year", SqlParam::from(1899i32)),
    ];
    match ctx.state.airlines().create(&values).await {
        Err(AppError::Validation(fields)) => assert!(fields.contains("founded_year")),
        other => panic!("expected check violation, got {:?}", other.map(|a| a.id)),
    }
    ctx.delete().await;
}

#[tokio::test]
async fn reviews_filter_verify_and_soft_delete() {
    let Some(ctx) = TestContext::new("reviews").await else { return };
    let state = &ctx.state;
    let airline = create_airline(state, airline_body("AF", "AFR")).await;
    let low = create_review(state, airline.id, 2).await;
    let high = create_review(state, airline.id, 5).await;
    assert!(!high.is_verified);

    let filter = ReviewQuery::from_params(&params(&[("min_rating", "4")])).unwrap();
    let (rows, count) = state.reviews().list(&filter, &PageRequest::default()).await.unwrap();
    assert_eq!(count, 1);
    assert_eq!(rows[0].id, high.id);

    let verified = state.reviews().verify(high.id).await.unwrap().unwrap();
    assert!(verified.is_verified);

    assert!(state.reviews().remove(low.id).await.unwrap());
    let embedded = state.reviews().for_airline(airline.id).await.unwrap();
    assert_eq!(embedded.len(), 1);
    assert!(!state.reviews().remove(low.id).await.unwrap());
    ctx.delete().await;
}

#[tokio::test]
async fn accounts_tokens_and_settings() {
    let Some(ctx) = TestContext::new("accounts").await else { return };
    let users = ctx.state.users();
    let user = create_user(&ctx.state, "first_officer", Role::User).await;
    let settings = users.settings(user.id).await.unwrap().unwrap();
    assert!(settings.receive_newsletter);
    assert!(!settings.dark_mode);

    assert!(users.authenticate("first_officer", "a long password").await.unwrap().is_some());
    assert!(users.authenticate("first_officer", "wrong").await.unwrap().is_none());

    let token = users.token_for(user.id).await.unwrap();
    assert_eq!(users.token_for(user.id).await.unwrap().key, token.key);
    assert_eq!(users.by_token(&token.key).await.unwrap().unwrap().id, user.id);
    assert!(users.by_token("nope").await.unwrap().is_none());

    let updated = users
        .update_settings(user.id, &vec![("dark_mode", SqlParam::from(true))])
        .await
        .unwrap()
        .unwrap();
    assert!(updated.dark_mode);

    assert!(users.remove(user.id).await.unwrap());
    assert!(users.settings(user.id).await.unwrap().is_none());
    ctx.delete().await;
}

#[tokio::test]
async fn blog_posts_carry_author_username() {
    let Some(ctx) = TestContext::new("blog").await else { return };
    let author = create_user(&ctx.state, "writer", Role::User).await;
    let posts = ctx.state.blog_posts();
    let post = posts
        .create(&vec![
            ("topic", SqlParam::from("Hiring outlook")),
            ("description", SqlParam::from("Who is recruiting this spring.")),
            ("author_id", SqlParam::from(author.id)),
        ])
        .await
        .unwrap();
    assert_eq!(post.author_username, "writer");
    let (rows, count) = posts.list(&(), &PageRequest::default()).await.unwrap();
    assert_eq!(count, 1);
    assert_eq!(rows[0].id, post.id);
    assert!(posts.remove(post.id).await.unwrap());
    ctx.delete().await;
}
