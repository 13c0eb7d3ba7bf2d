//! Airline directory server.
//!
//! Run from repo root: `cargo run -p directory-server`

use airline_directory::{app, ensure_database_exists, ensure_tables, AppConfig, AppState};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("airline_directory=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    ensure_database_exists(&config.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    let state = AppState::new(pool, &config.schema);
    ensure_tables(&state.pool, &state.tables).await?;

    let router = app(state, &config);
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        api_prefix = %config.api_prefix,
        "airline directory listening"
    );
    axum::serve(listener, router).await?;
    Ok(())
}
