use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use docbook::config::AppConfig;
use docbook::db;
use docbook::router::build_router;
use docbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;
    tracing::info!(
        database = %config.database_url,
        slot_minutes = config.slot_duration_minutes,
        enforce_working_hours = config.enforce_working_hours,
        "database ready"
    );

    let state = Arc::new(AppState::new(conn, config.clone()));
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
