use std::sync::Arc;

use beacon_api::app::app;
use beacon_api::auth::SessionStore;
use beacon_api::config;
use beacon_api::state::AppState;
use beacon_api::store::{DataStore, SqliteStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, BEACON_PORT, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!(
        "Starting Beacon management API in {:?} mode",
        config.environment
    );

    let store = Arc::new(SqliteStore::connect(&config.database.url).await?);
    let state = AppState::new(
        store.clone() as Arc<dyn DataStore>,
        store as Arc<dyn SessionStore>,
    );

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Beacon management API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
