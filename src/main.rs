use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use artist_os_api::auth::HostedAuthGateway;
use artist_os_api::services::ViberateClient;
use artist_os_api::{build_router, config, database, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH_*, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("artist_os_api=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config().clone();
    tracing::info!("Starting Artist OS API in {:?} mode", config.environment);
    if !config.has_service_role() {
        tracing::warn!("AUTH_SERVICE_ROLE_KEY not set; operator endpoints and analyses are disabled");
    }

    let store = database::open_store(&config.database)
        .await
        .context("failed to open database")?;
    let auth = Arc::new(HostedAuthGateway::new(&config.auth));
    let provider = Arc::new(ViberateClient::new(&config.provider));

    let sweep_every = Duration::from_secs(config.progress.sweep_interval_secs.max(1));
    let port = config.server.port;

    let state = AppState::new(config, store, auth, provider);
    state.progress.spawn_sweeper(sweep_every);

    let app = build_router(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Artist OS API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
