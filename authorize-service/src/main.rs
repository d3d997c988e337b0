use anyhow::Context;
use authorize_service::{build_router, load_service_config, AppState};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_service_config().context("Failed to load authorize-service configuration")?;
    let addr = config.socket_addr()?;
    let state = AppState::new(&config)?;
    let app = build_router(state);

    info!(
        %addr,
        required = ?config.gate.required_names(),
        "starting authorize-service"
    );
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
