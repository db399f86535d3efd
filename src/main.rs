use std::sync::Arc;

use anyhow::Context;
use secrecy::ExposeSecret;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use push_hub::adapters::{
    app_router, AppState, InMemorySessionStore, ProducerSupervisor, StaticCredentialVerifier,
};
use push_hub::application::ConnectionRegistry;
use push_hub::config::{AppConfig, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load_validated().context("loading configuration")?;
    init_tracing(&config.server);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        "Push Hub starting"
    );

    let registry = Arc::new(ConnectionRegistry::new(config.realtime.registry_config()));
    let sessions = Arc::new(InMemorySessionStore::new());
    let credentials = StaticCredentialVerifier::parse(config.auth.users.expose_secret())
        .context("parsing auth.users")?;
    tracing::info!(users = credentials.user_count(), "Credentials loaded");

    let state = AppState::new(
        registry.clone(),
        sessions,
        Arc::new(credentials),
        config.auth.cookie_name.as_str(),
    );

    let producers = ProducerSupervisor::start(registry.clone(), &config.producers);

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    producers.shutdown().await;
    let closed = registry.shutdown().await;
    tracing::info!(connections = closed, "Push Hub stopped");

    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if server.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
