//! Command Gateway Server
//!
//! Exposes a small allow-list of container runtime CLI actions over HTTP
//! and returns their captured output as JSON.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing::info;

mod api;
mod config;
mod domain;
mod error;
mod infra;
mod logging;
mod service;

pub use config::Config;
pub use error::{Error, Result};

use domain::command::CommandTable;
use infra::process::{Limits, TokioProcessRunner};
use service::gateway::CommandGateway;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: Arc<CommandGateway>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(Config::load()?);

    let _log_guard = logging::init(&config);

    let http_addr: SocketAddr = format!("{}:{}", config.http_host, config.http_port).parse()?;

    let table = CommandTable::container_runtime(&config.runtime_argv());
    let limits = Limits {
        read_timeout: config.read_timeout(),
        execution_timeout: config.execution_timeout(),
    };

    info!("Starting Command Gateway");
    info!("HTTP listening on {}", http_addr);
    info!(
        "Allowed actions: {} (runtime: {})",
        table.actions().join(", "),
        config.runtime_command
    );

    let gateway = Arc::new(CommandGateway::new(
        table,
        Arc::new(TokioProcessRunner),
        limits,
    ));

    let state = AppState {
        config: config.clone(),
        gateway,
    };

    let app = api::http::create_router(state);

    axum::serve(
        tokio::net::TcpListener::bind(http_addr).await?,
        app.into_make_service(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}
