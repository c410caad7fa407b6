//! Verigate Server - HTTP host for the human-verification gate
//!
//! Enables the configured verification plugins, then serves:
//! - GET  /verification - Widget markup for every active method
//! - POST /post         - Form submission gated by the registry
//! - GET  /health       - Health check

use std::net::SocketAddr;
use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use verigate_core::{enable_plugins, PluginConfig, VerificationRegistry};
use verigate_server::{create_router_with_config, AppState, Config};

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("verigate_server=info,verigate_core=info,tower_http=info")
            }),
        )
        .init();

    let config = Config::from_env();

    // Plugins register before any traffic; a half-configured gate must not start.
    let mut registry = VerificationRegistry::new();
    if let Err(e) = enable_plugins(
        config.plugins.iter().map(String::as_str),
        PluginConfig::from_env,
        &mut registry,
    ) {
        error!(error = %e, "Failed to enable verification plugins");
        return ExitCode::FAILURE;
    }
    if registry.is_empty() {
        warn!("No verification plugins enabled, submissions are not gated");
    }

    let app = create_router_with_config(&config, AppState::new(registry));
    let addr = config.socket_addr();

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, %addr, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!(%addr, version = env!("CARGO_PKG_VERSION"), "verigate-server listening");

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    if let Err(e) = served {
        error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    info!("Shut down cleanly");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
