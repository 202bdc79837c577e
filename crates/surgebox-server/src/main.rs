//! surgebox-server - REST API server binary.

use std::net::SocketAddr;

use surgebox_server::{create_server, AppState, ServerConfig};
use tokio::signal;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
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
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive(Level::INFO.into())
                .add_directive("surgebox_server=debug".parse()?),
        )
        .init();

    let config = ServerConfig::from_env()?;
    if config.app_password.is_empty() {
        warn!("APP_PASSWORD is not set; login is disabled");
    }
    if config.url_token.is_empty() {
        warn!("URL_TOKEN is not set; any path token is accepted");
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = AppState::from_config(config)?;
    if state.is_configured() {
        info!(max_versions = state.store.max_versions(), "Backend configured");
    }

    let app = create_server(state);

    // Start server
    info!("Starting surgebox-server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received");
        })
        .await?;

    info!("Server stopped cleanly");
    Ok(())
}
