// Service entry point: configuration, store connection, HTTP server.

use std::sync::Arc;

use tokio::signal;

use media_vault::api::{self, AppState};
use media_vault::config::Config;
use media_vault::db::{Database, Store};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let database = match Database::connect(&config).await {
        Ok(database) => database,
        Err(e) => {
            tracing::error!("failed to create document store client: {e}");
            std::process::exit(1);
        }
    };

    // Liveness check is advisory: a store that is still cold at boot should
    // not take the service down with it.
    match database.ping().await {
        Ok(()) => tracing::info!("connected to document store"),
        Err(e) => tracing::warn!("document store ping failed: {e}"),
    }

    let client = database.client().clone();
    let state = AppState {
        store: Arc::new(database),
        list_limit: config.list_limit,
        retry: config.retry,
    };
    let app = api::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!("media-vault listening on {addr}");
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("server error: {e}");
    }

    // Release the store handle once the server loop has drained.
    client.shutdown().await;
    tracing::info!("document store connection closed");
}

/// Resolve on Ctrl+C or SIGTERM.
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
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, shutting down");
        }
    }
}
