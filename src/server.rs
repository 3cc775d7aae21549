/// Server setup and initialization
///
/// Wires together the action table, dispatcher, middleware and routes.
/// Provides the main application factory function for creating the Axum app.

use crate::{
    api::{
        create_root_routes,
        middleware::{log_action, require_api_key},
        AppState,
    },
    config::{ActionsConfig, Config},
    dispatch::ActionDispatcher,
};
use anyhow::{Context, Result};
use axum::{middleware, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Build application state from configuration
///
/// Loads the action definitions file; any failure here is fatal for startup.
pub fn build_state(config: &Config) -> Result<AppState> {
    tracing::info!("📥 Loading action config from {}", config.config_path);
    let actions = ActionsConfig::load(&config.config_path)?;
    tracing::info!("📋 Loaded {} actions", actions.actions.len());

    if config.api_key.is_none() {
        tracing::warn!("🔒 API_KEY is not set; every request will be rejected");
    }

    Ok(AppState {
        dispatcher: ActionDispatcher::new(Arc::new(actions)),
        api_key: config.api_key.as_deref().map(Arc::from),
    })
}

/// Create the main Axum application with all routes and middleware
///
/// Layers wrap outside-in, so `log_action` sees the request before `require_api_key`.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(create_root_routes())
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .layer(middleware::from_fn(log_action))
        .with_state(state)
}

/// Start the HTTP server with the given configuration
///
/// Loads actions, binds to the configured address and serves until Ctrl-C or SIGTERM.
pub async fn start_server(config: Config) -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting relayhook server...");

    let state = build_state(&config)?;
    let app = create_app(state);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    tracing::info!("Server is running at http://{}", bind_addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

/// Resolve on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("❌ Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("❌ Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("🛑 Shutdown signal received");
}
