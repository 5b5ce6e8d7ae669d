//! Teetime Cache - golf tee-time price comparison service
//!
//! Serves plan search and per-course price calendars from the Rakuten GORA
//! API, fronted by two process-local TTL caches.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use teetime_cache::api::{create_router, AppState};
use teetime_cache::config::Config;
use teetime_cache::tasks::spawn_sweep_task;
use teetime_cache::upstream::GoraClient;

/// Main entry point for the price service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the GORA client and both caches
/// 4. Start the expiry sweep if one is configured
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "teetime_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tee-time price service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, search_ttl={}s, calendar_ttl={}s, sweep_interval={}s, calendar_request_interval={}ms",
        config.server_port,
        config.search_cache_ttl,
        config.calendar_cache_ttl,
        config.sweep_interval,
        config.calendar_request_interval_ms
    );

    let app_id = config
        .rakuten_app_id
        .clone()
        .context("RAKUTEN_APP_ID must be set")?;
    let source = GoraClient::new(app_id)
        .with_plan_search_url(config.gora_plan_search_url.clone())
        .with_course_search_url(config.gora_course_search_url.clone());

    let state = AppState::from_config(&config, Arc::new(source));
    info!("Caches initialized");

    // Lazy expiry is always on; the sweep only reclaims untouched entries
    let sweep_handle = (config.sweep_interval > 0).then(|| {
        info!("Background expiry sweep started");
        spawn_sweep_task(
            state.search_cache.clone(),
            state.calendar_cache.clone(),
            config.sweep_interval,
        )
    });

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(sweep_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = sweep_handle {
        handle.abort();
        warn!("Expiry sweep aborted");
    }
}
