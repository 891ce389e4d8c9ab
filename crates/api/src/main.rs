use std::net::{IpAddr, SocketAddr};

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cabinet_api::config::ServerConfig;
use cabinet_api::router::build_app_router;
use cabinet_api::seed::load_portfolio;
use cabinet_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cabinet_api=debug,cabinet_events=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Portfolio ---
    let portfolio = load_portfolio(config.seed_path.as_deref())?;
    let seed_source = match &config.seed_path {
        Some(path) => path.display().to_string(),
        None => "embedded".to_string(),
    };
    tracing::info!(
        seed = %seed_source,
        collaborators = portfolio.collaborators.len(),
        client_files = portfolio.client_files.len(),
        assignments = portfolio.assignments.snapshot().items.len(),
        prospects = portfolio.prospects.snapshot().items.len(),
        managers = portfolio.managers.len(),
        "Portfolio loaded"
    );

    // --- App state (spawns the activity log consumer) ---
    let state = AppState::new(portfolio, config.clone());

    // Log every assignment snapshot revision as it is published.
    let mut snapshots = state.portfolio.assignments.subscribe();
    let watcher_handle = tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            tracing::debug!(
                revision = snapshot.revision,
                assignments = snapshot.items.len(),
                "Assignment snapshot published"
            );
        }
    });

    let app = build_app_router(state, &config);

    // --- Start server ---
    let host: IpAddr = config
        .host
        .parse()
        .with_context(|| format!("Invalid HOST address '{}'", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // The router, and with it the last event bus handle, is dropped once
    // `serve` returns; the activity log consumer then stops on its own.
    watcher_handle.abort();

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
