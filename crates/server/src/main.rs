mod admin;
mod analytics;
mod bootstrap;
mod cache;
mod errors;
mod health;
mod recommendations;
mod restaurants;
mod state;

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tastemap_core::config::{AppConfig, LoadOptions};
use tokio::sync::Notify;

fn init_logging(config: &AppConfig) {
    use tastemap_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;
    let router = axum::Router::new()
        .merge(health::router(app.db_pool.clone()))
        .merge(restaurants::router(app.state.clone()))
        .merge(analytics::router(app.state.clone()))
        .merge(recommendations::router(app.state.clone()))
        .merge(admin::router(app.state.clone()));

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(
        event_name = "system.server.started",
        bind_address = %address,
        "tastemap-server listening"
    );

    let drain_grace = Duration::from_secs(app.config.server.graceful_shutdown_secs.max(1));
    let shutdown_started = Arc::new(Notify::new());
    let notifier = Arc::clone(&shutdown_started);
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        wait_for_shutdown().await;
        notifier.notify_one();
    });

    serve_with_drain_deadline(server.into_future(), shutdown_started, drain_grace).await?;

    tracing::info!(event_name = "system.server.stopping", "tastemap-server stopping");
    Ok(())
}

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(event_name = "system.server.signal_error", error = %error, "shutdown signal listener failed");
    }
}

/// Run the server to completion, but once shutdown has started, wait at
/// most `grace` for in-flight connections before dropping them.
async fn serve_with_drain_deadline<S>(
    server: S,
    shutdown_started: Arc<Notify>,
    grace: Duration,
) -> std::io::Result<()>
where
    S: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(server);
    let deadline = async {
        shutdown_started.notified().await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = &mut server => result,
        _ = deadline => {
            tracing::warn!(
                event_name = "system.server.drain_deadline",
                grace_secs = grace.as_secs(),
                "graceful shutdown window elapsed, dropping remaining connections"
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::Notify;

    use super::serve_with_drain_deadline;

    #[tokio::test]
    async fn drain_deadline_cuts_off_a_stalled_shutdown() {
        let shutdown_started = Arc::new(Notify::new());
        shutdown_started.notify_one();

        // A server that never finishes draining its connections.
        let stalled = std::future::pending::<std::io::Result<()>>();

        let result =
            serve_with_drain_deadline(stalled, shutdown_started, Duration::from_millis(20)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn completed_server_returns_without_waiting_for_any_deadline() {
        let shutdown_started = Arc::new(Notify::new());
        let finished = async { Ok(()) };

        let result =
            serve_with_drain_deadline(finished, shutdown_started, Duration::from_secs(60)).await;
        assert!(result.is_ok());
    }
}
