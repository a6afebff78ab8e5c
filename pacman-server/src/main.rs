#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, trace, warn};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::{watch, Notify};

use pacman_core::brains::TabularPolicy;
use pacman_core::Maze;

use crate::{
    app::{create_router, AppState},
    config::Config,
    registry::RoomRegistry,
};

#[cfg_attr(coverage_nightly, coverage(off))]
mod config;
#[cfg_attr(coverage_nightly, coverage(off))]
mod errors;
#[cfg_attr(coverage_nightly, coverage(off))]
mod formatter;

mod app;
mod directory;
mod logging;
mod registry;
mod room_actor;
mod routes;
mod transport;

#[tokio::main]
async fn main() {
    #[cfg(debug_assertions)]
    dotenvy::from_path(std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(".env")).ok();
    #[cfg(not(debug_assertions))]
    dotenvy::dotenv().ok();

    let config: Config = config::load_config();

    logging::setup_logging();
    trace!(
        host = %config.host,
        port = config.port,
        shutdown_timeout_seconds = config.shutdown_timeout_seconds,
        "Loaded server configuration"
    );

    info!(
        model_path = config.model_path.is_some(),
        "Feature configuration"
    );

    let addr = std::net::SocketAddr::new(config.host, config.port);
    let shutdown_timeout = std::time::Duration::from_secs(config.shutdown_timeout_seconds as u64);

    let maze = Arc::new(Maze::reference());
    let registry = RoomRegistry::new(
        maze,
        config.room_config(),
        std::time::Duration::from_secs(config.room_ttl_seconds),
        Arc::new(directory::NoopDirectory),
    );

    if let Some(path) = config.model_path.clone() {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            let path_str = path.to_string_lossy().into_owned();
            match tokio::task::spawn_blocking(move || TabularPolicy::load(&path_str)).await {
                Ok(Ok(policy)) => {
                    registry.install_tabular_policy(policy);
                    info!("tabular policy loaded");
                }
                Ok(Err(err)) => {
                    warn!(error = %err, "failed to load tabular policy; rooms will use heuristic brains only");
                }
                Err(err) => {
                    warn!(error = %err, "tabular policy load task panicked");
                }
            }
        });
    }

    let notify = Arc::new(Notify::new());
    let app_state = AppState::new(registry);
    let app = create_router(app_state);

    info!(%addr, "Starting HTTP server bind");
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    info!(%addr, "HTTP server listening");

    let (tx_signal, rx_signal) = watch::channel::<Option<Instant>>(None);

    {
        let notify = notify.clone();
        let tx = tx_signal.clone();
        tokio::spawn(async move {
            let signaled_at = shutdown_signal().await;
            let _ = tx.send(Some(signaled_at));
            notify.notify_waiters();
        });
    }

    let mut rx_for_timeout = rx_signal.clone();
    let timeout_task = async move {
        while rx_for_timeout.borrow().is_none() {
            if rx_for_timeout.changed().await.is_err() {
                return;
            }
        }
        tokio::time::sleep(shutdown_timeout).await;
        warn!(timeout = ?shutdown_timeout, "Shutdown timeout elapsed; forcing exit");
        std::process::exit(1);
    };

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        notify.notified().await;
    });

    tokio::select! {
        res = server => {
            let now = Instant::now();
            if let Some(signaled_at) = *rx_signal.borrow() {
                let elapsed = now.duration_since(signaled_at);
                if elapsed < shutdown_timeout {
                    let remaining = format!("{:.2?}", shutdown_timeout - elapsed);
                    info!(remaining = remaining, "Graceful shutdown complete");
                }
            }
            res.unwrap();
        }
        _ = timeout_task => {}
    }
}

async fn shutdown_signal() -> Instant {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
        warn!(signal = "ctrl_c", "Received Ctrl+C; shutting down");
    };

    #[cfg(unix)]
    let sigterm = async {
        let mut term_stream = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        term_stream.recv().await;
        warn!(signal = "sigterm", "Received SIGTERM; shutting down");
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { Instant::now() }
        _ = sigterm => { Instant::now() }
    }
}
