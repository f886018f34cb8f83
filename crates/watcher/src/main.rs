//! `vozurbana-watcher` -- headless report console daemon.
//!
//! Keeps the report buckets reconciled with the Voz Urbana backend:
//! listens for push notifications over WebSocket, reloads all buckets
//! periodically as the correctness backstop, and logs snapshot changes.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default | Description                                 |
//! |------------------------|----------|---------|---------------------------------------------|
//! | `VOZURBANA_API_URL`    | yes      | --      | REST base URL, e.g. `http://host:3000/api`  |
//! | `VOZURBANA_WS_URL`     | yes      | --      | WebSocket endpoint, e.g. `ws://host:3000/ws`|
//! | `VOZURBANA_TOKEN`      | yes      | --      | Admin bearer token                          |
//! | `RELOAD_INTERVAL_SECS` | no       | `900`   | Seconds between reconciliation reloads      |

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vozurbana_backend::{ReportsApi, StaticCredentials};
use vozurbana_coordinator::ReportsCoordinator;
use vozurbana_notify::NotificationChannel;

/// Fifteen minutes between reconciliation reloads unless overridden.
const DEFAULT_RELOAD_INTERVAL_SECS: u64 = 900;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vozurbana_watcher=info,vozurbana_notify=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let api_url = std::env::var("VOZURBANA_API_URL").unwrap_or_else(|_| {
        tracing::error!("VOZURBANA_API_URL environment variable is required");
        std::process::exit(1);
    });
    let ws_url = std::env::var("VOZURBANA_WS_URL").unwrap_or_else(|_| {
        tracing::error!("VOZURBANA_WS_URL environment variable is required");
        std::process::exit(1);
    });
    let token = std::env::var("VOZURBANA_TOKEN").unwrap_or_else(|_| {
        tracing::error!("VOZURBANA_TOKEN environment variable is required");
        std::process::exit(1);
    });
    let interval_secs: u64 = std::env::var("RELOAD_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_RELOAD_INTERVAL_SECS);

    tracing::info!(
        api_url = %api_url,
        ws_url = %ws_url,
        interval_secs,
        "Starting vozurbana-watcher",
    );

    let credentials = Arc::new(StaticCredentials::new(token));
    let backend = Arc::new(ReportsApi::new(api_url, credentials));
    let coordinator = ReportsCoordinator::new(backend);
    let channel = Arc::new(NotificationChannel::new(ws_url));

    let listener = coordinator.attach(&channel);
    channel.start();

    coordinator.load_all_reports().await;
    log_snapshot(&coordinator.snapshot().await);

    let mut snapshots = coordinator.watch();
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    // The first tick fires immediately; the initial load already ran.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tracing::info!("Periodic reconciliation reload");
                coordinator.load_all_reports().await;
                log_snapshot(&coordinator.snapshot().await);
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if snapshot.has_new_notification {
                    tracing::info!(
                        nuevos = snapshot.counts.nuevos,
                        "New report announced over WebSocket",
                    );
                }
                if let Some(error) = &snapshot.error {
                    tracing::warn!(error = %error, "Coordinator reported an error");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                channel.stop().await;
                break;
            }
        }
    }

    listener.abort();
    tracing::info!("vozurbana-watcher stopped");
}

fn log_snapshot(snapshot: &vozurbana_coordinator::DashboardSnapshot) {
    tracing::info!(
        nuevos = snapshot.counts.nuevos,
        en_proceso = snapshot.counts.en_proceso,
        resueltos = snapshot.counts.resueltos,
        cerrados = snapshot.counts.cerrados,
        rechazados = snapshot.counts.rechazados,
        connected = snapshot.socket_connected,
        "Report buckets",
    );
}
