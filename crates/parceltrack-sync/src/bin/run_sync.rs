//! # Sync Runner
//!
//! Thin scheduler entry point: runs one tracking sync pass and exits.
//! An external scheduler (cron, systemd timer) owns the cadence; the
//! engine's run guards make accidental overlap harmless.
//!
//! ## Usage
//! ```bash
//! # One active-lifecycle pass (default)
//! cargo run -p parceltrack-sync --bin run-sync
//!
//! # Inactive-lifecycle pass (delivered shipments, slow schedule)
//! cargo run -p parceltrack-sync --bin run-sync -- --lifecycle inactive
//!
//! # Custom config file
//! cargo run -p parceltrack-sync --bin run-sync -- --config ./sync.toml
//! ```

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use parceltrack_core::LifecycleClass;
use parceltrack_db::{Database, DbConfig};
use parceltrack_sync::carrier::HttpCarrierClient;
use parceltrack_sync::webhook::HttpWebhookTransport;
use parceltrack_sync::{SyncConfig, SyncOrchestrator};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut lifecycle = LifecycleClass::Active;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--lifecycle" | "-l" => {
                if i + 1 < args.len() {
                    match args[i + 1].parse() {
                        Ok(parsed) => lifecycle = parsed,
                        Err(_) => {
                            error!(value = %args[i + 1], "Invalid lifecycle, use active|inactive");
                            return ExitCode::FAILURE;
                        }
                    }
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    let config = match SyncConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let db = match Database::new(DbConfig::new(&config.database.path)).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "Failed to open database");
            return ExitCode::FAILURE;
        }
    };

    let carrier = match HttpCarrierClient::new(&config.carrier) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to build carrier client");
            return ExitCode::FAILURE;
        }
    };
    let transport = match HttpWebhookTransport::new(&config.webhook) {
        Ok(transport) => transport,
        Err(e) => {
            error!(error = %e, "Failed to build webhook transport");
            return ExitCode::FAILURE;
        }
    };

    let orchestrator = SyncOrchestrator::new(db.clone(), config, carrier, transport);

    let code = match orchestrator.run(lifecycle).await {
        Ok(report) if report.success => {
            info!(
                processed = report.processed,
                succeeded = report.succeeded,
                failed = report.failed,
                changes = report.changes,
                "Sync pass complete"
            );
            ExitCode::SUCCESS
        }
        Ok(report) => {
            error!(error = ?report.error, "Sync pass failed");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %e, "Sync pass rejected");
            ExitCode::FAILURE
        }
    };

    db.close().await;
    code
}
