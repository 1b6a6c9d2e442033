//! Lunch voting server entry point.

use std::sync::Arc;

use lunch_common::Config;
use lunch_core::{UserService, WinnerService};
use lunch_db::repositories::{UserRepository, VoteRepository, WinnerRepository};
use lunch_queue::{run_scheduler, SchedulerConfig};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, shutting down...");
        },
        () = terminate => {
            info!("Received SIGTERM, shutting down...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lunch=debug,lunch_core=debug,lunch_queue=debug".into()),
        )
        .init();

    info!("Starting lunch server...");

    // Load configuration, from `LUNCH_CONFIG` when set
    let config = match std::env::var("LUNCH_CONFIG") {
        Ok(path) => {
            info!(path = %path, "Loading configuration file");
            Config::from_file(path)?
        }
        Err(_) => Config::load()?,
    };

    // Connect to database
    let db = Arc::new(lunch_db::init(&config).await?);
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    lunch_db::migrate(&db).await?;
    info!("Migrations completed");

    let user_service = UserService::new(UserRepository::new(db.clone()));
    user_service.ensure_root_user(&config.root).await?;

    let winner_service = Arc::new(WinnerService::new(
        VoteRepository::new(db.clone()),
        WinnerRepository::new(db.clone()),
    ));

    let scheduler = run_scheduler(SchedulerConfig::from_voting(&config.voting)?, winner_service);
    info!(
        ends_at = %config.voting.ends_at,
        timezone = %config.voting.timezone,
        "Winner scheduler started"
    );

    shutdown_signal().await;

    scheduler.abort();
    // Wait for the task so its service handle is released.
    let _ = scheduler.await;
    drop(user_service);

    match Arc::try_unwrap(db) {
        Ok(db) => db.close().await?,
        Err(_) => error!("Database still in use, skipping pool close"),
    }

    info!("Server shutdown complete");
    Ok(())
}
