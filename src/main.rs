use std::sync::Arc;

use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use wasabi::config::Config;
use wasabi::db::PgGateway;

/// Wasabi account store and history retention.
#[derive(Parser, Debug)]
#[command(name = "wasabi", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the retention worker until interrupted (default).
    Serve,
    /// Purge old history once and exit.
    Purge {
        /// Override WASABI_RETENTION_HOURS.
        #[arg(long)]
        hours: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(&config.log_level)
        }))
        .init();

    tracing::info!("Starting Wasabi");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("Migrations applied");

    let state = wasabi::build_state(Arc::new(PgGateway::new(pool.clone())), config);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            let worker = tokio::spawn(wasabi::worker::run(
                state.purger.clone(),
                state.config.retention_hours,
                state.config.purge_interval,
                shutdown_rx,
            ));

            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
            if let Err(e) = worker.await {
                tracing::error!("Retention worker terminated abnormally: {e}");
            }
        }
        Commands::Purge { hours } => {
            let hours = hours.unwrap_or(state.config.retention_hours);
            let deleted = state.purger.purge_older_than(hours).await?;
            tracing::info!("Purge complete: {deleted} rows removed");
        }
    }

    pool.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
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

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
