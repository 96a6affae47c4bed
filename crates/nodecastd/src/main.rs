//! nodecastd — the nodecast daemon.
//!
//! Assembles the autoscaling pipeline — kubectl telemetry, demand
//! window, forecaster, decision engine, node actuator — and runs it on
//! a fixed tick interval.
//!
//! # Usage
//!
//! ```text
//! nodecastd run --config /etc/nodecast/nodecast.toml
//! nodecastd check-config --config nodecast.toml
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;

use nodecast_core::Settings;
use nodecastd::ControlLoop;

#[derive(Parser)]
#[command(name = "nodecastd", about = "nodecast autoscaling daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the autoscaling control loop.
    Run {
        /// Path to the nodecast.toml config file.
        #[arg(long, default_value = "nodecast.toml")]
        config: PathBuf,
    },
    /// Load a config file, validate it, and print the resolved settings.
    CheckConfig {
        /// Path to the nodecast.toml config file.
        #[arg(long, default_value = "nodecast.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,nodecastd=debug,nodecast=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run { config } => run(config).await,
        Command::CheckConfig { config } => check_config(config),
    }
}

async fn run(config: PathBuf) -> anyhow::Result<()> {
    let settings = Settings::from_file(&config)?;
    info!(config = %config.display(), "nodecast daemon starting");
    info!(
        cores_per_node = settings.engine.cores_per_node,
        min_workers = settings.engine.min_workers,
        max_workers = settings.engine.max_workers,
        window = settings.forecast.window,
        workers = settings.telemetry.workers.len(),
        "configuration resolved"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let control = tokio::spawn(ControlLoop::from_settings(&settings).run(shutdown_rx));

    tokio::signal::ctrl_c().await?;
    info!("interrupt received, shutting down");
    let _ = shutdown_tx.send(true);
    control.await?;

    Ok(())
}

fn check_config(config: PathBuf) -> anyhow::Result<()> {
    let settings = Settings::from_file(&config)?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
