mod cli;
mod config;
mod errors;
mod journal;
mod portal;
mod refresh;
mod routes;
mod schedule;
mod state;
#[cfg(test)]
mod testing;

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::journal::TransportLog;
use crate::portal::PortalClient;
use crate::refresh::Sequencer;
use crate::routes::build_router;
use crate::schedule::DailySchedule;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Naukri resume refresh v{}", env!("CARGO_PKG_VERSION"));

    let transport = PortalClient::new(&config)?;
    let log = TransportLog::open(&config.log_file_path)?;
    info!("Transport log: {}", config.log_file_path.display());

    let sequencer = Arc::new(Sequencer::new(
        Arc::new(transport),
        config.clone(),
        Arc::new(log),
    ));

    match cli.command() {
        Command::RunOnce => run_once(&sequencer).await,
        Command::Serve => serve(sequencer, &config).await,
    }
}

/// Standalone mode: any failure ends the process with a non-zero status.
async fn run_once(sequencer: &Sequencer) -> Result<()> {
    match sequencer.run("standalone").await {
        Ok(report) => {
            info!("Resume updated: {}", report.summary());
            Ok(())
        }
        Err(e) => {
            error!("Resume update failed: {e}");
            std::process::exit(1);
        }
    }
}

async fn serve(sequencer: Arc<Sequencer>, config: &Config) -> Result<()> {
    let schedule = DailySchedule::new(config.schedule_times.clone(), config.schedule_utc_offset);
    let _scheduler = schedule::spawn(sequencer.clone(), schedule);

    let app = build_router(AppState { sequencer }).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
