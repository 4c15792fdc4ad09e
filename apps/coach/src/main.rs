mod assessment;
mod bank;
mod config;
mod controller;
mod errors;
mod gateway;
mod interview;
mod models;
mod report;
mod terminal;
mod voice;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::bank::QuestionBank;
use crate::config::Config;
use crate::controller::Controller;
use crate::gateway::{Gateway, HttpGateway};
use crate::terminal::Terminal;
use crate::voice::SilentVoice;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Logs go to stderr so they never interleave with the prompts on stdout.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting coach v{}", env!("CARGO_PKG_VERSION"));

    let gateway = Arc::new(HttpGateway::new(config.api_base.clone(), config.timeout));
    match gateway.health().await {
        Ok(status) => info!(status = %status.status, "Backend reachable at {}", config.api_base),
        Err(e) => warn!(error = %e, "Backend at {} is not reachable yet", config.api_base),
    }

    let bank = Arc::new(QuestionBank::builtin().context("built-in question bank is invalid")?);
    let mut controller = Controller::new(gateway, Arc::new(SilentVoice), bank, config.report_dir);

    let mut term = Terminal::new();
    terminal::run(&mut controller, &mut term).await?;

    info!("Goodbye");
    Ok(())
}
