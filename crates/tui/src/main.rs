mod app;

use std::{
    fs::{self, OpenOptions},
    sync::Mutex,
};

use anyhow::{Context, Result};
use station_core::{
    config::{self, AppConfig},
    Repository,
};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let config_path = config::ensure_default_config()?;
    let config = AppConfig::load()?;
    info!(
        config = %config_path.display(),
        data_dir = %config.data_dir.display(),
        "Configuration loaded"
    );

    let repository = Repository::open(&config)
        .with_context(|| format!("failed to open registry in {}", config.data_dir.display()))?;

    let mut app = app::StationApp::new(repository);
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("station.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
