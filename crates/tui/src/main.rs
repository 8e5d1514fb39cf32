mod app;

use anyhow::Result;
use std::fs::{self, OpenOptions};

use tracing_subscriber::{prelude::*, EnvFilter};

use stockroom_core::{
    config::{self, AppConfig},
    Inventory,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;

    let mut inventory = Inventory::new();
    let inventory_path = config.inventory_path();
    if inventory_path.exists() {
        match inventory.load_from_file(&inventory_path) {
            Ok(report) => tracing::info!(
                loaded = report.loaded,
                skipped = report.skipped.len(),
                "Inventory loaded at startup"
            ),
            Err(err) => tracing::error!("Failed to load inventory at startup: {err}"),
        }
    }

    let mut app = app::StockroomApp::new(config, inventory);
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("stockroom.log");

    let env_filter = EnvFilter::from_default_env();

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
