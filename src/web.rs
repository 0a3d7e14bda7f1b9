#![cfg(not(tarpaulin_include))]

use clap::Parser;
use sales_dashboard::{app, config::Config};

/// Main entry point for the dashboard server
///
/// Reads launch settings from flags and environment, sets up logging
/// (`RUST_LOG`, `info` by default) and serves until the process is stopped.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    log::info!(
        "Starting sales dashboard on {} with data from {}",
        config.address(),
        config.data.display()
    );

    app::run(config).await
}
