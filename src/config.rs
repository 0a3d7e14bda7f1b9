#![cfg(feature = "web")]
use clap::Parser;
use std::path::PathBuf;

/// Launch settings for the dashboard server
///
/// Every flag can also come from the environment; flags win.
#[derive(Parser, Debug, Clone)]
#[command(name = "sales-dashboard", version, about = "Cross-filtering sales dashboard")]
pub struct Config {
    /// Interface to listen on
    #[arg(long, env = "DASHBOARD_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "DASHBOARD_PORT", default_value_t = 8050)]
    pub port: u16,

    /// Sales CSV with Product Name, Region Name, Month Name and Revenue columns
    #[arg(long, env = "DASHBOARD_DATA", default_value = "assets/sales_data.csv")]
    pub data: PathBuf,

    /// Directory served under /assets
    #[arg(long, env = "DASHBOARD_ASSETS", default_value = "assets")]
    pub assets_dir: PathBuf,
}

impl Config {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
