//! `chronocop-server` entry point.
//!
//! Spawned by the desktop shell and the `chronocop` launcher with the port in
//! `CHRONOCOP_PORT`/`PORT` and the run mode in `CHRONOCOP_ENV`.

use chronocop_axum::{ServerConfig, start_server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    start_server(config).await
}
