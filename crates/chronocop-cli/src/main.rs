//! `chronocop` entry point - the composition root for the headless launcher.

use std::process::ExitCode;
use std::sync::Arc;

use chronocop_cli::{BrowserHost, Cli};
use chronocop_core::WindowHostPort;
use chronocop_runtime::{BackendLogManager, Launcher};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = cli.config(|key| std::env::var(key).ok())?;

    let host = Arc::new(BrowserHost::new(!cli.no_browser));
    let launcher = Launcher::new(
        config,
        Arc::clone(&host) as Arc<dyn WindowHostPort>,
        Arc::new(BackendLogManager::new()),
    )?;

    if let Err(e) = launcher.start().await {
        error!(error = %e, "Startup failed");
        return Ok(ExitCode::FAILURE);
    }

    let mut exits = launcher.supervisor().subscribe_exit();
    let crashed = tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            false
        }
        () = host.quit_requested() => false,
        exit = exits.wait_for(Option::is_some) => {
            exit.ok().and_then(|e| *e).is_some_and(|e| e.is_crash())
        }
    };

    launcher.shutdown_and_wait().await;
    Ok(if crashed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
