//! Command-line arguments.
//!
//! Arguments override the `CHRONOCOP_*` environment variables read by
//! `LauncherConfig::from_lookup`.

use std::path::PathBuf;

use chronocop_core::{AppMode, MODE_ENV_VAR};
use chronocop_runtime::config::{
    HEALTH_ATTEMPTS_ENV_VAR, HEALTH_INTERVAL_ENV_VAR, PORT_MAX_ENV_VAR, PORT_MIN_ENV_VAR,
    SERVER_BIN_ENV_VAR,
};
use chronocop_runtime::{ConfigError, LauncherConfig};
use clap::Parser;

/// Start the chronocop backend and open it in the browser.
#[derive(Debug, Parser)]
#[command(name = "chronocop")]
#[command(about = "Launch the CHRONOCOP time audit calendar")]
#[command(version)]
pub struct Cli {
    /// Path to the chronocop-server executable
    #[arg(long = "server-bin")]
    pub server_bin: Option<PathBuf>,

    /// Lowest port to try for the backend
    #[arg(long = "port-min")]
    pub port_min: Option<u16>,

    /// Highest port to try for the backend
    #[arg(long = "port-max")]
    pub port_max: Option<u16>,

    /// Run mode passed to the backend (production or development)
    #[arg(long = "mode", value_parser = parse_mode)]
    pub mode: Option<AppMode>,

    /// Maximum number of health probes
    #[arg(long = "health-attempts")]
    pub health_attempts: Option<u32>,

    /// Delay between health probes, in milliseconds
    #[arg(long = "health-interval-ms")]
    pub health_interval_ms: Option<u64>,

    /// Print the URL instead of opening a browser
    #[arg(long = "no-browser")]
    pub no_browser: bool,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

fn parse_mode(value: &str) -> Result<AppMode, String> {
    value.parse()
}

impl Cli {
    /// Value an argument supplies for a launcher variable, if it was given.
    fn override_for(&self, key: &str) -> Option<String> {
        match key {
            MODE_ENV_VAR => self.mode.map(|mode| mode.as_env_value().to_string()),
            SERVER_BIN_ENV_VAR => self
                .server_bin
                .as_ref()
                .map(|path| path.to_string_lossy().into_owned()),
            PORT_MIN_ENV_VAR => self.port_min.map(|port| port.to_string()),
            PORT_MAX_ENV_VAR => self.port_max.map(|port| port.to_string()),
            HEALTH_ATTEMPTS_ENV_VAR => self.health_attempts.map(|n| n.to_string()),
            HEALTH_INTERVAL_ENV_VAR => self.health_interval_ms.map(|ms| ms.to_string()),
            _ => None,
        }
    }

    /// Launcher config with arguments layered over `env`.
    ///
    /// An environment value shadowed by an argument is never parsed, and the
    /// result is validated once.
    pub fn config(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<LauncherConfig, ConfigError> {
        LauncherConfig::from_lookup(|key: &str| self.override_for(key).or_else(|| env(key)), None)
    }
}
