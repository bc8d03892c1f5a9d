//! Launcher configuration.
//!
//! Defaults match the shipped desktop shell. Every value can be overridden
//! through `CHRONOCOP_*` environment variables; `from_lookup` takes the
//! variable source as a function so tests never touch the process env.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chronocop_core::paths::exe_dir;
use chronocop_core::{AppMode, MODE_ENV_VAR, PathError, WindowSpec};
use thiserror::Error;

use crate::health::HealthPolicy;
use crate::process::{BackendCommand, PortRange};

pub const PORT_MIN_ENV_VAR: &str = "CHRONOCOP_PORT_MIN";
pub const PORT_MAX_ENV_VAR: &str = "CHRONOCOP_PORT_MAX";
pub const HEALTH_ATTEMPTS_ENV_VAR: &str = "CHRONOCOP_HEALTH_ATTEMPTS";
pub const HEALTH_INTERVAL_ENV_VAR: &str = "CHRONOCOP_HEALTH_INTERVAL_MS";
pub const HEALTH_TIMEOUT_ENV_VAR: &str = "CHRONOCOP_HEALTH_TIMEOUT_MS";
pub const SERVER_BIN_ENV_VAR: &str = "CHRONOCOP_SERVER_BIN";
/// Any non-empty value opens devtools even in a packaged build.
pub const DEBUG_ENV_VAR: &str = "CHRONOCOP_DEBUG";

/// File stem of the backend executable.
pub const SERVER_BIN_NAME: &str = "chronocop-server";

/// Lowest port the launcher will hand to the backend.
pub const MIN_UNPRIVILEGED_PORT: u16 = 1024;

/// Errors from building or validating a [`LauncherConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Port range {min}-{max} is empty")]
    EmptyPortRange { min: u16, max: u16 },

    #[error("Port range must start at or above 1024, got {0}")]
    PrivilegedPort(u16),

    #[error("Health check needs at least one attempt")]
    ZeroAttempts,

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("Cannot locate backend executable: {0}")]
    BackendLocation(#[from] PathError),
}

/// Everything the launcher needs to bring up the backend and its window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    pub port_range: PortRange,
    pub health: HealthPolicy,
    pub mode: AppMode,
    pub backend: BackendCommand,
    pub window: WindowSpec,
}

impl LauncherConfig {
    /// Defaults for `mode` with the backend at `backend`.
    pub fn new(mode: AppMode, backend: BackendCommand) -> Self {
        Self {
            port_range: PortRange::DEFAULT,
            health: HealthPolicy::default(),
            mode,
            backend,
            window: WindowSpec {
                devtools: !mode.is_packaged(),
                ..WindowSpec::default()
            },
        }
    }

    /// Build from the process environment.
    ///
    /// `resource_dir` is the bundle's resource directory when running packaged.
    pub fn from_env(resource_dir: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), resource_dir)
    }

    /// Build from an arbitrary variable source, then validate.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        resource_dir: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mode = AppMode::detect(lookup(MODE_ENV_VAR).as_deref());

        let program = match lookup(SERVER_BIN_ENV_VAR).filter(|v| !v.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_backend_path(mode, resource_dir)?,
        };

        let mut config = Self::new(mode, BackendCommand::new(program));
        if lookup(DEBUG_ENV_VAR).is_some_and(|v| !v.trim().is_empty()) {
            config.window.devtools = true;
        }

        if let Some(min) = parse_var(&lookup, PORT_MIN_ENV_VAR)? {
            config.port_range.min = min;
        }
        if let Some(max) = parse_var(&lookup, PORT_MAX_ENV_VAR)? {
            config.port_range.max = max;
        }
        if let Some(attempts) = parse_var(&lookup, HEALTH_ATTEMPTS_ENV_VAR)? {
            config.health.max_attempts = attempts;
        }
        if let Some(ms) = parse_var(&lookup, HEALTH_INTERVAL_ENV_VAR)? {
            config.health.interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var(&lookup, HEALTH_TIMEOUT_ENV_VAR)? {
            config.health.request_timeout = Duration::from_millis(ms);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let PortRange { min, max } = self.port_range;
        if min > max {
            return Err(ConfigError::EmptyPortRange { min, max });
        }
        if min < MIN_UNPRIVILEGED_PORT {
            return Err(ConfigError::PrivilegedPort(min));
        }
        if self.health.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.health.interval.is_zero() {
            return Err(ConfigError::ZeroDuration("Health check interval"));
        }
        if self.health.request_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("Health check timeout"));
        }
        Ok(())
    }
}

/// `chronocop-server` with the platform's executable suffix.
pub fn server_binary_name() -> String {
    format!("{SERVER_BIN_NAME}{}", std::env::consts::EXE_SUFFIX)
}

/// Where the backend lives when no override is set.
///
/// Packaged builds ship it in the resource directory; development builds
/// find it next to the running executable (the cargo target directory).
pub fn default_backend_path(
    mode: AppMode,
    resource_dir: Option<&Path>,
) -> Result<PathBuf, ConfigError> {
    let dir = match resource_dir {
        Some(dir) if mode.is_packaged() => dir.to_path_buf(),
        _ => exe_dir()?,
    };
    Ok(dir.join(server_binary_name()))
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        })
}
