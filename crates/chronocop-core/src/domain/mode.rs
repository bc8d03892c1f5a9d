//! Packaged vs development run mode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Environment variable carrying the run mode to the backend process.
pub const MODE_ENV_VAR: &str = "CHRONOCOP_ENV";

/// Whether the application runs from a distributed bundle or a checkout.
///
/// Packaged mode hides error details from the user and surfaces backend
/// crashes as dialogs; development mode logs them for the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    Production,
    Development,
}

impl AppMode {
    /// Value passed to the backend through [`MODE_ENV_VAR`].
    pub const fn as_env_value(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }

    pub const fn is_packaged(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Mode implied by the build profile: release builds are packaged.
    pub const fn from_build() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Production
        }
    }

    /// Resolve the mode from an explicit override, falling back to the build profile.
    ///
    /// Unknown override values are ignored.
    pub fn detect(env_value: Option<&str>) -> Self {
        env_value
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(Self::from_build)
    }
}

impl fmt::Display for AppMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_env_value())
    }
}

impl FromStr for AppMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            other => Err(format!("unknown mode '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_build_profile() {
        assert_eq!(AppMode::detect(Some("production")), AppMode::Production);
        assert_eq!(AppMode::detect(Some("Development")), AppMode::Development);
    }

    #[test]
    fn unknown_override_falls_back() {
        assert_eq!(AppMode::detect(Some("staging")), AppMode::from_build());
        assert_eq!(AppMode::detect(None), AppMode::from_build());
    }

    #[test]
    fn env_value_round_trips() {
        for mode in [AppMode::Production, AppMode::Development] {
            assert_eq!(mode.as_env_value().parse::<AppMode>().unwrap(), mode);
        }
    }
}
