use std::time::Duration;

use chronocop_core::WindowHostError;
use thiserror::Error;

use crate::process::BackendExit;

/// Failures of the backend startup sequence and its supervision.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Every port in the configured range was taken.
    #[error("No free port in range {min}-{max} ({probes} ports probed)")]
    PortExhausted { min: u16, max: u16, probes: usize },

    /// The backend executable could not be launched.
    #[error("Failed to launch {program}: {reason}")]
    SpawnFailure { program: String, reason: String },

    /// The backend never answered the health probe with 200.
    #[error("Backend at {url} not healthy after {attempts} attempts ({budget:?} budget)")]
    HealthTimeout {
        url: String,
        attempts: u32,
        budget: Duration,
    },

    /// The backend exited without being asked to.
    #[error("Backend exited unexpectedly ({0})")]
    BackendCrash(BackendExit),

    /// A backend child is already live.
    #[error("Backend is already running on port {port}")]
    AlreadyRunning { port: u16 },

    /// `start` was called more than once.
    #[error("Startup sequence already ran")]
    AlreadyStarted,

    #[error(transparent)]
    Window(#[from] WindowHostError),

    #[error("Internal error: {0}")]
    Internal(String),
}
