//! HTTP backend for chronocop.
//!
//! Serves the calendar UI at `/`, a plain `/health` check and the time
//! entry API under `/api`. The desktop shell and the `chronocop` launcher
//! spawn the `chronocop-server` binary and probe `/` until it answers 200.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings for integration-test-only crates
#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use serde_json as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tower as _;

// Used by main.rs binary
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-export primary types
pub use bootstrap::{AxumContext, ServerConfig, bootstrap, start_server};
pub use error::HttpError;
pub use routes::{create_router, create_spa_router};
pub use state::AppState;
