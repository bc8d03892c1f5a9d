//! Backend supervision for the chronocop desktop shell.
//!
//! The startup sequence is allocator → supervisor → health poller → window:
//!
//! - [`process::allocate_port`] picks the first bindable port in a range
//! - [`process::BackendSupervisor`] owns the single backend child process
//! - [`health::HealthPoller`] waits for the backend to answer `GET /` with 200
//! - [`launcher::Launcher`] sequences the above and drives a
//!   [`WindowHostPort`](chronocop_core::WindowHostPort)

pub mod config;
mod error;
pub mod health;
pub mod launcher;
pub mod process;

pub use config::{ConfigError, LauncherConfig};
pub use error::LaunchError;
pub use health::{HealthPolicy, HealthPoller, HealthState, HttpProbe, ReqwestProbe};
pub use launcher::{Launcher, StartupPhase};
pub use process::{
    BackendCommand, BackendExit, BackendLogManager, BackendSupervisor, PortRange, allocate_port,
};
