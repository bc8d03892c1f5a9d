//! Backend process management.
//!
//! Port probing, child spawning with stdout/stderr capture, exit tracking,
//! and the in-memory log buffer fed by the capture tasks.

mod logs;
mod ports;
mod stream;
mod supervisor;

pub use logs::{BackendLogManager, DEFAULT_LOG_CAPACITY};
pub use ports::{PortRange, allocate_port, allocate_port_with, is_port_available};
pub use stream::spawn_stream_reader;
pub use supervisor::{
    BackendCommand, BackendExit, BackendSupervisor, PORT_ALIAS_ENV_VAR, PORT_ENV_VAR, backend_env,
};
