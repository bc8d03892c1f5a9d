//! Server log sink port for structured log capture.
//!
//! This port abstracts the destination for backend output (stdout/stderr),
//! allowing the headless launcher and the desktop shell to route lines
//! differently.

use std::fmt;

/// Which standard stream of the child a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    Stdout,
    Stderr,
}

impl LogStream {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

impl fmt::Display for LogStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Port for appending backend log lines to a sink.
///
/// Implementations must not block: they are called from the task draining
/// the child's pipe, and a slow sink would stall the child.
pub trait ServerLogSinkPort: Send + Sync {
    /// Append a log line from the backend process.
    ///
    /// * `port` - Port the backend is listening on (used for grouping logs)
    /// * `stream` - Origin stream of the line
    /// * `line` - The log line content (without trailing newline)
    fn append(&self, port: u16, stream: LogStream, line: String);
}

/// Sink that discards every line.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogSink;

impl ServerLogSinkPort for NoopLogSink {
    fn append(&self, _port: u16, _stream: LogStream, _line: String) {}
}
