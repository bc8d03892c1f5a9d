//! Backend log capture.
//!
//! Lines read from the child's pipes are re-emitted as `tracing` events and
//! kept in a bounded ring buffer, so a failed startup can quote the
//! backend's last complaints. Appending never blocks: the oldest line is
//! evicted when the buffer is full.

use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

use chronocop_core::{LogStream, ServerLogSinkPort};
use tracing::{info, warn};

/// Lines kept in memory when no capacity is given.
pub const DEFAULT_LOG_CAPACITY: usize = 2000;

/// Ring buffer over backend output.
pub struct BackendLogManager {
    capacity: usize,
    lines: RwLock<VecDeque<(LogStream, String)>>,
}

impl BackendLogManager {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }

    /// A manager keeping at most `capacity` lines (minimum one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            lines: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// The last `n` buffered stderr lines, oldest first.
    pub fn recent_errors(&self, n: usize) -> Vec<String> {
        let lines = self.lines.read().unwrap_or_else(PoisonError::into_inner);
        let mut errors: Vec<String> = lines
            .iter()
            .rev()
            .filter(|(stream, _)| *stream == LogStream::Stderr)
            .take(n)
            .map(|(_, line)| line.clone())
            .collect();
        errors.reverse();
        errors
    }
}

impl Default for BackendLogManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerLogSinkPort for BackendLogManager {
    fn append(&self, port: u16, stream: LogStream, line: String) {
        match stream {
            LogStream::Stdout => info!(target: "chronocop::backend", port, %stream, "{line}"),
            LogStream::Stderr => warn!(target: "chronocop::backend", port, %stream, "{line}"),
        }

        let mut lines = self.lines.write().unwrap_or_else(PoisonError::into_inner);
        if lines.len() >= self.capacity {
            lines.pop_front();
        }
        lines.push_back((stream, line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_when_full() {
        let logs = BackendLogManager::with_capacity(2);
        logs.append(1, LogStream::Stderr, "a".into());
        logs.append(1, LogStream::Stderr, "b".into());
        logs.append(1, LogStream::Stderr, "c".into());

        assert_eq!(logs.recent_errors(10), vec!["b", "c"]);
    }

    #[test]
    fn recent_errors_skips_stdout_and_keeps_order() {
        let logs = BackendLogManager::new();
        logs.append(1, LogStream::Stderr, "first".into());
        logs.append(1, LogStream::Stdout, "noise".into());
        logs.append(1, LogStream::Stderr, "second".into());
        logs.append(1, LogStream::Stderr, "third".into());

        assert_eq!(logs.recent_errors(2), vec!["second", "third"]);
        assert_eq!(logs.recent_errors(0), Vec::<String>::new());
    }

    #[test]
    fn zero_capacity_still_keeps_the_last_line() {
        let logs = BackendLogManager::with_capacity(0);
        logs.append(1, LogStream::Stderr, "x".into());
        logs.append(1, LogStream::Stderr, "y".into());
        assert_eq!(logs.recent_errors(5), vec!["y"]);
    }
}
