//! Backend child process supervisor.
//!
//! The supervisor owns at most one live backend. A watcher task owns the
//! `Child` itself and waits on either its exit or a kill request, then
//! publishes a [`BackendExit`] on a `watch` channel. `kill` only signals the
//! watcher, so it is synchronous, idempotent and safe to call from window
//! event callbacks or `Drop`.

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};

use chronocop_core::{AppMode, LogStream, MODE_ENV_VAR, ServerLogSinkPort};
use tokio::process::{Child, Command};
use tokio::sync::{oneshot, watch};
use tracing::{debug, error, info, warn};

use super::stream::spawn_stream_reader;
use crate::error::LaunchError;

/// Primary port variable read by the backend.
pub const PORT_ENV_VAR: &str = "CHRONOCOP_PORT";
/// Generic alias for the port, for servers that only look at `PORT`.
pub const PORT_ALIAS_ENV_VAR: &str = "PORT";

/// Executable, arguments, working directory and extra environment of the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    /// Extra variables; the port and mode variables are always added on top.
    pub env: Vec<(String, String)>,
}

impl BackendCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            env: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Environment handed to the backend for a given port and mode.
pub fn backend_env(port: u16, mode: AppMode) -> Vec<(String, String)> {
    vec![
        (PORT_ENV_VAR.to_string(), port.to_string()),
        (PORT_ALIAS_ENV_VAR.to_string(), port.to_string()),
        (MODE_ENV_VAR.to_string(), mode.as_env_value().to_string()),
    ]
}

/// How a backend child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendExit {
    pub port: u16,
    /// Exit code; `None` when the process was ended by a signal.
    pub code: Option<i32>,
    /// Whether the supervisor asked for the exit.
    pub kill_requested: bool,
}

impl BackendExit {
    /// An exit nobody asked for with anything other than code 0.
    pub const fn is_crash(&self) -> bool {
        !self.kill_requested && !matches!(self.code, Some(0))
    }
}

impl fmt::Display for BackendExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}")?,
            None => f.write_str("terminated by signal")?,
        }
        if self.kill_requested {
            f.write_str(", kill requested")?;
        }
        Ok(())
    }
}

struct ChildHandle {
    pid: Option<u32>,
    port: u16,
    kill_tx: Option<oneshot::Sender<()>>,
}

/// Owner of the backend child process.
pub struct BackendSupervisor {
    handle: Mutex<Option<ChildHandle>>,
    sink: Arc<dyn ServerLogSinkPort>,
    exit_tx: watch::Sender<Option<BackendExit>>,
}

impl BackendSupervisor {
    pub fn new(sink: Arc<dyn ServerLogSinkPort>) -> Self {
        let (exit_tx, _) = watch::channel(None);
        Self {
            handle: Mutex::new(None),
            sink,
            exit_tx,
        }
    }

    /// Spawn the backend listening on `port`.
    ///
    /// Must be called within a tokio runtime. Fails with `AlreadyRunning`
    /// while a previous child is still live.
    pub fn spawn(
        &self,
        command: &BackendCommand,
        port: u16,
        mode: AppMode,
    ) -> Result<(), LaunchError> {
        let mut guard = self.handle.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = guard.as_ref() {
            if self.child_live() {
                return Err(LaunchError::AlreadyRunning {
                    port: existing.port,
                });
            }
        }

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .envs(command.env.iter().cloned())
            .envs(backend_env(port, mode))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }

        let program = command.program.display().to_string();
        info!(%program, args = ?command.args, port, %mode, "Spawning backend");

        let mut child = cmd.spawn().map_err(|e| {
            error!(%program, error = %e, "Failed to spawn backend");
            LaunchError::SpawnFailure {
                program: program.clone(),
                reason: e.to_string(),
            }
        })?;

        if let Some(stdout) = child.stdout.take() {
            spawn_stream_reader(stdout, port, LogStream::Stdout, Arc::clone(&self.sink));
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_stream_reader(stderr, port, LogStream::Stderr, Arc::clone(&self.sink));
        }

        let pid = child.id();
        debug!(?pid, port, "Backend spawned");

        // Cleared before the watcher exists, so it can only ever be set by this child
        self.exit_tx.send_replace(None);
        let (kill_tx, kill_rx) = oneshot::channel();
        tokio::spawn(watch_child(child, port, kill_rx, self.exit_tx.clone()));

        *guard = Some(ChildHandle {
            pid,
            port,
            kill_tx: Some(kill_tx),
        });
        Ok(())
    }

    /// Request termination of the live child.
    ///
    /// Returns whether a kill was actually sent. Calling this with no child,
    /// or again after a kill, does nothing.
    pub fn kill(&self) -> bool {
        let mut guard = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(handle) = guard.as_mut() else {
            return false;
        };
        if !self.child_live() {
            return false;
        }
        match handle.kill_tx.take() {
            Some(tx) => {
                info!(pid = ?handle.pid, port = handle.port, "Killing backend");
                tx.send(()).is_ok()
            }
            None => false,
        }
    }

    /// Kill the child and wait until its exit has been recorded.
    ///
    /// Returns the last recorded exit, or `None` if nothing was ever spawned.
    pub async fn kill_and_wait(&self) -> Option<BackendExit> {
        let mut rx = self.exit_tx.subscribe();
        let has_child = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        if !has_child {
            return None;
        }
        self.kill();
        rx.wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|exit| *exit)
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
            && self.child_live()
    }

    pub fn pid(&self) -> Option<u32> {
        let guard = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .filter(|_| self.child_live())
            .and_then(|h| h.pid)
    }

    /// Receiver that yields `Some(exit)` once the current child has ended.
    pub fn subscribe_exit(&self) -> watch::Receiver<Option<BackendExit>> {
        self.exit_tx.subscribe()
    }

    pub fn last_exit(&self) -> Option<BackendExit> {
        *self.exit_tx.borrow()
    }

    /// The current child counts as live until its exit is published.
    fn child_live(&self) -> bool {
        self.exit_tx.borrow().is_none()
    }
}

impl Drop for BackendSupervisor {
    fn drop(&mut self) {
        self.kill();
    }
}

async fn watch_child(
    mut child: Child,
    port: u16,
    kill_rx: oneshot::Receiver<()>,
    exit_tx: watch::Sender<Option<BackendExit>>,
) {
    let mut kill_requested = false;
    let status = tokio::select! {
        status = child.wait() => status,
        // A dropped sender also means the owner is gone
        _ = kill_rx => {
            kill_requested = true;
            if let Err(e) = child.start_kill() {
                debug!(port, error = %e, "start_kill failed, child may have exited already");
            }
            child.wait().await
        }
    };

    let code = match status {
        Ok(status) => status.code(),
        Err(e) => {
            warn!(port, error = %e, "Failed to reap backend");
            None
        }
    };
    let exit = BackendExit {
        port,
        code,
        kill_requested,
    };

    if exit.is_crash() {
        error!(port, %exit, "Backend exited unexpectedly");
    } else {
        info!(port, %exit, "Backend exited");
    }
    exit_tx.send_replace(Some(exit));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronocop_core::NoopLogSink;

    #[test]
    fn env_carries_port_under_both_names_and_mode() {
        let env = backend_env(31340, AppMode::Production);
        assert!(env.contains(&("CHRONOCOP_PORT".into(), "31340".into())));
        assert!(env.contains(&("PORT".into(), "31340".into())));
        assert!(env.contains(&("CHRONOCOP_ENV".into(), "production".into())));
    }

    #[test]
    fn crash_classification() {
        let exit = |code, kill_requested| BackendExit {
            port: 1,
            code,
            kill_requested,
        };
        assert!(!exit(Some(0), false).is_crash());
        assert!(!exit(Some(0), true).is_crash());
        assert!(!exit(None, true).is_crash());
        assert!(!exit(Some(137), true).is_crash());
        assert!(exit(Some(1), false).is_crash());
        assert!(exit(None, false).is_crash());
    }

    #[tokio::test]
    async fn kill_without_child_is_noop() {
        let supervisor = BackendSupervisor::new(Arc::new(NoopLogSink));
        assert!(!supervisor.kill());
        assert!(!supervisor.kill());
        assert!(supervisor.kill_and_wait().await.is_none());
        assert!(!supervisor.is_running());
    }

    #[tokio::test]
    async fn missing_executable_is_spawn_failure() {
        let supervisor = BackendSupervisor::new(Arc::new(NoopLogSink));
        let command = BackendCommand::new("/definitely/not/here/chronocop-server");
        let err = supervisor
            .spawn(&command, 31337, AppMode::Development)
            .unwrap_err();
        assert!(matches!(err, LaunchError::SpawnFailure { .. }));
        assert!(!supervisor.is_running());
    }
}
