//! Startup orchestration.
//!
//! [`Launcher`] runs the allocate → spawn → poll → open-window sequence once,
//! reports failures through the window host, and owns the shutdown hook.
//! Any fatal startup error kills the backend, shows a dialog and quits the
//! application; there is no automatic retry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chronocop_core::{
    AppMode, Navigation, ServerLogSinkPort, WindowHostPort, classify_navigation,
};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::LauncherConfig;
use crate::error::LaunchError;
use crate::health::HealthPoller;
use crate::process::{
    BackendExit, BackendLogManager, BackendSupervisor, PortRange, allocate_port,
};

pub const STARTUP_ERROR_TITLE: &str = "CHRONOCOP Startup Error";
pub const CRASH_DIALOG_TITLE: &str = "Server Error";
pub const CRASH_DIALOG_MESSAGE: &str = "CHRONOCOP server encountered an error and stopped.\n\n\
     Please try restarting the application.\n\n\
     If the problem persists, please contact support.";

/// Backend stderr lines quoted in a development startup dialog.
pub const STARTUP_STDERR_LINES: usize = 10;

const PACKAGED_STARTUP_MESSAGE: &str = "Failed to start the application server.";

/// Where the startup sequence currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupPhase {
    Idle,
    Allocating,
    Spawning,
    Polling,
    Ready,
    Failed,
}

/// Dialog text for a failed startup.
///
/// Packaged builds get a generic message; development builds include the
/// error and whatever the backend last wrote to stderr.
pub fn startup_error_message(
    mode: AppMode,
    err: &LaunchError,
    recent_stderr: &[String],
) -> String {
    if mode.is_packaged() {
        return PACKAGED_STARTUP_MESSAGE.to_string();
    }
    let mut message = format!("Failed to start backend server: {err}");
    if !recent_stderr.is_empty() {
        message.push_str("\n\nBackend stderr:\n");
        message.push_str(&recent_stderr.join("\n"));
    }
    message.push_str("\n\nCheck the terminal for more details.");
    message
}

/// React to the backend exiting after startup.
///
/// Crashes show a dialog in packaged mode and are only logged in development.
pub fn report_backend_exit(mode: AppMode, host: &dyn WindowHostPort, exit: BackendExit) {
    if !exit.is_crash() {
        info!(%exit, "Backend stopped");
        return;
    }
    let err = LaunchError::BackendCrash(exit);
    if mode.is_packaged() {
        error!(error = %err, "Backend crashed");
        host.show_error_dialog(CRASH_DIALOG_TITLE, CRASH_DIALOG_MESSAGE);
    } else {
        error!(error = %err, "Backend crashed, see its output above");
    }
}

/// `http://127.0.0.1:<port>/`
pub fn base_url(port: u16) -> String {
    format!("http://127.0.0.1:{port}/")
}

type PortAllocator = Box<dyn Fn(PortRange) -> Result<u16, LaunchError> + Send + Sync>;

#[derive(Debug)]
struct LaunchState {
    phase: StartupPhase,
    port: Option<u16>,
}

/// Owns the backend supervisor and drives a window host through startup.
pub struct Launcher {
    config: LauncherConfig,
    supervisor: BackendSupervisor,
    logs: Arc<BackendLogManager>,
    poller: HealthPoller,
    host: Arc<dyn WindowHostPort>,
    allocator: PortAllocator,
    state: Mutex<LaunchState>,
    crash_watch: Mutex<Option<JoinHandle<()>>>,
    shutting_down: AtomicBool,
}

impl Launcher {
    /// Launcher probing health over real HTTP.
    pub fn new(
        config: LauncherConfig,
        host: Arc<dyn WindowHostPort>,
        logs: Arc<BackendLogManager>,
    ) -> Result<Self, LaunchError> {
        let poller = HealthPoller::http(config.health)?;
        Ok(Self::with_poller(config, host, logs, poller))
    }

    pub fn with_poller(
        config: LauncherConfig,
        host: Arc<dyn WindowHostPort>,
        logs: Arc<BackendLogManager>,
        poller: HealthPoller,
    ) -> Self {
        let sink: Arc<dyn ServerLogSinkPort> = Arc::<BackendLogManager>::clone(&logs);
        Self {
            config,
            supervisor: BackendSupervisor::new(sink),
            logs,
            poller,
            host,
            allocator: Box::new(allocate_port),
            state: Mutex::new(LaunchState {
                phase: StartupPhase::Idle,
                port: None,
            }),
            crash_watch: Mutex::new(None),
            shutting_down: AtomicBool::new(false),
        }
    }

    /// Replace the port allocator.
    #[must_use]
    pub fn with_port_allocator(
        mut self,
        allocator: impl Fn(PortRange) -> Result<u16, LaunchError> + Send + Sync + 'static,
    ) -> Self {
        self.allocator = Box::new(allocator);
        self
    }

    pub const fn config(&self) -> &LauncherConfig {
        &self.config
    }

    pub const fn supervisor(&self) -> &BackendSupervisor {
        &self.supervisor
    }

    pub fn phase(&self) -> StartupPhase {
        self.lock_state().phase
    }

    pub fn port(&self) -> Option<u16> {
        self.lock_state().port
    }

    pub fn base_url(&self) -> Option<String> {
        self.port().map(base_url)
    }

    /// Run the startup sequence. Returns the backend's port.
    ///
    /// On failure the backend is killed, an error dialog is shown and the
    /// host is asked to quit before the error is returned.
    pub async fn start(&self) -> Result<u16, LaunchError> {
        {
            let mut state = self.lock_state();
            if state.phase != StartupPhase::Idle {
                return Err(LaunchError::AlreadyStarted);
            }
            state.phase = StartupPhase::Allocating;
        }

        match self.bring_up().await {
            Ok(port) => Ok(port),
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    async fn bring_up(&self) -> Result<u16, LaunchError> {
        let port = (self.allocator)(self.config.port_range)?;
        {
            let mut state = self.lock_state();
            state.port = Some(port);
            state.phase = StartupPhase::Spawning;
        }

        self.supervisor
            .spawn(&self.config.backend, port, self.config.mode)?;
        self.set_phase(StartupPhase::Polling);

        let url = base_url(port);
        self.poller.wait_until_healthy(&url).await?;

        self.host
            .open_main_window(&self.config.window.with_url(url.as_str()))?;
        self.set_phase(StartupPhase::Ready);
        self.watch_for_crash();

        info!(port, mode = %self.config.mode, "Startup complete");
        Ok(port)
    }

    fn fail(&self, err: &LaunchError) {
        self.set_phase(StartupPhase::Failed);
        error!(error = %err, "Backend startup failed");
        self.supervisor.kill();
        self.host.show_error_dialog(
            STARTUP_ERROR_TITLE,
            &startup_error_message(
                self.config.mode,
                err,
                &self.logs.recent_errors(STARTUP_STDERR_LINES),
            ),
        );
        self.host.quit();
    }

    fn watch_for_crash(&self) {
        let mut exits = self.supervisor.subscribe_exit();
        let host = Arc::clone(&self.host);
        let mode = self.config.mode;

        let task = tokio::spawn(async move {
            let exit = match exits.wait_for(Option::is_some).await {
                Ok(exit) => *exit,
                Err(_) => return,
            };
            if let Some(exit) = exit {
                report_backend_exit(mode, host.as_ref(), exit);
            }
        });

        *self
            .crash_watch
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(task);
    }

    /// App re-activation: reuse the existing window, never restart the backend.
    ///
    /// Returns whether a new window was opened.
    pub fn activate(&self) -> Result<bool, LaunchError> {
        if self.host.has_main_window() {
            self.host.focus_main_window();
            return Ok(false);
        }

        let port = {
            let state = self.lock_state();
            match (state.phase, state.port) {
                (StartupPhase::Ready, Some(port)) => port,
                _ => return Ok(false),
            }
        };
        if self.shutting_down.load(Ordering::SeqCst) {
            return Ok(false);
        }

        self.host
            .open_main_window(&self.config.window.with_url(base_url(port)))?;
        Ok(true)
    }

    /// Decide whether loaded content may navigate to `target`.
    ///
    /// External targets are handed to the OS and refused in-app.
    pub fn handle_navigation(&self, target: &str, new_window: bool) -> bool {
        let base = self.base_url().unwrap_or_default();
        match classify_navigation(&base, target, new_window) {
            Navigation::InApp => true,
            Navigation::External(url) => {
                debug!(%url, "Opening link externally");
                if let Err(e) = self.host.open_external(&url) {
                    warn!(error = %e, "Failed to open external link");
                }
                false
            }
            Navigation::Blocked => {
                warn!(%target, "Blocked navigation");
                false
            }
        }
    }

    /// Shutdown hook for window-close and app-quit events.
    ///
    /// Kills the backend unconditionally; safe to call any number of times.
    pub fn shutdown(&self) {
        if self.shutting_down.swap(true, Ordering::SeqCst) {
            debug!("Shutdown hook already ran");
        } else {
            info!("Shutting down backend");
            if let Some(task) = self
                .crash_watch
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take()
            {
                task.abort();
            }
        }
        self.supervisor.kill();
    }

    /// [`shutdown`](Self::shutdown), then wait for the backend to be reaped.
    pub async fn shutdown_and_wait(&self) -> Option<BackendExit> {
        self.shutdown();
        self.supervisor.kill_and_wait().await
    }

    fn set_phase(&self, phase: StartupPhase) {
        debug!(?phase, "Startup phase");
        self.lock_state().phase = phase;
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, LaunchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
