//! Window host port.
//!
//! The startup orchestrator drives the user-facing shell through this trait:
//! the desktop app implements it with a native webview window, the headless
//! launcher with the system browser.

use thiserror::Error;

use crate::domain::WindowSpec;

/// Errors raised by a window host.
#[derive(Debug, Error)]
pub enum WindowHostError {
    #[error("Failed to create window: {0}")]
    CreateFailed(String),

    #[error("Failed to open external URL {url}: {reason}")]
    OpenExternal { url: String, reason: String },
}

/// Port for the shell that shows the backend's UI.
pub trait WindowHostPort: Send + Sync {
    /// Create the main window and load `spec.url`.
    ///
    /// Hosts honouring `spec.show_when_ready` keep the window hidden until
    /// its content is ready.
    fn open_main_window(&self, spec: &WindowSpec) -> Result<(), WindowHostError>;

    /// Whether a main window currently exists.
    fn has_main_window(&self) -> bool;

    /// Bring the existing main window to the front.
    fn focus_main_window(&self);

    /// Show a blocking modal error dialog.
    fn show_error_dialog(&self, title: &str, message: &str);

    /// Hand a URL to the operating system's default handler.
    fn open_external(&self, url: &str) -> Result<(), WindowHostError>;

    /// Terminate the whole application.
    fn quit(&self);
}
