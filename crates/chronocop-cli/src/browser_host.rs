//! Window host backed by the system browser.
//!
//! "Dialogs" go to stderr and `quit` wakes the launcher's main loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chronocop_core::{WindowHostError, WindowHostPort, WindowSpec};
use tokio::sync::Notify;
use tracing::{info, warn};

/// [`WindowHostPort`] that opens the UI in the default browser.
pub struct BrowserHost {
    open_browser: bool,
    opened: AtomicBool,
    last_url: std::sync::Mutex<Option<String>>,
    quit: Arc<Notify>,
}

impl BrowserHost {
    /// With `open_browser` false the URL is only printed.
    pub fn new(open_browser: bool) -> Self {
        Self {
            open_browser,
            opened: AtomicBool::new(false),
            last_url: std::sync::Mutex::new(None),
            quit: Arc::new(Notify::new()),
        }
    }

    /// Resolves once [`WindowHostPort::quit`] has been called.
    pub async fn quit_requested(&self) {
        self.quit.notified().await;
    }

    fn show(&self, url: &str) -> Result<(), WindowHostError> {
        if self.open_browser {
            open::that(url).map_err(|e| WindowHostError::CreateFailed(e.to_string()))?;
        }
        Ok(())
    }
}

impl WindowHostPort for BrowserHost {
    fn open_main_window(&self, spec: &WindowSpec) -> Result<(), WindowHostError> {
        println!("{} is running at {}", spec.title, spec.url);
        self.show(&spec.url)?;
        *self
            .last_url
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(spec.url.clone());
        self.opened.store(true, Ordering::SeqCst);
        info!(url = %spec.url, browser = self.open_browser, "Main window opened");
        Ok(())
    }

    fn has_main_window(&self) -> bool {
        self.opened.load(Ordering::SeqCst)
    }

    fn focus_main_window(&self) {
        let url = self
            .last_url
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        if let Some(url) = url {
            if let Err(e) = self.show(&url) {
                warn!(error = %e, "Failed to refocus browser");
            }
        }
    }

    fn show_error_dialog(&self, title: &str, message: &str) {
        eprintln!("\n{title}\n\n{message}\n");
    }

    fn open_external(&self, url: &str) -> Result<(), WindowHostError> {
        open::that(url).map_err(|e| WindowHostError::OpenExternal {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    fn quit(&self) {
        self.quit.notify_one();
    }
}
