//! Menu event handling.

use crate::lifecycle::shutdown_then_exit;
use crate::menu::ids;
use crate::window_host::MAIN_WINDOW;
use tauri::{AppHandle, Manager};
use tracing::{debug, info, warn};

/// Handle menu item click events.
pub fn handle_menu_event(app: &AppHandle, event: tauri::menu::MenuEvent) {
    let id = event.id().as_ref();

    debug!(menu_id = %id, "Menu event received");

    match id {
        ids::OPEN_DEVTOOLS => {
            // No window yet while the backend is still starting
            if let Some(window) = app.get_webview_window(MAIN_WINDOW) {
                window.open_devtools();
            }
        }
        ids::RELOAD => {
            if let Some(window) = app.get_webview_window(MAIN_WINDOW) {
                if let Err(e) = window.reload() {
                    warn!(error = %e, "Failed to reload main window");
                }
            }
        }
        ids::QUIT => {
            info!("Quit selected from menu - stopping backend");
            if let Some(window) = app.get_webview_window(MAIN_WINDOW) {
                let _ = window.hide();
            }
            shutdown_then_exit(app);
        }
        _ => {
            debug!(menu_id = %id, "Unhandled menu event");
        }
    }
}
