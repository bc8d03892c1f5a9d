//! Native window host.
//!
//! Implements `WindowHostPort` on top of a Tauri `AppHandle`: one webview
//! window labelled `main`, error dialogs through the dialog plugin, and
//! external links through the OS handler. Popup requests from page content
//! are always denied and routed to the launcher's navigation policy.

use std::sync::Arc;

use chronocop_core::{WindowHostError, WindowHostPort, WindowSpec};
use chronocop_runtime::Launcher;
use tauri::webview::{NewWindowResponse, PageLoadEvent};
use tauri::window::Color;
use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindowBuilder, Wry};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};
use tracing::{info, warn};

pub const MAIN_WINDOW: &str = "main";

/// Parse `#rrggbb` into an opaque color.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Color(channel(0)?, channel(2)?, channel(4)?, 255))
}

pub struct TauriWindowHost {
    app: AppHandle<Wry>,
}

impl TauriWindowHost {
    pub const fn new(app: AppHandle<Wry>) -> Self {
        Self { app }
    }
}

impl WindowHostPort for TauriWindowHost {
    fn open_main_window(&self, spec: &WindowSpec) -> Result<(), WindowHostError> {
        let url = spec
            .url
            .parse()
            .map_err(|e| WindowHostError::CreateFailed(format!("bad url {}: {e}", spec.url)))?;

        let nav_app = self.app.clone();
        let popup_app = self.app.clone();
        let mut builder = WebviewWindowBuilder::new(&self.app, MAIN_WINDOW, WebviewUrl::External(url))
            .title(&spec.title)
            .inner_size(f64::from(spec.width), f64::from(spec.height))
            .min_inner_size(f64::from(spec.min_width), f64::from(spec.min_height))
            .visible(!spec.show_when_ready)
            .on_navigation(move |target| {
                // Launcher is managed before the window can exist
                nav_app
                    .try_state::<Arc<Launcher>>()
                    .is_none_or(|launcher| launcher.handle_navigation(target.as_str(), false))
            })
            .on_new_window(move |target, _features| {
                // Popups never get a native window; the launcher hands them to the OS
                if let Some(launcher) = popup_app.try_state::<Arc<Launcher>>() {
                    launcher.handle_navigation(target.as_str(), true);
                }
                NewWindowResponse::Deny
            })
            .on_page_load(|window, payload| {
                if payload.event() == PageLoadEvent::Finished {
                    if let Err(e) = window.show() {
                        warn!(error = %e, "Failed to show main window");
                    }
                }
            });
        if let Some(color) = parse_hex_color(&spec.background) {
            builder = builder.background_color(color);
        }

        let window = builder
            .build()
            .map_err(|e| WindowHostError::CreateFailed(e.to_string()))?;

        if spec.devtools {
            window.open_devtools();
            info!("DevTools opened for debugging");
        }
        Ok(())
    }

    fn has_main_window(&self) -> bool {
        self.app.get_webview_window(MAIN_WINDOW).is_some()
    }

    fn focus_main_window(&self) {
        if let Some(window) = self.app.get_webview_window(MAIN_WINDOW) {
            let _ = window.unminimize();
            let _ = window.show();
            let _ = window.set_focus();
        }
    }

    fn show_error_dialog(&self, title: &str, message: &str) {
        self.app
            .dialog()
            .message(message)
            .title(title)
            .kind(MessageDialogKind::Error)
            .blocking_show();
    }

    fn open_external(&self, url: &str) -> Result<(), WindowHostError> {
        open::that(url).map_err(|e| WindowHostError::OpenExternal {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    fn quit(&self) {
        self.app.exit(1);
    }
}
