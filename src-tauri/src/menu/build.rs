//! Menu construction.

use super::ids;
use tauri::{
    AppHandle, Wry,
    menu::{Menu, MenuItem, PredefinedMenuItem, Submenu},
};

/// Quit shortcut: Cmd+Q on macOS, Ctrl+Q everywhere else.
pub const fn quit_accelerator() -> &'static str {
    if cfg!(target_os = "macos") {
        "Cmd+Q"
    } else {
        "Ctrl+Q"
    }
}

/// Build the complete application menu.
///
/// Quit is a custom item rather than `PredefinedMenuItem::quit` so it goes
/// through the backend shutdown hook before the process exits.
pub fn build_app_menu(app: &AppHandle) -> Result<Menu<Wry>, tauri::Error> {
    let devtools_item = MenuItem::with_id(
        app,
        ids::OPEN_DEVTOOLS,
        "Open Developer Tools",
        true,
        Some("F12"),
    )?;

    let reload_item = MenuItem::with_id(app, ids::RELOAD, "Reload", true, Some("CmdOrCtrl+R"))?;

    let quit_item = MenuItem::with_id(app, ids::QUIT, "Quit", true, Some(quit_accelerator()))?;

    // First submenu becomes the app menu on macOS
    let app_submenu = Submenu::with_items(
        app,
        "CHRONOCOP",
        true,
        &[
            &devtools_item,
            &reload_item,
            &PredefinedMenuItem::separator(app)?,
            &quit_item,
        ],
    )?;

    // Undo/Redo predefined items only exist on macOS; elsewhere the webview
    // handles Ctrl+Z/Ctrl+Y itself.
    let edit_submenu = Submenu::with_items(
        app,
        "Edit",
        true,
        &[
            #[cfg(target_os = "macos")]
            &PredefinedMenuItem::undo(app, None)?,
            #[cfg(target_os = "macos")]
            &PredefinedMenuItem::redo(app, None)?,
            #[cfg(target_os = "macos")]
            &PredefinedMenuItem::separator(app)?,
            &PredefinedMenuItem::cut(app, None)?,
            &PredefinedMenuItem::copy(app, None)?,
            &PredefinedMenuItem::paste(app, None)?,
            &PredefinedMenuItem::separator(app)?,
            &PredefinedMenuItem::select_all(app, None)?,
        ],
    )?;

    Menu::with_items(app, &[&app_submenu, &edit_submenu])
}
