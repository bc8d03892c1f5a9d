//! Native application menu.
//!
//! One `CHRONOCOP` submenu with the debugging shortcuts (developer tools,
//! reload) and Quit, plus the standard Edit items so clipboard shortcuts
//! reach the webview on macOS.
//!
//! # Module Structure
//!
//! - `ids` - Menu item ID constants for event handling
//! - `build` - Menu construction
//! - `handlers` - Menu event handling

mod build;
pub mod handlers;
pub mod ids;

pub use build::build_app_menu;
