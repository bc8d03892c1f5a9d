//! Headless launcher for chronocop.
//!
//! Runs the same startup sequence as the desktop shell, but shows the UI in
//! the system browser and reports errors on the terminal.

pub mod browser_host;
pub mod parser;

pub use browser_host::BrowserHost;
pub use parser::Cli;
