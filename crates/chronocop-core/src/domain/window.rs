//! Main window configuration and navigation policy.

use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for the main application window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub title: String,
    /// URL the window loads; set once the backend is healthy.
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub min_width: u32,
    pub min_height: u32,
    /// Keep the window hidden until its content has rendered.
    pub show_when_ready: bool,
    /// Background color painted before the first frame.
    pub background: String,
    /// Open developer tools after creation.
    pub devtools: bool,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            title: "CHRONOCOP".to_string(),
            url: String::new(),
            width: 1400,
            height: 900,
            min_width: 1200,
            min_height: 700,
            show_when_ready: true,
            background: "#0a0a0a".to_string(),
            devtools: false,
        }
    }
}

impl WindowSpec {
    /// Copy of this spec pointed at `url`.
    #[must_use]
    pub fn with_url(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..self.clone()
        }
    }
}

/// Where a navigation request from loaded content should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Stay inside the app window.
    InApp,
    /// Hand off to the operating system's default handler.
    External(String),
    /// Not a URL we can hand to anyone.
    Blocked,
}

/// Decide where `target` should open, given the backend's base URL.
///
/// Only same-origin navigations stay in the window. New-window requests are
/// always treated as external, whatever their origin.
pub fn classify_navigation(base_url: &str, target: &str, new_window: bool) -> Navigation {
    let Ok(target_url) = Url::parse(target) else {
        return Navigation::Blocked;
    };
    if !matches!(target_url.scheme(), "http" | "https" | "mailto") {
        return Navigation::Blocked;
    }
    if new_window {
        return Navigation::External(target_url.into());
    }
    match Url::parse(base_url) {
        Ok(base) if base.origin() == target_url.origin() => Navigation::InApp,
        _ => Navigation::External(target_url.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://127.0.0.1:31340/";

    #[test]
    fn same_origin_stays_in_app() {
        assert_eq!(
            classify_navigation(BASE, "http://127.0.0.1:31340/api/entries", false),
            Navigation::InApp
        );
    }

    #[test]
    fn other_origin_goes_external() {
        assert_eq!(
            classify_navigation(BASE, "https://example.com/help", false),
            Navigation::External("https://example.com/help".to_string())
        );
        // Different port is a different origin
        assert!(matches!(
            classify_navigation(BASE, "http://127.0.0.1:8080/", false),
            Navigation::External(_)
        ));
    }

    #[test]
    fn new_window_always_external() {
        assert!(matches!(
            classify_navigation(BASE, "http://127.0.0.1:31340/report", true),
            Navigation::External(_)
        ));
    }

    #[test]
    fn odd_schemes_blocked() {
        assert_eq!(
            classify_navigation(BASE, "file:///etc/passwd", false),
            Navigation::Blocked
        );
        assert_eq!(classify_navigation(BASE, "not a url", true), Navigation::Blocked);
    }

    #[test]
    fn default_spec_matches_shell_layout() {
        let spec = WindowSpec::default().with_url(BASE);
        assert_eq!((spec.min_width, spec.min_height), (1200, 700));
        assert!(spec.show_when_ready);
        assert_eq!(spec.url, BASE);
    }
}
