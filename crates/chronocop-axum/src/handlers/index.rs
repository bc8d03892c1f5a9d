//! Built-in UI page.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Serve the built-in index page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
