//! Route definitions and router construction.
//!
//! Handlers delegate to the shared `EntryService`.

use axum::Router;
use axum::routing::get;
use chronocop_core::AppMode;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::bootstrap::AxumContext;
use crate::handlers;
use crate::state::AppState;

/// Any origin, method and header may call the API.
fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// API routes without the `/api` prefix (for nesting under /api).
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/entries",
            get(handlers::entries::list).post(handlers::entries::create),
        )
        .route(
            "/entries/{id}",
            axum::routing::put(handlers::entries::update).delete(handlers::entries::remove),
        )
}

fn with_request_tracing(router: Router, mode: AppMode) -> Router {
    if mode.is_packaged() {
        router
    } else {
        router.layer(TraceLayer::new_for_http())
    }
}

/// Create the main Axum router: index page, `/health` and `/api/*`.
///
/// # Path Parameter Syntax
/// Axum 0.8 uses brace syntax for path parameters: `{id}`
pub fn create_router(ctx: AxumContext) -> Router {
    let mode = ctx.mode;
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer();

    let router = Router::new()
        .route("/", get(handlers::index::index))
        .route("/health", get(health_check))
        .nest("/api", api_routes().with_state(state).layer(cors));
    with_request_tracing(router, mode)
}

/// Create a router with API routes and static asset serving.
///
/// Unmatched paths are served from `static_dir`, falling back to its
/// `index.html` for client-side routing. `/` serves that `index.html`
/// instead of the built-in page.
pub fn create_spa_router<P: AsRef<Path>>(ctx: AxumContext, static_dir: P) -> Router {
    let mode = ctx.mode;
    let static_path = static_dir.as_ref();
    let index_path = static_path.join("index.html");

    let serve_dir = ServeDir::new(static_path).fallback(ServeFile::new(&index_path));

    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer();

    // API routes take priority, then fallback to static/SPA serving
    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes().with_state(state).layer(cors))
        .fallback_service(serve_dir);
    with_request_tracing(router, mode)
}

/// Health check endpoint.
pub(crate) async fn health_check() -> &'static str {
    "OK"
}
