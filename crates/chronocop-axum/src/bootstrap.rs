//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the backend. All concrete implementations are instantiated here.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chronocop_core::paths::{data_root, database_path_in};
use chronocop_core::{AppMode, EntryService, MODE_ENV_VAR, TimeEntryRepository};
use chronocop_db::{SqliteTimeEntryRepository, setup_database};
use tokio::net::TcpListener;
use tracing::info;

/// Port used when neither port variable is set.
pub const DEFAULT_PORT: u16 = 31337;
/// Variable pointing at a directory of built UI assets.
pub const STATIC_DIR_ENV_VAR: &str = "CHRONOCOP_STATIC_DIR";

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port for the HTTP server; always bound on loopback.
    pub port: u16,
    pub mode: AppMode,
    /// Database file; `None` means `<data_root>/time_audit.db`.
    pub database_path: Option<PathBuf>,
    /// Optional path to static assets for SPA serving.
    pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration from an arbitrary variable source.
    ///
    /// The port comes from `CHRONOCOP_PORT`, then `PORT`, then [`DEFAULT_PORT`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match lookup("CHRONOCOP_PORT").or_else(|| lookup("PORT")) {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid port '{raw}'"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            mode: AppMode::detect(lookup(MODE_ENV_VAR).as_deref()),
            database_path: None,
            static_dir: lookup(STATIC_DIR_ENV_VAR)
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    /// Use a specific database file.
    #[must_use]
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, self.port))
    }
}

/// Application context for the Axum adapter.
pub struct AxumContext {
    pub entries: Arc<EntryService>,
    pub mode: AppMode,
}

impl AxumContext {
    /// Context over any entry repository.
    pub fn new(repo: Arc<dyn TimeEntryRepository>, mode: AppMode) -> Self {
        Self {
            entries: Arc::new(EntryService::new(repo)),
            mode,
        }
    }
}

/// Open the database and build the handler context.
pub async fn bootstrap(config: &ServerConfig) -> Result<AxumContext> {
    let db_path = match &config.database_path {
        Some(path) => path.clone(),
        None => database_path_in(&data_root()?),
    };

    info!(
        target: "chronocop.paths",
        database_path = %db_path.display(),
        mode = %config.mode,
        "Axum bootstrap resolved paths"
    );

    let pool = setup_database(&db_path).await?;
    let repo: Arc<dyn TimeEntryRepository> = Arc::new(SqliteTimeEntryRepository::new(pool));
    Ok(AxumContext::new(repo, config.mode))
}

/// Start the web server on `127.0.0.1:<port>` and serve until ctrl-c.
///
/// If `config.static_dir` is set, serves static assets with SPA fallback.
/// Otherwise, serves the built-in index page.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let ctx = bootstrap(&config).await?;

    let app = if let Some(ref static_dir) = config.static_dir {
        info!("Serving static assets from: {}", static_dir.display());
        crate::routes::create_spa_router(ctx, static_dir)
    } else {
        crate::routes::create_router(ctx)
    };

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("chronocop server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    info!("chronocop server stopped");
    Ok(())
}
