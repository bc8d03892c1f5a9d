//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `sqlx` types in any signature
//! - No process/windowing implementation details
//! - Repository traits are minimal and CRUD-focused

pub mod server_log_sink;
pub mod time_entry_repository;
pub mod window_host;

use thiserror::Error;

pub use server_log_sink::{LogStream, NoopLogSink, ServerLogSinkPort};
pub use time_entry_repository::TimeEntryRepository;
pub use window_host::{WindowHostError, WindowHostPort};

/// Domain-specific errors for repository operations.
///
/// This error type abstracts away storage implementation details (e.g., sqlx errors)
/// and provides a clean interface for services to handle storage failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested entity was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An entity with the same identifier already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Storage backend error (database, filesystem, etc.).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Stored data could not be mapped back to a domain type.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Core error type for semantic domain errors.
///
/// Adapters map this to their own error types (HTTP status codes, CLI exit codes).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Validation error (invalid input).
    #[error("{0}")]
    Validation(String),

    /// The requested slot or resource is already taken.
    #[error("{0}")]
    Conflict(String),

    /// Internal error (unexpected condition).
    #[error("Internal error: {0}")]
    Internal(String),
}
