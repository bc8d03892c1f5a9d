//! Core domain types, ports, and services for chronocop.
//!
//! This crate has no storage, HTTP, or process dependencies. Adapters
//! (`chronocop-db`, `chronocop-axum`, `chronocop-runtime`) implement the
//! ports defined here.

pub mod domain;
pub mod paths;
pub mod ports;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{
    ActivityType, AppMode, EnergyImpact, EntryDraft, MODE_ENV_VAR, Navigation, NewTimeEntry,
    TimeEntry, WindowSpec, classify_navigation,
};
pub use paths::{PathError, data_root, database_path, logs_dir};
pub use ports::{
    CoreError, LogStream, NoopLogSink, RepositoryError, ServerLogSinkPort, TimeEntryRepository,
    WindowHostError, WindowHostPort,
};
pub use services::EntryService;
