//! `SQLite` persistence for chronocop.
//!
//! Entry points call [`setup_database`] with the resolved database path and
//! hand the pool to [`SqliteTimeEntryRepository`].
#![deny(unsafe_code)]

pub mod repositories;
pub mod setup;

// Linked for the bundled SQLite build only
use libsqlite3_sys as _;

pub use repositories::SqliteTimeEntryRepository;
pub use setup::setup_database;
#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;
