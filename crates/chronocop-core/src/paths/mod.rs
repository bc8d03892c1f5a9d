//! Path utilities for chronocop data directories.
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - OS-specific logic is kept private in `platform`

mod error;
mod files;
mod platform;

pub use error::PathError;
pub use files::{DATABASE_FILE, database_path, database_path_in, exe_dir, logs_dir};
pub use platform::{DATA_DIR_ENV_VAR, data_root, resolve_data_root};
