//! Well-known files under the data root.

use std::path::{Path, PathBuf};

use super::error::PathError;
use super::platform::{data_root, ensure_dir};

/// File name of the `SQLite` database.
pub const DATABASE_FILE: &str = "time_audit.db";

/// Get the path to the database file.
pub fn database_path() -> Result<PathBuf, PathError> {
    Ok(database_path_in(&data_root()?))
}

/// Database path under an explicit root.
pub fn database_path_in(root: &Path) -> PathBuf {
    root.join(DATABASE_FILE)
}

/// Get the log directory, creating it if needed.
pub fn logs_dir() -> Result<PathBuf, PathError> {
    let dir = data_root()?.join("logs");
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Directory containing the running executable.
pub fn exe_dir() -> Result<PathBuf, PathError> {
    let exe = std::env::current_exe().map_err(|e| PathError::CurrentExe(e.to_string()))?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| PathError::CurrentExe(format!("{} has no parent", exe.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_lives_at_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = database_path_in(dir.path());
        assert!(path.ends_with(DATABASE_FILE));
        assert_eq!(path.parent(), Some(dir.path()));
    }

    #[test]
    fn exe_dir_exists() {
        assert!(exe_dir().unwrap().is_dir());
    }
}
