//! Platform-specific data directory resolution.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::PathError;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV_VAR: &str = "CHRONOCOP_DATA_DIR";

const APP_DIR_NAME: &str = "CHRONOCOP";

/// Get the root directory for application data (database, logs).
///
/// Resolution order:
/// 1. `CHRONOCOP_DATA_DIR` environment variable
/// 2. `~/Library/Application Support/CHRONOCOP` on macOS
/// 3. `~/AppData/Local/CHRONOCOP` on Windows
/// 4. `~/.chronocop` elsewhere
///
/// The directory is created if it doesn't exist.
pub fn data_root() -> Result<PathBuf, PathError> {
    let root = resolve_data_root(
        env::var_os(DATA_DIR_ENV_VAR).map(PathBuf::from),
        dirs::home_dir(),
    )?;
    ensure_dir(&root)?;
    Ok(root)
}

/// Pure resolution step of [`data_root`], without touching the filesystem.
pub fn resolve_data_root(
    override_dir: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Result<PathBuf, PathError> {
    if let Some(dir) = override_dir.filter(|d| !d.as_os_str().is_empty()) {
        return Ok(dir);
    }
    let home = home.ok_or(PathError::NoHomeDir)?;
    Ok(platform_data_dir(&home))
}

fn platform_data_dir(home: &Path) -> PathBuf {
    if cfg!(target_os = "macos") {
        home.join("Library")
            .join("Application Support")
            .join(APP_DIR_NAME)
    } else if cfg!(windows) {
        home.join("AppData").join("Local").join(APP_DIR_NAME)
    } else {
        home.join(".chronocop")
    }
}

pub(super) fn ensure_dir(dir: &Path) -> Result<(), PathError> {
    fs::create_dir_all(dir).map_err(|e| PathError::CreateFailed {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_takes_priority() {
        let root = resolve_data_root(
            Some(PathBuf::from("/tmp/chronocop-data")),
            Some(PathBuf::from("/home/user")),
        )
        .unwrap();
        assert_eq!(root, PathBuf::from("/tmp/chronocop-data"));
    }

    #[test]
    fn empty_override_ignored() {
        let root =
            resolve_data_root(Some(PathBuf::new()), Some(PathBuf::from("/home/user"))).unwrap();
        assert!(root.starts_with("/home/user"));
    }

    #[test]
    fn missing_home_is_an_error() {
        assert!(matches!(
            resolve_data_root(None, None),
            Err(PathError::NoHomeDir)
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn linux_uses_dot_directory() {
        let root = resolve_data_root(None, Some(PathBuf::from("/home/user"))).unwrap();
        assert_eq!(root, PathBuf::from("/home/user/.chronocop"));
    }
}
