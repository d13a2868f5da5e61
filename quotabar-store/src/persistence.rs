//! JSON persistence.
//!
//! Files are written atomically and readable only by the owner on Unix.

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::StoreError;

/// Directory name under the platform config and cache roots.
const APP_DIR: &str = "quotabar";

// ============================================================================
// Default Paths
// ============================================================================

/// Returns the default configuration directory.
///
/// - Linux: `~/.config/quotabar`
/// - macOS: `~/Library/Application Support/quotabar`
/// - Windows: `%APPDATA%\quotabar`
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map_or_else(|| PathBuf::from("."), |dir| dir.join(APP_DIR))
}

/// Returns the default cache directory.
///
/// - Linux: `~/.cache/quotabar`
/// - macOS: `~/Library/Caches/quotabar`
/// - Windows: `%LOCALAPPDATA%\quotabar`
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map_or_else(|| PathBuf::from("."), |dir| dir.join(APP_DIR))
}

/// Returns the default config file path.
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.json")
}

/// Returns the default usage cache file path.
pub fn default_cache_path() -> PathBuf {
    default_cache_dir().join("usage_cache.json")
}

// ============================================================================
// Permissions
// ============================================================================

#[cfg(unix)]
async fn set_mode(path: &Path, mode: u32) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(mode);
    tokio::fs::set_permissions(path, perms).await?;
    debug!(path = %path.display(), mode = %format!("{mode:o}"), "Set permissions");
    Ok(())
}

#[cfg(not(unix))]
async fn set_mode(_path: &Path, _mode: u32) -> Result<(), StoreError> {
    Ok(())
}

/// Creates `dir` and missing ancestors. Newly created directories are 0700.
async fn create_private_dirs(dir: &Path) -> Result<(), StoreError> {
    let mut missing = Vec::new();
    let mut current = Some(dir);
    while let Some(path) = current {
        if tokio::fs::try_exists(path).await? {
            break;
        }
        missing.push(path.to_path_buf());
        current = path.parent();
    }

    if missing.is_empty() {
        return Ok(());
    }

    debug!(path = %dir.display(), created = missing.len(), "Creating private directories");
    tokio::fs::create_dir_all(dir).await?;
    for path in &missing {
        set_mode(path, 0o700).await?;
    }
    Ok(())
}

// ============================================================================
// File Operations
// ============================================================================

/// Saves `data` as pretty JSON.
///
/// Parent directories are created, the file is written to a temporary
/// sibling and renamed into place, and its mode is set to 0600 on Unix.
///
/// # Errors
///
/// Returns an error if serialization or any file operation fails.
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    debug!(path = %path.display(), "Saving JSON file");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_private_dirs(parent).await?;
    }

    let json = serde_json::to_string_pretty(data)?;
    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, &json).await?;
    set_mode(&temp_path, 0o600).await?;
    tokio::fs::rename(&temp_path, path).await?;

    debug!(path = %path.display(), len = json.len(), "JSON file saved");
    Ok(())
}

/// Loads JSON from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    debug!(path = %path.display(), "Loading JSON file");

    let content = tokio::fs::read_to_string(path).await?;
    let data = serde_json::from_str(&content)?;
    Ok(data)
}

/// Loads JSON from `path`, or the default when missing or unreadable.
///
/// A missing file is silent; any other failure is logged.
pub async fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match load_json(path).await {
        Ok(data) => data,
        Err(e) => {
            if !e.is_not_found() {
                warn!(path = %path.display(), error = %e, "Failed to load, using defaults");
            }
            T::default()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_default_paths() {
        assert!(default_config_path().ends_with("quotabar/config.json"));
        assert!(default_cache_path().ends_with("quotabar/usage_cache.json"));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");

        let mut data = BTreeMap::new();
        data.insert("Current session".to_string(), 45u8);
        save_json(&path, &data).await.unwrap();

        let loaded: BTreeMap<String, u8> = load_json(&path).await.unwrap();
        assert_eq!(loaded, data);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let err = load_json::<Vec<u8>>(&path).await.unwrap_err();
        assert!(err.is_not_found());

        let loaded: Vec<u8> = load_json_or_default(&path).await;
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let loaded: Vec<u8> = load_json_or_default(&path).await;
        assert!(loaded.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_and_dir_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("private");
        let path = nested.join("config.json");
        save_json(&path, &vec![1, 2, 3]).await.unwrap();

        let file_mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600);
        let dir_mode = std::fs::metadata(&nested).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode, 0o700);
    }
}
