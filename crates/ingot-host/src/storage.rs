//! Persisted configuration blob store.
//!
//! The config is one pretty-printed JSON object at a host-supplied path.
//! A missing file is not an error — the lifecycle manager falls back to
//! built-in defaults and the next save creates the file (and any missing
//! parent directory) with valid content.

use std::path::{Path, PathBuf};

use tokio::fs;

use ingot_core::PluginConfig;

use crate::error::{StorageError, StorageResult};

/// File-backed store for one plugin's [`PluginConfig`] blob.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Creates a store for the blob at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the blob file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted config.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    ///
    /// [`StorageError::Read`] on any other I/O failure,
    /// [`StorageError::Malformed`] when the file is not a valid config
    /// object.
    pub async fn load(&self) -> StorageResult<Option<PluginConfig>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        let config = serde_json::from_slice(&bytes).map_err(|e| StorageError::Malformed {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(Some(config))
    }

    /// Persists `config`, creating the parent directory first if needed.
    ///
    /// # Errors
    ///
    /// Save failures are not recovered here — the caller decides whether
    /// to surface them.
    pub async fn save(&self, config: &PluginConfig) -> StorageResult<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).await.map_err(|e| StorageError::CreateDir {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }
        let blob = serde_json::to_vec_pretty(config)?;
        fs::write(&self.path, blob).await.map_err(|e| StorageError::Write {
            path: self.path.clone(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("config.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_creates_missing_directories_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("nested").join("config.json"));

        let mut config = PluginConfig::new();
        config.insert("prefix", "#napcat");
        config.insert("enableReply", false);

        store.save(&config).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn malformed_blob_is_a_distinct_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, b"{ not json").await.unwrap();

        let store = ConfigStore::new(&path);
        assert!(matches!(
            store.load().await,
            Err(StorageError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn save_overwrites_malformed_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, b"garbage").await.unwrap();

        let store = ConfigStore::new(&path);
        let mut config = PluginConfig::new();
        config.insert("theme", "dark");
        store.save(&config).await.unwrap();

        assert_eq!(store.load().await.unwrap().unwrap(), config);
    }
}
