// # File State Store
//
// JSON-file implementation of StateStore.
//
// ## Purpose
//
// Keeps the reference of every managed host record across runs. Losing it
// means the next `apply` would create a duplicate record, so every change is
// written to disk before the call returns.
//
// ## Crash Recovery
//
// - Atomic writes: write to `<path>.tmp`, then rename over `<path>`
// - Backup: the previous good file is copied to `<path>.backup` first
// - Recovery: a file that fails to parse is replaced by its backup
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "resources": {
//     "www.example.com": {
//       "record": {
//         "id": "record:host/ZG5z...:www.example.com/default",
//         "fqdn": "www.example.com",
//         "name": "www",
//         "domain": "example.com",
//         "ipv4": "10.0.0.5",
//         "ttl": 300,
//         "use_ttl": true,
//         "view": "default"
//       },
//       "last_refreshed": "2025-01-09T12:00:00Z"
//     }
//   }
// }
// ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::state_store::{ResourceState, StateStore};

/// State file format version
const STATE_FILE_VERSION: &str = "1.0";

/// File-based state store with crash recovery
///
/// # Example
///
/// ```rust,no_run
/// use infoblox_core::state::FileStateStore;
/// use infoblox_core::traits::StateStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStateStore::new("/var/lib/infoblox/state.json").await?;
///
///     for address in store.list().await? {
///         println!("tracking {}", address);
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileStateStore {
    path: PathBuf,
    resources: RwLock<HashMap<String, ResourceState>>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct StateFileFormat {
    version: String,
    resources: HashMap<String, ResourceState>,
}

/// Why a state file could not be loaded
enum LoadError {
    /// Unreadable; surfaced to the caller
    Io(Error),
    /// Readable but not a state file; recoverable from backup
    Corrupt(String),
}

impl FileStateStore {
    /// Create or load a file state store
    ///
    /// Creates parent directories as needed. A missing file is an empty
    /// store; a corrupted file is recovered from its backup, or replaced by
    /// an empty store when no usable backup exists.
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::config(format!(
                        "Failed to create state directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let resources = Self::load_with_recovery(&path).await?;

        Ok(Self {
            path,
            resources: RwLock::new(resources),
        })
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load_with_recovery(path: &Path) -> Result<HashMap<String, ResourceState>, Error> {
        let reason = match Self::load(path).await {
            Ok(resources) => {
                tracing::debug!(
                    "Loaded state from {}: {} resources",
                    path.display(),
                    resources.len()
                );
                return Ok(resources);
            }
            Err(LoadError::Io(e)) => return Err(e),
            Err(LoadError::Corrupt(reason)) => reason,
        };

        tracing::warn!(
            "State file {} is corrupted ({}). Attempting recovery from backup.",
            path.display(),
            reason
        );

        let backup = Self::backup_path(path);
        if !backup.exists() {
            tracing::warn!("No backup file found. Starting with empty state.");
            return Ok(HashMap::new());
        }

        match Self::load(&backup).await {
            Ok(resources) => {
                tracing::info!("Recovered state from backup: {} resources", resources.len());
                if let Err(e) = fs::copy(&backup, path).await {
                    tracing::error!("Failed to restore state file from backup: {}", e);
                }
                Ok(resources)
            }
            Err(_) => {
                tracing::error!("Backup is unusable too. Starting with empty state.");
                Ok(HashMap::new())
            }
        }
    }

    async fn load(path: &Path) -> Result<HashMap<String, ResourceState>, LoadError> {
        if !path.exists() {
            tracing::debug!("State file does not exist: {}", path.display());
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            LoadError::Io(Error::state_store(format!(
                "Failed to read state file {}: {}",
                path.display(),
                e
            )))
        })?;

        let file: StateFileFormat =
            serde_json::from_str(&content).map_err(|e| LoadError::Corrupt(e.to_string()))?;

        if file.version != STATE_FILE_VERSION {
            tracing::warn!(
                "State file version mismatch: expected {}, got {}. Loading anyway.",
                STATE_FILE_VERSION,
                file.version
            );
        }

        Ok(file.resources)
    }

    /// Write the current map to disk atomically, keeping a backup
    async fn persist(&self, resources: &HashMap<String, ResourceState>) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(&StateFileFormat {
            version: STATE_FILE_VERSION.to_string(),
            resources: resources.clone(),
        })?;

        let temp = self.temp_path();
        let io_err = |what: &str, e: std::io::Error| {
            Error::state_store(format!("Failed to {} {}: {}", what, temp.display(), e))
        };

        let mut file = fs::File::create(&temp)
            .await
            .map_err(|e| io_err("create", e))?;
        file.write_all(json.as_bytes())
            .await
            .map_err(|e| io_err("write", e))?;
        file.flush().await.map_err(|e| io_err("flush", e))?;
        drop(file);

        if self.path.exists() {
            if let Err(e) = fs::copy(&self.path, Self::backup_path(&self.path)).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        fs::rename(&temp, &self.path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to rename {} to {}: {}",
                temp.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("State written to {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn get(&self, address: &str) -> Result<Option<ResourceState>, Error> {
        Ok(self.resources.read().await.get(address).cloned())
    }

    async fn set(&self, address: &str, state: &ResourceState) -> Result<(), Error> {
        let mut guard = self.resources.write().await;
        guard.insert(address.to_string(), state.clone());
        self.persist(&guard).await
    }

    async fn delete(&self, address: &str) -> Result<(), Error> {
        let mut guard = self.resources.write().await;
        if guard.remove(address).is_none() {
            return Ok(());
        }
        self.persist(&guard).await
    }

    async fn list(&self) -> Result<Vec<String>, Error> {
        let mut addresses: Vec<String> = self.resources.read().await.keys().cloned().collect();
        addresses.sort();
        Ok(addresses)
    }

    async fn flush(&self) -> Result<(), Error> {
        // Every mutation is already on disk
        Ok(())
    }
}
