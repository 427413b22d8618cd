//! Key-value store backed by a single JSON file.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use courier_application::ports::{KeyValueStore, StoreError};
use serde_json::Value;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};

/// Environment variable overriding the state file location.
pub const STATE_PATH_ENV: &str = "COURIER_STATE_PATH";

/// Persists every key as a member of one JSON object on disk.
///
/// The document is cached in memory; each write replaces the file through a
/// temporary sibling so a crash never leaves half a document behind.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    document: Mutex<BTreeMap<String, Value>>,
}

impl JsonFileStore {
    /// Returns the state file path: `$COURIER_STATE_PATH` when set,
    /// `<config_dir>/courier/state.json` otherwise.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os(STATE_PATH_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .or_else(|| super::config_dir().map(|p| p.join("state.json")))
    }

    /// Opens the store at the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if no location is available or the file cannot be read.
    pub async fn open_default() -> Result<Self, StoreError> {
        let path = Self::default_path()
            .ok_or_else(|| StoreError::Unavailable("no config directory".to_string()))?;
        Self::open(path).await
    }

    /// Opens the store at `path`. A missing file is an empty store; an
    /// unreadable document is logged and replaced on the next write.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let document: BTreeMap<String, Value> = match fs::read(&path).await {
            Ok(bytes) => from_json_bytes(&bytes).unwrap_or_else(|e: SerializationError| {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "state file is not a JSON object, starting empty"
                );
                BTreeMap::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = document.len(), "state store opened");

        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    /// Returns the file this store writes to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, document: &BTreeMap<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = to_json_stable_bytes(document)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, content).await?;
        fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.document.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut document = self.document.lock().await;
        document.insert(key.to_string(), value);
        self.flush(&document).await
    }

    async fn set_many(&self, entries: Vec<(String, Value)>) -> Result<(), StoreError> {
        let mut document = self.document.lock().await;
        document.extend(entries);
        self.flush(&document).await
    }
}
