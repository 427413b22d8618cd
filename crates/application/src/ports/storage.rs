//! Key-value storage port
//!
//! Persisted state is a handful of JSON documents addressed by key.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The backing store could not be located.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Port for the persisted key-value state.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be read.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Stores `value` under `key`.
    ///
    /// # Errors
    /// Returns an error if the value cannot be written.
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Stores several keys. Adapters that persist a single document override
    /// this to write once.
    ///
    /// # Errors
    /// Returns an error if any value cannot be written.
    async fn set_many(&self, entries: Vec<(String, Value)>) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(&key, value).await?;
        }
        Ok(())
    }
}

/// Reads and deserializes the value under `key`.
///
/// # Errors
/// Returns an error if the store fails or the value has the wrong shape.
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Serializes `value` and stores it under `key`.
///
/// # Errors
/// Returns an error if serialization or the write fails.
pub async fn save_json<T: Serialize + Sync>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    store.set(key, serde_json::to_value(value)?).await
}
