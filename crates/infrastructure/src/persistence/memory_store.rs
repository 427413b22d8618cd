//! Volatile key-value store.

use std::collections::HashMap;

use async_trait::async_trait;
use courier_application::ports::{KeyValueStore, StoreError};
use serde_json::Value;
use tokio::sync::RwLock;

/// Keeps state in memory only. Used when no state file is wanted.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    values: RwLock<HashMap<String, Value>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `entries`.
    #[must_use]
    pub fn with_entries(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            values: RwLock::new(entries.into_iter().collect()),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }
}
