//! In-memory state backed by the key-value store.

mod environment_store;
mod history_store;

pub use environment_store::{
    ACTIVE_ENVIRONMENT_KEY, ENVIRONMENTS_KEY, EnvironmentError, EnvironmentStore,
};
pub use history_store::{HISTORY_KEY, HistoryStore};
