//! Persistence adapters.
//!
//! Application state lives in one JSON document addressed by key; client
//! settings live in their own file next to it.

mod json_file_store;
mod memory_store;
mod settings_repository;

pub use json_file_store::{JsonFileStore, STATE_PATH_ENV};
pub use memory_store::InMemoryStore;
pub use settings_repository::{SettingsError, SettingsRepository};

use std::path::PathBuf;

/// Returns the Courier config directory, if the platform has one.
///
/// - Linux: `~/.config/courier`
/// - macOS: `~/Library/Application Support/courier`
/// - Windows: `%APPDATA%/courier`
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("courier"))
}
