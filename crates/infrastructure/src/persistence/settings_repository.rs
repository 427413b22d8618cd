//! Client settings persistence.
//!
//! Settings are read from `<config_dir>/courier/settings.json`. A missing
//! file means defaults.

use std::path::{Path, PathBuf};

use courier_domain::settings::ClientSettings;
use tokio::fs;

use crate::serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// Could not determine config directory.
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Repository for client settings.
#[derive(Debug, Clone, Default)]
pub struct SettingsRepository {
    path: Option<PathBuf>,
}

impl SettingsRepository {
    /// Creates a repository using the platform config directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: super::config_dir().map(|p| p.join("settings.json")),
        }
    }

    /// Creates a repository reading and writing `path`.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Returns the settings file path, if available.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Loads settings from disk.
    ///
    /// Returns defaults if the file doesn't exist or no config dir is known.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<ClientSettings, SettingsError> {
        let Some(path) = &self.path else {
            return Ok(ClientSettings::default());
        };

        if !fs::try_exists(path).await? {
            return Ok(ClientSettings::default());
        }

        let content = fs::read(path).await?;
        Ok(from_json_bytes(&content)?)
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is known or the file cannot be written.
    pub async fn save(&self, settings: &ClientSettings) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Err(SettingsError::NoConfigDir);
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = to_json_stable_bytes(settings)?;
        fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_path_is_under_courier() {
        if let Some(path) = SettingsRepository::new().path() {
            assert!(path.ends_with("courier/settings.json"));
        }
    }

    #[tokio::test]
    async fn test_load_returns_defaults_when_no_file() {
        let dir = TempDir::new().unwrap();
        let repo = SettingsRepository::at(dir.path().join("settings.json"));

        assert_eq!(repo.load().await.unwrap(), ClientSettings::default());
    }

    #[tokio::test]
    async fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"timeout_ms": 5000}"#).unwrap();

        let settings = SettingsRepository::at(&path).load().await.unwrap();

        assert_eq!(settings.timeout_ms, 5000);
        assert_eq!(settings.max_redirects, 10);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let repo = SettingsRepository::at(dir.path().join("cfg").join("settings.json"));
        let settings = ClientSettings {
            user_agent: "courier-test/1".to_string(),
            ..ClientSettings::default()
        };

        repo.save(&settings).await.unwrap();
        assert_eq!(repo.load().await.unwrap(), settings);
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{").unwrap();

        let result = SettingsRepository::at(&path).load().await;
        assert!(matches!(result, Err(SettingsError::Serialization(_))));
    }
}
