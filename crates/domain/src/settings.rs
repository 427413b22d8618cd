//! Client Settings Domain Model
//!
//! Transport preferences for the Courier request executor.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings applied to every dispatched request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// User-Agent sent when the request does not set one.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum redirects to follow before failing.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

const fn default_timeout_ms() -> u64 {
    30_000
}

fn default_user_agent() -> String {
    format!("courier/{}", env!("CARGO_PKG_VERSION"))
}

const fn default_max_redirects() -> usize {
    10
}

impl ClientSettings {
    /// Returns the timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_settings() {
        let settings = ClientSettings::default();
        assert_eq!(settings.timeout(), Duration::from_secs(30));
        assert!(settings.user_agent.starts_with("courier/"));
        assert_eq!(settings.max_redirects, 10);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let settings: ClientSettings = serde_json::from_str(r#"{"timeout_ms": 500}"#).unwrap();
        assert_eq!(settings.timeout_ms, 500);
        assert_eq!(settings.max_redirects, 10);
    }
}
