//! Authentication selection types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// How the credential is turned into a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// No authentication
    #[default]
    None,
    /// `Authorization: Bearer <credential>`
    Bearer,
    /// `Authorization: Basic base64(<credential>)`, credential is `user:password`
    Basic,
    /// `X-API-Key: <credential>`
    #[serde(alias = "apiKey", alias = "api_key")]
    Apikey,
}

impl AuthMode {
    /// Returns the tag used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bearer => "bearer",
            Self::Basic => "basic",
            Self::Apikey => "apikey",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMode {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "bearer" => Ok(Self::Bearer),
            "basic" => Ok(Self::Basic),
            "apikey" | "api_key" => Ok(Self::Apikey),
            _ => Err(DomainError::UnsupportedAuthMode(s.to_string())),
        }
    }
}

/// Auth mode plus the single credential string the user typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSpec {
    /// Selected mode.
    pub mode: AuthMode,
    /// Credential text, may contain placeholders.
    #[serde(default)]
    pub credential: String,
}

impl AuthSpec {
    /// No authentication.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates an auth selection.
    #[must_use]
    pub fn new(mode: AuthMode, credential: impl Into<String>) -> Self {
        Self {
            mode,
            credential: credential.into(),
        }
    }

    /// Bearer token auth.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::new(AuthMode::Bearer, token)
    }

    /// Basic auth from a pre-formatted `user:password` credential.
    #[must_use]
    pub fn basic(user_and_password: impl Into<String>) -> Self {
        Self::new(AuthMode::Basic, user_and_password)
    }

    /// API key auth.
    #[must_use]
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::new(AuthMode::Apikey, key)
    }
}
