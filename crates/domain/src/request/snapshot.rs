//! Raw field values captured from the editing surface

use serde::{Deserialize, Serialize};

use super::body::BodySpec;
use super::method::HttpMethod;
use crate::auth::AuthSpec;

/// Everything the user entered for one request, before any substitution.
///
/// History keeps this so a past request can be rebuilt exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSnapshot {
    /// HTTP method.
    pub method: HttpMethod,
    /// URL text, may contain placeholders.
    pub url: String,
    /// Headers as JSON object text.
    #[serde(default)]
    pub headers_text: String,
    /// Auth selection.
    #[serde(default)]
    pub auth: AuthSpec,
    /// Body selection.
    #[serde(default)]
    pub body: BodySpec,
}

impl RequestSnapshot {
    /// Creates a snapshot with no headers, auth or body.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Self::default()
        }
    }

    /// Sets the headers text.
    #[must_use]
    pub fn with_headers(mut self, headers_text: impl Into<String>) -> Self {
        self.headers_text = headers_text.into();
        self
    }

    /// Sets the auth selection.
    #[must_use]
    pub fn with_auth(mut self, auth: AuthSpec) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the body selection.
    #[must_use]
    pub fn with_body(mut self, body: BodySpec) -> Self {
        self.body = body;
        self
    }
}
