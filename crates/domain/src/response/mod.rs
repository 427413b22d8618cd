//! Response types handed back for display

mod status;

pub use status::ResponseStatus;

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Status text used when the exchange never produced an HTTP response.
pub const NETWORK_ERROR_TEXT: &str = "Network Error";

/// An HTTP response, or the sentinel describing a transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    /// Numeric status, or `Error` for transport failures.
    pub status: ResponseStatus,
    /// Reason phrase.
    pub status_text: String,
    /// Response headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Body decoded as text.
    #[serde(default)]
    pub body: String,
    /// Wall-clock duration of the exchange in milliseconds.
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    /// Size of the body in bytes.
    #[serde(rename = "size")]
    pub size_bytes: u64,
}

impl HttpResponse {
    /// Creates a response; the size is taken from the body.
    #[must_use]
    pub fn new(
        status: u16,
        status_text: impl Into<String>,
        headers: BTreeMap<String, String>,
        body: impl Into<String>,
        duration: Duration,
    ) -> Self {
        let body = body.into();
        Self {
            status: ResponseStatus::Code(status),
            status_text: status_text.into(),
            headers,
            size_bytes: body.len() as u64,
            body,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Sentinel shown when the request could not be completed.
    #[must_use]
    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            status_text: NETWORK_ERROR_TEXT.to_string(),
            headers: BTreeMap::new(),
            body: message.into(),
            duration_ms: 0,
            size_bytes: 0,
        }
    }

    /// Overrides the byte size when it differs from the decoded text length.
    #[must_use]
    pub const fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    /// Returns true for the transport failure sentinel.
    #[must_use]
    pub const fn is_transport_failure(&self) -> bool {
        matches!(self.status, ResponseStatus::Error)
    }

    /// Returns a header value, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_new_computes_size() {
        let response = HttpResponse::new(
            200,
            "OK",
            BTreeMap::new(),
            "héllo",
            Duration::from_millis(42),
        );
        assert_eq!(response.size_bytes, 6);
        assert_eq!(response.duration_ms, 42);
        assert!(!response.is_transport_failure());
    }

    #[test]
    fn test_transport_failure_wire_shape() {
        let response = HttpResponse::transport_failure("connection refused");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "status": "Error",
                "statusText": "Network Error",
                "headers": {},
                "body": "connection refused",
                "duration": 0,
                "size": 0
            })
        );
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let headers = BTreeMap::from([("content-type".to_string(), "text/html".to_string())]);
        let response = HttpResponse::new(404, "Not Found", headers, "", Duration::ZERO);
        assert_eq!(response.header("Content-Type"), Some("text/html"));
    }
}
