//! HTTP Client port

use std::future::Future;

use courier_domain::{request::ResolvedRequest, response::HttpResponse};
use thiserror::Error;

/// Transport failures. Any HTTP status, including 4xx and 5xx, is a
/// response rather than an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpClientError {
    /// The request did not complete in time.
    #[error("Request timed out after {timeout_ms} ms")]
    Timeout {
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// The host name could not be resolved.
    #[error("Could not resolve host {host}: {message}")]
    DnsError {
        /// Host that failed to resolve.
        host: String,
        /// Underlying message.
        message: String,
    },

    /// The server refused the connection.
    #[error("Connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The connection failed for another reason.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// TLS negotiation failed.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The redirect limit was exceeded.
    #[error("Too many redirects (max {max})")]
    TooManyRedirects {
        /// Configured limit.
        max: usize,
    },

    /// The URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A header or body could not be put on the wire.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl HttpClientError {
    /// Short machine-readable category for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::DnsError { .. } => "dns",
            Self::ConnectionRefused { .. } | Self::ConnectionFailed(_) => "connect",
            Self::Tls(_) => "tls",
            Self::TooManyRedirects { .. } => "redirect",
            Self::InvalidUrl(_) => "url",
            Self::InvalidRequest(_) => "request",
            Self::Other(_) => "other",
        }
    }
}

/// Port for executing HTTP requests.
///
/// This trait abstracts the HTTP client implementation, allowing
/// the application layer to be independent of specific HTTP libraries.
pub trait HttpClient: Send + Sync {
    /// Sends a fully resolved request and returns the response.
    ///
    /// # Errors
    ///
    /// Returns an error if no HTTP response was received.
    fn send(
        &self,
        request: &ResolvedRequest,
    ) -> impl Future<Output = Result<HttpResponse, HttpClientError>> + Send;
}
