//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! It handles all HTTP communication for the application.

use std::collections::BTreeMap;
use std::error::Error as _;
use std::time::Instant;

use courier_application::ports::{HttpClient, HttpClientError};
use courier_domain::{
    request::{HttpMethod, ResolvedRequest},
    response::HttpResponse,
    settings::ClientSettings,
};
use reqwest::{Client, Method, Url, redirect::Policy};
use tracing::debug;

use crate::http::apply_body;

/// HTTP client implementation using reqwest.
///
/// Wraps a `reqwest::Client` configured from [`ClientSettings`]: timeout,
/// user agent and redirect limit apply to every request it sends.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
    settings: ClientSettings,
}

impl ReqwestHttpClient {
    /// Creates a new HTTP client from settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(settings: ClientSettings) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .redirect(Policy::limited(settings.max_redirects))
            .timeout(settings.timeout())
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self { client, settings })
    }

    /// Returns the settings this client was built with.
    #[must_use]
    pub const fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    /// Joins an error with all of its sources.
    fn error_chain(error: &reqwest::Error) -> String {
        let mut message = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }

    /// Maps reqwest errors to `HttpClientError`.
    fn map_error(&self, error: &reqwest::Error) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout {
                timeout_ms: self.settings.timeout_ms,
            };
        }

        if error.is_redirect() {
            return HttpClientError::TooManyRedirects {
                max: self.settings.max_redirects,
            };
        }

        if error.is_builder() {
            return HttpClientError::InvalidRequest(Self::error_chain(error));
        }

        let message = Self::error_chain(error);
        let lower = message.to_lowercase();
        let host = error
            .url()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string());

        if lower.contains("certificate") || lower.contains("tls") {
            return HttpClientError::Tls(message);
        }

        if error.is_connect() {
            if lower.contains("dns") || lower.contains("resolve") {
                return HttpClientError::DnsError { host, message };
            }
            if lower.contains("refused") {
                return HttpClientError::ConnectionRefused {
                    host,
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return HttpClientError::ConnectionFailed(message);
        }

        HttpClientError::Other(message)
    }
}

impl HttpClient for ReqwestHttpClient {
    async fn send(&self, request: &ResolvedRequest) -> Result<HttpResponse, HttpClientError> {
        let url = Url::parse(&request.url)
            .map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {}", request.url)))?;

        let start = Instant::now();

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url);
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        builder = apply_body(builder, &request.body)
            .map_err(|e| HttpClientError::InvalidRequest(e.to_string()))?;

        let response = builder.send().await.map_err(|e| self.map_error(&e))?;

        let status = response.status();
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers() {
            let value = String::from_utf8_lossy(value.as_bytes());
            headers
                .entry(name.to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert_with(|| value.into_owned());
        }

        let body_bytes = response
            .bytes()
            .await
            .map_err(|e| HttpClientError::Other(format!("Failed to read body: {e}")))?;
        let duration = start.elapsed();

        debug!(
            status = status.as_u16(),
            bytes = body_bytes.len(),
            elapsed_ms = duration.as_millis(),
            "response received"
        );

        Ok(HttpResponse::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            headers,
            String::from_utf8_lossy(&body_bytes),
            duration,
        )
        .with_size(body_bytes.len() as u64))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use courier_domain::request::{
        BodyType, Headers, MultipartPart, MultipartPayload, ResolvedBody,
    };
    use courier_domain::response::ResponseStatus;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use wiremock::matchers::{body_string, body_string_contains, header, header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> ReqwestHttpClient {
        ReqwestHttpClient::new(ClientSettings::default()).unwrap()
    }

    fn request(method: HttpMethod, url: String) -> ResolvedRequest {
        ResolvedRequest {
            method,
            url,
            headers: Headers::new(),
            body: ResolvedBody::Empty,
            body_type: BodyType::None,
        }
    }

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Get),
            Method::GET
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Patch),
            Method::PATCH
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Options),
            Method::OPTIONS
        );
    }

    #[tokio::test]
    async fn test_sends_headers_and_reads_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .and(header("x-trace", "abc"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_string("created")
                    .insert_header("x-id", "7"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut req = request(HttpMethod::Get, format!("{}/users", server.uri()));
        req.headers.insert("X-Trace", "abc");

        let response = client().send(&req).await.unwrap();

        assert_eq!(response.status, ResponseStatus::Code(201));
        assert_eq!(response.status_text, "Created");
        assert_eq!(response.body, "created");
        assert_eq!(response.size_bytes, 7);
        assert_eq!(response.header("X-Id"), Some("7"));
    }

    #[tokio::test]
    async fn test_error_status_is_a_response() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
            .mount(&server)
            .await;

        let response = client()
            .send(&request(HttpMethod::Delete, format!("{}/x", server.uri())))
            .await
            .unwrap();

        assert_eq!(response.status, ResponseStatus::Code(404));
        assert_eq!(response.status_text, "Not Found");
        assert!(!response.is_transport_failure());
    }

    #[tokio::test]
    async fn test_posts_text_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("content-type", "application/json"))
            .and(body_string(r#"{"id":42}"#))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut req = request(HttpMethod::Post, server.uri());
        req.headers.insert("Content-Type", "application/json");
        req.body = ResolvedBody::Text {
            content: r#"{"id":42}"#.into(),
        };
        req.body_type = BodyType::Json;

        let response = client().send(&req).await.unwrap();
        assert_eq!(response.status, ResponseStatus::Code(200));
    }

    #[tokio::test]
    async fn test_posts_multipart_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .and(header_regex("content-type", "^multipart/form-data; boundary="))
            .and(body_string_contains(r#"name="file1"; filename="a.txt""#))
            .and(body_string_contains("hello"))
            .and(body_string_contains(r#"name="note""#))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut req = request(HttpMethod::Post, format!("{}/upload", server.uri()));
        req.body_type = BodyType::Formdata;
        req.body = ResolvedBody::Multipart(MultipartPayload {
            parts: vec![
                MultipartPart::File {
                    field: "file1".into(),
                    file_name: "a.txt".into(),
                    content: b"hello".to_vec(),
                },
                MultipartPart::Text {
                    name: "note".into(),
                    value: "hi".into(),
                },
            ],
        });

        let response = client().send(&req).await.unwrap();
        assert_eq!(response.status, ResponseStatus::Code(200));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_timeout_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let settings = ClientSettings {
            timeout_ms: 50,
            ..ClientSettings::default()
        };
        let client = ReqwestHttpClient::new(settings).unwrap();

        let err = client
            .send(&request(HttpMethod::Get, server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err, HttpClientError::Timeout { timeout_ms: 50 });
    }

    #[tokio::test]
    async fn test_closed_port_is_a_connect_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = client()
            .send(&request(HttpMethod::Get, format!("http://127.0.0.1:{port}/")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "connect");
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let err = client()
            .send(&request(HttpMethod::Get, "not a url".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, HttpClientError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_invalid_header_name_is_rejected() {
        let mut req = request(HttpMethod::Get, "http://127.0.0.1:1/".into());
        req.headers.insert("bad header", "x");

        let err = client().send(&req).await.unwrap_err();
        assert!(matches!(err, HttpClientError::InvalidRequest(_)));
    }
}
