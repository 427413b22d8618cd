//! Request builder
//!
//! Assembles a transport-ready request from the raw editor fields and the
//! active environment. Performs no network I/O and never mutates the
//! environment.

use std::sync::Arc;

use courier_domain::auth::AuthSpec;
use courier_domain::environment::{Environment, coerce_value};
use courier_domain::request::{
    Attachment, FileAttachment, Headers, RequestSnapshot, ResolvedRequest,
};
use futures_util::future::try_join_all;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::auth::AuthInjector;
use crate::body_encoder::{BodyEncoder, EncodeError, parse_form_fields};
use crate::ports::{AttachmentReader, FileReadError};
use crate::variable_resolver::VariableResolver;

/// Local validation failures. Nothing is sent when one of these occurs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    /// The headers text is not a JSON object.
    #[error("invalid headers: {0}")]
    InvalidHeaders(String),

    /// The body text does not fit its body type.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// An attachment could not be read.
    #[error("failed to read {file}: {message}")]
    FileReadFailure {
        /// Attachment name.
        file: String,
        /// Underlying message.
        message: String,
    },
}

impl From<EncodeError> for BuildError {
    fn from(error: EncodeError) -> Self {
        match error {
            EncodeError::MalformedPayload(message) => Self::MalformedPayload(message),
        }
    }
}

impl From<FileReadError> for BuildError {
    fn from(error: FileReadError) -> Self {
        Self::FileReadFailure {
            file: error.file,
            message: error.message,
        }
    }
}

/// Parses the headers text into a header mapping.
///
/// Blank text means no headers. Non-string values are coerced to text.
///
/// # Errors
///
/// Returns `InvalidHeaders` if the text is not a JSON object.
pub fn parse_headers(text: &str) -> Result<Headers, BuildError> {
    if text.trim().is_empty() {
        return Ok(Headers::new());
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map
            .iter()
            .map(|(name, value)| (name.clone(), coerce_value(value)))
            .collect()),
        Ok(_) => Err(BuildError::InvalidHeaders(
            "headers must be a JSON object".to_string(),
        )),
        Err(e) => Err(BuildError::InvalidHeaders(e.to_string())),
    }
}

/// Builds resolved requests.
#[derive(Clone)]
pub struct RequestBuilder {
    reader: Arc<dyn AttachmentReader>,
}

impl RequestBuilder {
    /// Creates a builder that loads attachments through `reader`.
    #[must_use]
    pub fn new(reader: Arc<dyn AttachmentReader>) -> Self {
        Self { reader }
    }

    /// Builds a request, reading every attachment first.
    ///
    /// Attachments are read concurrently. The first failure drops the
    /// remaining reads and aborts the build.
    ///
    /// # Errors
    ///
    /// Returns a `BuildError` if headers, body or any attachment is invalid.
    pub async fn build(
        &self,
        snapshot: &RequestSnapshot,
        environment: &Environment,
    ) -> Result<ResolvedRequest, BuildError> {
        let files = match snapshot.body.form() {
            Some(form) => {
                parse_form_fields(&form.fields)?;
                self.load_attachments(&form.files).await?
            }
            None => Vec::new(),
        };

        Self::build_loaded(snapshot, &files, environment)
    }

    async fn load_attachments(
        &self,
        attachments: &[Attachment],
    ) -> Result<Vec<FileAttachment>, BuildError> {
        let reads = attachments.iter().map(|attachment| async move {
            let content = self.reader.read(&attachment.source).await.map_err(|e| {
                BuildError::FileReadFailure {
                    file: attachment.name.clone(),
                    message: e.message,
                }
            })?;
            Ok::<_, BuildError>(FileAttachment::new(
                attachment.name.clone(),
                attachment.field.clone(),
                content,
            ))
        });

        try_join_all(reads).await
    }

    /// Builds a request whose attachments are already in memory.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHeaders`, or `MalformedPayload` for bad form fields.
    pub fn build_loaded(
        snapshot: &RequestSnapshot,
        files: &[FileAttachment],
        environment: &Environment,
    ) -> Result<ResolvedRequest, BuildError> {
        let resolver = VariableResolver::for_environment(environment);

        let url = resolve_logged(&resolver, "url", &snapshot.url);

        let mut headers = parse_headers(&snapshot.headers_text)?;
        headers.map_values(|value| resolve_logged(&resolver, "header", value));

        let auth = AuthSpec::new(
            snapshot.auth.mode,
            resolve_logged(&resolver, "auth", &snapshot.auth.credential),
        );
        AuthInjector::inject(&mut headers, &auth);

        let encoded =
            BodyEncoder::new(&environment.variables).encode(&snapshot.body, files, headers)?;

        Ok(ResolvedRequest {
            method: snapshot.method,
            url,
            headers: encoded.headers,
            body: encoded.body,
            body_type: snapshot.body.body_type(),
        })
    }
}

impl std::fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBuilder").finish_non_exhaustive()
    }
}

fn resolve_logged(resolver: &VariableResolver<'_>, field: &str, text: &str) -> String {
    let result = resolver.resolve_detailed(text);
    if !result.is_complete {
        debug!(field, unresolved = ?result.unresolved, "unresolved placeholders left verbatim");
    }
    result.resolved
}
