//! Body encoding
//!
//! Turns a body selection plus loaded attachments into the final payload and
//! settles the `Content-Type` header.

use courier_domain::environment::{VariableMap, coerce_value};
use courier_domain::request::{
    BodySpec, BodyType, CONTENT_TYPE, FileAttachment, Headers, MultipartPart, MultipartPayload,
    ResolvedBody,
};
use serde_json::Value;
use thiserror::Error;

use crate::variable_resolver::VariableResolver;

/// Errors raised while encoding a body.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// The payload text is not in the shape its body type requires.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// Encoded body together with the adjusted headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    /// Final body.
    pub body: ResolvedBody,
    /// Headers after content type handling.
    pub headers: Headers,
}

/// Parses the multipart extra-fields text into `(name, value)` pairs.
///
/// Blank text means no fields. Anything else must be a JSON object; values
/// that are not strings are coerced to their JSON text. Fields keep the order
/// they were written in.
///
/// # Errors
///
/// Returns `MalformedPayload` when the text is not a JSON object.
pub fn parse_form_fields(text: &str) -> Result<Vec<(String, String)>, EncodeError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map
            .iter()
            .map(|(name, value)| (name.clone(), coerce_value(value)))
            .collect()),
        Ok(other) => Err(EncodeError::MalformedPayload(format!(
            "form fields must be a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(EncodeError::MalformedPayload(format!(
            "form fields are not valid JSON: {e}"
        ))),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Encodes request bodies.
#[derive(Debug, Clone, Copy)]
pub struct BodyEncoder<'a> {
    resolver: VariableResolver<'a>,
}

impl<'a> BodyEncoder<'a> {
    /// Creates an encoder that substitutes from `variables`.
    #[must_use]
    pub const fn new(variables: &'a VariableMap) -> Self {
        Self {
            resolver: VariableResolver::new(variables),
        }
    }

    /// Encodes `body`, using `files` as the loaded attachments of a form.
    /// Text bodies are sent as substituted, without parsing.
    ///
    /// An explicit `Content-Type` (any case) wins over the body type's
    /// default. Multipart bodies always drop it so the transport can add the
    /// boundary.
    ///
    /// # Errors
    ///
    /// Returns `MalformedPayload` when the extra fields are not a JSON object.
    pub fn encode(
        &self,
        body: &BodySpec,
        files: &[FileAttachment],
        mut headers: Headers,
    ) -> Result<EncodedBody, EncodeError> {
        let body_type = body.body_type();

        let encoded = match body {
            BodySpec::None => ResolvedBody::Empty,
            BodySpec::Json { text } | BodySpec::Raw { text } | BodySpec::Urlencoded { text } => {
                ResolvedBody::Text {
                    content: self.resolver.resolve(text),
                }
            }
            BodySpec::Formdata(form) => {
                let fields = parse_form_fields(&form.fields)?;
                ResolvedBody::Multipart(self.multipart(files, fields))
            }
        };

        Self::apply_content_type(&mut headers, body_type);

        Ok(EncodedBody {
            body: encoded,
            headers,
        })
    }

    fn multipart(&self, files: &[FileAttachment], fields: Vec<(String, String)>) -> MultipartPayload {
        let mut parts = Vec::with_capacity(files.len() + fields.len());

        for (index, file) in files.iter().enumerate() {
            parts.push(MultipartPart::File {
                field: file
                    .field
                    .clone()
                    .unwrap_or_else(|| format!("file{}", index + 1)),
                file_name: file.name.clone(),
                content: file.content.clone(),
            });
        }

        for (name, value) in fields {
            parts.push(MultipartPart::Text {
                value: self.resolver.resolve(&value),
                name,
            });
        }

        MultipartPayload { parts }
    }

    fn apply_content_type(headers: &mut Headers, body_type: BodyType) {
        if body_type == BodyType::Formdata {
            headers.remove_ignore_case(CONTENT_TYPE);
            return;
        }

        if let Some(default) = body_type.default_content_type() {
            if !headers.contains_ignore_case(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, default);
            }
        }
    }
}
