//! HTTP request body builder.
//!
//! Maps a [`ResolvedBody`] onto a `reqwest::RequestBuilder`. Multipart
//! bodies become a reqwest [`Form`], which picks its own boundary and sets
//! the `Content-Type` header.

use courier_domain::request::{MultipartPart, MultipartPayload, ResolvedBody};
use reqwest::RequestBuilder;
use reqwest::multipart::{Form, Part};

/// Error type for body building operations.
#[derive(Debug, thiserror::Error)]
pub enum BodyBuildError {
    /// A file part got a MIME type reqwest would not accept.
    #[error("Invalid content type for {file}: {message}")]
    InvalidMime {
        /// Original file name.
        file: String,
        /// Underlying message.
        message: String,
    },
}

/// Builds a multipart form, keeping the part order of the payload.
///
/// # Errors
///
/// Returns an error if a guessed MIME type is rejected.
pub fn build_multipart(payload: &MultipartPayload) -> Result<Form, BodyBuildError> {
    let mut form = Form::new();

    for part in &payload.parts {
        form = match part {
            MultipartPart::File {
                field,
                file_name,
                content,
            } => {
                let mime_type = mime_guess::from_path(file_name)
                    .first_or_octet_stream()
                    .to_string();
                let part = Part::bytes(content.clone())
                    .file_name(file_name.clone())
                    .mime_str(&mime_type)
                    .map_err(|e| BodyBuildError::InvalidMime {
                        file: file_name.clone(),
                        message: e.to_string(),
                    })?;
                form.part(field.clone(), part)
            }
            MultipartPart::Text { name, value } => form.text(name.clone(), value.clone()),
        };
    }

    Ok(form)
}

/// Attaches `body` to `builder`. Empty text is sent as no body at all.
///
/// # Errors
///
/// Returns an error if the multipart form cannot be built.
pub fn apply_body(
    builder: RequestBuilder,
    body: &ResolvedBody,
) -> Result<RequestBuilder, BodyBuildError> {
    match body {
        ResolvedBody::Empty => Ok(builder),
        ResolvedBody::Text { content } if content.is_empty() => Ok(builder),
        ResolvedBody::Text { content } => Ok(builder.body(content.clone())),
        ResolvedBody::Multipart(payload) => Ok(builder.multipart(build_multipart(payload)?)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reqwest::Client;

    fn payload() -> MultipartPayload {
        MultipartPayload {
            parts: vec![
                MultipartPart::File {
                    field: "file1".into(),
                    file_name: "notes.txt".into(),
                    content: b"hello".to_vec(),
                },
                MultipartPart::Text {
                    name: "note".into(),
                    value: "hi".into(),
                },
            ],
        }
    }

    #[test]
    fn test_multipart_sets_boundary_header() {
        let builder = Client::new().post("http://localhost/upload");
        let request = apply_body(builder, &ResolvedBody::Multipart(payload()))
            .unwrap()
            .build()
            .unwrap();

        let content_type = request
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
    }

    #[test]
    fn test_text_body_is_sent_verbatim() {
        let builder = Client::new().post("http://localhost/");
        let request = apply_body(
            builder,
            &ResolvedBody::Text {
                content: r#"{"a":1}"#.into(),
            },
        )
        .unwrap()
        .build()
        .unwrap();

        let bytes = request.body().and_then(reqwest::Body::as_bytes).unwrap();
        assert_eq!(bytes, br#"{"a":1}"#);
    }

    #[test]
    fn test_empty_text_sends_no_body() {
        let builder = Client::new().post("http://localhost/");
        let request = apply_body(
            builder,
            &ResolvedBody::Text {
                content: String::new(),
            },
        )
        .unwrap()
        .build()
        .unwrap();
        assert!(request.body().is_none());

        let builder = Client::new().get("http://localhost/");
        let request = apply_body(builder, &ResolvedBody::Empty)
            .unwrap()
            .build()
            .unwrap();
        assert!(request.body().is_none());
    }
}
