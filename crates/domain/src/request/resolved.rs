//! The fully resolved request handed to the transport

use serde::{Deserialize, Serialize};

use super::body::{BodyType, base64_bytes};
use super::headers::{CONTENT_TYPE, Headers};
use super::method::HttpMethod;

/// One part of a multipart payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MultipartPart {
    /// A file part carrying raw bytes and the original file name.
    File {
        /// Form field name.
        field: String,
        /// Original file name.
        file_name: String,
        /// Raw bytes.
        #[serde(with = "base64_bytes")]
        content: Vec<u8>,
    },
    /// A plain text part.
    Text {
        /// Form field name.
        name: String,
        /// Substituted value.
        value: String,
    },
}

/// Structured multipart body. The transport chooses the boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipartPayload {
    /// Parts in send order: files first, then text fields.
    pub parts: Vec<MultipartPart>,
}

impl MultipartPayload {
    /// Returns the number of file parts.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, MultipartPart::File { .. }))
            .count()
    }

    /// Total bytes carried by file parts.
    #[must_use]
    pub fn file_bytes(&self) -> usize {
        self.parts
            .iter()
            .map(|p| match p {
                MultipartPart::File { content, .. } => content.len(),
                MultipartPart::Text { .. } => 0,
            })
            .sum()
    }
}

/// Final request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedBody {
    /// No body is sent.
    #[default]
    Empty,
    /// A text body.
    Text {
        /// Substituted text.
        content: String,
    },
    /// A multipart form.
    Multipart(MultipartPayload),
}

impl ResolvedBody {
    /// Returns the text content for text bodies.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { content } => Some(content),
            Self::Empty | Self::Multipart(_) => None,
        }
    }

    /// Returns true when nothing will be sent.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Transport-ready request: every placeholder substituted, auth merged,
/// body encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Substituted URL.
    pub url: String,
    /// Final headers.
    pub headers: Headers,
    /// Final body.
    pub body: ResolvedBody,
    /// Body type the user selected.
    pub body_type: BodyType,
}

impl ResolvedRequest {
    /// Returns the content type header, matched case-insensitively.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get_ignore_case(CONTENT_TYPE)
    }
}
