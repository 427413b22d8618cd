//! HTTP request body types

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// The kind of request body selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    /// No body
    #[default]
    None,
    /// JSON text
    Json,
    /// Plain text
    Raw,
    /// Pre-encoded `key=value&...` text
    Urlencoded,
    /// Multipart form with file attachments
    Formdata,
}

impl BodyType {
    /// Returns the tag used on the wire and in persisted history.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Json => "json",
            Self::Raw => "raw",
            Self::Urlencoded => "urlencoded",
            Self::Formdata => "formdata",
        }
    }

    /// Content type applied when the user did not set one.
    ///
    /// Multipart has no default here: the transport generates the boundary
    /// header itself.
    #[must_use]
    pub const fn default_content_type(self) -> Option<&'static str> {
        match self {
            Self::Json => Some("application/json"),
            Self::Raw => Some("text/plain"),
            Self::Urlencoded => Some("application/x-www-form-urlencoded"),
            Self::None | Self::Formdata => None,
        }
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyType {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s {
            "none" | "" => Ok(Self::None),
            "json" => Ok(Self::Json),
            "raw" => Ok(Self::Raw),
            "urlencoded" => Ok(Self::Urlencoded),
            "formdata" => Ok(Self::Formdata),
            other => Err(DomainError::UnsupportedBodyType(other.to_string())),
        }
    }
}

/// Where the bytes of an attachment come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttachmentSource {
    /// Content already in memory (the panel sends base64).
    Inline {
        /// Raw file bytes.
        #[serde(with = "base64_bytes")]
        content: Vec<u8>,
    },
    /// A file on the local filesystem, read at build time.
    Path {
        /// Path to the file.
        path: PathBuf,
        /// Size reported by the file picker, if known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<u64>,
    },
}

/// A file the user attached to a multipart body, before it is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Original file name.
    pub name: String,
    /// Explicit form field name; positional `fileN` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Where to read the bytes from.
    #[serde(flatten)]
    pub source: AttachmentSource,
}

impl Attachment {
    /// Creates an attachment whose bytes are already loaded.
    #[must_use]
    pub fn inline(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            field: None,
            source: AttachmentSource::Inline {
                content: content.into(),
            },
        }
    }

    /// Creates an attachment read from `path` at build time.
    #[must_use]
    pub fn from_path(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            field: None,
            source: AttachmentSource::Path {
                path: path.into(),
                size: None,
            },
        }
    }

    /// Sets an explicit form field name.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Size in bytes, when it is known without touching the filesystem.
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        match &self.source {
            AttachmentSource::Inline { content } => u64::try_from(content.len()).ok(),
            AttachmentSource::Path { size, .. } => *size,
        }
    }

    fn is_duplicate_of(&self, other: &Self) -> bool {
        if self.name != other.name {
            return false;
        }
        match (self.size(), other.size()) {
            (Some(a), Some(b)) => a == b,
            _ => match (&self.source, &other.source) {
                (
                    AttachmentSource::Path { path: a, .. },
                    AttachmentSource::Path { path: b, .. },
                ) => a == b,
                _ => false,
            },
        }
    }
}

/// A file attachment with its bytes loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttachment {
    /// Original file name.
    pub name: String,
    /// Explicit form field name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Raw file bytes.
    #[serde(with = "base64_bytes")]
    pub content: Vec<u8>,
}

impl FileAttachment {
    /// Creates a loaded attachment.
    #[must_use]
    pub fn new(name: impl Into<String>, field: Option<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            field,
            content,
        }
    }
}

/// Multipart form description: extra text fields plus ordered attachments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSpec {
    /// Extra fields as JSON object text, parsed at build time.
    #[serde(default)]
    pub fields: String,
    /// Attachments in selection order.
    #[serde(default)]
    pub files: Vec<Attachment>,
}

impl FormSpec {
    /// Creates a form from extra-fields text with no attachments.
    #[must_use]
    pub fn new(fields: impl Into<String>) -> Self {
        Self {
            fields: fields.into(),
            files: Vec::new(),
        }
    }

    /// Appends an attachment unless one with the same name and size is
    /// already selected. Returns whether it was added.
    pub fn attach(&mut self, attachment: Attachment) -> bool {
        if self.files.iter().any(|f| f.is_duplicate_of(&attachment)) {
            return false;
        }
        self.files.push(attachment);
        true
    }
}

/// The request payload before substitution and encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BodySpec {
    /// No body
    #[default]
    None,
    /// JSON text
    Json {
        /// Raw text, may contain placeholders.
        text: String,
    },
    /// Plain text
    Raw {
        /// Raw text, may contain placeholders.
        text: String,
    },
    /// Pre-encoded form text
    Urlencoded {
        /// Raw text, may contain placeholders.
        text: String,
    },
    /// Multipart form
    Formdata(FormSpec),
}

impl BodySpec {
    /// Creates a text body of the given type. `Formdata` yields an empty form
    /// whose extra fields are `text`.
    #[must_use]
    pub fn text(body_type: BodyType, text: impl Into<String>) -> Self {
        let text = text.into();
        match body_type {
            BodyType::None => Self::None,
            BodyType::Json => Self::Json { text },
            BodyType::Raw => Self::Raw { text },
            BodyType::Urlencoded => Self::Urlencoded { text },
            BodyType::Formdata => Self::Formdata(FormSpec::new(text)),
        }
    }

    /// Returns the body type tag.
    #[must_use]
    pub const fn body_type(&self) -> BodyType {
        match self {
            Self::None => BodyType::None,
            Self::Json { .. } => BodyType::Json,
            Self::Raw { .. } => BodyType::Raw,
            Self::Urlencoded { .. } => BodyType::Urlencoded,
            Self::Formdata(_) => BodyType::Formdata,
        }
    }

    /// Returns the raw text for the single-payload kinds.
    #[must_use]
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            Self::Json { text } | Self::Raw { text } | Self::Urlencoded { text } => Some(text),
            Self::None | Self::Formdata(_) => None,
        }
    }

    /// Returns the form description for multipart bodies.
    #[must_use]
    pub const fn form(&self) -> Option<&FormSpec> {
        match self {
            Self::Formdata(form) => Some(form),
            _ => None,
        }
    }
}

/// Serde adapter storing bytes as standard base64 text.
pub(crate) mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text.as_bytes()).map_err(serde::de::Error::custom)
    }
}
