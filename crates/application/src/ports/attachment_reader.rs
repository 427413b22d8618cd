//! Attachment reading port

use async_trait::async_trait;
use courier_domain::request::AttachmentSource;
use thiserror::Error;

/// A file could not be read.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{file}: {message}")]
pub struct FileReadError {
    /// Display name or path of the file.
    pub file: String,
    /// Underlying message.
    pub message: String,
}

impl FileReadError {
    /// Creates a read error.
    #[must_use]
    pub fn new(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            message: message.into(),
        }
    }
}

/// Port for loading attachment bytes.
#[async_trait]
pub trait AttachmentReader: Send + Sync {
    /// Returns the full contents of the attachment.
    ///
    /// # Errors
    /// Returns an error if the bytes cannot be obtained.
    async fn read(&self, source: &AttachmentSource) -> Result<Vec<u8>, FileReadError>;
}
