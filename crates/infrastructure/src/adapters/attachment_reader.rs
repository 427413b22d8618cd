//! Attachment reader backed by `tokio::fs`.

use async_trait::async_trait;
use courier_application::ports::{AttachmentReader, FileReadError};
use courier_domain::request::AttachmentSource;
use tracing::debug;

/// Reads attachments from memory or the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioAttachmentReader;

impl TokioAttachmentReader {
    /// Creates a new reader.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AttachmentReader for TokioAttachmentReader {
    async fn read(&self, source: &AttachmentSource) -> Result<Vec<u8>, FileReadError> {
        match source {
            AttachmentSource::Inline { content } => Ok(content.clone()),
            AttachmentSource::Path { path, .. } => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| FileReadError::new(path.display().to_string(), e.to_string()))?;
                debug!(path = %path.display(), len = bytes.len(), "attachment read");
                Ok(bytes)
            }
        }
    }
}
