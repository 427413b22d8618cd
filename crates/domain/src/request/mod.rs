//! Request domain types: what the user entered and what gets sent.

mod body;
mod headers;
mod method;
mod resolved;
mod snapshot;

pub use body::{Attachment, AttachmentSource, BodySpec, BodyType, FileAttachment, FormSpec};
pub use headers::{CONTENT_TYPE, Headers};
pub use method::HttpMethod;
pub use resolved::{MultipartPart, MultipartPayload, ResolvedBody, ResolvedRequest};
pub use snapshot::RequestSnapshot;
