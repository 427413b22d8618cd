//! Courier Domain - Core business types
//!
//! This crate defines the domain model for the Courier request composer.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod environment;
pub mod error;
pub mod history;
pub mod id;
pub mod request;
pub mod response;
pub mod settings;

pub use auth::{AuthMode, AuthSpec};
pub use environment::{DEFAULT_ENVIRONMENT, Environment, VariableMap, coerce_value};
pub use error::{DomainError, DomainResult};
pub use history::{HistoryEntry, MAX_HISTORY_ENTRIES, RequestHistory};
pub use id::generate_id;
pub use request::{
    Attachment, AttachmentSource, BodySpec, BodyType, CONTENT_TYPE, FileAttachment, FormSpec,
    Headers, HttpMethod, MultipartPart, MultipartPayload, RequestSnapshot, ResolvedBody,
    ResolvedRequest,
};
pub use response::{HttpResponse, NETWORK_ERROR_TEXT, ResponseStatus};
pub use settings::ClientSettings;
