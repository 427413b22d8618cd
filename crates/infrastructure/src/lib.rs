//! Courier Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer.

pub mod adapters;
pub mod http;
pub mod persistence;
pub mod serialization;

pub use adapters::{ReqwestHttpClient, SystemClock, TokioAttachmentReader};
pub use http::{BodyBuildError, apply_body, build_multipart};
pub use persistence::{
    InMemoryStore, JsonFileStore, STATE_PATH_ENV, SettingsError, SettingsRepository,
};
pub use serialization::{
    SerializationError, from_json, from_json_bytes, to_json_stable, to_json_stable_bytes,
};
