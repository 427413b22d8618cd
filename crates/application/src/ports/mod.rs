//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod attachment_reader;
mod clock;
mod http_client;
mod storage;

pub use attachment_reader::{AttachmentReader, FileReadError};
pub use clock::Clock;
pub use http_client::{HttpClient, HttpClientError};
pub use storage::{KeyValueStore, StoreError, load_json, save_json};
