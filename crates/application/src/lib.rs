//! Courier Application - Use cases and ports
//!
//! This crate turns raw editor fields into transport-ready requests and
//! drives the message channel between the editing panel and the host.
//! All I/O goes through the traits in [`ports`].

pub mod auth;
pub mod body_encoder;
pub mod builder;
pub mod error;
pub mod messages;
pub mod ports;
pub mod session;
pub mod stores;
pub mod variable_resolver;

pub use auth::AuthInjector;
pub use body_encoder::{BodyEncoder, EncodeError, EncodedBody};
pub use builder::{BuildError, RequestBuilder};
pub use error::{ApplicationError, ApplicationResult};
pub use messages::{InboundMessage, OutboundMessage, RequestErrorKind};
pub use session::Session;
pub use stores::{EnvironmentError, EnvironmentStore, HistoryStore};
pub use variable_resolver::{ResolutionResult, VariableResolver, resolve};
