//! Authentication domain types

mod types;

pub use types::{AuthMode, AuthSpec};
