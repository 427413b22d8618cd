//! HTTP infrastructure utilities.
//!
//! This module turns resolved bodies into reqwest request bodies.

mod body_builder;

pub use body_builder::{BodyBuildError, apply_body, build_multipart};
