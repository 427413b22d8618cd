//! Deterministic JSON serialization for the files Courier writes.
//!
//! State and settings files are written with sorted keys, 2-space
//! indentation and a trailing newline so they stay readable and diffable.

mod json;

pub use json::*;
