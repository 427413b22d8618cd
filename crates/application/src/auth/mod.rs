//! Authentication header injection.

mod injector;

pub use injector::{API_KEY_HEADER, AUTHORIZATION, AuthInjector};
