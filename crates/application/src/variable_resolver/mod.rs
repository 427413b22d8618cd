//! Variable resolution module
//!
//! Provides parsing and resolution of `{{variable}}` syntax in strings.
//!
//! # Usage
//!
//! ```
//! use courier_application::variable_resolver::VariableResolver;
//! use courier_domain::Environment;
//!
//! let env = Environment::new("development").with_variable("host", "localhost");
//! let resolver = VariableResolver::for_environment(&env);
//!
//! assert_eq!(resolver.resolve("http://{{host}}/api"), "http://localhost/api");
//! ```

pub mod engine;
pub mod parser;

pub use engine::{ResolutionResult, ResolvedVariable, VariableResolver, resolve};
pub use parser::{VariableReference, extract_variable_names, has_variables, parse_variables};
