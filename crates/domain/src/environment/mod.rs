//! Environment and variable domain types

mod variable;

pub use variable::{DEFAULT_ENVIRONMENT, Environment, VariableMap, coerce_value};
