//! Environment and variable value types

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// Name of the environment that always exists and is active by default.
pub const DEFAULT_ENVIRONMENT: &str = "default";

/// Variable name to string value.
pub type VariableMap = BTreeMap<String, String>;

/// Converts an arbitrary JSON value into the string stored for a variable.
///
/// Strings are kept verbatim, `null` becomes empty, everything else is stored
/// as its compact JSON text (`42`, `true`, `[1,2]`).
#[must_use]
pub fn coerce_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn deserialize_coerced<'de, D: Deserializer<'de>>(deserializer: D) -> Result<VariableMap, D::Error> {
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    Ok(raw.iter().map(|(k, v)| (k.clone(), coerce_value(v))).collect())
}

/// A named set of variables used for placeholder substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Unique environment name.
    pub name: String,
    /// Variables; values are always strings.
    #[serde(default, deserialize_with = "deserialize_coerced")]
    pub variables: VariableMap,
}

impl Environment {
    /// Creates an empty environment.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: VariableMap::new(),
        }
    }

    /// Creates the empty `default` environment.
    #[must_use]
    pub fn default_environment() -> Self {
        Self::new(DEFAULT_ENVIRONMENT)
    }

    /// Validates an environment name: non-empty after trimming.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEnvironmentName` for blank names.
    pub fn validate_name(name: &str) -> DomainResult<&str> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidEnvironmentName(name.to_string()));
        }
        Ok(trimmed)
    }

    /// Adds or replaces a string variable.
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    /// Adds or replaces a variable from any JSON value, coercing it to text.
    pub fn set_value(&mut self, name: impl Into<String>, value: &Value) {
        self.variables.insert(name.into(), coerce_value(value));
    }

    /// Builder-style variant of [`Self::set_variable`].
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_variable(name, value);
        self
    }

    /// Returns the value for `name`.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Removes a variable.
    pub fn remove_variable(&mut self, name: &str) -> Option<String> {
        self.variables.remove(name)
    }

    /// Returns the number of variables.
    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Returns true if this is the sentinel `default` environment.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_ENVIRONMENT
    }
}
