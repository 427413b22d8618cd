//! Variable resolution engine
//!
//! Substitutes `{{variable}}` references from one environment's variables.

use courier_domain::environment::{Environment, VariableMap};

use super::parser::parse_variables;

/// A variable that was found and substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariable {
    /// Variable name.
    pub name: String,
    /// Substituted value.
    pub value: String,
}

/// Result of variable resolution for a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    /// The resolved string with all known variables substituted.
    pub resolved: String,

    /// Variables that were successfully resolved.
    pub resolved_variables: Vec<ResolvedVariable>,

    /// Variable names that could not be resolved.
    pub unresolved: Vec<String>,

    /// Whether all variables were successfully resolved.
    pub is_complete: bool,
}

impl ResolutionResult {
    /// Creates a result for input with no variables.
    #[must_use]
    pub fn no_variables(input: &str) -> Self {
        Self {
            resolved: input.to_string(),
            resolved_variables: Vec::new(),
            unresolved: Vec::new(),
            is_complete: true,
        }
    }

    /// Returns the count of resolved variables.
    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.resolved_variables.len()
    }

    /// Returns the count of unresolved variables.
    #[must_use]
    pub fn unresolved_count(&self) -> usize {
        self.unresolved.len()
    }
}

/// The variable resolution engine.
///
/// Substitution is a single pass: values are inserted as-is and never
/// scanned for further placeholders. Unknown names stay verbatim.
#[derive(Debug, Clone, Copy)]
pub struct VariableResolver<'a> {
    variables: &'a VariableMap,
}

impl<'a> VariableResolver<'a> {
    /// Creates a resolver over a variable mapping.
    #[must_use]
    pub const fn new(variables: &'a VariableMap) -> Self {
        Self { variables }
    }

    /// Creates a resolver over an environment's variables.
    #[must_use]
    pub const fn for_environment(environment: &'a Environment) -> Self {
        Self::new(&environment.variables)
    }

    /// Resolves all variables in the input string.
    #[must_use]
    pub fn resolve(&self, input: &str) -> String {
        self.resolve_detailed(input).resolved
    }

    /// Resolves all variables and reports which names were found.
    #[must_use]
    pub fn resolve_detailed(&self, input: &str) -> ResolutionResult {
        let references = parse_variables(input);

        if references.is_empty() {
            return ResolutionResult::no_variables(input);
        }

        let mut resolved_vars = Vec::new();
        let mut unresolved = Vec::new();
        let mut result = String::with_capacity(input.len());
        let mut last_end = 0;

        for var_ref in &references {
            result.push_str(&input[last_end..var_ref.span.start]);

            if let Some(value) = self.variables.get(&var_ref.name) {
                result.push_str(value);
                resolved_vars.push(ResolvedVariable {
                    name: var_ref.name.clone(),
                    value: value.clone(),
                });
            } else {
                // Keep the original {{variable}} for unresolved
                result.push_str(&input[var_ref.span.clone()]);
                unresolved.push(var_ref.name.clone());
            }

            last_end = var_ref.span.end;
        }

        result.push_str(&input[last_end..]);

        let is_complete = unresolved.is_empty();
        ResolutionResult {
            resolved: result,
            resolved_variables: resolved_vars,
            unresolved,
            is_complete,
        }
    }

    /// Checks which variables in the input would be unresolved.
    #[must_use]
    pub fn find_unresolved(&self, input: &str) -> Vec<String> {
        parse_variables(input)
            .into_iter()
            .filter(|r| !self.variables.contains_key(&r.name))
            .map(|r| r.name)
            .collect()
    }
}

/// Substitutes `{{name}}` placeholders in `text` from `variables`.
#[must_use]
pub fn resolve(text: &str, variables: &VariableMap) -> String {
    VariableResolver::new(variables).resolve(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vars(pairs: &[(&str, &str)]) -> VariableMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_empty_environment_is_identity() {
        let empty = VariableMap::new();
        for text in ["", "plain", "{{a}}", "x {{ b }} y", "{{unclosed"] {
            assert_eq!(resolve(text, &empty), text);
        }
    }

    #[test]
    fn test_missing_variable_left_verbatim() {
        let env = vars(&[("foo", "1")]);
        assert_eq!(resolve("{{missing}}", &env), "{{missing}}");
    }

    #[test]
    fn test_resolve_host() {
        let env = vars(&[("host", "api.example.com")]);
        assert_eq!(
            resolve("https://{{host}}/v1", &env),
            "https://api.example.com/v1"
        );
    }

    #[test]
    fn test_whitespace_inside_braces() {
        let env = vars(&[("host", "h")]);
        assert_eq!(resolve("{{ host }}|{{host}}", &env), "h|h");
    }

    #[test]
    fn test_substitution_is_not_recursive() {
        let env = vars(&[("a", "{{b}}"), ("b", "deep")]);
        assert_eq!(resolve("{{a}}", &env), "{{b}}");
    }

    #[test]
    fn test_unclosed_leaves_remainder() {
        let env = vars(&[("a", "1"), ("b", "2")]);
        assert_eq!(resolve("{{a}}-{{b", &env), "1-{{b");
    }

    #[test]
    fn test_mixed_resolved_unresolved() {
        let env = vars(&[("base_url", "http://localhost:3000")]);
        let result = VariableResolver::new(&env).resolve_detailed("{{base_url}}/{{unknown}}/users");

        assert_eq!(result.resolved, "http://localhost:3000/{{unknown}}/users");
        assert!(!result.is_complete);
        assert_eq!(result.resolved_count(), 1);
        assert_eq!(result.unresolved, vec!["unknown"]);
    }

    #[test]
    fn test_find_unresolved() {
        let env = vars(&[("a", "1")]);
        let resolver = VariableResolver::new(&env);
        assert_eq!(resolver.find_unresolved("{{a}} {{b}} {{ c }}"), vec!["b", "c"]);
    }

    #[test]
    fn test_for_environment() {
        let env = Environment::new("dev").with_variable("token", "t-1");
        let resolver = VariableResolver::for_environment(&env);
        assert_eq!(resolver.resolve("Bearer {{token}}"), "Bearer t-1");
    }

    #[test]
    fn test_json_body_with_variables() {
        let env = vars(&[("app_name", "TestApp"), ("id", "7")]);
        assert_eq!(
            resolve(r#"{"app": "{{app_name}}", "id": {{id}}}"#, &env),
            r#"{"app": "TestApp", "id": 7}"#
        );
    }
}
