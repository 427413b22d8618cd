//! Variable parser for {{variable}} syntax
//!
//! Parses strings to extract variable references with their positions.

use std::ops::Range;

/// Represents a parsed variable reference in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference {
    /// The variable name (without {{ }}), trimmed.
    pub name: String,

    /// Byte range in the original string where this reference appears.
    pub span: Range<usize>,
}

impl VariableReference {
    /// Creates a new variable reference.
    #[must_use]
    pub fn new(name: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Parses a string and extracts all variable references.
///
/// Whitespace inside the braces is ignored, so `{{ host }}` names `host`.
/// Empty names are skipped. Scanning stops at the first `{{` that is never
/// closed; everything after it is plain text.
///
/// # Examples
///
/// ```
/// use courier_application::variable_resolver::parser::parse_variables;
///
/// let refs = parse_variables("https://{{host}}/users/{{ id }}");
/// assert_eq!(refs.len(), 2);
/// assert_eq!(refs[0].name, "host");
/// assert_eq!(refs[1].name, "id");
/// ```
#[must_use]
pub fn parse_variables(input: &str) -> Vec<VariableReference> {
    let mut references = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        if ch != '{' || !matches!(chars.peek(), Some((_, '{'))) {
            continue;
        }
        chars.next();

        let start = i;
        let mut name = String::new();
        let mut found_end = false;

        while let Some((_, ch)) = chars.next() {
            if ch == '}' {
                if let Some(&(end_idx, '}')) = chars.peek() {
                    chars.next();

                    let trimmed = name.trim();
                    if !trimmed.is_empty() {
                        references.push(VariableReference::new(trimmed, start..end_idx + 1));
                    }
                    found_end = true;
                    break;
                }
            }
            name.push(ch);
        }

        if !found_end {
            break;
        }
    }

    references
}

/// Returns true if the input string contains any variable references.
#[must_use]
pub fn has_variables(input: &str) -> bool {
    !parse_variables(input).is_empty()
}

/// Extracts just the variable names from the input without full parsing info.
#[must_use]
pub fn extract_variable_names(input: &str) -> Vec<String> {
    parse_variables(input)
        .into_iter()
        .map(|r| r.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_variable() {
        let refs = parse_variables("{{name}}");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "name");
        assert_eq!(refs[0].span, 0..8);
    }

    #[test]
    fn test_parse_multiple_variables() {
        let refs = parse_variables("{{base_url}}/api/{{version}}/users");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].name, "base_url");
        assert_eq!(refs[1].name, "version");
    }

    #[test]
    fn test_parse_with_whitespace() {
        let refs = parse_variables("{{ name }}");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "name");
    }

    #[test]
    fn test_no_variables() {
        assert!(parse_variables("Hello, World!").is_empty());
    }

    #[test]
    fn test_unclosed_variable_stops_scan() {
        let refs = parse_variables("{{a}} {{b and {{c}}");
        // The second opener swallows everything up to the next `}}`.
        assert_eq!(extract_variable_names("{{a}} {{b and {{c}}"), vec!["a", "b and {{c"]);
        assert_eq!(refs.len(), 2);

        assert_eq!(extract_variable_names("{{a}} then {{b"), vec!["a"]);
    }

    #[test]
    fn test_empty_variable() {
        assert!(parse_variables("{{}}").is_empty());
        assert!(parse_variables("{{   }}").is_empty());
    }

    #[test]
    fn test_variable_in_json() {
        let refs = parse_variables(r#"{"name": "{{user_name}}", "id": "{{id}}"}"#);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].name, "user_name");
        assert_eq!(refs[1].name, "id");
    }

    #[test]
    fn test_adjacent_variables() {
        assert_eq!(extract_variable_names("{{a}}{{b}}{{c}}"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_single_brace() {
        assert!(parse_variables("{name}").is_empty());
        assert!(!has_variables("{name}"));
    }

    #[test]
    fn test_multibyte_text_spans() {
        let input = "héllo {{näme}} wörld";
        let refs = parse_variables(input);
        assert_eq!(refs.len(), 1);
        assert_eq!(&input[refs[0].span.clone()], "{{näme}}");
    }
}
