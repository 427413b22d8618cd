//! Request header mapping

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Name of the content type header.
pub const CONTENT_TYPE: &str = "Content-Type";

/// Header mapping as the user entered it.
///
/// Names keep their original case. Inserting an exactly equal name replaces
/// the previous value (last write wins). Lookups used for precedence rules
/// compare names case-insensitively, since HTTP header names are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    /// Creates an empty header mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Inserts a header under the exact name given, replacing an exact match.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Returns the value stored under the exact name given.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Returns the first value whose name matches case-insensitively.
    #[must_use]
    pub fn get_ignore_case(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns true if any header matches `name` case-insensitively.
    #[must_use]
    pub fn contains_ignore_case(&self, name: &str) -> bool {
        self.0.keys().any(|key| key.eq_ignore_ascii_case(name))
    }

    /// Removes every header whose name matches case-insensitively.
    ///
    /// Returns the number of entries removed.
    pub fn remove_ignore_case(&mut self, name: &str) -> usize {
        let before = self.0.len();
        self.0.retain(|key, _| !key.eq_ignore_ascii_case(name));
        before - self.0.len()
    }

    /// Sets a header the caller owns: any spelling of `name` is replaced by
    /// exactly one entry with the canonical name.
    pub fn set_owned(&mut self, name: &str, value: impl Into<String>) {
        self.remove_ignore_case(name);
        self.0.insert(name.to_string(), value.into());
    }

    /// Applies `f` to every header value, leaving names untouched.
    pub fn map_values(&mut self, mut f: impl FnMut(&str) -> String) {
        for value in self.0.values_mut() {
            *value = f(value);
        }
    }

    /// Iterates headers in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<Headers> for BTreeMap<String, String> {
    fn from(headers: Headers) -> Self {
        headers.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_keeps_case_and_last_write_wins() {
        let mut headers = Headers::new();
        headers.insert("X-Trace", "1");
        headers.insert("X-Trace", "2");
        headers.insert("x-trace", "3");

        assert_eq!(headers.get("X-Trace"), Some("2"));
        assert_eq!(headers.get("x-trace"), Some("3"));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let headers: Headers = [("content-type", "text/xml")].into_iter().collect();
        assert!(headers.contains_ignore_case(CONTENT_TYPE));
        assert_eq!(headers.get_ignore_case("CONTENT-TYPE"), Some("text/xml"));
    }

    #[test]
    fn test_set_owned_replaces_other_spellings() {
        let mut headers: Headers = [("authorization", "old"), ("Accept", "*/*")]
            .into_iter()
            .collect();
        headers.set_owned("Authorization", "Bearer t");

        assert_eq!(headers.get("Authorization"), Some("Bearer t"));
        assert_eq!(headers.get("authorization"), None);
        assert_eq!(headers.get("Accept"), Some("*/*"));
    }

    #[test]
    fn test_remove_ignore_case_counts() {
        let mut headers: Headers = [("Content-Type", "a"), ("content-type", "b"), ("Accept", "c")]
            .into_iter()
            .collect();
        assert_eq!(headers.remove_ignore_case(CONTENT_TYPE), 2);
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let headers: Headers = [("B", "2"), ("A", "1")].into_iter().collect();
        let json = serde_json::to_string(&headers).unwrap_or_default();
        assert_eq!(json, r#"{"A":"1","B":"2"}"#);
    }
}
