//! Turns an auth selection into a request header.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use courier_domain::auth::{AuthMode, AuthSpec};
use courier_domain::request::Headers;

/// Header written by bearer and basic auth.
pub const AUTHORIZATION: &str = "Authorization";

/// Header written by API key auth.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Derives the auth header from a mode and an already-substituted credential.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthInjector;

impl AuthInjector {
    /// Returns the header name and value for `auth`, or `None` when nothing
    /// should be written.
    ///
    /// A blank credential disables injection for every mode.
    #[must_use]
    pub fn header_for(auth: &AuthSpec) -> Option<(&'static str, String)> {
        if auth.credential.trim().is_empty() {
            return None;
        }

        let credential = auth.credential.as_str();
        match auth.mode {
            AuthMode::None => None,
            AuthMode::Bearer => Some((AUTHORIZATION, format!("Bearer {credential}"))),
            AuthMode::Basic => Some((
                AUTHORIZATION,
                format!("Basic {}", STANDARD.encode(credential.as_bytes())),
            )),
            AuthMode::Apikey => Some((API_KEY_HEADER, credential.to_string())),
        }
    }

    /// Writes the auth header into `headers`.
    ///
    /// Any user-entered spelling of the same header is replaced; every other
    /// header is left untouched.
    pub fn inject(headers: &mut Headers, auth: &AuthSpec) {
        if let Some((name, value)) = Self::header_for(auth) {
            headers.set_owned(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base_headers() -> Headers {
        [("Accept", "application/json")].into_iter().collect()
    }

    #[test]
    fn test_none_never_injects() {
        let mut headers = base_headers();
        AuthInjector::inject(&mut headers, &AuthSpec::new(AuthMode::None, "secret"));
        assert_eq!(headers, base_headers());
    }

    #[test]
    fn test_bearer() {
        let mut headers = base_headers();
        AuthInjector::inject(&mut headers, &AuthSpec::bearer("abc"));
        assert_eq!(headers.get("Authorization"), Some("Bearer abc"));
        assert_eq!(headers.get("Accept"), Some("application/json"));
    }

    #[test]
    fn test_basic_encodes_credential() {
        let mut headers = Headers::new();
        AuthInjector::inject(&mut headers, &AuthSpec::basic("user:pass"));
        assert_eq!(headers.get("Authorization"), Some("Basic dXNlcjpwYXNz"));
    }

    #[test]
    fn test_api_key() {
        let mut headers = Headers::new();
        AuthInjector::inject(&mut headers, &AuthSpec::api_key("k-123"));
        assert_eq!(headers.get("X-API-Key"), Some("k-123"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_blank_credential_suppresses() {
        for spec in [
            AuthSpec::bearer(""),
            AuthSpec::basic("   "),
            AuthSpec::api_key("\t"),
        ] {
            let mut headers = base_headers();
            AuthInjector::inject(&mut headers, &spec);
            assert_eq!(headers, base_headers());
        }
    }

    #[test]
    fn test_replaces_user_header_in_any_case() {
        let mut headers: Headers = [("authorization", "Token old"), ("X-Other", "1")]
            .into_iter()
            .collect();
        AuthInjector::inject(&mut headers, &AuthSpec::bearer("new"));

        assert_eq!(headers.get("Authorization"), Some("Bearer new"));
        assert_eq!(headers.get("authorization"), None);
        assert_eq!(headers.get("X-Other"), Some("1"));
        assert_eq!(headers.len(), 2);
    }
}
