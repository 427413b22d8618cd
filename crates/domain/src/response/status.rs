//! Response status: a numeric code or the transport failure sentinel

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const ERROR_SENTINEL: &str = "Error";

/// HTTP status as shown to the user.
///
/// Serializes as a bare number, or as the string `"Error"` when no response
/// was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
    /// A real HTTP status code. Any code is a valid response.
    Code(u16),
    /// The exchange failed before a status line arrived.
    Error,
}

impl ResponseStatus {
    /// Returns the numeric code, if any.
    #[must_use]
    pub const fn code(self) -> Option<u16> {
        match self {
            Self::Code(code) => Some(code),
            Self::Error => None,
        }
    }

    /// Returns true for 2xx codes.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Code(200..=299))
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Error => f.write_str(ERROR_SENTINEL),
        }
    }
}

impl Serialize for ResponseStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Code(code) => serializer.serialize_u16(*code),
            Self::Error => serializer.serialize_str(ERROR_SENTINEL),
        }
    }
}

impl<'de> Deserialize<'de> for ResponseStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StatusVisitor;

        impl Visitor<'_> for StatusVisitor {
            type Value = ResponseStatus;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a status code or \"Error\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                u16::try_from(v)
                    .map(ResponseStatus::Code)
                    .map_err(|_| E::custom(format!("status code out of range: {v}")))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u16::try_from(v)
                    .map(ResponseStatus::Code)
                    .map_err(|_| E::custom(format!("status code out of range: {v}")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                if v == ERROR_SENTINEL {
                    Ok(ResponseStatus::Error)
                } else {
                    v.parse::<u16>()
                        .map(ResponseStatus::Code)
                        .map_err(|_| E::custom(format!("unknown status: {v}")))
                }
            }
        }

        deserializer.deserialize_any(StatusVisitor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serde_forms() {
        assert_eq!(serde_json::to_string(&ResponseStatus::Code(201)).unwrap(), "201");
        assert_eq!(serde_json::to_string(&ResponseStatus::Error).unwrap(), "\"Error\"");

        let code: ResponseStatus = serde_json::from_str("404").unwrap();
        assert_eq!(code, ResponseStatus::Code(404));
        let error: ResponseStatus = serde_json::from_str("\"Error\"").unwrap();
        assert_eq!(error, ResponseStatus::Error);
        assert!(serde_json::from_str::<ResponseStatus>("70000").is_err());
    }

    #[test]
    fn test_success_range() {
        assert!(ResponseStatus::Code(204).is_success());
        assert!(!ResponseStatus::Code(500).is_success());
        assert!(!ResponseStatus::Error.is_success());
        assert_eq!(ResponseStatus::Error.code(), None);
    }
}
