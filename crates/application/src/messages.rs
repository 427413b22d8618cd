//! Messages exchanged between the editing panel and the host.
//!
//! Both directions are JSON objects tagged by a `command` field.

use courier_domain::auth::{AuthMode, AuthSpec};
use courier_domain::environment::Environment;
use courier_domain::history::HistoryEntry;
use courier_domain::request::{Attachment, BodySpec, BodyType, FormSpec, HttpMethod, RequestSnapshot};
use courier_domain::response::HttpResponse;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::builder::BuildError;

/// Messages sent by the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum InboundMessage {
    /// Build and dispatch the request described by the current fields.
    SendRequest(SendRequest),
    /// Replace all environments and the active selection.
    #[serde(rename_all = "camelCase")]
    SaveEnvironments {
        /// Every environment.
        environments: Vec<Environment>,
        /// Name of the active environment.
        active_environment: String,
    },
    /// Ask for history and environments.
    GetInitialData,
    /// Drop every history entry.
    ClearHistory,
    /// Re-send a past request against the active environment.
    ReplayHistory {
        /// History entry ID.
        id: String,
    },
}

/// Raw field values of a send action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// URL text.
    pub url: String,
    /// Headers as JSON object text. An object is accepted too.
    #[serde(default, deserialize_with = "json_text")]
    pub headers: String,
    /// Selected body type.
    #[serde(default)]
    pub body_type: BodyType,
    /// Body text, or a form description for `formdata`. Any other JSON
    /// value is kept as its compact text.
    #[serde(default)]
    pub body: Option<Value>,
    /// Selected auth mode.
    #[serde(default)]
    pub auth_type: AuthMode,
    /// Auth credential text.
    #[serde(default)]
    pub auth_value: String,
}

/// Multipart body as sent by the panel.
#[derive(Debug, Deserialize)]
struct FormPayload {
    #[serde(default, deserialize_with = "json_text")]
    fields: String,
    #[serde(default)]
    files: Vec<Attachment>,
}

impl SendRequest {
    /// Converts the raw message into a request snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error when a `formdata` body is not a form description.
    pub fn into_snapshot(self) -> Result<RequestSnapshot, serde_json::Error> {
        let body = match (self.body_type, self.body) {
            (BodyType::None, _) => BodySpec::None,
            (BodyType::Formdata, Some(value @ Value::Object(_))) => {
                let form: FormPayload = serde_json::from_value(value)?;
                BodySpec::Formdata(FormSpec {
                    fields: form.fields,
                    files: form.files,
                })
            }
            (body_type, value) => {
                BodySpec::text(body_type, value.map(value_text).unwrap_or_default())
            }
        };

        Ok(RequestSnapshot {
            method: self.method,
            url: self.url,
            headers_text: self.headers,
            auth: AuthSpec::new(self.auth_type, self.auth_value),
            body,
        })
    }
}

/// Text as is, `null` as empty, anything else as compact JSON.
fn value_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Accepts either text or any JSON value, keeping the value's compact text.
fn json_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Value::deserialize(deserializer).map(value_text)
}

/// Category of a locally rejected action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestErrorKind {
    /// Headers text is not a JSON object.
    InvalidHeaders,
    /// Body text does not fit its body type.
    MalformedPayload,
    /// An attachment could not be read.
    FileReadFailure,
    /// A send is already in flight.
    Busy,
    /// The inbound message could not be understood.
    InvalidMessage,
    /// A referenced item does not exist.
    NotFound,
    /// An environment edit was rejected.
    InvalidEnvironment,
    /// Persisting state failed.
    Storage,
}

impl From<&BuildError> for RequestErrorKind {
    fn from(error: &BuildError) -> Self {
        match error {
            BuildError::InvalidHeaders(_) => Self::InvalidHeaders,
            BuildError::MalformedPayload(_) => Self::MalformedPayload,
            BuildError::FileReadFailure { .. } => Self::FileReadFailure,
        }
    }
}

/// Messages sent to the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// Everything the panel needs at startup.
    #[serde(rename_all = "camelCase")]
    InitData {
        /// History, newest first.
        history: Vec<HistoryEntry>,
        /// Every environment.
        environments: Vec<Environment>,
        /// Name of the active environment.
        active_environment: String,
    },
    /// Result of a dispatched request.
    Response(HttpResponse),
    /// History changed.
    LoadHistory {
        /// History, newest first.
        history: Vec<HistoryEntry>,
    },
    /// An action was rejected before anything was sent.
    RequestError {
        /// Failure category.
        kind: RequestErrorKind,
        /// Human-readable detail.
        message: String,
    },
}

impl OutboundMessage {
    /// Builds a `requestError` message.
    #[must_use]
    pub fn request_error(kind: RequestErrorKind, message: impl Into<String>) -> Self {
        Self::RequestError {
            kind,
            message: message.into(),
        }
    }
}
