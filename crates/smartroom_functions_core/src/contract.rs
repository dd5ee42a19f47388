use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

pub const HELLO_RESPONSE_BODY: &str = "SmartRoom Backend is Working!";
pub const HELLO_LOG_MESSAGE: &str = "Hello SmartRoom triggered";
pub const UNAUTHENTICATED_MIGRATION_MESSAGE: &str = "Only authenticated users can migrate claims";
pub const MIGRATION_STARTED_MESSAGE: &str = "Claims migration started";
pub const DOCUMENT_CREATED_EVENT_TYPE: &str = "google.cloud.firestore.document.v1.created";
pub const ABSENT_FIELD_PLACEHOLDER: &str = "<absent>";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpRequest {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub path: String,
    // lower-cased names
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn text(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            headers: BTreeMap::from([(
                "Content-Type".to_string(),
                "text/plain; charset=utf-8".to_string(),
            )]),
            body: body.into(),
        }
    }

    pub fn json(status_code: u16, payload: &Value) -> Self {
        Self {
            status_code,
            headers: BTreeMap::from([(
                "Content-Type".to_string(),
                "application/json".to_string(),
            )]),
            body: payload.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdentityAssertion {
    pub uid: String,
    #[serde(default)]
    pub token: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CallableRequest {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub auth: Option<IdentityAssertion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallResult {
    pub success: bool,
    pub message: String,
}

impl CallResult {
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn envelope(&self) -> Value {
        json!({ "result": self })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallableError {
    #[error("unauthenticated: {message}")]
    Unauthenticated { message: String },
    #[error("invalid-argument: {message}")]
    InvalidArgument { message: String },
    #[error("internal: {message}")]
    Internal { message: String },
}

impl CallableError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated { .. } => "unauthenticated",
            Self::InvalidArgument { .. } => "invalid-argument",
            Self::Internal { .. } => "internal",
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Self::Unauthenticated { .. } => "UNAUTHENTICATED",
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::Internal { .. } => "INTERNAL",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::Unauthenticated { .. } => 401,
            Self::InvalidArgument { .. } => 400,
            Self::Internal { .. } => 500,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Unauthenticated { message }
            | Self::InvalidArgument { message }
            | Self::Internal { message } => message,
        }
    }

    pub fn envelope(&self) -> Value {
        json!({
            "error": {
                "status": self.status(),
                "message": self.message(),
            }
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentCreatedEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub time: Option<String>,
    pub document: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    // Kept as a raw value: a missing or non-object snapshot reads as an empty record.
    #[serde(default)]
    pub data: Option<Value>,
}

impl DocumentCreatedEvent {
    pub fn roster_record(&self) -> RosterRecord {
        RosterRecord::from_snapshot(self.data.as_ref().and_then(Value::as_object))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostel_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_rotation: Option<String>,
}

impl RosterRecord {
    pub fn from_snapshot(snapshot: Option<&Map<String, Value>>) -> Self {
        let Some(fields) = snapshot else {
            return Self::default();
        };

        Self {
            room_number: scalar_text(fields.get("roomNumber")),
            hostel_name: scalar_text(fields.get("hostelName")),
            task_rotation: scalar_text(fields.get("taskRotation")),
        }
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("roomNumber", self.room_number.is_none()),
            ("hostelName", self.hostel_name.is_none()),
            ("taskRotation", self.task_rotation.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }
}

fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub severity: Severity,
    pub message: String,
    pub fields: Map<String, Value>,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            fields: Map::new(),
        }
    }

    pub fn with_optional_field(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.fields
                .insert(key.to_string(), Value::String(value.to_string()));
        }
        self
    }
}
