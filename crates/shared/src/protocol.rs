use serde::{Deserialize, Serialize};

use crate::domain::ItemId;

/// `{message}` body used by both endpoints on their failure paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: String,
}

/// Order endpoint reply. Only `message` is always present; the rest is
/// informational and does not decide success, the HTTP status does.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<ItemId>,
    #[serde(
        default,
        rename = "itemAvailable",
        skip_serializing_if = "Option::is_none"
    )]
    pub item_available: Option<bool>,
    #[serde(
        default,
        rename = "availableStock",
        skip_serializing_if = "Option::is_none"
    )]
    pub available_stock: Option<u64>,
}

/// What a failure body has to say for itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    /// `{"message": "..."}` or a bare JSON string.
    Message(String),
    /// Valid JSON without a usable message.
    Unlabelled,
    NotJson,
}

/// Classifies an error body.
///
/// Accepts `{"message": "..."}` as well as a bare JSON string, which the
/// inventory handler emits for some of its failures.
pub fn classify_error_body(body: &str) -> ErrorBody {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return ErrorBody::NotJson;
    };
    let message = match &value {
        serde_json::Value::String(text) => Some(text.as_str()),
        serde_json::Value::Object(fields) => fields.get("message").and_then(|m| m.as_str()),
        _ => None,
    };
    match message {
        Some(text) if !text.is_empty() => ErrorBody::Message(text.to_string()),
        _ => ErrorBody::Unlabelled,
    }
}

pub fn error_message_from_body(body: &str) -> Option<String> {
    match classify_error_body(body) {
        ErrorBody::Message(text) => Some(text),
        ErrorBody::Unlabelled | ErrorBody::NotJson => None,
    }
}
