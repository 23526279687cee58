//! Host event model.
//!
//! Events arrive as loosely-typed JSON with a `type` discriminator and a
//! `properties` object. Some event types the host emits are not part of its
//! advertised schema, so every event goes through a structural check here:
//! a shape that doesn't validate becomes [`Event::Unrecognized`] instead of
//! an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PERMISSION_ASKED: &str = "permission.asked";
pub const PERMISSION_REPLIED: &str = "permission.replied";
pub const SESSION_IDLE: &str = "session.idle";
pub const SESSION_ERROR: &str = "session.error";

/// Properties of a `permission.asked` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRequest {
    /// Correlation id, referenced by the matching reply.
    pub id: String,
    /// Permission category, usually a tool name (e.g. "bash").
    pub permission: String,
    /// Command patterns the user may choose to always allow.
    pub always: Vec<String>,
}

/// The user's answer to a permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyDecision {
    Always,
    Once,
    Reject,
}

/// Properties of a `permission.replied` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionReply {
    #[serde(rename = "requestID")]
    pub request_id: String,
    pub reply: ReplyDecision,
}

/// A host event after structural validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    PermissionAsked(PermissionRequest),
    PermissionReplied(PermissionReply),
    SessionIdle,
    SessionError,
    /// Any event whose type is unknown or whose properties failed validation.
    Unrecognized { event_type: Option<String> },
}

impl Event {
    /// Classify a raw host event.
    pub fn from_value(value: &Value) -> Self {
        let event_type = value.get("type").and_then(Value::as_str);
        let properties = value.get("properties");

        let parsed = match event_type {
            Some(PERMISSION_ASKED) => properties
                .and_then(|p| PermissionRequest::deserialize(p).ok())
                .map(Event::PermissionAsked),
            Some(PERMISSION_REPLIED) => properties
                .and_then(|p| PermissionReply::deserialize(p).ok())
                .map(Event::PermissionReplied),
            Some(SESSION_IDLE) => Some(Event::SessionIdle),
            Some(SESSION_ERROR) => Some(Event::SessionError),
            _ => None,
        };

        parsed.unwrap_or_else(|| Event::Unrecognized {
            event_type: event_type.map(str::to_string),
        })
    }

    /// The `type` discriminator, even for events that failed validation.
    pub fn event_type(&self) -> Option<&str> {
        match self {
            Event::PermissionAsked(_) => Some(PERMISSION_ASKED),
            Event::PermissionReplied(_) => Some(PERMISSION_REPLIED),
            Event::SessionIdle => Some(SESSION_IDLE),
            Event::SessionError => Some(SESSION_ERROR),
            Event::Unrecognized { event_type } => event_type.as_deref(),
        }
    }
}
