//! JSON message types for the browser-facing command protocol.
//!
//! Every inbound command is a JSON object with two envelope fields — a
//! client-assigned `"id"` and a `"type"` string that selects the command —
//! plus any command-specific fields.  For example:
//!
//! ```json
//! {"id":5,"type":"family_board/config/set","config":{"theme":"dark"}}
//! ```
//!
//! The reply to every command is a result envelope echoing the request id:
//!
//! ```json
//! {"id":5,"type":"result","success":true,"result":{"ok":true}}
//! {"id":5,"type":"result","success":false,
//!  "error":{"code":"invalid_format","message":"..."}}
//! ```
//!
//! # Why an open envelope instead of one big tagged enum?
//!
//! Commands are registered with the router at setup time by type string, so
//! the envelope cannot enumerate every command up front.  [`CommandRequest`]
//! therefore keeps the command-specific fields as a raw JSON map; each
//! registered handler validates and interprets the fields it cares about.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Request envelope ──────────────────────────────────────────────────────────

/// A single inbound command, decoded from a WebSocket text frame.
///
/// The envelope fields (`id`, `type`) are required; everything else lands in
/// [`CommandRequest::fields`] untouched for the handler to inspect.
///
/// # Serde representation
///
/// `#[serde(flatten)]` collects all JSON fields other than `id` and `type`
/// into the `fields` map, so `{"id":1,"type":"x","config":{}}` decodes with
/// `fields == {"config": {}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    /// Client-assigned request identifier, echoed back in the response so the
    /// client can match replies to in-flight commands.
    pub id: u64,

    /// Command type string, e.g. `"family_board/config/get"`.
    #[serde(rename = "type")]
    pub msg_type: String,

    /// All command-specific fields, preserved as raw JSON.
    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

impl CommandRequest {
    /// Returns the named command-specific field, or `None` when absent.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

// ── Response envelope ─────────────────────────────────────────────────────────

/// The `"type"` discriminant of an outbound frame.
///
/// Today the service only sends result envelopes; the enum keeps the wire
/// field honest (always the literal string `"result"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Reply to a command, successful or not.
    Result,
}

/// Machine-readable error codes carried in failure responses.
///
/// Clients branch on the code; the accompanying message is for logs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// No handler is registered for the request's `type` string.
    UnknownCommand,
    /// The request failed the command's schema validation (or was not a
    /// well-formed command envelope at all).
    InvalidFormat,
    /// The handler itself failed, e.g. a storage I/O error.
    UnknownError,
}

/// The `error` object inside a failure response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Machine-readable error class.
    pub code: ErrorCode,
    /// Human-readable description (for logging; not meant for end users).
    pub message: String,
}

/// Reply sent for every dispatched command.
///
/// Exactly one of `result` / `error` is populated, matching `success`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    /// Echo of the request id.  `0` when the request was too malformed to
    /// carry an id at all.
    pub id: u64,

    /// Always [`ResponseType::Result`]; serialized as `"type":"result"`.
    #[serde(rename = "type")]
    pub response_type: ResponseType,

    /// `true` when the handler ran and returned a result.
    pub success: bool,

    /// Handler result payload, present on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error payload, present on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

impl CommandResponse {
    /// Builds a success envelope carrying `result`.
    pub fn ok(id: u64, result: Value) -> Self {
        Self {
            id,
            response_type: ResponseType::Result,
            success: true,
            result: Some(result),
            error: None,
        }
    }

    /// Builds a failure envelope carrying `code` and `message`.
    pub fn err(id: u64, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            id,
            response_type: ResponseType::Result,
            success: false,
            result: None,
            error: Some(ErrorPayload {
                code,
                message: message.into(),
            }),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
