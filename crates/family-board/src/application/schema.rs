//! Field-level schema checks for inbound commands.
//!
//! The router runs a command's schema validation *before* invoking its
//! handler, so handler bodies only ever see requests whose fields have the
//! right shape.  This mirrors how the rest of the protocol separates decode
//! errors (`invalid_format`) from handler failures (`unknown_error`).
//!
//! The helpers here are deliberately small: they check presence and JSON type
//! only.  They never interpret field contents — the configuration record is
//! opaque to this service.

use serde_json::Value;
use thiserror::Error;

use crate::domain::CommandRequest;

/// Errors produced by schema validation.
///
/// These are business-logic failures (a malformed request from the client),
/// not I/O errors.  The router maps them to `invalid_format` responses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A required field was absent from the request.
    #[error("required field '{0}' is missing")]
    MissingField(&'static str),

    /// A field was present but had the wrong JSON type.
    #[error("field '{field}' must be {expected}, got {got}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        got: &'static str,
    },
}

/// Returns the JSON type name of `value` for use in error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Checks that `field`, when present, is a JSON object or `null`.
///
/// Absence and `null` both pass: the write path coalesces them to the empty
/// mapping.  A string, number, boolean, or array fails so the handler is
/// never invoked with a non-mapping configuration.
pub fn mapping_or_absent(request: &CommandRequest, field: &'static str) -> Result<(), SchemaError> {
    match request.field(field) {
        None | Some(Value::Null) | Some(Value::Object(_)) => Ok(()),
        Some(other) => Err(SchemaError::WrongType {
            field,
            expected: "an object",
            got: json_type_name(other),
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
