//! Unescape walk over decoded config records.
//!
//! Responsibilities:
//! - Replace every JSON-escaped string field of a decoded record with its
//!   literal content, recursing into nested records.
//!
//! Does NOT handle:
//! - The escaping itself (see `escape.rs`).
//! - Conversion into the caller's record type (see `loader.rs`).
//!
//! Invariants:
//! - Only string and record fields are supported; anything else is an
//!   unhandled-type error naming the field.
//! - Only a string that is a complete quoted literal is decoded; values
//!   already holding their literal content pass through unchanged.
//! - A failure inside a nested record propagates to the caller.

use serde_json::Value;

use crate::error::ConfigError;
use crate::escape::json_unescape;

/// Walk a decoded record and JSON-unescape its string fields in place.
///
/// `value` must be a JSON object; anything else fails with
/// [`ConfigError::NotARecord`]. Nested objects are walked recursively,
/// `null` fields (absent nullable records) are skipped.
pub fn unescape_record(value: &mut Value) -> Result<(), ConfigError> {
    let kind = value_kind(value);
    let Value::Object(fields) = value else {
        return Err(ConfigError::NotARecord { kind });
    };

    for (name, field) in fields.iter_mut() {
        match field {
            Value::String(s) => {
                *s = json_unescape(s);
            }
            Value::Object(_) => unescape_record(field)?,
            Value::Null => {}
            other => {
                return Err(ConfigError::UnhandledField {
                    field: name.clone(),
                    kind: value_kind(other),
                });
            }
        }
    }
    Ok(())
}

/// Human-readable kind of a JSON value, for error messages.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "record",
    }
}
