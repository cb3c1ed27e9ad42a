//! JSON string escaping helpers for the expansion pipeline.
//!
//! Responsibilities:
//! - Escape arbitrary text so it can be embedded inside a JSON string
//!   literal (used on shell output at substitution time).
//! - Unwrap decoded string fields that still carry a complete quoted
//!   literal.
//!
//! Does NOT handle:
//! - Token scanning (see `expand.rs`).
//! - Walking decoded records (see `walk.rs`).
//!
//! Invariants:
//! - Escaped output embedded in a JSON string literal decodes back to the
//!   original text when the document is parsed.
//! - `json_unescape` only decodes a complete quoted literal; everything
//!   else is returned unchanged. Decoded field values that already hold
//!   their literal content must never be unescaped a second time.
//! - `json_unescape` never fails.

/// Escape `src` for embedding inside a JSON string literal.
///
/// Escapes quotes, backslashes, the forward slash (allowed but not required
/// to be escaped; escaped for consistency), the named control characters,
/// and every other character below 0x20 as `\uXXXX`.
pub fn json_escape(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    for c in src.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '/' => out.push_str("\\/"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

/// Decode `src` if it is a complete JSON string literal, quotes included.
///
/// Anything else is returned unchanged. Decoded field values already hold
/// their literal content (the JSON parser resolved escape sequences when
/// the document was read), so re-interpreting their backslashes here would
/// corrupt them; only a value that still carries its surrounding quotes is
/// an encoded literal left to unwrap.
pub fn json_unescape(src: &str) -> String {
    match serde_json::from_str::<String>(src) {
        Ok(decoded) => decoded,
        Err(_) => src.to_string(),
    }
}
