//! Literal Encoder for the session store.
//!
//! Turns a [`LiteralValue`] into canonical literal text. Tokens are joined by a
//! single space, so `{"a": [1]}` encodes as `{ "a" : [ 1 ] }`. The finished text
//! is scanned once more: with quoted strings removed, only data syntax may remain.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::errors::SessionStoreError;
use crate::types::literal::LiteralValue;

/// Quoted string bodies, removed before the structural scan.
const QUOTED_STRING_PATTERN: &str = r#""(\\.|[^"\\])*""#;
/// Any character that is not part of literal data syntax.
const DISALLOWED_CHAR_PATTERN: &str = r"[^,:{}\[\]0-9.\-+Eaeflnr-u \n\r\t]";

static INTEGRITY_PATTERNS: OnceLock<Result<(Regex, Regex), regex::Error>> = OnceLock::new();

/// Encodes `value` as literal text.
///
/// # Errors
/// `UnencodableValue` for non-finite numbers, `EncodingIntegrityFailure` when the
/// structural scan rejects the result.
pub fn encode(value: &LiteralValue) -> Result<String, SessionStoreError> {
    let mut parts: Vec<String> = Vec::new();
    push_value(value, &mut parts)?;
    let text = parts.join(" ");
    check_integrity(&text)?;
    Ok(text)
}

fn push_value(value: &LiteralValue, parts: &mut Vec<String>) -> Result<(), SessionStoreError> {
    match value {
        LiteralValue::Bool(b) => parts.push(if *b { "true" } else { "false" }.to_string()),
        LiteralValue::Number(n) => parts.push(format_number(*n)?),
        LiteralValue::Text(s) => parts.push(quote(s)),
        LiteralValue::Null => parts.push("null".to_string()),
        LiteralValue::List(items) => {
            parts.push("[".to_string());
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    parts.push(",".to_string());
                }
                push_value(item, parts)?;
            }
            parts.push("]".to_string());
        }
        LiteralValue::Map(entries) => {
            parts.push("{".to_string());
            for (i, (key, item)) in entries.iter().enumerate() {
                if i > 0 {
                    parts.push(",".to_string());
                }
                parts.push(quote(key));
                parts.push(":".to_string());
                push_value(item, parts)?;
            }
            parts.push("}".to_string());
        }
    }
    Ok(())
}

/// Formats a finite number the way a script engine prints it: plain decimal
/// between 1e-6 and 1e21, exponent form (`1e+21`, `1.5e-7`) outside.
pub fn format_number(n: f64) -> Result<String, SessionStoreError> {
    if !n.is_finite() {
        return Err(SessionStoreError::UnencodableValue(format!(
            "no literal representation for {}",
            n
        )));
    }
    if n == 0.0 {
        // Also covers negative zero.
        return Ok("0".to_string());
    }

    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return Ok(format!("{}", n));
    }

    let scientific = format!("{:e}", n);
    Ok(match scientific.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => scientific,
    })
}

/// Quotes and escapes text.
///
/// Backspace, tab, newline, form feed, carriage return, quote and backslash
/// use their short escapes. Other control characters and everything above
/// Basic Latin become `\u` escapes of their UTF-16 units.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if u32::from(c) < 0x20 || u32::from(c) >= 0x80 => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04x}", unit));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Rejects text that, once its quoted strings are removed, still holds any
/// character outside literal data syntax.
pub fn check_integrity(text: &str) -> Result<(), SessionStoreError> {
    let (quoted, disallowed) = INTEGRITY_PATTERNS
        .get_or_init(|| Ok((Regex::new(QUOTED_STRING_PATTERN)?, Regex::new(DISALLOWED_CHAR_PATTERN)?)))
        .as_ref()
        .map_err(|e| SessionStoreError::EncodingIntegrityFailure(e.to_string()))?;

    let structure = quoted.replace_all(text, "");
    match disallowed.find(&structure) {
        Some(found) => Err(SessionStoreError::EncodingIntegrityFailure(format!(
            "unexpected {:?} at offset {} of the unquoted structure",
            found.as_str(),
            found.start()
        ))),
        None => Ok(()),
    }
}
