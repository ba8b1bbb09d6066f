//! XML escaping and parameter type inference.
//!
//! The emulation format round-trips tool parameters through XML text nodes,
//! so the five XML special characters must survive escape/unescape, and
//! scalar-looking values are restored to JSON scalars on the way out.

use serde_json::Value;

/// Escape the XML special characters `& < > " '`.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Reverse [`escape_xml`]. `&amp;` is decoded last so that a literal
/// `&amp;lt;` becomes `&lt;`, not `<`.
pub fn unescape_xml(s: &str) -> String {
    s.replace("&apos;", "'")
        .replace("&quot;", "\"")
        .replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&amp;", "&")
}

/// Infer a JSON value from a raw XML parameter string.
///
/// Exactly `true`/`false` become booleans; values containing `.` that parse
/// as f64 become floats; values parsing as i64 become integers; everything
/// else stays a string. Dotted non-numbers like `1.2.3` stay strings.
pub fn infer_type(value: &str) -> Value {
    if value == "true" || value == "false" {
        return Value::Bool(value == "true");
    }
    if value.contains('.') {
        if let Ok(f) = value.parse::<f64>() {
            if let Some(n) = serde_json::Number::from_f64(f) {
                return Value::Number(n);
            }
        }
        return Value::String(value.to_string());
    }
    if let Ok(i) = value.parse::<i64>() {
        return Value::Number(i.into());
    }
    Value::String(value.to_string())
}
