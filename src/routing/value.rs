//! Dynamically typed scalars decoded from query strings and path segments.
//!
//! Raw text is interpreted by a literal-parse rule: integers, floats, booleans,
//! null and quoted strings are recognised; anything else stays a plain string.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag of a [`ScalarValue`], used by handlers to declare expected query types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Integer,
    Float,
    Boolean,
    String,
    Null,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Boolean => "boolean",
            ValueKind::String => "string",
            ValueKind::Null => "null",
        };
        f.write_str(name)
    }
}

/// A decoded scalar value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Null,
}

impl ScalarValue {
    /// Decode raw text using the literal-parse rule, falling back to the raw string.
    pub fn parse_literal(raw: &str) -> Self {
        if let Some(value) = parse_integer(raw) {
            return ScalarValue::Integer(value);
        }
        if let Some(value) = parse_float(raw) {
            return ScalarValue::Float(value);
        }
        match raw {
            "true" | "True" => return ScalarValue::Boolean(true),
            "false" | "False" => return ScalarValue::Boolean(false),
            "null" | "None" => return ScalarValue::Null,
            _ => {}
        }
        if let Some(inner) = unquote(raw) {
            return ScalarValue::String(inner.to_string());
        }
        ScalarValue::String(raw.to_string())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            ScalarValue::Integer(_) => ValueKind::Integer,
            ScalarValue::Float(_) => ValueKind::Float,
            ScalarValue::Boolean(_) => ValueKind::Boolean,
            ScalarValue::String(_) => ValueKind::String,
            ScalarValue::Null => ValueKind::Null,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Integer(v) => write!(f, "{}", v),
            ScalarValue::Float(v) => write!(f, "{}", v),
            ScalarValue::Boolean(v) => write!(f, "{}", v),
            ScalarValue::String(v) => f.write_str(v),
            ScalarValue::Null => f.write_str("null"),
        }
    }
}

fn parse_integer(raw: &str) -> Option<i64> {
    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

// `f64::from_str` also accepts "inf" and "NaN"; only numeric notation counts here.
fn parse_float(raw: &str) -> Option<f64> {
    let has_digit = raw.bytes().any(|b| b.is_ascii_digit());
    let numeric_only = raw
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !has_digit || !numeric_only {
        return None;
    }
    raw.parse().ok()
}

fn unquote(raw: &str) -> Option<&str> {
    if raw.len() < 2 {
        return None;
    }
    ['\'', '"'].into_iter().find_map(|quote| {
        raw.strip_prefix(quote).and_then(|rest| rest.strip_suffix(quote))
    })
}
