//! Lenient readers for loosely typed codex values.
//!
//! CSV-ingested rows mix strings, numbers and arrays for the same column
//! depending on the export. Every reader accepts any JSON value and falls
//! back instead of failing.

use serde_json::Value;

/// Text form of a scalar. Null and containers become an empty string.
pub fn as_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Text or `None` when blank.
pub fn as_opt_text(value: Option<&Value>) -> Option<String> {
    Some(as_text(value)).filter(|s| !s.is_empty())
}

/// A list of strings. Comma-separated strings are split, arrays are passed
/// through element-wise, null gives an empty list.
pub fn as_text_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| as_text(Some(v)))
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Some(v @ Value::Number(_)) => vec![as_text(Some(v))],
        _ => Vec::new(),
    }
}

pub fn as_f64_or(value: Option<&Value>, default: f64) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        _ => default,
    }
}

/// Integer reading; fractional values are truncated.
pub fn as_i32_or(value: Option<&Value>, default: i32) -> i32 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .map(|i| i.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
            .or_else(|| n.as_f64().map(|f| f as i32))
            .unwrap_or(default),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i32>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i32))
                .unwrap_or(default)
        }
        Some(Value::Bool(b)) => i32::from(*b),
        _ => default,
    }
}

/// Truthiness: `true`, `yes`, `y` and `1` (any case), or a non-zero number.
pub fn as_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "y" | "1"
        ),
        _ => false,
    }
}
