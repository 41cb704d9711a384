//! Loose coercion of JSON values.
//!
//! The planning webhook has sent numbers as strings and booleans as strings
//! or 0/1 across versions. Every helper returns `None` when no coercion
//! applies; call sites pick their own default.

use serde_json::Value;

pub fn as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Integers accept whole numbers, floats (truncated toward zero) and numeric strings.
pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_u64().and_then(|v| i64::try_from(v).ok()))
            .or_else(|| number.as_f64().and_then(truncate)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(truncate))
        }
        _ => None,
    }
}

/// Non-negative integer that fits in a `u32`; negatives are absent.
pub fn as_u32(value: &Value) -> Option<u32> {
    as_i64(value).and_then(|v| u32::try_from(v).ok())
}

pub fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub fn as_str(value: &Value) -> Option<&str> {
    value.as_str()
}

/// A list of strings; non-string members are skipped.
pub fn as_string_list(value: &Value) -> Option<Vec<String>> {
    value.as_array().map(|items| {
        items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect()
    })
}

fn truncate(value: f64) -> Option<i64> {
    if !value.is_finite() || value >= i64::MAX as f64 || value <= i64::MIN as f64 {
        return None;
    }
    Some(value.trunc() as i64)
}
