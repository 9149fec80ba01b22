//! Cell normalization and the tolerant equality rule.
//!
//! Both sides of a cell pair are normalized before comparison, so `" 10 "`,
//! `10` and `10.0` are all the same number, and `"abc "` equals `"abc"`.

use crate::config::ToleranceConfig;
use crate::model::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedValue {
    Empty,
    Number(f64),
    Text(String),
}

/// Coerce a raw cell into Empty / Number / Text.
pub fn normalize(value: &Value) -> NormalizedValue {
    if value.is_empty() {
        return NormalizedValue::Empty;
    }
    match value {
        Value::Number(n) => NormalizedValue::Number(*n),
        Value::Integer(n) => NormalizedValue::Number(*n as f64),
        Value::Bool(b) => NormalizedValue::Number(if *b { 1.0 } else { 0.0 }),
        Value::Text(s) => match parse_number(s) {
            Some(n) if n.is_nan() => NormalizedValue::Empty,
            Some(n) => NormalizedValue::Number(n),
            None => NormalizedValue::Text(s.trim().to_string()),
        },
        Value::Empty => NormalizedValue::Empty,
    }
}

/// Parse a float from text, ignoring surrounding whitespace.
///
/// Accepts what `f64::from_str` accepts (`1e3`, `-0.5`, `+2`, `inf`).
/// Thousands separators and currency symbols are text, not numbers.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// `a` is the old value, `b` the new one; the relative term scales with `b`.
pub fn is_close(a: f64, b: f64, tolerance: &ToleranceConfig) -> bool {
    if a == b {
        return true;
    }
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    (a - b).abs() <= tolerance.atol + tolerance.rtol * b.abs()
}

pub fn values_equal(
    old: &NormalizedValue,
    new: &NormalizedValue,
    tolerance: &ToleranceConfig,
) -> bool {
    match (old, new) {
        (NormalizedValue::Empty, NormalizedValue::Empty) => true,
        (NormalizedValue::Number(a), NormalizedValue::Number(b)) => is_close(*a, *b, tolerance),
        (NormalizedValue::Text(a), NormalizedValue::Text(b)) => a == b,
        _ => false,
    }
}

/// True when the pair is a reportable change.
pub fn cells_differ(old: &Value, new: &Value, tolerance: &ToleranceConfig) -> bool {
    !values_equal(&normalize(old), &normalize(new), tolerance)
}

/// Raw value as shown in change markers, or `empty_label` for null cells.
pub fn display_value(value: &Value, empty_label: &str) -> String {
    match value {
        Value::Empty => empty_label.to_string(),
        Value::Number(n) if n.is_nan() => empty_label.to_string(),
        other => other.to_string(),
    }
}
