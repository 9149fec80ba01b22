//! Column-level typing of loaded cells.
//!
//! A column is typed as a whole, the way spreadsheet exports usually are:
//! all-integer columns stay integers, integers mixed with floats or gaps
//! become floats, and any free text turns the whole column back into text.

use std::collections::{HashMap, HashSet};

use cubadiff_compare::Value;

/// Cell strings that load as an empty cell.
pub const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_na_token(s: &str) -> bool {
    NA_TOKENS.contains(&s)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Integer,
    Number,
    Bool,
    Text,
}

/// Type one column of raw text fields.
///
/// NA tokens become `Value::Empty` whatever the column type.
pub fn type_text_column(fields: Vec<String>) -> Vec<Value> {
    let mut kind: Option<ColumnKind> = None;
    let mut has_gap = false;

    for field in &fields {
        if is_na_token(field) {
            has_gap = true;
            continue;
        }
        let t = field.trim();
        let this = if t.parse::<i64>().is_ok() {
            ColumnKind::Integer
        } else if t.parse::<f64>().is_ok() {
            ColumnKind::Number
        } else if parse_bool(t).is_some() {
            ColumnKind::Bool
        } else {
            ColumnKind::Text
        };
        kind = Some(match (kind, this) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(ColumnKind::Integer), ColumnKind::Number)
            | (Some(ColumnKind::Number), ColumnKind::Integer) => ColumnKind::Number,
            _ => ColumnKind::Text,
        });
        if kind == Some(ColumnKind::Text) {
            break;
        }
    }

    // Booleans with gaps stay as text; integers with gaps widen to floats.
    let kind = match kind {
        Some(ColumnKind::Integer) if has_gap => ColumnKind::Number,
        Some(ColumnKind::Bool) if has_gap => ColumnKind::Text,
        Some(k) => k,
        None => ColumnKind::Text,
    };

    fields
        .into_iter()
        .map(|field| {
            if is_na_token(&field) {
                return Value::Empty;
            }
            let t = field.trim();
            match kind {
                ColumnKind::Integer => t.parse().map(Value::Integer).unwrap_or(Value::Text(field)),
                ColumnKind::Number => t.parse().map(Value::Number).unwrap_or(Value::Text(field)),
                ColumnKind::Bool => parse_bool(t).map(Value::Bool).unwrap_or(Value::Text(field)),
                ColumnKind::Text => Value::Text(field),
            }
        })
        .collect()
}

/// Widen a column of already-typed cells (workbook input): whole floats are
/// integers unless the column also holds fractions or gaps.
pub fn unify_numeric_column(cells: &mut [Value]) {
    let mut has_gap = false;
    let mut has_fraction = false;
    let mut has_other = false;

    for cell in cells.iter() {
        match cell {
            Value::Empty => has_gap = true,
            Value::Number(n) if n.fract() != 0.0 || !n.is_finite() => has_fraction = true,
            Value::Number(_) | Value::Integer(_) => {}
            Value::Bool(_) | Value::Text(_) => has_other = true,
        }
    }
    if has_other {
        return;
    }

    let as_float = has_gap || has_fraction;
    for cell in cells.iter_mut() {
        *cell = match std::mem::take(cell) {
            Value::Number(n) if !as_float && n.abs() < 9.0e15 => Value::Integer(n as i64),
            Value::Integer(n) if as_float => Value::Number(n as f64),
            other => other,
        };
    }
}

/// Header names with blanks filled in and duplicates suffixed `.1`, `.2`, ...
pub fn mangle_headers(raw: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut suffixes: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(raw.len());
    let mut renamed = 0usize;

    for (i, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            name
        };
        if used.insert(base.clone()) {
            out.push(base);
            continue;
        }
        renamed += 1;
        let n = suffixes.entry(base.clone()).or_insert(0);
        loop {
            *n += 1;
            let candidate = format!("{base}.{n}");
            if used.insert(candidate.clone()) {
                out.push(candidate);
                break;
            }
        }
    }

    if renamed > 0 {
        log::debug!("renamed {renamed} duplicated header(s): {out:?}");
    }
    out
}
