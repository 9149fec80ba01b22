//! Row and column alignment between the old and new table.
//!
//! Rows are keyed by the identifier column when it is present and unique on
//! both sides, otherwise by position. The choice is made once per run and
//! carried as a [`KeyScheme`]; every [`RowKey`] of one alignment uses the
//! same variant.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Serialize, Serializer};

use crate::model::Table;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowKey {
    /// Identifier cell rendered as a string.
    Identifier(String),
    /// Zero-based row position.
    Position(usize),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(id) => write!(f, "{id}"),
            Self::Position(p) => write!(f, "{p}"),
        }
    }
}

impl Serialize for RowKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum KeyScheme {
    Identifier { column: String },
    /// Rows `0..bound` are paired by position.
    Positional { bound: usize },
}

impl fmt::Display for KeyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier { column } => write!(f, "identifier '{column}'"),
            Self::Positional { bound } => write!(f, "row position (first {bound} rows)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Old,
    New,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Old => "old",
            Side::New => "new",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateKey {
    pub side: Side,
    pub key: String,
    pub count: usize,
}

/// Why positional keys were used instead of the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FallbackReason {
    NotConfigured,
    IdentifierMissing { column: String, missing_in: Vec<Side> },
    IdentifierDuplicated { column: String, duplicates: Vec<DuplicateKey> },
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => {
                write!(f, "no identifier column configured; using row position as reference")
            }
            Self::IdentifierMissing { column, missing_in } => {
                let sides: Vec<&str> = missing_in.iter().map(|s| s.as_str()).collect();
                write!(
                    f,
                    "identifier column '{column}' not found in {} table; using row position as reference",
                    sides.join(" and ")
                )
            }
            Self::IdentifierDuplicated { column, duplicates } => {
                write!(
                    f,
                    "identifier column '{column}' has {} duplicated value(s); using row position as reference",
                    duplicates.len()
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedRow {
    pub key: RowKey,
    pub label: String,
    pub old_index: usize,
    pub new_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedColumn {
    pub name: String,
    pub old_index: usize,
    pub new_index: usize,
}

/// Common row and column key space of one comparison run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentResult {
    scheme: KeyScheme,
    fallback: Option<FallbackReason>,
    rows: Vec<AlignedRow>,
    columns: Vec<AlignedColumn>,
    original_order: Vec<String>,
    old_rows: usize,
    new_rows: usize,
    old_only_columns: usize,
    new_only_columns: usize,
}

impl AlignmentResult {
    pub fn scheme(&self) -> &KeyScheme {
        &self.scheme
    }

    pub fn fallback(&self) -> Option<&FallbackReason> {
        self.fallback.as_ref()
    }

    pub fn fallback_engaged(&self) -> bool {
        matches!(self.scheme, KeyScheme::Positional { .. })
    }

    pub fn identifier_missing(&self) -> bool {
        matches!(self.fallback, Some(FallbackReason::IdentifierMissing { .. }))
    }

    pub fn identifier_duplicated(&self) -> bool {
        matches!(self.fallback, Some(FallbackReason::IdentifierDuplicated { .. }))
    }

    /// Common rows, in old-table order.
    pub fn rows(&self) -> &[AlignedRow] {
        &self.rows
    }

    /// Common columns, in new-table order.
    pub fn columns(&self) -> &[AlignedColumn] {
        &self.columns
    }

    /// Old table column names captured before alignment; drives categories.
    pub fn original_order(&self) -> &[String] {
        &self.original_order
    }

    /// Zero-based position of a column in the original order.
    pub fn position_of(&self, column: &str) -> Option<usize> {
        self.original_order.iter().position(|c| c == column)
    }

    pub fn rows_only_in_old(&self) -> usize {
        self.old_rows - self.rows.len()
    }

    pub fn rows_only_in_new(&self) -> usize {
        self.new_rows - self.rows.len()
    }

    pub fn columns_only_in_old(&self) -> usize {
        self.old_only_columns
    }

    pub fn columns_only_in_new(&self) -> usize {
        self.new_only_columns
    }
}

// ---------------------------------------------------------------------------
// Align
// ---------------------------------------------------------------------------

/// Build the common row/column key space of `old` and `new`.
pub fn align(old: &Table, new: &Table, identifier: Option<&str>) -> AlignmentResult {
    let (scheme, fallback) = choose_scheme(old, new, identifier);

    if let Some(ref reason) = fallback {
        log::warn!("{reason}");
    }

    let key_column = match &scheme {
        KeyScheme::Identifier { column } => Some(column.as_str()),
        KeyScheme::Positional { .. } => None,
    };

    let columns = align_columns(old, new, key_column);
    let rows = match &scheme {
        KeyScheme::Identifier { column } => align_by_identifier(old, new, column),
        KeyScheme::Positional { bound } => align_by_position(new, identifier, *bound),
    };

    let key_offset = usize::from(key_column.is_some());
    let old_only_columns = old
        .column_count()
        .saturating_sub(key_offset + columns.len());
    let new_only_columns = new
        .column_count()
        .saturating_sub(key_offset + columns.len());

    log::debug!(
        "aligned by {scheme}: {} common rows, {} common columns",
        rows.len(),
        columns.len()
    );

    AlignmentResult {
        scheme,
        fallback,
        rows,
        columns,
        original_order: old.columns().to_vec(),
        old_rows: old.row_count(),
        new_rows: new.row_count(),
        old_only_columns,
        new_only_columns,
    }
}

fn choose_scheme(
    old: &Table,
    new: &Table,
    identifier: Option<&str>,
) -> (KeyScheme, Option<FallbackReason>) {
    let bound = old.row_count().min(new.row_count());
    let positional = KeyScheme::Positional { bound };

    let Some(column) = identifier else {
        return (positional, Some(FallbackReason::NotConfigured));
    };

    let old_idx = old.column_index(column);
    let new_idx = new.column_index(column);

    let (old_idx, new_idx) = match (old_idx, new_idx) {
        (Some(o), Some(n)) => (o, n),
        _ => {
            let mut missing_in = Vec::new();
            if old_idx.is_none() {
                missing_in.push(Side::Old);
            }
            if new_idx.is_none() {
                missing_in.push(Side::New);
            }
            let reason = FallbackReason::IdentifierMissing {
                column: column.to_string(),
                missing_in,
            };
            return (positional, Some(reason));
        }
    };

    let mut duplicates = Vec::new();
    check_duplicates(old, old_idx, Side::Old, &mut duplicates);
    check_duplicates(new, new_idx, Side::New, &mut duplicates);
    if !duplicates.is_empty() {
        let reason = FallbackReason::IdentifierDuplicated {
            column: column.to_string(),
            duplicates,
        };
        return (positional, Some(reason));
    }

    (
        KeyScheme::Identifier {
            column: column.to_string(),
        },
        None,
    )
}

fn check_duplicates(table: &Table, col: usize, side: Side, out: &mut Vec<DuplicateKey>) {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in table.column_values(col) {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    for (key, count) in counts {
        if count > 1 {
            out.push(DuplicateKey { side, key, count });
        }
    }
}

/// Columns present in both tables, in new-table order. The key column is
/// the row index in identifier mode, not a compared column.
fn align_columns(old: &Table, new: &Table, key_column: Option<&str>) -> Vec<AlignedColumn> {
    let mut seen = HashSet::new();
    new.columns()
        .iter()
        .enumerate()
        .filter(|(_, name)| Some(name.as_str()) != key_column)
        .filter(|(_, name)| seen.insert(name.as_str()))
        .filter_map(|(new_index, name)| {
            old.column_index(name).map(|old_index| AlignedColumn {
                name: name.clone(),
                old_index,
                new_index,
            })
        })
        .collect()
}

fn align_by_identifier(old: &Table, new: &Table, column: &str) -> Vec<AlignedRow> {
    let (Some(old_col), Some(new_col)) = (old.column_index(column), new.column_index(column))
    else {
        return Vec::new();
    };

    let new_index: HashMap<String, usize> = new
        .column_values(new_col)
        .enumerate()
        .map(|(i, v)| (v.to_string(), i))
        .collect();

    old.column_values(old_col)
        .enumerate()
        .filter_map(|(old_index, value)| {
            let id = value.to_string();
            new_index.get(&id).map(|&new_index| AlignedRow {
                key: RowKey::Identifier(id.clone()),
                label: id,
                old_index,
                new_index,
            })
        })
        .collect()
}

/// Pair rows `0..bound`. The label comes from the new table's identifier
/// column when it has one, so duplicated identifiers still read naturally.
fn align_by_position(new: &Table, identifier: Option<&str>, bound: usize) -> Vec<AlignedRow> {
    let label_col = identifier.and_then(|c| new.column_index(c));
    (0..bound)
        .map(|i| {
            let label = label_col
                .map(|c| new.cell(i, c).to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| i.to_string());
            AlignedRow {
                key: RowKey::Position(i),
                label,
                old_index: i,
                new_index: i,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use pretty_assertions::assert_eq;

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::with_rows(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| Value::text(*v)).collect())
                .collect(),
        )
    }

    #[test]
    fn identifier_keys_when_unique() {
        let old = table(&["rotas", "peso"], &[&["R1", "1"], &["R2", "2"], &["R3", "3"]]);
        let new = table(&["rotas", "peso"], &[&["R2", "2"], &["R1", "1"], &["R4", "4"]]);
        let a = align(&old, &new, Some("rotas"));

        assert_eq!(
            a.scheme(),
            &KeyScheme::Identifier {
                column: "rotas".into()
            }
        );
        assert!(a.fallback().is_none());
        assert!(!a.fallback_engaged());
        // Old-table order; R3 and R4 dropped.
        let keys: Vec<String> = a.rows().iter().map(|r| r.key.to_string()).collect();
        assert_eq!(keys, vec!["R1", "R2"]);
        assert_eq!(a.rows()[0].new_index, 1);
        assert_eq!(a.rows()[1].new_index, 0);
        assert_eq!(a.rows_only_in_old(), 1);
        assert_eq!(a.rows_only_in_new(), 1);
        // Identifier is the key, not a compared column.
        let cols: Vec<&str> = a.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(cols, vec!["peso"]);
    }

    #[test]
    fn duplicate_identifier_falls_back_to_position() {
        let old = table(&["rotas", "peso"], &[&["R1", "1"], &["R1", "2"], &["R2", "3"]]);
        let new = table(&["rotas", "peso"], &[&["R1", "1"], &["R2", "2"]]);
        let a = align(&old, &new, Some("rotas"));

        assert!(a.identifier_duplicated());
        assert!(a.fallback_engaged());
        assert_eq!(a.scheme(), &KeyScheme::Positional { bound: 2 });
        assert_eq!(
            a.fallback(),
            Some(&FallbackReason::IdentifierDuplicated {
                column: "rotas".into(),
                duplicates: vec![DuplicateKey {
                    side: Side::Old,
                    key: "R1".into(),
                    count: 2
                }],
            })
        );
        assert_eq!(a.rows().len(), 2);
        assert!(a.rows().iter().all(|r| matches!(r.key, RowKey::Position(_))));
        // Labels come from the new table's identifier column.
        assert_eq!(a.rows()[1].label, "R2");
        // The identifier is compared like any other column in this mode.
        assert_eq!(a.columns().len(), 2);
    }

    #[test]
    fn missing_identifier_falls_back() {
        let old = table(&["peso"], &[&["1"], &["2"], &["3"]]);
        let new = table(&["rotas", "peso"], &[&["R1", "1"]]);
        let a = align(&old, &new, Some("rotas"));

        assert!(a.identifier_missing());
        assert_eq!(
            a.fallback(),
            Some(&FallbackReason::IdentifierMissing {
                column: "rotas".into(),
                missing_in: vec![Side::Old],
            })
        );
        assert_eq!(a.scheme(), &KeyScheme::Positional { bound: 1 });
        assert_eq!(a.rows()[0].label, "R1");
        assert_eq!(a.rows_only_in_old(), 2);
    }

    #[test]
    fn no_identifier_uses_position_labels() {
        let old = table(&["a"], &[&["1"], &["2"]]);
        let new = table(&["a"], &[&["1"], &["2"]]);
        let a = align(&old, &new, None);
        assert_eq!(a.fallback(), Some(&FallbackReason::NotConfigured));
        assert_eq!(a.rows()[1].label, "1");
        assert!(!a.identifier_missing());
    }

    #[test]
    fn columns_follow_new_order_positions_follow_old() {
        let old = table(&["id", "a", "b", "only_old"], &[&["1", "x", "y", "z"]]);
        let new = table(&["id", "only_new", "b", "a"], &[&["1", "n", "y", "x"]]);
        let a = align(&old, &new, Some("id"));

        let cols: Vec<(&str, usize, usize)> = a
            .columns()
            .iter()
            .map(|c| (c.name.as_str(), c.old_index, c.new_index))
            .collect();
        assert_eq!(cols, vec![("b", 2, 2), ("a", 1, 3)]);
        assert_eq!(a.position_of("b"), Some(2));
        assert_eq!(a.original_order(), &["id", "a", "b", "only_old"]);
        assert_eq!(a.columns_only_in_old(), 1);
        assert_eq!(a.columns_only_in_new(), 1);
    }

    #[test]
    fn numeric_identifiers_render_consistently() {
        let old = Table::with_rows(
            vec!["id".into(), "v".into()],
            vec![vec![Value::Integer(7), Value::text("a")]],
        );
        let new = Table::with_rows(
            vec!["id".into(), "v".into()],
            vec![vec![Value::Integer(7), Value::text("b")]],
        );
        let a = align(&old, &new, Some("id"));
        assert_eq!(a.rows()[0].key, RowKey::Identifier("7".into()));
    }

    #[test]
    fn row_key_serializes_as_string() {
        assert_eq!(serde_json::to_string(&RowKey::Position(3)).unwrap(), "\"3\"");
        assert_eq!(
            serde_json::to_string(&RowKey::Identifier("R1".into())).unwrap(),
            "\"R1\""
        );
    }
}
