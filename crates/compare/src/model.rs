use std::fmt;

use serde::Serialize;

use crate::align::{AlignmentResult, FallbackReason, KeyScheme, RowKey};

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// A raw cell as produced by a spreadsheet loader.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Empty,
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Null, blank string, or a NaN float.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            Self::Number(n) => n.is_nan(),
            Self::Bool(_) | Self::Integer(_) => false,
        }
    }
}

/// String form of a cell, the way it appears in a change marker.
///
/// Whole floats keep one decimal (`20.0`), so a float column stays
/// distinguishable from an integer one. Magnitudes below `1e-4` or from
/// `1e16` up switch to exponent form (`1e-07`, `1.5e+16`).
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Number(n) => {
                if n.is_nan() {
                    write!(f, "nan")
                } else if n.is_infinite() {
                    write!(f, "{}", if *n > 0.0 { "inf" } else { "-inf" })
                } else if *n != 0.0 && (n.abs() < 1e-4 || n.abs() >= 1e16) {
                    write_exponent(f, *n)
                } else if n.fract() == 0.0 {
                    write!(f, "{n:.1}")
                } else {
                    write!(f, "{n}")
                }
            }
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Shortest round-trip mantissa, signed exponent of at least two digits.
fn write_exponent(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    let formatted = format!("{n:e}");
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    write!(f, "{mantissa}e{sign}{:02}", exponent.unsigned_abs())
}

static EMPTY_CELL: Value = Value::Empty;

/// An ordered set of named columns and rows of cells.
///
/// Every row holds exactly `columns().len()` cells; short rows are padded
/// with `Value::Empty` and long rows truncated on insertion.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Empty);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// First column with this exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    /// Cell at (row, col); out-of-range coordinates read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &Value {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Overwrite a cell. Returns false when (row, col) is out of range.
    pub fn set(&mut self, row: usize, col: usize, value: Value) -> bool {
        match self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn column_values(&self, col: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |r| r.get(col).unwrap_or(&EMPTY_CELL))
    }

    /// A table with the same columns holding only the given row.
    pub fn slice_row(&self, index: usize) -> Option<Table> {
        let row = self.rows.get(index)?;
        Some(Table {
            columns: self.columns.clone(),
            rows: vec![row.clone()],
        })
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Business classification of a changed column, derived from its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    General,
    BranchChange,
    TransportChange,
    ReturnFreightChange,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::General => write!(f, "general"),
            Self::BranchChange => write!(f, "branch_change"),
            Self::TransportChange => write!(f, "transport_change"),
            Self::ReturnFreightChange => write!(f, "return_freight_change"),
        }
    }
}

// ---------------------------------------------------------------------------
// Change log
// ---------------------------------------------------------------------------

/// One reported changed cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRecord {
    pub row_key: RowKey,
    pub row_label: String,
    pub column: String,
    /// Zero-based position of the column in the old table.
    pub position: usize,
    pub old_value: String,
    pub new_value: String,
    pub category: Category,
}

/// All reported changes of one row, joined into a single description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowGroup {
    pub row_key: RowKey,
    pub row_label: String,
    pub change_count: usize,
    pub description: String,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareSummary {
    pub key_scheme: KeyScheme,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackReason>,
    pub rows_compared: usize,
    pub columns_compared: usize,
    pub rows_only_in_old: usize,
    pub rows_only_in_new: usize,
    pub columns_only_in_old: usize,
    pub columns_only_in_new: usize,
    /// Every unequal cell, suppressed positions included.
    pub total_changes: usize,
    pub recorded_changes: usize,
    pub suppressed_changes: usize,
    /// Rows with any unequal cell, suppressed changes included.
    pub rows_with_changes: usize,
    /// Rows with at least one recorded change (one group each).
    pub changed_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareReport {
    pub summary: CompareSummary,
    pub display: Table,
    pub changes: Vec<ChangeRecord>,
    pub groups: Vec<RowGroup>,
    #[serde(skip)]
    pub alignment: AlignmentResult,
}

/// The display row and reported changes of a single row key.
#[derive(Debug, Clone)]
pub struct RowFocus<'a> {
    pub row_key: &'a RowKey,
    pub row_label: &'a str,
    pub display: Table,
    pub changes: Vec<&'a ChangeRecord>,
}

impl CompareReport {
    pub fn has_changes(&self) -> bool {
        self.summary.total_changes > 0
    }

    /// Narrow the report to one row, looked up by its rendered key.
    pub fn focus(&self, key: &str) -> Option<RowFocus<'_>> {
        let row = self
            .alignment
            .rows()
            .iter()
            .find(|r| r.key.to_string() == key)?;
        let display = self.display.slice_row(row.new_index)?;
        let changes = self.changes.iter().filter(|c| c.row_key == row.key).collect();
        Some(RowFocus {
            row_key: &row.key,
            row_label: &row.label,
            display,
            changes,
        })
    }
}
