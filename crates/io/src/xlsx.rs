// Workbook loading (xlsx, xlsm, xls, xlsb, ods)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::NaiveDateTime;
use cubadiff_compare::{Table, Value};

use crate::error::LoadError;
use crate::infer::{is_na_token, mangle_headers, unify_numeric_column};

/// Load one sheet; the first sheet when `sheet` is `None`.
pub fn import(path: &Path, sheet: Option<&str>) -> Result<Table, LoadError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| match e {
        calamine::Error::Io(source) => LoadError::io(path, source),
        other => LoadError::Excel(other),
    })?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();

    let name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| LoadError::SheetNotFound {
                sheet: wanted.to_string(),
                available: sheet_names.clone(),
            })?,
        None => sheet_names.first().cloned().ok_or(LoadError::NoSheets)?,
    };

    log::debug!("reading sheet '{name}' of {}", path.display());
    let range = workbook.worksheet_range(&name)?;
    table_from_range(&range).ok_or_else(|| LoadError::EmptyInput {
        path: path.to_path_buf(),
    })
}

/// First row of the used range is the header. `None` for an empty sheet.
///
/// Columns stay anchored to column A: blank leading columns before the used
/// range become `Unnamed: i` columns of empty cells.
pub fn table_from_range(range: &Range<Data>) -> Option<Table> {
    let leading = range.start().map(|(_, col)| col as usize).unwrap_or(0);
    let mut rows = range.rows();
    let header = rows.next()?;
    let names = std::iter::repeat(String::new())
        .take(leading)
        .chain(header.iter().map(header_text))
        .collect();
    let columns = mangle_headers(names);
    let width = columns.len();

    let mut cells: Vec<Vec<Value>> = vec![Vec::new(); width];
    let mut row_count = 0usize;
    for row in rows {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        for (col, slot) in cells.iter_mut().enumerate() {
            let value = col
                .checked_sub(leading)
                .and_then(|c| row.get(c))
                .map(cell_value)
                .unwrap_or(Value::Empty);
            slot.push(value);
        }
        row_count += 1;
    }

    for column in cells.iter_mut() {
        unify_numeric_column(column);
    }

    let mut table = Table::new(columns);
    for row in 0..row_count {
        table.push_row(cells.iter().map(|col| col[row].clone()).collect());
    }
    Some(table)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Empty => String::new(),
        other => cell_value(other).to_string(),
    }
}

fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Empty,
        Data::String(s) if is_na_token(s) => Value::Empty,
        Data::String(s) => Value::Text(s.clone()),
        Data::Float(n) => Value::Number(*n),
        Data::Int(n) => Value::Integer(*n),
        Data::Bool(b) => Value::Bool(*b),
        Data::Error(e) => {
            let text = e.to_string();
            if is_na_token(&text) {
                Value::Empty
            } else {
                Value::Text(text)
            }
        }
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => Value::Text(format_datetime(naive)),
            None => Value::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cell_mapping() {
        assert_eq!(cell_value(&Data::Empty), Value::Empty);
        assert_eq!(cell_value(&Data::String("NA".into())), Value::Empty);
        assert_eq!(cell_value(&Data::String("R1".into())), Value::text("R1"));
        assert_eq!(cell_value(&Data::Int(4)), Value::Integer(4));
        assert_eq!(cell_value(&Data::Bool(true)), Value::Bool(true));
        assert_eq!(cell_value(&Data::Error(CellErrorType::NA)), Value::Empty);
        assert_eq!(
            cell_value(&Data::Error(CellErrorType::Div0)),
            Value::text("#DIV/0!")
        );
    }

    #[test]
    fn test_range_to_table() {
        let mut range: Range<Data> = Range::new((0, 0), (3, 2));
        range.set_value((0, 0), Data::String("rotas".into()));
        range.set_value((0, 1), Data::String("peso".into()));
        range.set_value((0, 2), Data::String("peso".into()));
        range.set_value((1, 0), Data::String("R1".into()));
        range.set_value((1, 1), Data::Float(10.0));
        range.set_value((1, 2), Data::Float(1.0));
        range.set_value((3, 0), Data::String("R2".into()));
        range.set_value((3, 1), Data::Float(20.5));
        range.set_value((3, 2), Data::Float(2.0));

        let table = table_from_range(&range).unwrap();
        assert_eq!(table.columns(), &["rotas", "peso", "peso.1"]);
        // Row 2 is blank and skipped.
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 1), &Value::Number(10.0));
        assert_eq!(table.cell(1, 1), &Value::Number(20.5));
        assert_eq!(table.cell(0, 2), &Value::Integer(1));
    }

    #[test]
    fn test_blank_leading_columns_keep_positions() {
        let mut range: Range<Data> = Range::new((0, 2), (1, 3));
        range.set_value((0, 2), Data::String("rotas".into()));
        range.set_value((0, 3), Data::String("peso".into()));
        range.set_value((1, 2), Data::String("R1".into()));
        range.set_value((1, 3), Data::Float(1.5));

        let table = table_from_range(&range).unwrap();
        assert_eq!(table.columns(), &["Unnamed: 0", "Unnamed: 1", "rotas", "peso"]);
        assert_eq!(table.column_index("peso"), Some(3));
        assert_eq!(table.cell(0, 0), &Value::Empty);
        assert_eq!(table.cell(0, 2), &Value::text("R1"));
        assert_eq!(table.cell(0, 3), &Value::Number(1.5));
    }

    #[test]
    fn test_empty_range() {
        let range: Range<Data> = Range::empty();
        assert!(table_from_range(&range).is_none());
    }

    #[test]
    fn test_numeric_header() {
        assert_eq!(header_text(&Data::Float(2024.0)), "2024");
        assert_eq!(header_text(&Data::Empty), "");
    }
}
