//! CSV export of the change log and row groups.
//!
//! Header literals are fixed regardless of locale so downstream sheets keep
//! working; only the category label follows the locale.

use std::io::Write;

use crate::config::Locale;
use crate::error::CompareError;
use crate::model::{ChangeRecord, RowGroup};

pub const CHANGE_LOG_HEADERS: [&str; 6] = [
    "ID_REF",
    "Rota",
    "Coluna",
    "Valor Antigo",
    "Valor Novo",
    "Categoria",
];

pub const GROUP_HEADERS: [&str; 3] = ["ID_REF", "Rota", "Alterações"];

pub fn write_changes_csv<W: Write>(
    out: W,
    records: &[ChangeRecord],
    locale: Locale,
) -> Result<(), CompareError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(out);
    wtr.write_record(CHANGE_LOG_HEADERS)?;
    for r in records {
        let key = r.row_key.to_string();
        wtr.write_record([
            key.as_str(),
            r.row_label.as_str(),
            r.column.as_str(),
            r.old_value.as_str(),
            r.new_value.as_str(),
            locale.category_label(r.category),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn changes_to_csv(records: &[ChangeRecord], locale: Locale) -> Result<Vec<u8>, CompareError> {
    let mut buf = Vec::new();
    write_changes_csv(&mut buf, records, locale)?;
    Ok(buf)
}

pub fn write_groups_csv<W: Write>(out: W, groups: &[RowGroup]) -> Result<(), CompareError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(out);
    wtr.write_record(GROUP_HEADERS)?;
    for g in groups {
        let key = g.row_key.to_string();
        wtr.write_record([key.as_str(), g.row_label.as_str(), g.description.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn groups_to_csv(groups: &[RowGroup]) -> Result<Vec<u8>, CompareError> {
    let mut buf = Vec::new();
    write_groups_csv(&mut buf, groups)?;
    Ok(buf)
}
