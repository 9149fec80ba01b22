//! `cubadiff-io`: turns spreadsheet files into `Table`s and writes display
//! tables back out.

pub mod csv;
pub mod error;
pub mod infer;
pub mod xlsx;

use std::path::Path;

use cubadiff_compare::Table;

pub use error::LoadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Delimited text; `Some` forces the delimiter, `None` sniffs it.
    Delimited(Option<u8>),
    Workbook,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "txt" => Ok(Self::Delimited(None)),
            "tsv" => Ok(Self::Delimited(Some(b'\t'))),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Self::Workbook),
            _ => Err(LoadError::UnsupportedFormat { extension: ext }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Workbook sheet to read; the first sheet when unset.
    pub sheet: Option<String>,
    /// Overrides delimiter detection for text files.
    pub delimiter: Option<u8>,
}

/// Load a table from a CSV or workbook file, picked by extension.
pub fn load(path: &Path, options: &LoadOptions) -> Result<Table, LoadError> {
    let table = match FileFormat::from_path(path)? {
        FileFormat::Delimited(detected) => csv::import(path, options.delimiter.or(detected))?,
        FileFormat::Workbook => xlsx::import(path, options.sheet.as_deref())?,
    };
    log::info!(
        "loaded {}: {} rows x {} columns",
        path.display(),
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}
