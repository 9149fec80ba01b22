// CSV/TSV loading and display-table export

use std::io::{Read, Write};
use std::path::Path;

use cubadiff_compare::{Table, Value};

use crate::error::LoadError;
use crate::infer::{mangle_headers, type_text_column};

pub fn import(path: &Path, delimiter: Option<u8>) -> Result<Table, LoadError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&content));
    log::debug!(
        "reading {} with delimiter {:?}",
        path.display(),
        delimiter as char
    );
    import_from_string(&content, delimiter).map_err(|e| match e {
        LoadError::EmptyInput { .. } => LoadError::EmptyInput {
            path: path.to_path_buf(),
        },
        other => other,
    })
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Lines agreeing with the header, weighted by field count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (Excel-exported CSVs are often Windows-1252)
pub fn read_file_as_utf8(path: &Path) -> Result<String, LoadError> {
    let mut file = std::fs::File::open(path).map_err(|e| LoadError::io(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| LoadError::io(path, e))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.strip_prefix('\u{feff}').map(str::to_owned).unwrap_or(s)),
        Err(e) => {
            let bytes = e.into_bytes();
            log::debug!("{} is not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Parse CSV text: first record is the header, every column is typed as a whole.
/// Empty lines are skipped; rows of empty fields are kept.
pub fn import_from_string(content: &str, delimiter: u8) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record?,
        None => {
            return Err(LoadError::EmptyInput {
                path: Default::default(),
            })
        }
    };
    let columns = mangle_headers(header.iter().map(str::to_owned).collect());
    let width = columns.len();

    // Column-major buffer so each column can be typed on its own.
    let mut fields: Vec<Vec<String>> = vec![Vec::new(); width];
    let mut row_count = 0usize;
    for result in records {
        // The reader already drops empty lines; a line of bare delimiters is
        // a row of empty cells.
        let record = result?;
        for (col, slot) in fields.iter_mut().enumerate() {
            slot.push(record.get(col).unwrap_or("").to_owned());
        }
        if record.len() > width {
            log::warn!(
                "row {} has {} fields, header has {width}; extra fields dropped",
                row_count + 2,
                record.len()
            );
        }
        row_count += 1;
    }

    let typed: Vec<Vec<Value>> = fields.into_iter().map(type_text_column).collect();
    let mut table = Table::new(columns);
    for row in 0..row_count {
        table.push_row(typed.iter().map(|col| col[row].clone()).collect());
    }
    Ok(table)
}

/// Cell text as written to an exported CSV: empty cells are blank fields.
fn export_text(value: &Value) -> String {
    if value.is_empty() {
        String::new()
    } else {
        value.to_string()
    }
}

pub fn write_table<W: Write>(out: W, table: &Table, delimiter: u8) -> Result<(), LoadError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(out);

    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(export_text))?;
    }
    writer.flush().map_err(|e| LoadError::io(Path::new("<output>"), e))?;
    Ok(())
}

/// Write the display table to `path`, header included.
pub fn export(table: &Table, path: &Path) -> Result<(), LoadError> {
    let delimiter = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    };
    let file = std::fs::File::create(path).map_err(|e| LoadError::io(path, e))?;
    write_table(std::io::BufWriter::new(file), table, delimiter)
}
