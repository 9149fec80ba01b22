//! Output formats for `cubadiff compare`.

use std::fmt::Write as _;

use cubadiff_compare::config::Locale;
use cubadiff_compare::export::{changes_to_csv, groups_to_csv};
use cubadiff_compare::group::group_by_row;
use cubadiff_compare::model::RowFocus;
use cubadiff_compare::{ChangeRecord, CompareReport};

use crate::CliError;

/// Human-readable report: banner, reference mode, then one line per row.
pub fn text_report(report: &CompareReport) -> String {
    let s = &report.summary;
    let mut out = String::new();

    if s.total_changes == 0 {
        let _ = writeln!(out, "No differences found.");
    } else {
        let _ = writeln!(
            out,
            "{} change(s) found in {} row(s).",
            s.total_changes, s.rows_with_changes
        );
    }
    let _ = writeln!(out, "reference: {}", s.key_scheme);
    if let Some(reason) = &s.fallback {
        let _ = writeln!(out, "note: {reason}");
    }
    let _ = writeln!(
        out,
        "compared: {} rows x {} columns",
        s.rows_compared, s.columns_compared
    );
    if s.rows_only_in_old + s.rows_only_in_new > 0 {
        let _ = writeln!(
            out,
            "ignored rows: {} only in old, {} only in new",
            s.rows_only_in_old, s.rows_only_in_new
        );
    }
    if s.columns_only_in_old + s.columns_only_in_new > 0 {
        let _ = writeln!(
            out,
            "ignored columns: {} only in old, {} only in new",
            s.columns_only_in_old, s.columns_only_in_new
        );
    }
    if s.suppressed_changes > 0 {
        let _ = writeln!(
            out,
            "suppressed: {} change(s) hidden from the change log",
            s.suppressed_changes
        );
    }

    if !report.groups.is_empty() {
        out.push('\n');
        for group in &report.groups {
            let _ = writeln!(out, "{}: {}", group.row_label, group.description);
        }
    }
    out
}

pub fn json_report(report: &CompareReport) -> Result<Vec<u8>, CliError> {
    let mut bytes = serde_json::to_vec_pretty(report)
        .map_err(|e| CliError::io(format!("cannot serialize report: {e}")))?;
    bytes.push(b'\n');
    Ok(bytes)
}

pub fn csv_report(records: &[ChangeRecord], locale: Locale) -> Result<Vec<u8>, CliError> {
    changes_to_csv(records, locale).map_err(|e| CliError::io(e.to_string()))
}

pub fn groups_report(records: &[ChangeRecord], locale: Locale) -> Result<Vec<u8>, CliError> {
    groups_to_csv(&group_by_row(records, locale)).map_err(|e| CliError::io(e.to_string()))
}

// ---------------------------------------------------------------------------
// Single row
// ---------------------------------------------------------------------------

pub fn text_focus(focus: &RowFocus<'_>, locale: Locale) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "row {} ({})", focus.row_label, focus.row_key);
    if focus.changes.is_empty() {
        let _ = writeln!(out, "no reported changes");
        return out;
    }
    for change in &focus.changes {
        let _ = writeln!(
            out,
            "  [{}] {} ({} {} {})",
            locale.category_label(change.category),
            change.column,
            change.old_value,
            locale.arrow(),
            change.new_value
        );
    }
    out
}

pub fn json_focus(focus: &RowFocus<'_>) -> Result<Vec<u8>, CliError> {
    let value = serde_json::json!({
        "row_key": focus.row_key,
        "row_label": focus.row_label,
        "display": focus.display,
        "changes": focus.changes,
    });
    let mut bytes = serde_json::to_vec_pretty(&value)
        .map_err(|e| CliError::io(format!("cannot serialize row: {e}")))?;
    bytes.push(b'\n');
    Ok(bytes)
}

pub fn focus_records(focus: &RowFocus<'_>) -> Vec<ChangeRecord> {
    focus.changes.iter().map(|c| (*c).clone()).collect()
}
