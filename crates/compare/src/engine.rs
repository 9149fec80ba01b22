use crate::align::{align, AlignmentResult};
use crate::classify::{categorize, column_letter, is_suppressed};
use crate::config::CompareConfig;
use crate::group::group_by_row;
use crate::model::{ChangeRecord, CompareReport, CompareSummary, Table, Value};
use crate::normalize::{cells_differ, display_value};

/// Output of one diff pass over an alignment.
#[derive(Debug, Clone)]
pub struct DiffOutput {
    /// The new table with every changed cell replaced by `old ➡️ new`.
    pub display: Table,
    /// Row-major: rows in alignment order, then columns in alignment order.
    pub changes: Vec<ChangeRecord>,
    pub total_changes: usize,
    pub suppressed_changes: usize,
    /// Rows with at least one unequal cell, suppressed ones included.
    pub rows_with_changes: usize,
}

/// Compare every (row, column) pair of the alignment.
///
/// Never fails: cells outside the common key space are not visited, and
/// values that do not parse as numbers are compared as text.
pub fn diff(
    old: &Table,
    new: &Table,
    alignment: &AlignmentResult,
    config: &CompareConfig,
) -> DiffOutput {
    let locale = config.locale;
    let mut display = new.clone();
    let mut changes = Vec::new();
    let mut total_changes = 0;
    let mut suppressed_changes = 0;
    let mut rows_with_changes = 0;

    for row in alignment.rows() {
        let mut row_changed = false;
        for col in alignment.columns() {
            let old_value = old.cell(row.old_index, col.old_index);
            let new_value = new.cell(row.new_index, col.new_index);

            if !cells_differ(old_value, new_value, &config.tolerance) {
                continue;
            }
            total_changes += 1;
            row_changed = true;

            let old_display = display_value(old_value, locale.empty_label());
            let new_display = display_value(new_value, locale.empty_label());
            display.set(
                row.new_index,
                col.new_index,
                Value::Text(format!("{old_display} {} {new_display}", locale.arrow())),
            );

            // Common columns always come from the old table, so their old
            // index is their original position.
            let position = col.old_index;
            if is_suppressed(position, &config.suppressed_positions) {
                suppressed_changes += 1;
                log::trace!("row {} column '{}': change suppressed", row.key, col.name);
                continue;
            }

            let category = categorize(position, &config.categories);
            log::trace!(
                "row {} column '{}' ({}): {old_display} -> {new_display} ({category})",
                row.key,
                col.name,
                column_letter(position)
            );
            changes.push(ChangeRecord {
                row_key: row.key.clone(),
                row_label: row.label.clone(),
                column: col.name.clone(),
                position,
                old_value: old_display,
                new_value: new_display,
                category,
            });
        }
        if row_changed {
            rows_with_changes += 1;
        }
    }

    DiffOutput {
        display,
        changes,
        total_changes,
        suppressed_changes,
        rows_with_changes,
    }
}

/// Align, diff and group in one call.
pub fn compare(old: &Table, new: &Table, config: &CompareConfig) -> CompareReport {
    let alignment = align(old, new, config.identifier());
    let output = diff(old, new, &alignment, config);
    let groups = group_by_row(&output.changes, config.locale);

    let summary = CompareSummary {
        key_scheme: alignment.scheme().clone(),
        fallback: alignment.fallback().cloned(),
        rows_compared: alignment.rows().len(),
        columns_compared: alignment.columns().len(),
        rows_only_in_old: alignment.rows_only_in_old(),
        rows_only_in_new: alignment.rows_only_in_new(),
        columns_only_in_old: alignment.columns_only_in_old(),
        columns_only_in_new: alignment.columns_only_in_new(),
        total_changes: output.total_changes,
        recorded_changes: output.changes.len(),
        suppressed_changes: output.suppressed_changes,
        rows_with_changes: output.rows_with_changes,
        changed_rows: groups.len(),
    };

    log::info!(
        "compared {} rows x {} columns by {}: {} change(s), {} suppressed, {} row(s) affected",
        summary.rows_compared,
        summary.columns_compared,
        summary.key_scheme,
        summary.total_changes,
        summary.suppressed_changes,
        summary.changed_rows
    );

    CompareReport {
        summary,
        display: output.display,
        changes: output.changes,
        groups,
        alignment,
    }
}
