use std::collections::HashMap;

use crate::align::RowKey;
use crate::config::Locale;
use crate::model::{ChangeRecord, RowGroup};

pub const GROUP_SEPARATOR: &str = " | ";

/// `[category] column (old ➡️ new)`
pub fn describe(record: &ChangeRecord, locale: Locale) -> String {
    format!(
        "[{}] {} ({} {} {})",
        locale.category_label(record.category),
        record.column,
        record.old_value,
        locale.arrow(),
        record.new_value
    )
}

/// Roll records up per row key, rows in first-seen order, descriptions in
/// record order.
pub fn group_by_row(records: &[ChangeRecord], locale: Locale) -> Vec<RowGroup> {
    let mut index: HashMap<&RowKey, usize> = HashMap::new();
    let mut groups: Vec<(&ChangeRecord, Vec<String>)> = Vec::new();

    for record in records {
        let slot = *index.entry(&record.row_key).or_insert_with(|| {
            groups.push((record, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(describe(record, locale));
    }

    groups
        .into_iter()
        .map(|(first, parts)| RowGroup {
            row_key: first.row_key.clone(),
            row_label: first.row_label.clone(),
            change_count: parts.len(),
            description: parts.join(GROUP_SEPARATOR),
        })
        .collect()
}
