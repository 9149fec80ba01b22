use std::collections::BTreeSet;

use crate::config::CategoryRange;
use crate::model::Category;

/// Category of a column from its original position; first matching range
/// wins, anything outside every range is `General`.
pub fn categorize(position: usize, ranges: &[CategoryRange]) -> Category {
    ranges
        .iter()
        .find(|r| r.contains(position))
        .map(|r| r.category)
        .unwrap_or(Category::General)
}

pub fn is_suppressed(position: usize, suppressed: &BTreeSet<usize>) -> bool {
    suppressed.contains(&position)
}

/// Spreadsheet column letter for a zero-based position (0 → A, 26 → AA).
pub fn column_letter(position: usize) -> String {
    let mut n = position + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}
