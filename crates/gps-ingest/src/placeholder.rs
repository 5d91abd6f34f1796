//! Cell text that stands for "no value recorded".

const PLACEHOLDERS: &[&str] = &["-", "--", "—", "–", "n/a", "na", "null", "none", "nan"];

/// Returns true for empty cells and vendor placeholders such as `-` or `N/A`.
pub fn is_placeholder(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty()
        || PLACEHOLDERS
            .iter()
            .any(|placeholder| trimmed.eq_ignore_ascii_case(placeholder))
}
