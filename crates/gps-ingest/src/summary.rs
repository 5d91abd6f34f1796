//! Vendor summary-row labels.
//!
//! Exports commonly append team aggregate rows under the athlete rows. Their
//! first cell carries one of these labels and nothing else, so the whole cell
//! is compared. A name like "Sum Ka Wai" is an athlete.

/// Whole-cell labels, lowercase with single spaces.
const SUMMARY_LABELS: &[&str] = &[
    "average",
    "avg",
    "mean",
    "total",
    "totals",
    "sum",
    "summary",
    "median",
    "team average",
    "team avg",
    "team total",
    "team totals",
    "squad average",
    "squad avg",
    "squad total",
    "squad totals",
    "session average",
    "session total",
    "grand total",
    "среднее",
    "средние",
    "среднее значение",
    "сумма",
    "итого",
    "всего",
    "итог",
    "итого по команде",
    "среднее по команде",
];

/// Prefixes for inflected single-word forms ("средний", "итоговое").
const SUMMARY_PREFIXES: &[&str] = &["средн", "итог"];

/// Lowercases, collapses inner whitespace and strips trailing `:` or `.`.
fn fold_label(cell: &str) -> String {
    let lowered = cell.trim().to_lowercase();
    let stripped = lowered.trim_end_matches([':', '.']).trim_end();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns true if a first cell marks an aggregate row rather than an athlete.
pub fn is_summary_label(cell: &str) -> bool {
    let folded = fold_label(cell);
    if folded.is_empty() {
        return false;
    }
    if SUMMARY_LABELS.contains(&folded.as_str()) {
        return true;
    }
    !folded.contains(' ')
        && folded.chars().all(char::is_alphabetic)
        && SUMMARY_PREFIXES.iter().any(|prefix| folded.starts_with(prefix))
}
