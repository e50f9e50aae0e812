//! Text shortening for one-line display.

const ELLIPSIS: &str = "...";

/// Flattens newlines to spaces and shortens `s` to at most `max` characters,
/// replacing the tail with `...` when it is too long.
///
/// # Examples
///
/// ```
/// use iacscan_common::truncate_right;
///
/// assert_eq!(truncate_right("short", 10), "short");
/// assert_eq!(truncate_right("a long\ndescription", 10), "a long ...");
/// ```
#[must_use]
pub fn truncate_right(s: &str, max: usize) -> String {
    let flat = s.replace('\n', " ");
    if flat.chars().count() <= max {
        return flat;
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let mut out: String = flat.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}
