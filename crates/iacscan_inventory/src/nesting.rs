use iacscan_common::StringSet;
use iacscan_common::path::is_within;

/// Collapses nested directories into the outermost one.
///
/// The set is sorted, then an entry is kept only when it does not lie
/// beneath an entry already kept. If `"."` is present it is the only
/// survivor.
///
/// # Examples
///
/// ```
/// use iacscan_common::StringSet;
/// use iacscan_inventory::collapse_nested_dirs;
///
/// let mut dirs: StringSet = ["a/b/c", "a/b", "a/bc", "d"].into_iter().collect();
/// collapse_nested_dirs(&mut dirs);
/// assert_eq!(dirs.values(), &["a/b", "a/bc", "d"]);
/// ```
pub fn collapse_nested_dirs(values: &mut StringSet) {
    if values.contains(".") {
        values.replace(["."]);
        return;
    }
    let mut kept: Vec<String> = Vec::with_capacity(values.len());
    for dir in values.sorted() {
        if !kept.iter().any(|outer| is_within(outer, &dir)) {
            kept.push(dir);
        }
    }
    values.replace(kept);
}
