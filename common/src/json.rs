//! Filtering helpers for `serde_json` values.

use serde_json::Value;

/// Removes every element of a JSON array for which `remove` returns `true`.
///
/// Values that are not arrays are left untouched. Returns the number of
/// elements removed.
///
/// # Examples
///
/// ```
/// use iacscan_common::remove_elements_if;
/// use serde_json::json;
///
/// let mut findings = json!([{"pass": true}, {"pass": false}]);
/// let removed = remove_elements_if(&mut findings, |item| item["pass"] == json!(true));
/// assert_eq!(removed, 1);
/// assert_eq!(findings, json!([{"pass": false}]));
/// ```
pub fn remove_elements_if<F>(value: &mut Value, mut remove: F) -> usize
where
    F: FnMut(&Value) -> bool,
{
    let Some(items) = value.as_array_mut() else {
        return 0;
    };
    let before = items.len();
    items.retain(|item| !remove(item));
    before - items.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn leaves_non_arrays_alone() {
        let mut value = json!({"a": 1});
        assert_eq!(remove_elements_if(&mut value, |_| true), 0);
        assert_eq!(value, json!({"a": 1}));
    }

    #[rstest]
    fn keeps_order_of_survivors() {
        let mut value = json!([1, 2, 3, 4, 5]);
        let removed = remove_elements_if(&mut value, |v| v.as_i64().is_some_and(|n| n % 2 == 0));
        assert_eq!(removed, 2);
        assert_eq!(value, json!([1, 3, 5]));
    }
}
