//! Insertion-ordered set of strings.
//!
//! Manifest categories are stored as [`StringSet`] values: membership checks
//! are hash lookups, iteration follows insertion order, and a sorted copy is
//! available when callers need a canonical ordering.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::collections::HashSet;

/// A set of strings that remembers insertion order and rejects duplicates.
///
/// # Examples
///
/// ```
/// use iacscan_common::StringSet;
///
/// let mut set = StringSet::new();
/// assert!(set.add("b"));
/// assert!(set.add("a"));
/// assert!(!set.add("b"));
/// assert_eq!(set.values(), &["b", "a"]);
/// assert_eq!(set.sorted(), vec!["a", "b"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct StringSet {
    values: Vec<String>,
    members: HashSet<String>,
}

impl StringSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value`, returning `true` when it was not already present.
    pub fn add(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.members.contains(&value) {
            return false;
        }
        self.members.insert(value.clone());
        self.values.push(value);
        true
    }

    /// Adds every value from `values`, skipping duplicates.
    pub fn add_all<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            self.add(value);
        }
    }

    /// Returns `true` when `value` is a member.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.members.contains(value)
    }

    /// Returns the members in insertion order.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Returns a sorted copy of the members.
    #[must_use]
    pub fn sorted(&self) -> Vec<String> {
        let mut sorted = self.values.clone();
        sorted.sort();
        sorted
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the members in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.values.iter()
    }

    /// Removes every member while keeping the allocated capacity.
    pub fn reset(&mut self) {
        self.values.clear();
        self.members.clear();
    }

    /// Keeps only the members for which `keep` returns `true`, preserving
    /// the relative order of the survivors.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        let members = &mut self.members;
        self.values.retain(|value| {
            let kept = keep(value);
            if !kept {
                members.remove(value);
            }
            kept
        });
    }

    /// Replaces the contents with `values`, in the order given.
    pub fn replace<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reset();
        self.add_all(values);
    }
}

impl PartialEq for StringSet {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for StringSet {}

impl<S: Into<String>> FromIterator<S> for StringSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.add_all(iter);
        set
    }
}

impl<'a> IntoIterator for &'a StringSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for StringSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StringSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<String>::deserialize(deserializer)?;
        Ok(values.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn rejects_duplicates_and_keeps_order() {
        let mut set: StringSet = ["z", "a", "z", "m"].into_iter().collect();
        assert_eq!(set.len(), 3);
        assert_eq!(set.values(), &["z", "a", "m"]);
        assert!(!set.add("a"));
        assert!(set.contains("m"));
        assert!(!set.contains("q"));
    }

    #[rstest]
    fn reset_empties_the_set() {
        let mut set: StringSet = ["x", "y"].into_iter().collect();
        set.reset();
        assert!(set.is_empty());
        assert!(!set.contains("x"));
        assert!(set.add("x"));
    }

    #[rstest]
    fn retain_drops_membership() {
        let mut set: StringSet = ["a", "a/b", "c"].into_iter().collect();
        set.retain(|value| !value.starts_with("a/"));
        assert_eq!(set.values(), &["a", "c"]);
        assert!(!set.contains("a/b"));
        assert!(set.add("a/b"));
    }

    #[rstest]
    fn serialises_as_array() {
        let empty = StringSet::new();
        assert_eq!(serde_json::to_string(&empty).expect("serialise"), "[]");

        let set: StringSet = ["b", "a"].into_iter().collect();
        let json = serde_json::to_string(&set).expect("serialise");
        assert_eq!(json, r#"["b","a"]"#);

        let back: StringSet = serde_json::from_str(r#"["b","a","b"]"#).expect("deserialise");
        assert_eq!(back, set);
    }
}
