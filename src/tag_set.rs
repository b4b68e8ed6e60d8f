//! Tag string parsing.
//!
//! Clients supply tags as one free-text, comma-separated string. This module
//! turns that string into a normalized set of labels.

use std::collections::btree_set;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Separator used when joining labels back into a tag string.
pub const TAG_STRING_SEPARATOR: &str = ", ";

/// A normalized set of tag labels.
///
/// Labels are trimmed, non-empty and free of `,`. Iteration is in label order so that the
/// joined tag string is stable between reads. Serialized as a list of labels;
/// deserializing normalizes the same way parsing does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    /// An empty label set
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Exact, case-sensitive membership test
    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(label)
    }

    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.0.iter()
    }

    /// Labels in `self` that are not in `other`
    pub fn difference<'a>(&'a self, other: &'a TagSet) -> impl Iterator<Item = &'a String> {
        self.0.difference(&other.0)
    }

    /// Join the labels into a tag string (`"a, b"`). Empty set gives `""`.
    pub fn to_tag_string(&self) -> String {
        self.0
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(TAG_STRING_SEPARATOR)
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    /// Collect labels, applying the same normalization as [`parse_tag_string`].
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut labels = BTreeSet::new();
        for item in iter {
            labels.extend(
                item.as_ref()
                    .split(',')
                    .map(str::trim)
                    .filter(|label| !label.is_empty())
                    .map(str::to_string),
            );
        }
        Self(labels)
    }
}

impl From<Vec<String>> for TagSet {
    fn from(labels: Vec<String>) -> Self {
        labels.into_iter().collect()
    }
}

impl From<TagSet> for Vec<String> {
    fn from(set: TagSet) -> Self {
        set.0.into_iter().collect()
    }
}

impl IntoIterator for TagSet {
    type Item = String;
    type IntoIter = btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Parse a free-text tag string into a label set.
///
/// - `None` or `""` yields the empty set
/// - pieces are split on `,` and trimmed
/// - pieces that are empty after trimming are dropped
/// - duplicates collapse
///
/// Labels are otherwise kept verbatim: no case folding, no length limit.
pub fn parse_tag_string(raw: Option<&str>) -> TagSet {
    match raw {
        Some(raw) if !raw.is_empty() => raw.split(',').collect(),
        _ => TagSet::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(set: &TagSet) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_none_and_empty_are_empty() {
        assert!(parse_tag_string(None).is_empty());
        assert!(parse_tag_string(Some("")).is_empty());
        assert_eq!(parse_tag_string(None), parse_tag_string(Some("")));
    }

    #[test]
    fn test_trims_and_splits() {
        let set = parse_tag_string(Some("Tag1, Tag2"));
        assert_eq!(labels(&set), vec!["Tag1", "Tag2"]);
    }

    #[test]
    fn test_drops_blank_pieces() {
        let set = parse_tag_string(Some(" , ,rust,,\t, web ,"));
        assert_eq!(labels(&set), vec!["rust", "web"]);

        assert!(parse_tag_string(Some("   ")).is_empty());
        assert!(parse_tag_string(Some(",,,")).is_empty());
    }

    #[test]
    fn test_collapses_duplicates() {
        let set = parse_tag_string(Some("rust, rust ,rust"));
        assert_eq!(set.len(), 1);
        assert!(set.contains("rust"));
    }

    #[test]
    fn test_case_sensitive() {
        let set = parse_tag_string(Some("Rust, rust"));
        assert_eq!(set.len(), 2);
        assert!(set.contains("Rust"));
        assert!(set.contains("rust"));
    }

    #[test]
    fn test_inner_whitespace_kept() {
        let set = parse_tag_string(Some("  machine learning  "));
        assert!(set.contains("machine learning"));
    }

    #[test]
    fn test_no_blank_or_duplicate_entries() {
        let inputs = [
            "a,b,c",
            " a , a , b ",
            ",,a,,",
            "\n,\t, ,x",
            "one",
            "x, y, x, y, z",
        ];
        for input in inputs {
            let set = parse_tag_string(Some(input));
            let mut seen = std::collections::HashSet::new();
            for label in &set {
                assert!(!label.trim().is_empty(), "blank label from {:?}", input);
                assert_eq!(label.trim(), label, "untrimmed label from {:?}", input);
                assert!(seen.insert(label.clone()), "duplicate label from {:?}", input);
            }
        }
    }

    #[test]
    fn test_to_tag_string_round_trips() {
        let set = parse_tag_string(Some("web,  Rust ,api"));
        let joined = set.to_tag_string();
        assert_eq!(joined, "Rust, api, web");
        assert_eq!(parse_tag_string(Some(joined.as_str())), set);
        assert_eq!(TagSet::new().to_tag_string(), "");
    }

    #[test]
    fn test_deserialize_normalizes() {
        let set: TagSet = serde_json::from_str(r#"[" web ", "", "web", "api"]"#).unwrap();
        assert_eq!(labels(&set), vec!["api", "web"]);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["api","web"]"#);
    }

    #[test]
    fn test_deserialize_splits_commas() {
        let set: TagSet = serde_json::from_str(r#"["a,b", " c "]"#).unwrap();
        assert_eq!(set, parse_tag_string(Some("a,b, c")));
        assert_eq!(labels(&set), vec!["a", "b", "c"]);

        let single: TagSet = serde_json::from_str(r#"["a,b"]"#).unwrap();
        assert_eq!(single, parse_tag_string(Some("a,b")));
    }

    #[test]
    fn test_collect_matches_parse() {
        let set: TagSet = vec!["x, y", "", " z "].into_iter().collect();
        assert_eq!(set, parse_tag_string(Some("x, y, z")));
        assert!(set.iter().all(|label| !label.contains(',')));
    }

    #[test]
    fn test_difference() {
        let desired = parse_tag_string(Some("a, b, c"));
        let kept = parse_tag_string(Some("b"));
        let to_add: Vec<&String> = desired.difference(&kept).collect();
        assert_eq!(to_add, vec!["a", "c"]);
    }
}
