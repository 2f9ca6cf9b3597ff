//! Flattening of nested translation trees into dot-delimited key sets.
//!
//! Two views of the same tree exist:
//!
//! * [`flatten`] keeps arrays as a single leaf. Completeness checks compare
//!   these sets, so a translated list counts as one unit.
//! * [`flatten_expanded`] decomposes arrays by index (`days.0`, `days.1`).
//!   Placeholder checks use this view so every element is inspected.
//!
//! The asymmetry is intentional: element counts in lists legitimately differ
//! between languages, while placeholders inside each element must still match.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::translation::TranslationTree;

/// Mapping from full key path to leaf value, in tree traversal order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlattenedKeySet {
    entries: Map<String, Value>,
}

impl FlattenedKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Keys of `self` that `other` lacks, in `self`'s order
    pub fn keys_missing_from(&self, other: &FlattenedKeySet) -> Vec<String> {
        self.entries
            .keys()
            .filter(|k| !other.contains_key(k))
            .cloned()
            .collect()
    }

    /// Keys whose value is the empty string
    pub fn empty_keys(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, v)| matches!(v, Value::String(s) if s.is_empty()))
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// String leaves only, for checks that look inside text
    pub fn string_values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.as_str(), s)))
    }

    fn insert(&mut self, key: String, value: Value) {
        self.entries.insert(key, value);
    }
}

impl FromIterator<(String, Value)> for FlattenedKeySet {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Flatten a tree, treating arrays as atomic leaves
pub fn flatten(tree: &TranslationTree) -> FlattenedKeySet {
    let mut out = FlattenedKeySet::new();
    flatten_object(tree.root(), "", false, &mut out);
    out
}

/// Flatten a tree, decomposing arrays into indexed keys
pub fn flatten_expanded(tree: &TranslationTree) -> FlattenedKeySet {
    let mut out = FlattenedKeySet::new();
    flatten_object(tree.root(), "", true, &mut out);
    out
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn flatten_object(
    map: &Map<String, Value>,
    prefix: &str,
    expand_arrays: bool,
    out: &mut FlattenedKeySet,
) {
    for (key, value) in map {
        let full_key = join_key(prefix, key);
        flatten_value(value, full_key, expand_arrays, out);
    }
}

fn flatten_value(value: &Value, full_key: String, expand_arrays: bool, out: &mut FlattenedKeySet) {
    match value {
        Value::Object(child) => flatten_object(child, &full_key, expand_arrays, out),
        Value::Array(items) if expand_arrays => {
            for (index, item) in items.iter().enumerate() {
                flatten_value(item, join_key(&full_key, &index.to_string()), true, out);
            }
        }
        leaf => out.insert(full_key, leaf.clone()),
    }
}

/// Rebuild a nested tree from a flattened (array-atomic) key set.
///
/// When a path runs through a leaf, the later key wins and the leaf is
/// replaced by an object.
pub fn unflatten(set: &FlattenedKeySet) -> TranslationTree {
    let mut root = Map::new();
    for (key, value) in set.iter() {
        let segments: Vec<&str> = key.split('.').collect();
        insert_path(&mut root, &segments, value.clone());
    }
    TranslationTree::new(root)
}

fn insert_path(map: &mut Map<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            map.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let child = map
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(child_map) = child {
                insert_path(child_map, rest, value);
            }
        }
    }
}
