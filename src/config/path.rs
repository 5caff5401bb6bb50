//! Dotted Paths
//!
//! Helpers for addressing nested keys with dotted strings (`wallet.name`)
//! and for flattening nested nodes into dotted-path leaves.

use indexmap::IndexMap;

use super::value::{Node, Value};
use crate::constants::path::SEPARATOR;

/// Split a dotted path into its segments
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR)
}

/// Join a prefix and a key; an empty prefix yields the key unchanged
pub fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}{}{}", prefix, SEPARATOR, key)
    }
}

/// Split off the last segment: `a.b.c` -> (`Some("a.b")`, `"c"`)
pub fn split_last(path: &str) -> (Option<&str>, &str) {
    match path.rsplit_once(SEPARATOR) {
        Some((parent, leaf)) => (Some(parent), leaf),
        None => (None, path),
    }
}

/// Flatten a node into dotted path -> leaf value, in insertion order.
///
/// Nested trees are descended into; an empty nested tree is kept as a leaf so
/// that its path stays addressable.
pub fn flatten(node: &Node) -> IndexMap<String, Value> {
    let mut out = IndexMap::new();
    flatten_into(node, "", &mut out);
    out
}

fn flatten_into(node: &Node, prefix: &str, out: &mut IndexMap<String, Value>) {
    for (key, value) in node {
        let path = join(prefix, key);
        match value {
            Value::Tree(child) if !child.is_empty() => flatten_into(child, &path, out),
            leaf => {
                out.insert(path, leaf.clone());
            }
        }
    }
}
