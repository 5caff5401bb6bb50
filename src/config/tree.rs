//! Configuration Tree
//!
//! Ordered, nested key-value configuration with:
//! - recursive right-biased merge
//! - an optional default returned for unset keys
//! - a separate explicit-set map keyed by dotted path
//! - default filling driven by that map
//!
//! The explicit-set map never appears in iteration or in any rendered form.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Index;
use tracing::debug;

use super::explicit::ExplicitSet;
use super::format::OutputFormat;
use super::path;
use super::value::{NULL, Node, Value};
use crate::types::{ConfigError, Result};

/// Hierarchical configuration object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigTree {
    root: Node,
    default: Option<Value>,
    explicit: ExplicitSet,
}

impl ConfigTree {
    /// Create an empty tree without a default value
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing node
    pub fn from_root(root: Node) -> Self {
        Self {
            root,
            ..Self::default()
        }
    }

    /// Build a tree from a flat mapping of (possibly dotted) keys
    pub fn from_flat<K, V, I>(entries: I) -> Self
    where
        K: AsRef<str>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut tree = Self::new();
        tree.update(entries);
        tree
    }

    /// Build a tree from a previously loaded configuration source.
    ///
    /// Loading is not supported: any non-null source fails with
    /// [`ConfigError::NotImplemented`].
    pub fn from_loaded(loaded: Option<Value>) -> Result<Self> {
        match loaded {
            None | Some(Value::Null) => Ok(Self::new()),
            Some(source) => Err(ConfigError::NotImplemented(format!(
                "building a configuration from a loaded source ({}) is not supported",
                source.type_name()
            ))),
        }
    }

    /// Parse a YAML document into a tree with an empty explicit-set map
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }
        let root: Node = serde_yaml::from_str(text)?;
        Ok(Self::from_root(root))
    }

    /// Set the value returned by [`get`](Self::get) for absent keys
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Attach an explicit-set map
    pub fn with_explicit(mut self, explicit: ExplicitSet) -> Self {
        self.explicit = explicit;
        self
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    // =========================================================================
    // Access
    // =========================================================================

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Top-level keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }

    /// Top-level entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.root.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Value stored at a dotted path, ignoring the tree default
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        let mut segments = path::segments(key);
        let first = segments.next()?;
        segments.try_fold(self.root.get(first)?, |current, segment| {
            current.as_tree()?.get(segment)
        })
    }

    /// Value at a dotted path, else the tree default
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.lookup(key).or(self.default.as_ref())
    }

    /// Value at a dotted path, else the tree default, else `fallback`
    pub fn get_or<'a>(&'a self, key: &str, fallback: &'a Value) -> &'a Value {
        self.get(key).unwrap_or(fallback)
    }

    /// Mutable access to the value at a dotted path
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        let mut segments = path::segments(key);
        let first = segments.next()?;
        let mut current = self.root.get_mut(first)?;
        for segment in segments {
            current = current.as_tree_mut()?.get_mut(segment)?;
        }
        Some(current)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Set a (possibly dotted) key, creating intermediate trees as needed.
    ///
    /// A leaf standing where an intermediate tree is needed is replaced.
    /// The explicit-set map is left untouched.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let (parent, leaf) = path::split_last(key);
        let node = match parent {
            Some(parent) => ensure_node(&mut self.root, parent),
            None => &mut self.root,
        };
        node.insert(leaf.to_string(), value.into());
    }

    /// Set every entry of a flat mapping
    pub fn update<K, V, I>(&mut self, entries: I)
    where
        K: AsRef<str>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in entries {
            self.set(key.as_ref(), value);
        }
    }

    /// Merge `other` into this tree; `other` wins on conflicts.
    ///
    /// Nested trees present on both sides are merged recursively; otherwise
    /// the incoming value replaces the existing one regardless of type.
    /// Values are deep-copied. The explicit-set map is not touched.
    pub fn merge(&mut self, other: &ConfigTree) -> &mut Self {
        debug!(keys = other.root.len(), "Merging configuration tree");
        merge_nodes(&mut self.root, &other.root);
        self
    }

    /// Merge values and fold in `other`'s explicit-set flags.
    ///
    /// Where both trees track the same path, `other`'s flag wins.
    pub fn merge_layer(&mut self, other: &ConfigTree) -> &mut Self {
        self.merge(other);
        self.explicit.reconcile(&other.explicit);
        self
    }

    /// Fill leaves that were not explicitly set from `defaults`.
    ///
    /// Only top-level keys already present in this tree are considered. For
    /// each flattened default path: untracked paths are skipped, paths marked
    /// `false` receive the default, paths marked `true` keep their value.
    /// An empty nested tree in `defaults` counts as a leaf and is filled too.
    pub fn fill_with_defaults(&mut self, explicit: &ExplicitSet, defaults: &ConfigTree) {
        let filtered: Node = defaults
            .root
            .iter()
            .filter(|(key, _)| self.root.contains_key(key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        if filtered.is_empty() {
            debug!("No defaults overlap with configuration, skipping fill");
            return;
        }

        let mut filled = 0usize;
        for (dotted, value) in path::flatten(&filtered) {
            match explicit.get(&dotted) {
                Some(false) => {
                    self.set(&dotted, value);
                    filled += 1;
                }
                Some(true) | None => {}
            }
        }

        debug!(filled, "Filled configuration defaults");
    }

    /// [`fill_with_defaults`](Self::fill_with_defaults) using this tree's own
    /// explicit-set map
    pub fn apply_defaults(&mut self, defaults: &ConfigTree) {
        let explicit = self.explicit.clone();
        self.fill_with_defaults(&explicit, defaults);
    }

    // =========================================================================
    // Explicit-set tracking
    // =========================================================================

    /// Whether the user explicitly set this dotted path
    pub fn is_set(&self, path: &str) -> bool {
        self.explicit.is_set(path)
    }

    /// Record whether a dotted path was explicitly set
    pub fn mark_explicit(&mut self, path: impl Into<String>, explicit: bool) {
        self.explicit.mark(path, explicit);
    }

    pub fn explicit(&self) -> &ExplicitSet {
        &self.explicit
    }

    pub fn explicit_mut(&mut self) -> &mut ExplicitSet {
        &mut self.explicit
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// YAML dump of the values in insertion order
    pub fn to_text(&self) -> Result<String> {
        self.render(OutputFormat::Yaml)
    }

    /// Render the values in the requested format
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        let text = match format {
            OutputFormat::Yaml => serde_yaml::to_string(&self.root)?,
            OutputFormat::Json => serde_json::to_string_pretty(&self.root)? + "\n",
            OutputFormat::Toml => toml::to_string_pretty(&without_nulls(&self.root))?,
        };
        Ok(text)
    }
}

/// Recursive right-biased merge of `source` into `target`
pub fn merge_nodes(target: &mut Node, source: &Node) {
    for (key, incoming) in source {
        match (target.get_mut(key), incoming) {
            (Some(Value::Tree(existing)), Value::Tree(child)) => merge_nodes(existing, child),
            (Some(slot), _) => *slot = incoming.clone(),
            (None, _) => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}

/// Copy of `node` with null entries removed at every depth; TOML has no null
fn without_nulls(node: &Node) -> Node {
    node.iter()
        .filter_map(|(key, value)| Some((key.clone(), strip_null(value)?)))
        .collect()
}

fn strip_null(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Tree(child) => Some(Value::Tree(without_nulls(child))),
        Value::List(items) => Some(Value::List(items.iter().filter_map(strip_null).collect())),
        leaf => Some(leaf.clone()),
    }
}

/// Walk a dotted path, creating (or replacing leaves with) trees
fn ensure_node<'a>(mut node: &'a mut Node, dotted: &str) -> &'a mut Node {
    for segment in path::segments(dotted) {
        let slot = node.entry(segment.to_string()).or_insert_with(Value::tree);
        if !slot.is_tree() {
            *slot = Value::tree();
        }
        node = match slot {
            Value::Tree(child) => child,
            _ => unreachable!("slot was just replaced by a tree"),
        };
    }
    node
}

impl Index<&str> for ConfigTree {
    type Output = Value;

    /// Top-level key access; missing keys yield `Null`.
    /// Chain with `Value` indexing: `cfg["wallet"]["name"]`.
    fn index(&self, key: &str) -> &Value {
        self.root.get(key).unwrap_or(&NULL)
    }
}

impl fmt::Display for ConfigTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_text().map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl Serialize for ConfigTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConfigTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Node::deserialize(deserializer).map(Self::from_root)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn yaml(text: &str) -> ConfigTree {
        ConfigTree::from_yaml(text).unwrap()
    }

    #[test]
    fn test_set_creates_intermediate_trees() {
        let mut tree = ConfigTree::new();
        tree.set("wallet.name", "alice");
        tree.set("wallet.hotkey", "hot");
        tree.set("netuid", 3);

        assert_eq!(tree["wallet"]["name"], Value::from("alice"));
        assert_eq!(tree.get("wallet.hotkey"), Some(&Value::from("hot")));
        assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["wallet", "netuid"]);
        assert!(tree.explicit().is_empty());
    }

    #[test]
    fn test_set_replaces_leaf_with_tree() {
        let mut tree = ConfigTree::from_flat([("wallet", "flat")]);
        tree.set("wallet.name", "alice");
        assert_eq!(tree.lookup("wallet.name"), Some(&Value::from("alice")));
    }

    #[test]
    fn test_get_falls_back_to_tree_default() {
        let tree = ConfigTree::from_flat([("wallet.name", "alice")]).with_default(Value::Null);
        assert_eq!(tree.get("wallet.name"), Some(&Value::from("alice")));
        assert_eq!(tree.get("wallet.missing"), Some(&Value::Null));
        assert_eq!(tree.lookup("wallet.missing"), None);

        let bare = ConfigTree::new();
        let fallback = Value::from("fallback");
        assert_eq!(bare.get("anything"), None);
        assert_eq!(bare.get_or("anything", &fallback), &fallback);
    }

    #[test]
    fn test_get_mut_and_contains() {
        let mut tree = yaml("wallet:\n  name: alice\n");
        if let Some(value) = tree.get_mut("wallet.name") {
            *value = Value::from("bob");
        }
        assert_eq!(tree["wallet"]["name"], Value::from("bob"));
        assert!(tree.contains("wallet.name"));
        assert!(!tree.contains("wallet.name.deeper"));
        assert!(!tree.contains("wallet."));
    }

    #[test]
    fn test_from_loaded_not_implemented() {
        assert!(ConfigTree::from_loaded(None).unwrap().is_empty());
        assert!(ConfigTree::from_loaded(Some(Value::Null)).is_ok());

        let sources = [
            Value::Bool(true),
            Value::Bool(false),
            Value::Int(0),
            Value::from("config.yaml"),
            Value::from(""),
            Value::tree(),
            Value::List(vec![]),
        ];
        for source in sources {
            let err = ConfigTree::from_loaded(Some(source)).unwrap_err();
            assert!(matches!(err, ConfigError::NotImplemented(_)));
        }
    }

    #[test]
    fn test_merge_right_biased() {
        let mut a = yaml("wallet:\n  name: alice\n  hotkey: a_hot\nonly_a: 1\nshared: a\n");
        let b = yaml("wallet:\n  hotkey: b_hot\n  path: /b\nonly_b: 2\nshared: b\n");
        a.merge(&b);

        assert_eq!(a["wallet"]["name"], Value::from("alice"));
        assert_eq!(a["wallet"]["hotkey"], Value::from("b_hot"));
        assert_eq!(a["wallet"]["path"], Value::from("/b"));
        assert_eq!(a["only_a"], Value::Int(1));
        assert_eq!(a["only_b"], Value::Int(2));
        assert_eq!(a["shared"], Value::from("b"));
        assert_eq!(
            a.keys().collect::<Vec<_>>(),
            vec!["wallet", "only_a", "shared", "only_b"]
        );
    }

    #[test]
    fn test_merge_scalar_replaces_subtree() {
        let mut a = yaml("wallet:\n  name: alice\n");
        a.merge(&yaml("wallet: flat\n"));
        assert_eq!(a["wallet"], Value::from("flat"));

        let mut b = yaml("wallet: flat\n");
        b.merge(&yaml("wallet:\n  name: bob\n"));
        assert_eq!(b["wallet"]["name"], Value::from("bob"));
    }

    #[test]
    fn test_merge_deep_copies() {
        let mut a = ConfigTree::new();
        let mut b = yaml("wallet:\n  name: alice\n");
        a.merge(&b);
        b.set("wallet.name", "mutated");
        assert_eq!(a["wallet"]["name"], Value::from("alice"));
    }

    #[test]
    fn test_merge_leaves_explicit_untouched() {
        let mut a = ConfigTree::new();
        a.mark_explicit("wallet.name", true);
        let mut b = yaml("wallet:\n  name: bob\n");
        b.mark_explicit("wallet.name", false);
        b.mark_explicit("wallet.hotkey", true);

        a.merge(&b);
        assert!(a.is_set("wallet.name"));
        assert!(!a.explicit().contains("wallet.hotkey"));
    }

    #[test]
    fn test_merge_layer_prefers_later_flags() {
        let mut a = yaml("wallet:\n  name: alice\n");
        a.mark_explicit("wallet.name", true);
        a.mark_explicit("wallet.path", true);
        let mut b = yaml("wallet:\n  name: bob\n");
        b.mark_explicit("wallet.name", false);
        b.mark_explicit("wallet.hotkey", true);

        a.merge_layer(&b);
        assert_eq!(a["wallet"]["name"], Value::from("bob"));
        assert!(!a.is_set("wallet.name"));
        assert!(a.is_set("wallet.path"));
        assert!(a.is_set("wallet.hotkey"));
        assert_eq!(a.explicit().len(), 3);
    }

    #[test]
    fn test_fill_with_defaults_scenario() {
        let explicit = ExplicitSet::from_iter([("wallet.name", true), ("wallet.hotkey", false)]);
        let defaults = yaml("wallet:\n  name: ignored\n  hotkey: default_hot\n  path: /x\n");
        let mut tree = yaml("wallet:\n  name: alice\n  hotkey: old\n");

        tree.fill_with_defaults(&explicit, &defaults);

        assert_eq!(tree.get("wallet.name"), Some(&Value::from("alice")));
        assert_eq!(tree.get("wallet.hotkey"), Some(&Value::from("default_hot")));
        assert!(!tree.contains("wallet.path"));
    }

    #[test]
    fn test_fill_creates_missing_intermediates() {
        let explicit = ExplicitSet::from_iter([("axon.port", false)]);
        let defaults = yaml("axon:\n  port: 8091\n");
        let mut tree = yaml("axon: {}\n");

        tree.fill_with_defaults(&explicit, &defaults);
        assert_eq!(tree.get("axon.port"), Some(&Value::Int(8091)));
    }

    #[test]
    fn test_fill_ignores_foreign_top_level_keys() {
        let explicit = ExplicitSet::from_iter([("logging.debug", false), ("wallet.name", false)]);
        let defaults = yaml("logging:\n  debug: true\nwallet:\n  name: default\n");
        let mut tree = yaml("wallet:\n  name: alice\n");

        tree.fill_with_defaults(&explicit, &defaults);
        assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["wallet"]);
        assert_eq!(tree["wallet"]["name"], Value::from("default"));
    }

    #[test]
    fn test_fill_without_overlap_is_noop() {
        let explicit = ExplicitSet::from_iter([("logging.debug", false)]);
        let defaults = yaml("logging:\n  debug: true\n");
        let mut tree = yaml("wallet:\n  name: alice\n");
        let before = tree.clone();

        tree.fill_with_defaults(&explicit, &defaults);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_fill_does_not_mark_explicit() {
        let mut tree = yaml("wallet:\n  hotkey: old\n");
        tree.mark_explicit("wallet.hotkey", false);
        tree.apply_defaults(&yaml("wallet:\n  hotkey: default\n"));

        assert_eq!(tree["wallet"]["hotkey"], Value::from("default"));
        assert!(!tree.is_set("wallet.hotkey"));
        assert_eq!(tree.explicit().len(), 1);
    }

    #[test]
    fn test_to_text_hides_explicit_and_keeps_order() {
        let mut tree = ConfigTree::new();
        tree.set("zeta", 1);
        tree.set("alpha.name", "a");
        tree.mark_explicit("zeta", true);

        let text = tree.to_text().unwrap();
        assert_eq!(text, "zeta: 1\nalpha:\n  name: a\n");
        assert!(!text.contains("explicit"));
        assert_eq!(tree.to_string(), text);
    }

    #[test]
    fn test_render_formats() {
        let tree = yaml("wallet:\n  name: alice\n  port: 1\n");
        let json = tree.render(OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["wallet"]["name"], "alice");

        let toml_text = tree.render(OutputFormat::Toml).unwrap();
        assert!(toml_text.contains("[wallet]"));
        assert!(toml_text.contains("name = \"alice\""));
    }

    #[test]
    fn test_render_toml_skips_null_leaves() {
        let tree = yaml("wallet:\n  name: a\n  hotkey: ~\n  path: /w\n  peers: [x, ~]\n");

        let toml_text = tree.render(OutputFormat::Toml).unwrap();
        assert!(toml_text.contains("name = \"a\""));
        assert!(toml_text.contains("path = \"/w\""));
        assert!(!toml_text.contains("hotkey"));

        let reparsed: toml::Table = toml::from_str(&toml_text).unwrap();
        assert_eq!(reparsed["wallet"]["peers"].as_array().map(Vec::len), Some(1));

        // other formats keep the null
        assert!(tree.to_text().unwrap().contains("hotkey: null"));
        assert_eq!(tree["wallet"]["hotkey"], Value::Null);
    }

    #[test]
    fn test_fill_treats_empty_default_tree_as_leaf() {
        let mut tree = yaml("logging:\n  level: info\n");
        tree.mark_explicit("logging.sinks", false);
        tree.apply_defaults(&yaml("logging:\n  sinks: {}\n"));

        assert_eq!(tree["logging"]["sinks"], Value::tree());
    }

    #[test]
    fn test_yaml_round_trip_drops_explicit() {
        let mut tree = yaml("wallet:\n  name: alice\n  hotkey: ~\n  tags: [a, b]\n");
        tree.mark_explicit("wallet.name", true);

        let reparsed = ConfigTree::from_yaml(&tree.to_text().unwrap()).unwrap();
        assert_eq!(reparsed.root(), tree.root());
        assert!(reparsed.explicit().is_empty());
        assert!(ConfigTree::from_yaml("").unwrap().is_empty());
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            (-1000i64..1000).prop_map(Value::Int),
            "s_[a-z]{0,4}".prop_map(Value::String),
        ]
    }

    fn value() -> impl Strategy<Value = Value> {
        leaf().prop_recursive(3, 24, 4, |inner| {
            prop::collection::vec(("[a-d]", inner), 0..4)
                .prop_map(|entries| Value::Tree(entries.into_iter().collect()))
        })
    }

    fn node() -> impl Strategy<Value = Node> {
        prop::collection::vec(("[a-d]", value()), 0..5)
            .prop_map(|entries| entries.into_iter().collect())
    }

    fn check_merge(a: &Node, b: &Node, merged: &Node) -> std::result::Result<(), TestCaseError> {
        for (key, original) in a {
            if !b.contains_key(key) {
                prop_assert_eq!(merged.get(key), Some(original));
            }
        }
        for (key, incoming) in b {
            match (a.get(key), incoming) {
                (Some(Value::Tree(left)), Value::Tree(right)) => {
                    let Some(Value::Tree(result)) = merged.get(key) else {
                        return Err(TestCaseError::fail(format!("{key} lost its subtree")));
                    };
                    check_merge(left, right, result)?;
                }
                _ => prop_assert_eq!(merged.get(key), Some(incoming)),
            }
        }
        let union = a.keys().chain(b.keys().filter(|k| !a.contains_key(*k))).count();
        prop_assert_eq!(merged.len(), union);
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_merge_is_right_biased(a in node(), b in node()) {
            let mut merged = ConfigTree::from_root(a.clone());
            merged.merge(&ConfigTree::from_root(b.clone()));
            check_merge(&a, &b, merged.root())?;
        }

        #[test]
        fn prop_fill_is_idempotent_and_scoped(
            start in node(),
            defaults in node(),
            flags in prop::collection::vec(any::<Option<bool>>(), 32),
        ) {
            let defaults = ConfigTree::from_root(defaults);
            let explicit: ExplicitSet = path::flatten(defaults.root())
                .into_keys()
                .zip(flags)
                .filter_map(|(dotted, flag)| flag.map(|flag| (dotted, flag)))
                .collect();

            let mut once = ConfigTree::from_root(start.clone());
            once.fill_with_defaults(&explicit, &defaults);
            let mut twice = once.clone();
            twice.fill_with_defaults(&explicit, &defaults);

            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(once.keys().collect::<Vec<_>>(), start.keys().map(String::as_str).collect::<Vec<_>>());
            for dotted in path::flatten(defaults.root()).keys() {
                prop_assert!(!once.is_set(dotted));
            }
        }

        #[test]
        fn prop_yaml_round_trip(root in node()) {
            let tree = ConfigTree::from_root(root);
            let reparsed = ConfigTree::from_yaml(&tree.to_text().unwrap()).unwrap();
            prop_assert_eq!(reparsed.root(), tree.root());
        }
    }
}
