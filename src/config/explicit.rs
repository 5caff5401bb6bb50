//! Explicit-Set Tracking
//!
//! Shadow map recording, per dotted path, whether the value currently in a
//! tree was supplied by the user or filled from a default.

use indexmap::IndexMap;

/// Dotted path -> "explicitly set by the user" flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplicitSet {
    flags: IndexMap<String, bool>,
}

impl ExplicitSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a flag for a path, replacing any earlier entry
    pub fn mark(&mut self, path: impl Into<String>, explicit: bool) {
        self.flags.insert(path.into(), explicit);
    }

    /// Recorded flag, `None` if the path was never tracked
    pub fn get(&self, path: &str) -> Option<bool> {
        self.flags.get(path).copied()
    }

    /// `true` only when the path is tracked and was explicitly set
    pub fn is_set(&self, path: &str) -> bool {
        self.get(path).unwrap_or(false)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.flags.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(path, flag)| (path.as_str(), *flag))
    }

    /// Paths the user set explicitly, in recording order
    pub fn explicit_paths(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|(_, flag)| *flag).map(|(path, _)| path)
    }

    /// Fold a later layer's flags into this one.
    ///
    /// Where both sides track a path, `other` wins.
    pub fn reconcile(&mut self, other: &ExplicitSet) {
        for (path, flag) in other.iter() {
            self.mark(path, flag);
        }
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for ExplicitSet {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<K: Into<String>> Extend<(K, bool)> for ExplicitSet {
    fn extend<I: IntoIterator<Item = (K, bool)>>(&mut self, iter: I) {
        for (path, flag) in iter {
            self.mark(path, flag);
        }
    }
}
