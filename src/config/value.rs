//! Configuration Values
//!
//! Tagged value type stored in a [`ConfigTree`](super::ConfigTree).
//! A value is either a leaf (scalar or list) or a nested, insertion-ordered
//! [`Node`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

use crate::constants::path::SEPARATOR;

/// Insertion-ordered mapping of keys to values
pub type Node = IndexMap<String, Value>;

pub(crate) static NULL: Value = Value::Null;

/// A configuration value
///
/// Serialized untagged so that YAML, JSON and TOML dumps read like plain
/// documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Tree(Node),
}

impl Value {
    /// Create an empty nested tree
    pub fn tree() -> Self {
        Value::Tree(Node::new())
    }

    /// Leaves are everything except nested trees
    pub fn is_leaf(&self) -> bool {
        !self.is_tree()
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, Value::Tree(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Node> {
        match self {
            Value::Tree(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_tree_mut(&mut self) -> Option<&mut Node> {
        match self {
            Value::Tree(node) => Some(node),
            _ => None,
        }
    }

    /// Short type name used in validation messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Tree(_) => "tree",
        }
    }

    /// Look up a dotted path below this value.
    ///
    /// An empty path returns the value itself.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(self);
        }
        path.split(SEPARATOR)
            .try_fold(self, |current, key| current.as_tree()?.get(key))
    }
}

impl Index<&str> for Value {
    type Output = Value;

    /// Key-style access on a single level; missing keys and leaves yield `Null`.
    fn index(&self, key: &str) -> &Value {
        self.as_tree().and_then(|node| node.get(key)).unwrap_or(&NULL)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Tree(node) => {
                write!(f, "{{")?;
                for (i, (key, item)) in node.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, item)?;
                }
                write!(f, "}}")
            }
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::Tree(node)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
