//! Configuration Management
//!
//! Hierarchical configuration tree with layered resolution:
//! 1. Built-in defaults
//! 2. Environment variables (BT_*)
//! 3. Command-line arguments (highest priority, tracked as explicit)
//!
//! Defaults are filled only into leaves the user did not set explicitly.

mod defaults;
mod explicit;
mod format;
pub mod path;
mod tree;
mod value;

pub use defaults::DefaultsLoader;
pub use explicit::ExplicitSet;
pub use format::OutputFormat;
pub use tree::{ConfigTree, merge_nodes};
pub use value::{Node, Value};
