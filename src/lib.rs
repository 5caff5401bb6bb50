//! OpenConfig - Layered Configuration with Explicit-Set Tracking
//!
//! Hierarchical key-value configuration trees built from command-line
//! arguments, environment variables and built-in defaults. Every leaf
//! remembers whether the user set it explicitly, so defaults only fill what
//! the user left alone.
//!
//! ## Quick Start
//!
//! ```ignore
//! use openconfig::{ConfigTree, wallet};
//!
//! let mut defaults = ConfigTree::new();
//! wallet::add_defaults(&mut defaults)?;
//!
//! let mut config = wallet::config(&mut defaults, ["--wallet.name", "alice"])?;
//! config.apply_defaults(&defaults);
//! assert!(config.is_set("wallet.name"));
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration tree, merge and default filling
//! - [`cli`]: Argument parsing into configuration trees
//! - [`wallet`]: Wallet argument registration, defaults and validation

pub mod cli;
pub mod config;
pub mod constants;
pub mod types;
pub mod wallet;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{ConfigTree, DefaultsLoader, ExplicitSet, Node, OutputFormat, Value};

// Error Types
pub use types::error::{ConfigError, Result, ValidationError, ValidationErrorKind};

// =============================================================================
// Parsing Re-exports
// =============================================================================

pub use cli::args::{ParsedArgs, parse_config, parse_known, parse_strict};
pub use wallet::{ResolvedWallet, WalletOverrides, WalletSettings};
