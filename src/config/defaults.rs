//! Defaults Loader (Figment-based)
//!
//! Builds a defaults tree from two layers:
//! 1. Built-in defaults (Serialized)
//! 2. Environment variables (`BT_*` prefix, `_` splits nesting)
//!
//! `BT_WALLET_NAME=alice` becomes `wallet.name: alice`.
//!
//! [`DefaultsLoader::load`] lets figment type environment values (`8091`
//! becomes an integer). [`DefaultsLoader::load_verbatim`] keeps them as the
//! strings the environment holds, for settings such as names and paths.

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use tracing::debug;

use super::tree::ConfigTree;
use crate::constants::env::{DEFAULTS_PREFIX, KEY_SPLIT};
use crate::types::Result;

/// Defaults loader
pub struct DefaultsLoader;

impl DefaultsLoader {
    /// Layer `BT_*` environment variables over `builtin`
    pub fn load(builtin: &ConfigTree) -> Result<ConfigTree> {
        Self::load_with_prefix(builtin, DEFAULTS_PREFIX)
    }

    /// Layer environment variables carrying `prefix` over `builtin`
    pub fn load_with_prefix(builtin: &ConfigTree, prefix: &str) -> Result<ConfigTree> {
        let figment = Figment::new()
            .merge(Serialized::defaults(builtin))
            .merge(Env::prefixed(prefix).split(KEY_SPLIT));

        let defaults: ConfigTree = figment.extract()?;
        debug!(prefix, keys = defaults.len(), "Loaded configuration defaults");
        Ok(defaults)
    }

    /// Layer `prefix` environment variables over `builtin`, keeping every
    /// environment value a string (`BT_WALLET_NAME=1234` stays `"1234"`)
    pub fn load_verbatim(builtin: &ConfigTree, prefix: &str) -> Result<ConfigTree> {
        let env = Env::prefixed(prefix).split(KEY_SPLIT);
        let raw = ConfigTree::from_flat(
            env.iter()
                .map(|(key, value)| (key.as_str().to_ascii_lowercase(), value)),
        );

        let figment = Figment::new()
            .merge(Serialized::defaults(builtin))
            .merge(Serialized::defaults(&raw));

        let defaults: ConfigTree = figment.extract()?;
        debug!(prefix, keys = defaults.len(), "Loaded verbatim configuration defaults");
        Ok(defaults)
    }

    /// Environment variables carrying `prefix`, without built-in values
    pub fn from_env(prefix: &str) -> Result<ConfigTree> {
        Self::load_with_prefix(&ConfigTree::new(), prefix)
    }
}
