//! Wallet Configuration
//!
//! Argument registration, defaults and validation for the `wallet` section.
//! Key material is out of scope; this module only resolves where a wallet
//! lives and which hotkey it uses.
//!
//! Resolution order for each setting:
//! 1. Programmatic overrides ([`WalletOverrides`])
//! 2. Command-line arguments (`--wallet.name`, ...)
//! 3. `BT_WALLET_*` environment variables
//! 4. Built-in defaults

use clap::{Arg, ArgAction, Command};
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::args::parse_config;
use crate::config::{ConfigTree, DefaultsLoader, Value, path};
use crate::constants::env::DEFAULTS_PREFIX;
use crate::constants::wallet::{DEFAULT_HOTKEY, DEFAULT_NAME, DEFAULT_PATH, SECTION};
use crate::types::{ConfigError, Result};

const NAME: &str = "wallet.name";
const HOTKEY: &str = "wallet.hotkey";
const PATH: &str = "wallet.path";
const MOCK: &str = "wallet._mock";

// =============================================================================
// Argument registration
// =============================================================================

/// Register the wallet arguments on `command`.
///
/// With a prefix the arguments become `--{prefix}.wallet.*` and
/// `defaults[prefix].wallet` is pointed at the unprefixed wallet defaults.
/// Arguments the command already defines are left alone.
pub fn add_args(mut command: Command, prefix: Option<&str>, defaults: &mut ConfigTree) -> Command {
    if let Some(prefix) = prefix {
        let alias = path::join(prefix, SECTION);
        if !defaults.contains(&alias) {
            if let Some(wallet) = defaults.lookup(SECTION).cloned() {
                defaults.set(&alias, wallet);
            }
        }
    }

    let path_default = defaults
        .lookup(PATH)
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PATH)
        .to_string();

    let specs = [
        (
            NAME,
            "The name of the wallet to unlock for running bittensor (name mock is reserved for mocking this wallet)",
            None,
        ),
        (HOTKEY, "The name of the wallet's hotkey.", None),
        (PATH, "The path to your bittensor wallets", Some(path_default)),
    ];

    for (key, help, default) in specs {
        let id = match prefix {
            Some(prefix) => path::join(prefix, key),
            None => key.to_string(),
        };
        if command
            .get_arguments()
            .any(|arg| arg.get_id().as_str() == id)
        {
            debug!(argument = %id, "Wallet argument already registered");
            continue;
        }

        let mut arg = Arg::new(id.clone())
            .long(id)
            .help(help)
            .action(ArgAction::Set)
            .required(false);
        if let Some(default) = default {
            arg = arg.default_value(default);
        }
        command = command.arg(arg);
    }

    command
}

/// Built-in wallet defaults, before environment overrides
pub fn builtin_defaults() -> ConfigTree {
    ConfigTree::from_flat([
        (NAME, DEFAULT_NAME),
        (HOTKEY, DEFAULT_HOTKEY),
        (PATH, DEFAULT_PATH),
    ])
}

/// Replace `defaults.wallet` with built-in values overridden by `BT_WALLET_*`.
///
/// Environment values stay strings, so a wallet named `1234` is still a name.
pub fn add_defaults(defaults: &mut ConfigTree) -> Result<()> {
    let resolved = DefaultsLoader::load_verbatim(&builtin_defaults(), DEFAULTS_PREFIX)?;
    if let Some(wallet) = resolved.lookup(SECTION) {
        defaults.set(SECTION, wallet.clone());
    }
    Ok(())
}

/// Validate the wallet section of `config`.
///
/// Name and hotkey fall back to `defaults` when the config lacks them.
pub fn check_config(config: &ConfigTree, defaults: &ConfigTree) -> Result<()> {
    if !config.lookup(SECTION).is_some_and(Value::is_tree) {
        return Err(ConfigError::missing(SECTION));
    }

    match setting(config, defaults, NAME) {
        Some(Value::String(_)) => {}
        other => return Err(type_error(NAME, "string", other)),
    }
    match setting(config, defaults, HOTKEY) {
        Some(Value::String(_) | Value::Null) | None => {}
        other => return Err(type_error(HOTKEY, "string or null", other)),
    }
    match config.lookup(PATH) {
        Some(Value::String(_)) => {}
        other => return Err(type_error(PATH, "string", other)),
    }

    Ok(())
}

/// Parse wallet arguments into a configuration tree (non-strict)
pub fn config<I, T>(defaults: &mut ConfigTree, args: I) -> Result<ConfigTree>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let command = add_args(Command::new(SECTION), None, defaults);
    parse_config(command, false, args)
}

/// Rendered usage text for the wallet arguments
pub fn help(defaults: &ConfigTree) -> String {
    let mut scratch = defaults.clone();
    let mut command = add_args(
        Command::new(SECTION).about("Wallet location and hotkey selection"),
        None,
        &mut scratch,
    );
    command.render_help().to_string()
}

fn setting<'a>(config: &'a ConfigTree, defaults: &'a ConfigTree, key: &str) -> Option<&'a Value> {
    config.lookup(key).or_else(|| defaults.lookup(key))
}

fn type_error(field: &str, expected: &str, actual: Option<&Value>) -> ConfigError {
    match actual {
        Some(value) => ConfigError::wrong_type(field, expected, value.type_name()),
        None => ConfigError::missing(field),
    }
}

// =============================================================================
// Resolved settings
// =============================================================================

/// Programmatic overrides applied on top of parsed configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletOverrides {
    pub name: Option<String>,
    pub hotkey: Option<String>,
    pub path: Option<String>,
    pub mock: Option<bool>,
}

/// Wallet location after every layer has been applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletSettings {
    pub name: String,
    pub hotkey: Option<String>,
    pub path: String,
    pub mock: bool,
}

/// Settings together with the configuration they were read from
#[derive(Debug, Clone)]
pub struct ResolvedWallet {
    pub settings: WalletSettings,
    pub config: ConfigTree,
}

impl WalletSettings {
    /// Resolve settings from `config` (parsed from no arguments when absent),
    /// with `overrides` written into a copy of it before validation.
    pub fn resolve(
        config: Option<&ConfigTree>,
        overrides: &WalletOverrides,
        defaults: &ConfigTree,
    ) -> Result<ResolvedWallet> {
        let mut config = match config {
            Some(config) => config.clone(),
            None => self::config(&mut defaults.clone(), Vec::<String>::new())?,
        };

        if let Some(name) = &overrides.name {
            config.set(NAME, name.as_str());
        }
        if let Some(hotkey) = &overrides.hotkey {
            config.set(HOTKEY, hotkey.as_str());
        }
        if let Some(path) = &overrides.path {
            config.set(PATH, path.as_str());
        }
        if let Some(mock) = overrides.mock {
            config.set(MOCK, mock);
        }

        check_config(&config, defaults)?;

        let name = setting(&config, defaults, NAME)
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_NAME)
            .to_string();
        let hotkey = setting(&config, defaults, HOTKEY)
            .and_then(Value::as_str)
            .map(str::to_string);
        let path = config
            .lookup(PATH)
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PATH)
            .to_string();
        let mock = config.lookup(MOCK).and_then(Value::as_bool).unwrap_or(false);

        info!(name = %name, path = %path, mock, "Resolved wallet settings");

        Ok(ResolvedWallet {
            settings: WalletSettings {
                name,
                hotkey,
                path,
                mock,
            },
            config,
        })
    }
}
