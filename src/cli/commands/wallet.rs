//! Wallet Command
//!
//! Resolve wallet configuration from command-line arguments.
//!
//! Usage:
//!   openconfig wallet [-f yaml|json|toml] [--strict] [--explicit] -- ARGS
//!   openconfig wallet --usage

use clap::Command;

use crate::cli::args::parse_config;
use crate::config::{ConfigTree, OutputFormat};
use crate::types::Result;
use crate::wallet::{self, WalletOverrides, WalletSettings};

/// Options for `openconfig wallet`
#[derive(Debug, Clone, Default)]
pub struct WalletCommandOptions {
    /// Raw wallet arguments (`--wallet.name alice ...`)
    pub args: Vec<String>,
    pub strict: bool,
    pub format: OutputFormat,
    /// Also print the explicit-set map
    pub show_explicit: bool,
}

/// Parse, fill defaults, validate and print the wallet configuration
pub fn run(options: WalletCommandOptions) -> Result<()> {
    let mut defaults = ConfigTree::new();
    wallet::add_defaults(&mut defaults)?;

    let command = wallet::add_args(Command::new("openconfig-wallet"), None, &mut defaults);
    let mut config = parse_config(command, options.strict, options.args)?;
    config.apply_defaults(&defaults);

    let resolved = WalletSettings::resolve(Some(&config), &WalletOverrides::default(), &defaults)?;
    print!("{}", resolved.config.render(options.format)?);

    if options.show_explicit {
        println!();
        println!("# Explicitly set:");
        for (path, explicit) in config.explicit().iter() {
            println!("#   {}: {}", path, explicit);
        }
    }
    Ok(())
}

/// Print usage for the wallet arguments
pub fn usage() -> Result<()> {
    let mut defaults = ConfigTree::new();
    wallet::add_defaults(&mut defaults)?;
    println!("{}", wallet::help(&defaults));
    Ok(())
}
