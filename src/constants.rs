//! Global Constants
//!
//! Centralized constants for configuration resolution and argument parsing.

/// Dotted path constants
pub mod path {
    /// Separator between nested keys in a dotted path (`wallet.name`)
    pub const SEPARATOR: char = '.';
}

/// Environment-driven defaults
pub mod env {
    /// Prefix for environment variables feeding the defaults tree.
    /// `BT_WALLET_NAME` resolves to `wallet.name`.
    pub const DEFAULTS_PREFIX: &str = "BT_";

    /// Segment separator inside environment variable names
    pub const KEY_SPLIT: &str = "_";
}

/// Argument parsing constants
pub mod cli {
    /// Flag that turns on strict parsing from the command line
    pub const STRICT_FLAG: &str = "strict";

    /// Exit status used for generic failures
    pub const FAILURE_EXIT_CODE: u8 = 1;

    /// Upper bound on retries while stripping unrecognized arguments
    pub const MAX_IGNORED_ARGUMENTS: usize = 256;
}

/// Wallet module defaults
pub mod wallet {
    /// Section name holding wallet settings
    pub const SECTION: &str = "wallet";

    /// Default wallet name
    pub const DEFAULT_NAME: &str = "default";

    /// Default hotkey name
    pub const DEFAULT_HOTKEY: &str = "default";

    /// Default wallet directory
    pub const DEFAULT_PATH: &str = "~/.bittensor/wallets/";
}
