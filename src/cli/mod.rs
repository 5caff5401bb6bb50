pub mod args;
pub mod commands;

pub use args::{ParsedArgs, parse_config, parse_known, parse_strict};
