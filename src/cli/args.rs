//! Argument Parsing
//!
//! Turns a `clap::Command` plus raw arguments into a [`ConfigTree`]:
//! - dotted argument ids (`wallet.name`) become nested keys
//! - arguments supplied on the command line are marked explicit
//! - parser defaults and environment values are tracked as not explicit
//! - arguments absent without a default are omitted
//!
//! Strict parsing fails on unrecognized arguments with the parser's usage
//! status (2). Non-strict parsing drops them and reports what was ignored.

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::{debug, warn};

use crate::config::{ConfigTree, Value};
use crate::constants::cli::{MAX_IGNORED_ARGUMENTS, STRICT_FLAG};
use crate::types::Result;

/// Result of a parse: the configuration and any arguments that were dropped
#[derive(Debug, Clone, Default)]
pub struct ParsedArgs {
    /// Parsed values with the explicit-set map seeded
    pub config: ConfigTree,
    /// Unrecognized arguments removed before parsing (non-strict only)
    pub ignored: Vec<String>,
}

/// Parse `args` against `command` into a configuration tree.
///
/// Strict mode is on when `strict` is true or `--strict` appears in `args`.
/// `args` excludes the binary name.
pub fn parse_config<I, T>(command: Command, strict: bool, args: I) -> Result<ConfigTree>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    let strict = strict || requests_strict(&args);

    let parsed = if strict {
        parse_strict(command, &args)?
    } else {
        parse_known(command, &args)?
    };
    Ok(parsed.config)
}

/// Parse failing on any unrecognized argument
pub fn parse_strict(command: Command, args: &[String]) -> Result<ParsedArgs> {
    let mut command = with_strict_flag(command);
    let argv = argv(&command, args);
    let matches = command.try_get_matches_from_mut(argv)?;

    Ok(ParsedArgs {
        config: collect(&command, &matches),
        ignored: Vec::new(),
    })
}

/// Parse known arguments, dropping unrecognized ones
pub fn parse_known(command: Command, args: &[String]) -> Result<ParsedArgs> {
    let mut command = with_strict_flag(command);
    let mut argv = argv(&command, args);
    let mut ignored = Vec::new();

    for _ in 0..=MAX_IGNORED_ARGUMENTS {
        match command.try_get_matches_from_mut(argv.clone()) {
            Ok(matches) => {
                if !ignored.is_empty() {
                    debug!(count = ignored.len(), "Parsed with unrecognized arguments dropped");
                }
                return Ok(ParsedArgs {
                    config: collect(&command, &matches),
                    ignored,
                });
            }
            Err(err) if err.kind() == ErrorKind::UnknownArgument => {
                let Some(invalid) = invalid_argument(&err) else {
                    return Err(err.into());
                };
                let removed = strip_unrecognized(&mut argv, &invalid);
                if removed.is_empty() {
                    return Err(err.into());
                }
                for token in &removed {
                    warn!(argument = %token, "Ignoring unrecognized argument");
                }
                ignored.extend(removed);
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(command
        .error(
            ErrorKind::TooManyValues,
            "too many unrecognized arguments",
        )
        .into())
}

/// Whether the raw arguments ask for strict parsing
fn requests_strict(args: &[String]) -> bool {
    let flag = format!("--{}", STRICT_FLAG);
    args.iter().any(|arg| *arg == flag)
}

/// Register `--strict` unless the command already has it
fn with_strict_flag(command: Command) -> Command {
    if command
        .get_arguments()
        .any(|arg| arg.get_id().as_str() == STRICT_FLAG)
    {
        return command;
    }
    command.arg(
        Arg::new(STRICT_FLAG)
            .long(STRICT_FLAG)
            .action(ArgAction::SetTrue)
            .help("If set, unrecognized arguments are an error"),
    )
}

fn argv(command: &Command, args: &[String]) -> Vec<String> {
    std::iter::once(command.get_name().to_string())
        .chain(args.iter().cloned())
        .collect()
}

fn invalid_argument(err: &clap::Error) -> Option<String> {
    match err.get(ContextKind::InvalidArg)? {
        ContextValue::String(arg) => Some(arg.clone()),
        _ => None,
    }
}

/// Remove an unrecognized argument from `argv`, returning what was removed.
///
/// An unknown flag takes the bare values that follow it along, the way an
/// unknown option would have consumed them. A bare unknown value is removed
/// from the end, where extra positionals trail.
fn strip_unrecognized(argv: &mut Vec<String>, invalid: &str) -> Vec<String> {
    let with_value = format!("{}=", invalid);
    let is_flag = invalid.starts_with('-');

    let position = if is_flag {
        argv.iter()
            .skip(1)
            .position(|token| token == invalid || token.starts_with(&with_value))
    } else {
        argv.iter().skip(1).rposition(|token| token == invalid)
    };
    let Some(start) = position.map(|index| index + 1) else {
        return Vec::new();
    };

    let mut end = start + 1;
    if is_flag && argv[start] == invalid {
        while end < argv.len() && !argv[end].starts_with('-') {
            end += 1;
        }
    }
    argv.drain(start..end).collect()
}

/// Build the tree and explicit-set map from parsed matches
fn collect(command: &Command, matches: &ArgMatches) -> ConfigTree {
    let mut config = ConfigTree::new();

    for arg in command.get_arguments() {
        let id = arg.get_id().as_str();
        let Some(source) = matches.value_source(id) else {
            continue;
        };
        let value = match arg.get_action() {
            ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong | ArgAction::Version => {
                continue;
            }
            ArgAction::SetTrue | ArgAction::SetFalse => Value::Bool(matches.get_flag(id)),
            ArgAction::Count => Value::Int(i64::from(matches.get_count(id))),
            _ => raw_value(matches, id),
        };

        config.set(id, value);
        config.mark_explicit(id, source == ValueSource::CommandLine);
    }

    config
}

/// One raw value becomes a string, several become a list
fn raw_value(matches: &ArgMatches, id: &str) -> Value {
    let Some(raw) = matches.get_raw(id) else {
        return Value::Null;
    };
    let mut values: Vec<Value> = raw
        .map(|value| Value::from(value.to_string_lossy().into_owned()))
        .collect();
    match values.len() {
        0 => Value::Null,
        1 => values.remove(0),
        _ => Value::List(values),
    }
}
