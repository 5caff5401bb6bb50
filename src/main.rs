use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use openconfig::ConfigError;
use openconfig::config::OutputFormat;

/// Parse output format from string
fn parse_output_format(s: &str) -> Result<OutputFormat, String> {
    s.parse()
}

#[derive(Parser)]
#[command(name = "openconfig")]
#[command(
    version,
    about = "Layered configuration with explicit-set tracking for wallet settings"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve wallet configuration from arguments, environment and defaults
    Wallet {
        #[arg(long, help = "Fail on unrecognized wallet arguments")]
        strict: bool,
        #[arg(
            short = 'f',
            long,
            default_value = "yaml",
            value_parser = parse_output_format,
            help = "Output format: yaml, json, toml"
        )]
        format: OutputFormat,
        #[arg(long, help = "Show which settings were set explicitly")]
        explicit: bool,
        #[arg(long, help = "Show usage for the wallet arguments")]
        usage: bool,
        #[arg(
            trailing_var_arg = true,
            allow_hyphen_values = true,
            help = "Wallet arguments, e.g. --wallet.name alice"
        )]
        args: Vec<String>,
    },

    /// Show defaults resolved from built-in values and BT_* environment variables
    Defaults {
        #[arg(
            short = 'f',
            long,
            default_value = "yaml",
            value_parser = parse_output_format,
            help = "Output format: yaml, json, toml"
        )]
        format: OutputFormat,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mopenconfig encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<ConfigError>() {
            Some(err) => {
                // Parser errors carry their own formatting and status
                if let ConfigError::Cli(parse_err) = err {
                    let _ = parse_err.print();
                } else {
                    eprintln!("\x1b[31mError:\x1b[0m {}", err);
                }
                ExitCode::from(err.exit_code())
            }
            None => {
                eprintln!("\x1b[31mError:\x1b[0m {}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Wallet {
            strict,
            format,
            explicit,
            usage,
            args,
        } => {
            use openconfig::cli::commands::wallet::{WalletCommandOptions, run, usage as show_usage};

            if usage {
                show_usage()?;
            } else {
                run(WalletCommandOptions {
                    args,
                    strict,
                    format,
                    show_explicit: explicit,
                })?;
            }
        }
        Commands::Defaults { format } => {
            openconfig::cli::commands::defaults::run(format)?;
        }
    }

    Ok(())
}
