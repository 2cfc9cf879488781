//! `dotset` - query and summarize JSON or YAML documents with dotted paths.
//!
//! ```text
//! dotset extract 'users.{n}[age>=18].email' users.json
//! dotset stats age,country users.json --at users
//! cat orders.yaml | dotset --output csv count status
//! ```

mod commands;
mod input;
mod output;
mod serialize;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};

use crate::commands::{render, Command};
use crate::input::{read_document, InputFormat, RealEnv, RealStdin};
use crate::output::{OutputDestination, OutputMode};
use crate::settings::{Overrides, Settings};

#[derive(Debug, Parser)]
#[command(name = "dotset", version)]
#[command(about = "Extract values and statistics from JSON or YAML with dotted paths")]
struct Cli {
    /// Input decoding
    #[arg(long, global = true, value_enum)]
    input: Option<InputFormat>,

    /// Output format (auto: text on a terminal, JSON when piped)
    #[arg(long, global = true, value_enum)]
    output: Option<OutputMode>,

    /// Write the result to FILE instead of stdout
    #[arg(long, global = true, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Settings file (default: $DOTSET_CONFIG)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Decimal separator for numeric text
    #[arg(long, global = true, value_name = "CHAR")]
    decimal: Option<char>,

    /// Digit-grouping separator for numeric text
    #[arg(long, global = true, value_name = "CHAR")]
    thousands: Option<char>,

    /// More logging on stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            input: self.input,
            output: self.output,
            decimal: self.decimal,
            thousands: self.thousands,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref(), &RealEnv)?.apply(cli.overrides());
    tracing::debug!(?settings, "effective settings");

    let document = read_document(cli.command.file(), settings.input, &RealStdin)?;
    let report = cli.command.execute(&document, &settings)?;
    let text = render(&report, settings.output)?;
    if text.is_empty() {
        return Ok(());
    }
    OutputDestination::from_arg(cli.out)
        .write_text(&text)
        .context("failed to write output")
}

/// Logs to stderr. `-v`/`-q` take precedence over `RUST_LOG`; the default
/// level is `warn`.
fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = if quiet || verbose > 0 {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
