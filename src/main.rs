//! Command-line entry point: batch the INSERT statements of a SQL file.
//!
//! ```text
//! sql-batcher --test dump.sql --out batched.sql [-b 500] [-v]
//! ```
//!
//! The single-dash spellings `-test` and `-out` are accepted too.

use std::ffi::OsString;
use std::fs;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueHint};
use sql_batcher::{BatchConfig, batch_queries};
use tracing_subscriber::EnvFilter;

/// Merge the single-row INSERT statements of a SQL file into multi-row batches.
#[derive(Debug, Parser)]
#[command(name = "sql-batcher", version, about)]
struct Cli {
    /// SQL file to read.
    #[arg(long = "test", value_name = "PATH", value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// File to write the batched SQL to. Created or truncated.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    out: PathBuf,

    /// Rows per batched INSERT statement.
    #[arg(short, long, default_value_t = BatchConfig::DEFAULT_BATCH_SIZE)]
    batch_size: NonZeroUsize,

    /// Log at debug level unless `RUST_LOG` is set.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to batch statements: {0}")]
    Batch(#[from] sql_batcher::Error),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Rewrite `-test` and `-out` as their double-dash forms.
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| {
            let is_single_dash_long = arg.to_str().is_some_and(|arg| {
                ["-test", "-out"].iter().any(|flag| {
                    arg.strip_prefix(flag)
                        .is_some_and(|rest| rest.is_empty() || rest.starts_with('='))
                })
            });
            if is_single_dash_long {
                let mut long = OsString::from("-");
                long.push(&arg);
                long
            } else {
                arg
            }
        })
        .collect()
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let input = fs::read_to_string(&cli.input).map_err(|source| CliError::Read {
        path: cli.input.clone(),
        source,
    })?;
    tracing::info!(path = %cli.input.display(), bytes = input.len(), "read input");

    let output = batch_queries(&input, BatchConfig::new(cli.batch_size))?;

    fs::write(&cli.out, &output.sql).map_err(|source| CliError::Write {
        path: cli.out.clone(),
        source,
    })?;
    tracing::info!(
        path = %cli.out.display(),
        statements = output.stats.statements,
        rows = output.stats.rows,
        batches = output.stats.batches,
        tables = output.stats.groups,
        "wrote batched output"
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
