//! Command-line runtime for recast.
//!
//! The runtime splits global configuration flags from the subcommand, loads
//! the layered [`recast_config::Config`], installs logging and dispatches to
//! `list`, `show` or `run`. Streams and the configuration loader are
//! parameters so tests can drive the whole CLI in process.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use recast_config::Config;
use recast_rules::{RuleRegistry, load_registry};
use recast_runner::{BatchOptions, CancellationToken, run_rule};
use tracing::info;

mod cli;
mod config;
mod errors;
mod output;
mod telemetry;

use cli::{Cli, CliCommand, RunArgs};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
use config::{prepare_cli_arguments, split_config_arguments};
pub(crate) use errors::AppError;

/// Bundles the output streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) const fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    run_with_loader(args, &mut io, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    io: &mut IoStreams<'_, W, E>,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);
    let cli_arguments = prepare_cli_arguments(&args, &split);

    let result = Cli::try_parse_from(cli_arguments)
        .map_err(AppError::CliUsage)
        .and_then(|cli| {
            loader
                .load(&split.config_arguments)
                .map(|loaded| (cli, loaded))
        })
        .and_then(|(cli, loaded)| {
            telemetry::initialise(&loaded)?;
            execute(cli.command, &loaded, io)
        });

    match result {
        Ok(exit_code) => exit_code,
        Err(error) if error.is_informational() => {
            let _ = write!(io.stdout, "{error}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            let _ = writeln!(io.stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn execute<W: Write, E: Write>(
    command: CliCommand,
    config: &Config,
    io: &mut IoStreams<'_, W, E>,
) -> Result<ExitCode, AppError> {
    let registry = load_registry(config.rules_path())?;
    match command {
        CliCommand::List { format } => {
            output::render_rule_list(&mut *io.stdout, &registry, format)?;
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Show { rule, format } => {
            let found = registry.lookup(&rule)?;
            output::render_rule(&mut *io.stdout, &found, format)?;
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Run(args) => execute_run(&args, config, &registry, io),
    }
}

fn execute_run<W: Write, E: Write>(
    args: &RunArgs,
    config: &Config,
    registry: &RuleRegistry,
    io: &mut IoStreams<'_, W, E>,
) -> Result<ExitCode, AppError> {
    let recipe = registry.recipe(&args.recipe)?;
    let options = BatchOptions::new()
        .with_max_cycles(args.max_cycles.unwrap_or(config.max_cycles))
        .with_jobs(args.jobs.unwrap_or(config.jobs))
        .with_best_effort(args.best_effort || config.best_effort);
    info!(
        recipe = %args.recipe,
        rules = recipe.len(),
        files = args.files.len(),
        dry_run = args.dry_run,
        "running recipe"
    );

    let report = run_rule(&recipe, &args.files, options, &CancellationToken::new())?;
    if !args.dry_run {
        report.commit()?;
    }
    output::render_batch(&mut *io.stdout, &args.recipe, &report, args.dry_run, args.format)?;

    if report.failed() > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

#[cfg(test)]
mod tests;
