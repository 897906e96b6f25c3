//! Command-line interface definitions for recast.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for command results.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Plain text for terminals.
    #[default]
    Human,
    /// A single JSON document.
    Json,
}

/// Command-line interface for the recast Java rewrite tool.
#[derive(Parser, Debug)]
#[command(name = "recast", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Lists every registered rule.
    List {
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },
    /// Prints the templates, constraints and imports of one rule.
    Show {
        /// Full rule name, for example `AssertJIntegerRules.AssertThatIsEvenRecipe`.
        #[arg(value_name = "RULE")]
        rule: String,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },
    /// Applies a rule or rule class to Java files.
    Run(RunArgs),
}

/// Arguments of `recast run`.
#[derive(clap::Args, Debug, Clone)]
pub(crate) struct RunArgs {
    /// Rule name or rule-class prefix.
    #[arg(value_name = "RECIPE")]
    pub(crate) recipe: String,
    /// Java files to rewrite.
    #[arg(value_name = "FILE", required = true)]
    pub(crate) files: Vec<PathBuf>,
    /// Reports what would change without writing any file.
    #[arg(long)]
    pub(crate) dry_run: bool,
    /// Overrides the configured cycle limit.
    #[arg(long, value_name = "N")]
    pub(crate) max_cycles: Option<usize>,
    /// Overrides the configured worker count.
    #[arg(long, value_name = "N")]
    pub(crate) jobs: Option<usize>,
    /// Records non-convergence per file instead of aborting.
    #[arg(long)]
    pub(crate) best_effort: bool,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub(crate) format: OutputFormat,
}
