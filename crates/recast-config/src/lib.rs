//! Layered configuration for recast.
//!
//! [`Config`] merges, from lowest to highest precedence, built-in defaults,
//! a TOML file named by `--config-path` or `RECAST_CONFIG_PATH`,
//! `RECAST_*` environment variables and command-line flags.
//!
//! ```toml
//! max_cycles = 3
//! jobs = 4
//! best_effort = true
//! rules_path = "rules/"
//! log_filter = "recast_syntax=debug"
//! log_format = "json"
//! ```

mod defaults;
mod logging;

use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_MAX_CYCLES, default_jobs, default_log_filter,
    default_log_filter_string, default_log_format, default_max_cycles, default_rules_path,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration shared by the command line and the batch runner.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "RECAST")]
pub struct Config {
    /// Maximum rewrite cycles per file before reporting non-convergence.
    #[ortho_config(default = default_max_cycles())]
    pub max_cycles: usize,
    /// Worker threads for batch runs; `0` uses the available parallelism.
    #[ortho_config(default = default_jobs())]
    pub jobs: usize,
    /// Record fatal rewrite errors per file instead of aborting the run.
    #[ortho_config(default = false)]
    pub best_effort: bool,
    /// Rule file or directory loaded alongside the built-in catalog.
    pub rules_path: Option<PathBuf>,
    /// `tracing` filter expression.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_cycles: default_max_cycles(),
            jobs: default_jobs(),
            best_effort: false,
            rules_path: default_rules_path(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Returns the cycle limit.
    #[must_use]
    pub const fn max_cycles(&self) -> usize {
        self.max_cycles
    }

    /// Returns the worker count.
    #[must_use]
    pub const fn jobs(&self) -> usize {
        self.jobs
    }

    /// Returns whether best-effort mode is enabled.
    #[must_use]
    pub const fn best_effort(&self) -> bool {
        self.best_effort
    }

    /// Returns the configured rule file or directory.
    #[must_use]
    pub fn rules_path(&self) -> Option<&Path> {
        self.rules_path.as_deref()
    }

    /// Returns the log filter expression.
    #[must_use]
    pub const fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_values() {
        let config = Config::default();
        assert_eq!(config.max_cycles(), 2);
        assert_eq!(config.jobs(), 0);
        assert!(!config.best_effort());
        assert_eq!(config.rules_path(), None);
        assert_eq!(config.log_filter(), "warn");
        assert_eq!(config.log_format(), LogFormat::Compact);
    }
}
