//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use recast_rules::RuleError;
use recast_runner::BatchError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Rules(#[from] RuleError),
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error("failed to serialise output: {0}")]
    Serialise(serde_json::Error),
    #[error("failed to write output: {0}")]
    WriteOutput(#[from] io::Error),
}

impl AppError {
    /// Returns true when clap produced help or version text rather than an
    /// actual usage error.
    pub(crate) fn is_informational(&self) -> bool {
        matches!(
            self,
            Self::CliUsage(error) if matches!(
                error.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            )
        )
    }
}
