//! Errors that stop a batch run.
//!
//! Per-file failures that do not abort the run are recorded in the
//! [`crate::BatchReport`] instead.

use std::path::PathBuf;
use std::sync::Arc;

use recast_syntax::SyntaxError;
use thiserror::Error;

/// Errors raised by [`crate::run_rule`] and [`crate::BatchReport::commit`].
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum BatchError {
    /// The worker pool could not be created.
    #[error("failed to start worker pool: {message}")]
    ThreadPool {
        /// Description of the failure.
        message: String,
    },

    /// The same file was named twice in one batch.
    #[error("file {} appears more than once in the batch", path.display())]
    DuplicateFile {
        /// Repeated path.
        path: PathBuf,
    },

    /// A fatal rewrite error aborted the run.
    #[error("run aborted while rewriting {}: {source}", path.display())]
    Aborted {
        /// File being rewritten.
        path: PathBuf,
        /// Underlying engine error.
        #[source]
        source: SyntaxError,
    },

    /// A rewritten file could not be written back.
    #[error("failed to write {}: {source}", path.display())]
    Commit {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl BatchError {
    /// Creates a [`BatchError::Commit`] error.
    #[must_use]
    pub fn commit(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Commit {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}
