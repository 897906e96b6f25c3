//! Parallel rewriting of a batch of files.
//!
//! Every file is owned end-to-end by one worker of a rayon pool: the worker
//! reads it, drives the recipe to a fixed point and stages the result in
//! memory. Nothing touches the disk until [`BatchReport::commit`].

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use recast_syntax::{RewriteRule, Rewriter};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::commit::write_atomically;
use crate::error::BatchError;

/// Tuning for a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    max_cycles: usize,
    jobs: usize,
    best_effort: bool,
}

impl BatchOptions {
    /// Default limit on rewrite cycles per file.
    pub const DEFAULT_MAX_CYCLES: usize = 2;

    /// Creates options with the default cycle limit, one worker per
    /// available core and fatal errors aborting the run.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_cycles: Self::DEFAULT_MAX_CYCLES,
            jobs: 0,
            best_effort: false,
        }
    }

    /// Sets the cycle limit.
    #[must_use]
    pub const fn with_max_cycles(mut self, max_cycles: usize) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// Sets the worker count; `0` uses the available parallelism.
    #[must_use]
    pub const fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Records fatal errors per file instead of aborting the run.
    #[must_use]
    pub const fn with_best_effort(mut self, best_effort: bool) -> Self {
        self.best_effort = best_effort;
        self
    }

    /// Returns the cycle limit.
    #[must_use]
    pub const fn max_cycles(self) -> usize {
        self.max_cycles
    }

    /// Returns the requested worker count.
    #[must_use]
    pub const fn jobs(self) -> usize {
        self.jobs
    }

    /// Returns whether fatal errors are recorded rather than propagated.
    #[must_use]
    pub const fn best_effort(self) -> bool {
        self.best_effort
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// No rule matched.
    Unchanged,
    /// The recipe changed the file.
    Rewritten {
        /// Number of sites rewritten across all cycles.
        applied: usize,
        /// Number of cycles that made changes.
        cycles: usize,
    },
    /// The file could not be read, parsed or rewritten.
    Failed {
        /// Description of the failure.
        error: String,
    },
    /// The run was cancelled before the file was started.
    Skipped,
}

/// Outcome for one file plus its staged output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    path: PathBuf,
    #[serde(flatten)]
    outcome: FileOutcome,
    #[serde(skip)]
    output: Option<String>,
}

impl FileReport {
    fn new(path: &Path, outcome: FileOutcome) -> Self {
        Self {
            path: path.to_path_buf(),
            outcome,
            output: None,
        }
    }

    fn failed(path: &Path, error: &impl std::fmt::Display) -> Self {
        Self::new(
            path,
            FileOutcome::Failed {
                error: error.to_string(),
            },
        )
    }

    /// Returns the file path as given to the batch.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the outcome.
    #[must_use]
    pub const fn outcome(&self) -> &FileOutcome {
        &self.outcome
    }

    /// Returns the rewritten source, staged but not yet written.
    #[must_use]
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }
}

/// Outcomes of a batch run, in the order the files were given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    files: Vec<FileReport>,
}

impl BatchReport {
    /// Returns the per-file reports.
    #[must_use]
    pub fn files(&self) -> &[FileReport] {
        &self.files
    }

    /// Returns the number of rewritten files.
    #[must_use]
    pub fn rewritten(&self) -> usize {
        self.count(|outcome| matches!(outcome, FileOutcome::Rewritten { .. }))
    }

    /// Returns the number of unchanged files.
    #[must_use]
    pub fn unchanged(&self) -> usize {
        self.count(|outcome| matches!(outcome, FileOutcome::Unchanged))
    }

    /// Returns the number of failed files.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, FileOutcome::Failed { .. }))
    }

    /// Returns the number of skipped files.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, FileOutcome::Skipped))
    }

    fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files
            .iter()
            .filter(|file| predicate(&file.outcome))
            .count()
    }

    /// Writes every rewritten file back to disk and returns how many were
    /// written.
    ///
    /// Each file is replaced atomically. Writing stops at the first failure;
    /// files written before it keep their new content.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Commit`] if a file cannot be written.
    pub fn commit(&self) -> Result<usize, BatchError> {
        let mut written = 0;
        for file in &self.files {
            if let Some(output) = &file.output {
                write_atomically(&file.path, output)?;
                debug!(path = %file.path.display(), "committed rewritten file");
                written += 1;
            }
        }
        info!(files = written, "committed batch");
        Ok(written)
    }
}

/// Applies `recipe` to every file in `files`.
///
/// Parse errors and unreadable files are recorded per file. Non-convergence
/// and invariant violations abort the run with [`BatchError::Aborted`]
/// unless [`BatchOptions::with_best_effort`] is set.
///
/// # Errors
///
/// Returns an error if a path repeats, the worker pool cannot start, or a
/// fatal rewrite error occurs outside best-effort mode.
pub fn run_rule<R>(
    recipe: &[R],
    files: &[PathBuf],
    options: BatchOptions,
    cancel: &CancellationToken,
) -> Result<BatchReport, BatchError>
where
    R: Borrow<RewriteRule> + Sync,
{
    reject_duplicates(files)?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.jobs)
        .build()
        .map_err(|err| BatchError::ThreadPool {
            message: err.to_string(),
        })?;
    info!(
        files = files.len(),
        rules = recipe.len(),
        jobs = pool.current_num_threads(),
        "starting batch"
    );

    let abort = CancellationToken::new();
    let results: Vec<Result<FileReport, BatchError>> = pool.install(|| {
        files
            .par_iter()
            .map(|path| rewrite_file(recipe, path, options, cancel, &abort))
            .collect()
    });
    let report = BatchReport {
        files: results.into_iter().collect::<Result<_, _>>()?,
    };
    info!(
        rewritten = report.rewritten(),
        unchanged = report.unchanged(),
        failed = report.failed(),
        skipped = report.skipped(),
        "finished batch"
    );
    Ok(report)
}

fn reject_duplicates(files: &[PathBuf]) -> Result<(), BatchError> {
    let mut seen = HashSet::with_capacity(files.len());
    for path in files {
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.clone());
        if !seen.insert(key) {
            return Err(BatchError::DuplicateFile { path: path.clone() });
        }
    }
    Ok(())
}

fn rewrite_file<R>(
    recipe: &[R],
    path: &Path,
    options: BatchOptions,
    cancel: &CancellationToken,
    abort: &CancellationToken,
) -> Result<FileReport, BatchError>
where
    R: Borrow<RewriteRule>,
{
    if cancel.is_cancelled() || abort.is_cancelled() {
        debug!(path = %path.display(), "skipping file after cancellation");
        return Ok(FileReport::new(path, FileOutcome::Skipped));
    }
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read file");
            return Ok(FileReport::failed(path, &err));
        }
    };

    match Rewriter::new().run(recipe, &source, options.max_cycles) {
        Ok(report) if report.output() == source => {
            Ok(FileReport::new(path, FileOutcome::Unchanged))
        }
        Ok(report) => {
            debug!(
                path = %path.display(),
                applied = report.applied(),
                cycles = report.cycles_with_changes(),
                "rewrote file"
            );
            let outcome = FileOutcome::Rewritten {
                applied: report.applied(),
                cycles: report.cycles_with_changes(),
            };
            Ok(FileReport {
                output: Some(report.into_output()),
                ..FileReport::new(path, outcome)
            })
        }
        Err(err) if err.is_fatal() && !options.best_effort => {
            warn!(path = %path.display(), error = %err, "aborting batch");
            abort.cancel();
            Err(BatchError::Aborted {
                path: path.to_path_buf(),
                source: err,
            })
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to rewrite file");
            Ok(FileReport::failed(path, &err))
        }
    }
}
