//! Batch runner applying recast recipes to Java files.
//!
//! [`run_rule`] rewrites a list of files on a rayon thread pool and returns a
//! [`BatchReport`] with one outcome per file. Rewritten sources are staged in
//! memory; [`BatchReport::commit`] writes them back atomically. A
//! [`CancellationToken`] lets the caller stop a run between files.

mod batch;
mod cancel;
mod commit;
mod error;

pub use batch::{BatchOptions, BatchReport, FileOutcome, FileReport, run_rule};
pub use cancel::CancellationToken;
pub use error::BatchError;

#[cfg(test)]
mod tests;
