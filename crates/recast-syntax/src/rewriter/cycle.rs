//! Fixed-point driver: repeats rewrite cycles until nothing changes.

use std::borrow::Borrow;

use tracing::{debug, warn};

use super::state::PASS_TARGET;
use super::{RewriteRule, Rewriter};
use crate::error::SyntaxError;

/// Outcome of running a recipe to a fixed point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    output: String,
    cycles_run: usize,
    cycles_with_changes: usize,
    applied: usize,
}

impl CycleReport {
    /// Returns the final source.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Consumes the report, returning the final source.
    #[must_use]
    pub fn into_output(self) -> String {
        self.output
    }

    /// Returns the number of cycles executed, including the final cycle
    /// that made no change. Never exceeds the cycle limit.
    #[must_use]
    pub const fn cycles_run(&self) -> usize {
        self.cycles_run
    }

    /// Returns the number of cycles that changed the source.
    #[must_use]
    pub const fn cycles_with_changes(&self) -> usize {
        self.cycles_with_changes
    }

    /// Returns the total number of sites rewritten across all cycles.
    #[must_use]
    pub const fn applied(&self) -> usize {
        self.applied
    }

    /// Returns whether the source changed at all.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.cycles_with_changes > 0
    }
}

/// Runs `recipe` for up to `max_cycles` changing cycles. When the last
/// allowed cycle changes the source, one more pass checks for a fixed point
/// without counting as a cycle.
pub(super) fn run<R>(
    rewriter: &Rewriter,
    recipe: &[R],
    source: &str,
    max_cycles: usize,
) -> Result<CycleReport, SyntaxError>
where
    R: Borrow<RewriteRule>,
{
    let limit = max_cycles.max(1);
    let mut current = source.to_owned();
    let mut last_diff = String::new();
    let mut cycles_with_changes = 0;
    let mut applied = 0;

    for cycle in 1..=limit.saturating_add(1) {
        let (next, cycle_applied) = run_cycle(rewriter, recipe, &current)?;

        if next == current {
            debug!(target: PASS_TARGET, cycle, "fixed point reached");
            return Ok(CycleReport {
                output: current,
                cycles_run: cycle.min(limit),
                cycles_with_changes,
                applied,
            });
        }

        if cycle > limit {
            warn!(
                target: PASS_TARGET,
                cycles = limit,
                "recipe did not converge"
            );
            return Err(SyntaxError::non_convergence(limit, last_diff));
        }

        cycles_with_changes += 1;
        applied += cycle_applied;
        last_diff = line_diff(&current, &next);
        current = next;
        debug!(
            target: PASS_TARGET,
            cycle,
            applied = cycle_applied,
            "cycle changed source"
        );
    }

    Err(SyntaxError::internal_invariant("cycle loop exited early"))
}

/// Applies every rule once, in order.
fn run_cycle<R>(
    rewriter: &Rewriter,
    recipe: &[R],
    source: &str,
) -> Result<(String, usize), SyntaxError>
where
    R: Borrow<RewriteRule>,
{
    let mut output = source.to_owned();
    let mut applied = 0;
    for rule in recipe {
        let result = rewriter.apply(rule.borrow(), &output)?;
        applied += result.applied();
        output = result.into_output();
    }
    Ok((output, applied))
}

/// Renders the lines that differ between `old` and `new`, after removing the
/// common leading and trailing lines.
pub(super) fn line_diff(old: &str, new: &str) -> String {
    let old_lines: Vec<_> = old.lines().collect();
    let new_lines: Vec<_> = new.lines().collect();

    let prefix = old_lines
        .iter()
        .zip(&new_lines)
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = old_lines
        .iter()
        .rev()
        .zip(new_lines.iter().rev())
        .take_while(|(a, b)| a == b)
        .count()
        .min(old_lines.len().min(new_lines.len()) - prefix);

    let removed = old_lines.get(prefix..old_lines.len() - suffix).unwrap_or_default();
    let added = new_lines.get(prefix..new_lines.len() - suffix).unwrap_or_default();
    removed
        .iter()
        .map(|line| format!("-{line}\n"))
        .chain(added.iter().map(|line| format!("+{line}\n")))
        .collect()
}
