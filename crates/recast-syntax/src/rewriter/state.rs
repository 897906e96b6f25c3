//! Lifecycle of a single rewrite pass.

use tracing::{debug, trace};

use crate::error::SyntaxError;

pub(super) const PASS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::pass");

/// States of one rule applied to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    /// No pass is running.
    Idle,
    /// The target source is being parsed.
    Scanning,
    /// Before-templates are being matched.
    Matching,
    /// Match sites are being replaced and the result validated.
    Substituting,
    /// The rewritten tree is being printed.
    Reemitting,
    /// The pass failed; no output is produced.
    Error,
}

impl PassState {
    /// Returns whether the pass may move from `self` to `next`.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle | Self::Error, Self::Scanning)
                | (Self::Scanning, Self::Matching | Self::Error)
                | (Self::Matching, Self::Substituting | Self::Idle)
                | (Self::Substituting, Self::Reemitting | Self::Error)
                | (Self::Reemitting, Self::Idle)
        )
    }
}

/// Tracks and logs the state of one pass.
#[derive(Debug)]
pub(super) struct PassTracker<'r> {
    rule: &'r str,
    state: PassState,
}

impl<'r> PassTracker<'r> {
    pub(super) const fn new(rule: &'r str) -> Self {
        Self {
            rule,
            state: PassState::Idle,
        }
    }

    pub(super) fn advance(&mut self, next: PassState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid pass transition {:?} -> {next:?}",
            self.state
        );
        trace!(
            target: PASS_TARGET,
            rule = self.rule,
            from = ?self.state,
            to = ?next,
            "pass state transition"
        );
        self.state = next;
    }

    /// Moves to [`PassState::Error`] and hands the error back.
    pub(super) fn fail(&mut self, error: SyntaxError) -> SyntaxError {
        self.advance(PassState::Error);
        debug!(
            target: PASS_TARGET,
            rule = self.rule,
            error = %error,
            "rewrite pass failed"
        );
        error
    }

    #[cfg(test)]
    pub(super) const fn state(&self) -> PassState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PassState::Idle, PassState::Scanning, true)]
    #[case(PassState::Scanning, PassState::Error, true)]
    #[case(PassState::Matching, PassState::Idle, true)]
    #[case(PassState::Substituting, PassState::Error, true)]
    #[case(PassState::Reemitting, PassState::Idle, true)]
    #[case(PassState::Idle, PassState::Substituting, false)]
    #[case(PassState::Matching, PassState::Error, false)]
    #[case(PassState::Reemitting, PassState::Error, false)]
    fn transitions_follow_pass_lifecycle(
        #[case] from: PassState,
        #[case] to: PassState,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_advance_to(to), allowed);
    }

    #[test]
    fn fail_moves_to_error() {
        let mut tracker = PassTracker::new("Rule");
        tracker.advance(PassState::Scanning);
        let err = tracker.fail(SyntaxError::internal_invariant("boom"));
        assert_eq!(tracker.state(), PassState::Error);
        assert!(err.is_fatal());
    }
}
