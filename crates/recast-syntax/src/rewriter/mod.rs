//! Template rewrite engine.
//!
//! A pass applies one rule to one file: the tree is scanned top-down for
//! before-template matches, every site is replaced end-to-start with the
//! instantiated after-template, the result is validated by re-parsing and
//! imports are fixed. [`Rewriter::run`] repeats passes until a fixed point.

mod cycle;
mod render;
mod rule;
mod state;

use std::borrow::Borrow;
use std::ops::Range;

use tracing::debug;

use crate::error::SyntaxError;
use crate::imports::fix_imports;
use crate::matcher::{MatchSite, Matcher};
use crate::parser::JavaParser;
use crate::tree::SyntaxTree;
use crate::types::LocalTypeOracle;

pub use cycle::CycleReport;
pub use rule::{ImportSpec, Predicate, RewriteRule, RewriteRuleBuilder};
pub use state::PassState;

use render::{find_with_parent, instantiate, needs_parens, precedence};
use state::{PASS_TARGET, PassTracker};

/// Result of applying one rule to one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteResult {
    output: String,
    applied: usize,
}

impl RewriteResult {
    /// Returns the rewritten source.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Consumes the result, returning the rewritten source.
    #[must_use]
    pub fn into_output(self) -> String {
        self.output
    }

    /// Returns the number of sites rewritten.
    #[must_use]
    pub const fn applied(&self) -> usize {
        self.applied
    }

    /// Returns whether any site was rewritten.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.applied > 0
    }
}

/// Engine for applying rewrite rules.
#[derive(Debug, Clone, Copy)]
pub struct Rewriter {
    fix_imports: bool,
}

impl Default for Rewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Rewriter {
    /// Creates a rewriter that fixes imports after each pass.
    #[must_use]
    pub const fn new() -> Self {
        Self { fix_imports: true }
    }

    /// Enables or disables import fix-up.
    #[must_use]
    pub const fn with_import_fixing(mut self, enabled: bool) -> Self {
        self.fix_imports = enabled;
        self
    }

    /// Parses `source` and applies `rule` once.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::Parse`] when `source` is not valid Java and
    /// [`SyntaxError::InternalInvariant`] when substitution breaks an
    /// invariant (unbound metavariable, overlapping sites, unparsable
    /// output).
    pub fn apply(&self, rule: &RewriteRule, source: &str) -> Result<RewriteResult, SyntaxError> {
        let mut tracker = PassTracker::new(rule.name());
        tracker.advance(PassState::Scanning);
        let mut parser = JavaParser::new().map_err(|e| tracker.fail(e))?;
        let tree = parser.parse(source).map_err(|e| tracker.fail(e))?;
        self.pass(&mut tracker, &mut parser, rule, &tree)
    }

    /// Applies `rule` once to an already parsed tree.
    ///
    /// # Errors
    ///
    /// As [`Rewriter::apply`], minus parse errors of the input.
    pub fn apply_tree(
        &self,
        rule: &RewriteRule,
        tree: &SyntaxTree,
    ) -> Result<RewriteResult, SyntaxError> {
        let mut tracker = PassTracker::new(rule.name());
        tracker.advance(PassState::Scanning);
        let mut parser = JavaParser::new().map_err(|e| tracker.fail(e))?;
        self.pass(&mut tracker, &mut parser, rule, tree)
    }

    /// Applies every rule of `recipe` in order, repeating until a cycle makes
    /// no change.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::NonConvergence`] when the source still changes
    /// after `max_cycles` changing cycles, or any error of a single pass.
    pub fn run<R>(
        &self,
        recipe: &[R],
        source: &str,
        max_cycles: usize,
    ) -> Result<CycleReport, SyntaxError>
    where
        R: Borrow<RewriteRule>,
    {
        cycle::run(self, recipe, source, max_cycles)
    }

    fn pass(
        &self,
        tracker: &mut PassTracker<'_>,
        parser: &mut JavaParser,
        rule: &RewriteRule,
        tree: &SyntaxTree,
    ) -> Result<RewriteResult, SyntaxError> {
        tracker.advance(PassState::Matching);
        let oracle = LocalTypeOracle::new(tree);
        let sites = collect_sites(rule, tree, &oracle);
        if sites.is_empty() {
            tracker.advance(PassState::Idle);
            return Ok(RewriteResult {
                output: tree.source().to_owned(),
                applied: 0,
            });
        }

        tracker.advance(PassState::Substituting);
        let applied = sites.len();
        let rewritten = substitute(rule, tree, &sites).map_err(|e| tracker.fail(e))?;
        let mut after = parser
            .try_parse(&rewritten)
            .map_err(|e| tracker.fail(e))?
            .ok_or_else(|| {
                tracker.fail(SyntaxError::internal_invariant(format!(
                    "rule {} produced invalid Java",
                    rule.name()
                )))
            })?;

        if self.fix_imports
            && let Some(fixed) = fix_imports(tree, &after, rule.imports())
        {
            after = parser
                .try_parse(&fixed)
                .map_err(|e| tracker.fail(e))?
                .ok_or_else(|| {
                    tracker.fail(SyntaxError::internal_invariant(format!(
                        "import fix-up for rule {} produced invalid Java",
                        rule.name()
                    )))
                })?;
        }

        tracker.advance(PassState::Reemitting);
        let output = after.print();
        debug!(
            target: PASS_TARGET,
            rule = rule.name(),
            applied,
            "rewrite pass complete"
        );
        tracker.advance(PassState::Idle);
        Ok(RewriteResult { output, applied })
    }
}

/// Matches every before-template in order. Sites of later templates that
/// overlap an earlier accepted site are dropped.
fn collect_sites<'t>(
    rule: &RewriteRule,
    tree: &'t SyntaxTree,
    oracle: &LocalTypeOracle,
) -> Vec<(usize, MatchSite<'t>)> {
    let mut accepted: Vec<(usize, MatchSite<'t>)> = Vec::new();
    for (index, before) in rule.templates().befores().iter().enumerate() {
        let found = Matcher::new(before, oracle)
            .find_all_where(tree.root(), |binding| rule.accepts(binding, oracle));
        for site in found {
            let span = site.span();
            if accepted.iter().any(|(_, other)| overlaps(&other.span(), &span)) {
                continue;
            }
            accepted.push((index, site));
        }
    }
    accepted.sort_by_key(|(_, site)| site.span().start);
    accepted
}

const fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// Replaces every site end-to-start, returning the new source text.
fn substitute(
    rule: &RewriteRule,
    tree: &SyntaxTree,
    sites: &[(usize, MatchSite<'_>)],
) -> Result<String, SyntaxError> {
    for pair in sites.windows(2) {
        if let [(_, first), (_, second)] = pair
            && overlaps(&first.span(), &second.span())
        {
            return Err(SyntaxError::internal_invariant(format!(
                "overlapping match sites {:?} and {:?}",
                first.span(),
                second.span()
            )));
        }
    }

    let after = rule.templates().after();
    let after_strength = after.root().map(precedence);
    let mut output = tree.source().to_owned();
    for (index, site) in sites.iter().rev() {
        let span = site.span();
        let mut replacement = instantiate(after, site.binding(), tree.source())?;

        let before_kind = rule
            .templates()
            .befores()
            .get(*index)
            .and_then(|template| template.root())
            .map(|root| root.kind());
        let wrap = match (before_kind, after_strength) {
            (Some(kind), Some(strength)) => find_with_parent(tree.root(), &span, kind)
                .is_some_and(|(parent, node)| needs_parens(parent, node, strength)),
            _ => false,
        };
        if wrap {
            replacement = format!("({replacement})");
        }

        if !output.is_char_boundary(span.start) || !output.is_char_boundary(span.end) {
            return Err(SyntaxError::internal_invariant(
                "match site is not on a UTF-8 boundary",
            ));
        }
        debug!(
            target: PASS_TARGET,
            rule = rule.name(),
            start = span.start,
            end = span.end,
            "substituting match site"
        );
        output.replace_range(span, &replacement);
    }
    Ok(output)
}
