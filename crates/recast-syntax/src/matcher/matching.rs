//! Matching algorithms for the [`Matcher`](super::Matcher) implementation.

use crate::matcher::binding::Binding;
use crate::metavariables::{MetaVarKind, MetaVariable};
use crate::template::Template;
use crate::tree::SyntaxNode;
use crate::types::{TypeConstraint, TypeOracle};

/// Shared state for one template matched against one target tree.
pub(super) struct MatchContext<'p> {
    pub(super) template: &'p Template,
    pub(super) oracle: &'p dyn TypeOracle,
}

impl MatchContext<'_> {
    /// Matches a single-root template against `target`.
    pub(super) fn match_root<'t>(&self, target: &'t SyntaxNode) -> Option<Binding<'t>> {
        let root = self.template.root()?;
        let mut binding = Binding::default();
        self.nodes_match(target, root, &mut binding)
            .then_some(binding)
    }

    /// Matches a sequence template against exactly the nodes in `targets`.
    pub(super) fn match_run<'t>(&self, targets: &'t [SyntaxNode]) -> Option<Binding<'t>> {
        let anchor = targets.first().map_or(0, |node| node.span().start);
        let mut binding = Binding::default();
        SequenceMatcher {
            anchor,
            source_children: targets,
            pattern_children: self.template.root_nodes(),
            ctx: self,
        }
        .matches(0, 0, &mut binding)
        .then_some(binding)
    }

    /// Checks whether `target` matches `pattern`, handling metavariables,
    /// kind comparison, leaf text comparison, and delegating to child
    /// matching. Updates `binding` if the match succeeds.
    fn nodes_match<'t>(
        &self,
        target: &'t SyntaxNode,
        pattern: &SyntaxNode,
        binding: &mut Binding<'t>,
    ) -> bool {
        if let Some(metavar) = self.template.metavariable_at(pattern) {
            return match metavar.kind {
                MetaVarKind::Single => {
                    target.is_named()
                        && self.admits(metavar, target)
                        && binding.bind_single(&metavar.name, target)
                }
                MetaVarKind::Multiple => binding.bind_sequence(
                    &metavar.name,
                    std::slice::from_ref(target),
                    target.span().start,
                ),
            };
        }

        if target.kind() != pattern.kind() {
            return false;
        }

        if pattern.is_leaf() || target.is_leaf() {
            return pattern.token_text() == target.token_text();
        }

        self.match_children(target, pattern, binding)
    }

    fn admits(&self, metavar: &MetaVariable, target: &SyntaxNode) -> bool {
        let constraint = self.template.constraint(&metavar.name);
        if *constraint == TypeConstraint::Any {
            return true;
        }
        constraint.admits(self.oracle.type_of(target).as_ref())
    }

    fn is_multiple(&self, pattern: &SyntaxNode) -> bool {
        self.template
            .metavariable_at(pattern)
            .is_some_and(|metavar| metavar.kind == MetaVarKind::Multiple)
    }

    /// Matches children pairwise, or with backtracking when the pattern
    /// contains a `$$$` child.
    fn match_children<'t>(
        &self,
        target: &'t SyntaxNode,
        pattern: &SyntaxNode,
        binding: &mut Binding<'t>,
    ) -> bool {
        let source_children = target.children();
        let pattern_children = pattern.children();

        if pattern_children.iter().any(|child| self.is_multiple(child)) {
            return SequenceMatcher {
                anchor: target.span().start,
                source_children,
                pattern_children,
                ctx: self,
            }
            .matches(0, 0, binding);
        }

        source_children.len() == pattern_children.len()
            && source_children
                .iter()
                .zip(pattern_children)
                .all(|(source_child, pattern_child)| {
                    self.nodes_match(source_child, pattern_child, binding)
                })
    }
}

/// Current positions in the source and pattern child sequences.
#[derive(Clone, Copy)]
struct MatchIndices {
    source_idx: usize,
    pattern_idx: usize,
}

/// Backtracking matcher for child sequences containing `$$$VAR`, trying
/// every split until the whole sequence matches.
struct SequenceMatcher<'t, 'p, 'c> {
    anchor: usize,
    source_children: &'t [SyntaxNode],
    pattern_children: &'p [SyntaxNode],
    ctx: &'c MatchContext<'p>,
}

impl<'t> SequenceMatcher<'t, '_, '_> {
    /// Position of an empty `$$$` run starting at `source_idx`.
    fn empty_anchor(&self, source_idx: usize) -> usize {
        if let Some(next) = self.source_children.get(source_idx) {
            return next.span().start;
        }
        self.source_children
            .last()
            .map_or(self.anchor, |last| last.span().end)
    }

    fn matches(&self, source_idx: usize, pattern_idx: usize, binding: &mut Binding<'t>) -> bool {
        let Some(pattern_child) = self.pattern_children.get(pattern_idx) else {
            return source_idx == self.source_children.len();
        };

        if let Some(metavar) = self
            .ctx
            .template
            .metavariable_at(pattern_child)
            .filter(|metavar| metavar.kind == MetaVarKind::Multiple)
        {
            return self.matches_multiple(
                MatchIndices {
                    source_idx,
                    pattern_idx,
                },
                metavar,
                binding,
            );
        }

        self.matches_single(
            MatchIndices {
                source_idx,
                pattern_idx,
            },
            pattern_child,
            binding,
        )
    }

    /// Tries every run length for a `$$$` metavariable, shortest first.
    fn matches_multiple(
        &self,
        indices: MatchIndices,
        metavar: &MetaVariable,
        binding: &mut Binding<'t>,
    ) -> bool {
        let anchor = self.empty_anchor(indices.source_idx);
        for end in indices.source_idx..=self.source_children.len() {
            let Some(run) = self.source_children.get(indices.source_idx..end) else {
                continue;
            };

            let mut trial = binding.clone();
            if !trial.bind_sequence(&metavar.name, run, anchor) {
                continue;
            }

            if self.matches(end, indices.pattern_idx + 1, &mut trial) {
                *binding = trial;
                return true;
            }
        }

        false
    }

    /// Matches one pattern child against one source child, then the rest.
    fn matches_single(
        &self,
        indices: MatchIndices,
        pattern_child: &SyntaxNode,
        binding: &mut Binding<'t>,
    ) -> bool {
        let Some(source_child) = self.source_children.get(indices.source_idx) else {
            return false;
        };

        let mut trial = binding.clone();
        if !self.ctx.nodes_match(source_child, pattern_child, &mut trial) {
            return false;
        }

        if self.matches(indices.source_idx + 1, indices.pattern_idx + 1, &mut trial) {
            *binding = trial;
            return true;
        }

        false
    }
}
