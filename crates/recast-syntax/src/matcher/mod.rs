//! Unification matcher for compiled templates.
//!
//! This module walks a parsed Java tree and yields the sites where a template
//! matches, together with the metavariable bindings. Matching is structural:
//! kinds must agree, leaves compare token text, and `$$$` children are
//! matched with backtracking. Declared type constraints are checked against
//! a [`TypeOracle`].

mod binding;
mod matching;

use std::ops::Range;

use crate::template::Template;
use crate::tree::SyntaxNode;
use crate::types::TypeOracle;

pub use binding::{Binding, Bound};
use matching::MatchContext;

/// A matched region of the target tree and its bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSite<'t> {
    span: Range<usize>,
    binding: Binding<'t>,
}

impl<'t> MatchSite<'t> {
    pub(crate) const fn new(span: Range<usize>, binding: Binding<'t>) -> Self {
        Self { span, binding }
    }

    /// Returns the byte range of the match in the target source.
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Returns the metavariable bindings.
    #[must_use]
    pub const fn binding(&self) -> &Binding<'t> {
        &self.binding
    }

    /// Consumes the site, returning its bindings.
    #[must_use]
    pub fn into_binding(self) -> Binding<'t> {
        self.binding
    }
}

/// Matches `template` against one candidate node.
///
/// Returns `None` for sequence templates; use [`Matcher::find_all`] to match
/// those against statement lists.
#[must_use]
pub fn match_template<'t>(
    template: &Template,
    candidate: &'t SyntaxNode,
    oracle: &dyn TypeOracle,
) -> Option<Binding<'t>> {
    Matcher::new(template, oracle).match_node(candidate)
}

/// Template matcher bound to a type oracle for the target tree.
pub struct Matcher<'p> {
    ctx: MatchContext<'p>,
}

impl<'p> Matcher<'p> {
    /// Creates a new matcher for the given template.
    #[must_use]
    pub const fn new(template: &'p Template, oracle: &'p dyn TypeOracle) -> Self {
        Self {
            ctx: MatchContext { template, oracle },
        }
    }

    /// Matches a single-root template against `candidate`.
    #[must_use]
    pub fn match_node<'t>(&self, candidate: &'t SyntaxNode) -> Option<Binding<'t>> {
        self.ctx.match_root(candidate)
    }

    /// Matches a sequence template against exactly `candidates`.
    #[must_use]
    pub fn match_sequence<'t>(&self, candidates: &'t [SyntaxNode]) -> Option<Binding<'t>> {
        if !self.ctx.template.is_sequence() {
            return None;
        }
        self.ctx.match_run(candidates)
    }

    /// Finds all non-overlapping matches in pre-order.
    #[must_use]
    pub fn find_all<'t>(&self, root: &'t SyntaxNode) -> Vec<MatchSite<'t>> {
        self.find_all_where(root, |_| true)
    }

    /// Finds all non-overlapping matches whose bindings satisfy `accept`.
    ///
    /// The outermost match wins: once a node matches, its descendants are not
    /// searched. Sequence templates slide over each node's children.
    #[must_use]
    pub fn find_all_where<'t, F>(&self, root: &'t SyntaxNode, accept: F) -> Vec<MatchSite<'t>>
    where
        F: Fn(&Binding<'t>) -> bool,
    {
        let mut sites = Vec::new();
        self.scan(root, &accept, &mut sites);
        sites
    }

    fn scan<'t, F>(&self, node: &'t SyntaxNode, accept: &F, sites: &mut Vec<MatchSite<'t>>)
    where
        F: Fn(&Binding<'t>) -> bool,
    {
        if self.ctx.template.is_sequence() {
            self.scan_children(node, accept, sites);
            return;
        }

        if let Some(binding) = self.match_node(node).filter(|b| accept(b)) {
            sites.push(MatchSite::new(node.span(), binding));
            return;
        }

        for child in node.children() {
            self.scan(child, accept, sites);
        }
    }

    fn scan_children<'t, F>(&self, node: &'t SyntaxNode, accept: &F, sites: &mut Vec<MatchSite<'t>>)
    where
        F: Fn(&Binding<'t>) -> bool,
    {
        let children = node.children();
        let mut idx = 0;
        while let Some(child) = children.get(idx) {
            if let Some((end, site)) = self.match_window(children, idx, accept) {
                sites.push(site);
                idx = end;
                continue;
            }
            self.scan_children(child, accept, sites);
            idx += 1;
        }
    }

    /// Finds the shortest run starting at `start` that matches.
    fn match_window<'t, F>(
        &self,
        children: &'t [SyntaxNode],
        start: usize,
        accept: &F,
    ) -> Option<(usize, MatchSite<'t>)>
    where
        F: Fn(&Binding<'t>) -> bool,
    {
        if !children.get(start).is_some_and(SyntaxNode::is_named) {
            return None;
        }
        (start + 1..=children.len()).find_map(|end| {
            let window = children.get(start..end)?;
            let binding = self.ctx.match_run(window).filter(|b| accept(b))?;
            let first = window.first()?;
            let last = window.last()?;
            Some((end, MatchSite::new(first.span().start..last.span().end, binding)))
        })
    }
}

#[cfg(test)]
mod tests;
