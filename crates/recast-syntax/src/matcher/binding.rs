//! Metavariable bindings produced by a successful match.
//!
//! Bindings borrow nodes from the target tree. Each trial branch of the
//! matcher works on a clone, so a failed branch leaves no trace.

use std::collections::HashMap;
use std::ops::Range;

use crate::metavariables::WILDCARD;
use crate::tree::SyntaxNode;

/// The node or nodes bound to one metavariable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound<'t> {
    /// A single node bound by `$NAME`.
    Single(&'t SyntaxNode),
    /// A run of sibling nodes bound by `$$$NAME`.
    Sequence {
        /// The bound nodes in source order, possibly empty.
        nodes: Vec<&'t SyntaxNode>,
        /// Byte offset used as the position of an empty run.
        anchor: usize,
    },
}

impl<'t> Bound<'t> {
    /// Returns the byte range covered by the bound nodes.
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        match self {
            Self::Single(node) => node.span(),
            Self::Sequence { nodes, anchor } => match (nodes.first(), nodes.last()) {
                (Some(first), Some(last)) => first.span().start..last.span().end,
                _ => *anchor..*anchor,
            },
        }
    }

    /// Returns the bound nodes.
    #[must_use]
    pub fn nodes(&self) -> Vec<&'t SyntaxNode> {
        match self {
            Self::Single(node) => vec![*node],
            Self::Sequence { nodes, .. } => nodes.clone(),
        }
    }

    /// Returns the bound source text, taken verbatim from `source`.
    #[must_use]
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.span()).unwrap_or_default()
    }

    /// Returns the single bound node, if this is a single binding.
    #[must_use]
    pub const fn as_single(&self) -> Option<&'t SyntaxNode> {
        match self {
            Self::Single(node) => Some(*node),
            Self::Sequence { .. } => None,
        }
    }

    fn structurally_eq(&self, other: &Self) -> bool {
        let left = self.nodes();
        let right = other.nodes();
        left.len() == right.len()
            && left
                .iter()
                .zip(&right)
                .all(|(a, b)| a.structurally_eq(b))
    }
}

/// Map from metavariable name to bound nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding<'t> {
    inner: HashMap<String, Bound<'t>>,
}

impl<'t> Binding<'t> {
    /// Returns the nodes bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Bound<'t>> {
        self.inner.get(name)
    }

    /// Returns the single node bound to `name`.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&'t SyntaxNode> {
        self.inner.get(name).and_then(Bound::as_single)
    }

    /// Returns the number of bound metavariables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns whether nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the bound names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.inner.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub(super) fn bind_single(&mut self, name: &str, node: &'t SyntaxNode) -> bool {
        self.insert_consistent(name, Bound::Single(node))
    }

    pub(super) fn bind_sequence(
        &mut self,
        name: &str,
        nodes: &'t [SyntaxNode],
        anchor: usize,
    ) -> bool {
        self.insert_consistent(
            name,
            Bound::Sequence {
                nodes: nodes.iter().collect(),
                anchor,
            },
        )
    }

    /// Records `next` unless `name` is already bound to a structurally
    /// different value.
    fn insert_consistent(&mut self, name: &str, next: Bound<'t>) -> bool {
        if name == WILDCARD {
            return true;
        }

        let Some(existing) = self.inner.get(name) else {
            self.inner.insert(name.to_owned(), next);
            return true;
        };

        let same_shape = matches!(
            (existing, &next),
            (Bound::Single(_), Bound::Single(_)) | (Bound::Sequence { .. }, Bound::Sequence { .. })
        );
        same_shape && existing.structurally_eq(&next)
    }
}
