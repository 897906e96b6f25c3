//! Instantiation of after-templates.
//!
//! The after-template text is copied verbatim with each placeholder replaced
//! by the source text its metavariable bound. Bound expressions are wrapped in
//! parentheses when the surrounding operator binds tighter than they do.

use std::ops::Range;

use crate::error::SyntaxError;
use crate::matcher::{Binding, Bound};
use crate::template::Template;
use crate::tree::{NodeKind, SyntaxNode};

/// Precedence of primary expressions: literals, names, calls, field access.
const PRIMARY: u8 = 16;
const PREFIX: u8 = 14;

/// Returns the binding strength of an expression node; higher binds tighter.
pub(super) fn precedence(node: &SyntaxNode) -> u8 {
    match node.node_kind() {
        NodeKind::Lambda | NodeKind::Assignment => 1,
        NodeKind::Ternary => 2,
        NodeKind::Binary => node
            .child_by_field("operator")
            .and_then(SyntaxNode::token_text)
            .map_or(9, binary_precedence),
        NodeKind::Cast => PREFIX,
        NodeKind::Unary if node.kind() == "update_expression" => PREFIX + 1,
        NodeKind::Unary => PREFIX,
        _ => PRIMARY,
    }
}

fn binary_precedence(operator: &str) -> u8 {
    match operator {
        "||" => 3,
        "&&" => 4,
        "|" => 5,
        "^" => 6,
        "&" => 7,
        "==" | "!=" => 8,
        "<<" | ">>" | ">>>" => 10,
        "+" | "-" => 11,
        "*" | "/" | "%" => 12,
        // Relational operators and `instanceof`.
        _ => 9,
    }
}

/// Returns whether an expression of strength `inner` placed in `slot` of
/// `parent` must be parenthesised.
pub(super) fn needs_parens(parent: &SyntaxNode, slot: &SyntaxNode, inner: u8) -> bool {
    if inner >= PRIMARY {
        return false;
    }
    match parent.node_kind() {
        NodeKind::Binary => {
            let outer = precedence(parent);
            inner < outer || (inner == outer && slot.field() == Some("right"))
        }
        NodeKind::Unary | NodeKind::Cast => inner < PREFIX,
        NodeKind::MethodCall | NodeKind::FieldAccess => slot.field() == Some("object"),
        NodeKind::ArrayAccess => slot.field() == Some("array"),
        NodeKind::Ternary if slot.field() == Some("condition") => inner <= 2,
        NodeKind::Ternary => inner < 2,
        _ => false,
    }
}

/// A placeholder occurrence in the after-template.
struct Slot<'a> {
    node: &'a SyntaxNode,
    parent: Option<&'a SyntaxNode>,
    name: &'a str,
}

fn collect_slots<'a>(
    template: &'a Template,
    node: &'a SyntaxNode,
    parent: Option<&'a SyntaxNode>,
    out: &mut Vec<Slot<'a>>,
) {
    if let Some(metavar) = template.metavariable_at(node) {
        out.push(Slot {
            node,
            parent,
            name: &metavar.name,
        });
        return;
    }
    for child in node.children() {
        collect_slots(template, child, Some(node), out);
    }
}

/// Returns the byte range of the template root within the template tree.
fn root_span(template: &Template) -> Option<Range<usize>> {
    let roots = template.root_nodes();
    Some(roots.first()?.span().start..roots.last()?.span().end)
}

/// Instantiates `after` with the text bound in `binding`.
///
/// # Errors
///
/// Returns [`SyntaxError::InternalInvariant`] when the after-template refers
/// to a metavariable the binding lacks.
pub(super) fn instantiate(
    after: &Template,
    binding: &Binding<'_>,
    target_source: &str,
) -> Result<String, SyntaxError> {
    let template_source = after.tree_source();
    let span = root_span(after)
        .ok_or_else(|| SyntaxError::internal_invariant("after-template has no root"))?;

    let mut slots = Vec::new();
    for root in after.root_nodes() {
        collect_slots(after, root, None, &mut slots);
    }

    let mut out = String::with_capacity(span.len());
    let mut cursor = span.start;
    for slot in slots {
        let slot_span = slot.node.span();
        out.push_str(template_source.get(cursor..slot_span.start).unwrap_or_default());

        let bound = binding.get(slot.name).ok_or_else(|| {
            SyntaxError::internal_invariant(format!(
                "after-template metavariable ${} is unbound",
                slot.name
            ))
        })?;
        let (text, wrap) = match bound {
            Bound::Single(node) => single_text(node, &slot, target_source),
            Bound::Sequence { .. } => (bound.text(target_source), false),
        };
        if wrap {
            out.push('(');
            out.push_str(text);
            out.push(')');
        } else {
            out.push_str(text);
        }
        cursor = slot_span.end;
    }
    out.push_str(template_source.get(cursor..span.end).unwrap_or_default());
    Ok(out)
}

/// Returns the text substituted for `node` in `slot` and whether it must be
/// wrapped in parentheses. Parentheses the slot makes redundant are dropped.
fn single_text<'s>(node: &SyntaxNode, slot: &Slot<'_>, source: &'s str) -> (&'s str, bool) {
    let text = source.get(node.span()).unwrap_or_default();
    let Some(parent) = slot.parent else {
        return (text, false);
    };
    if matches!(node.node_kind(), NodeKind::Parenthesized)
        && let Some(inner) = node.named_children().next()
        && !needs_parens(parent, slot.node, precedence(inner))
        && let Some(inner_text) = source.get(inner.span())
    {
        return (inner_text, false);
    }
    (text, needs_parens(parent, slot.node, precedence(node)))
}

/// Finds the node of kind `kind` spanning exactly `span`, with its parent.
pub(super) fn find_with_parent<'t>(
    node: &'t SyntaxNode,
    span: &Range<usize>,
    kind: &str,
) -> Option<(&'t SyntaxNode, &'t SyntaxNode)> {
    for child in node.children() {
        let child_span = child.span();
        if child_span.start > span.start || child_span.end < span.end {
            continue;
        }
        if child_span == *span && child.kind() == kind {
            return Some((node, child));
        }
        if let Some(found) = find_with_parent(child, span, kind) {
            return Some(found);
        }
    }
    None
}
