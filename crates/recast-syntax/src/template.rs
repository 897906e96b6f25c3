//! Template compilation for rewrite rules.
//!
//! A template is ordinary Java source in which `$NAME` stands for one node and
//! `$$$NAME` for a run of sibling nodes; `$_` matches without capturing.
//! Templates may be expressions, statements, statement sequences or class
//! members. Each is compiled once and shared read-only by every match.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use crate::error::SyntaxError;
use crate::metavariables::{
    MetaVarKind, MetaVariable, WILDCARD, is_metavariable_name, name_from_placeholder,
    normalise,
};
use crate::parser::JavaParser;
use crate::tree::{SyntaxNode, SyntaxTree};
use crate::types::TypeConstraint;

/// A declared metavariable with its type constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaVarDecl {
    /// Name without the `$` prefix.
    pub name: String,
    /// Constraint on the static type of bound expressions.
    pub constraint: TypeConstraint,
}

impl MetaVarDecl {
    /// Declares a metavariable whose bound expressions must have type `ty`.
    ///
    /// # Errors
    ///
    /// Returns an error when `name` is not a valid metavariable name or `ty`
    /// is not a well-formed Java type.
    pub fn new(name: &str, ty: &str) -> Result<Self, SyntaxError> {
        let bare = name.strip_prefix('$').unwrap_or(name);
        if !is_metavariable_name(bare) || bare == WILDCARD {
            return Err(SyntaxError::invalid_metavariable(format!(
                "`{name}` is not a valid metavariable name"
            )));
        }
        Ok(Self {
            name: bare.to_owned(),
            constraint: TypeConstraint::parse(bare, ty)?,
        })
    }

    /// Declares an unconstrained metavariable.
    ///
    /// # Errors
    ///
    /// Returns an error when `name` is not a valid metavariable name.
    pub fn untyped(name: &str) -> Result<Self, SyntaxError> {
        Self::new(name, "?")
    }
}

/// Wrappings tried in order until the template parses cleanly.
const WRAPPINGS: &[(&str, &str)] = &[
    ("", ""),
    ("", ";"),
    ("class __RecastTemplate__ {\n", "\n}"),
    ("class __RecastTemplate__ { void __recastTemplate__() {\n", "\n} }"),
    ("class __RecastTemplate__ { void __recastTemplate__() {\n", ";\n} }"),
];

/// Location of the template root inside the wrapped template tree.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RootLocation {
    parent: Vec<usize>,
    children: Range<usize>,
    sequence: bool,
}

/// A compiled template.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    metavariables: Vec<MetaVariable>,
    constraints: HashMap<String, TypeConstraint>,
    tree: SyntaxTree,
    root: RootLocation,
}

impl Template {
    /// Compiles a template against the declared metavariables.
    ///
    /// Metavariables that are not declared are unconstrained.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::InvalidMetavariable`] for malformed metavariable
    /// syntax and [`SyntaxError::InvalidTemplate`] when the template is not
    /// valid Java under any supported wrapping.
    pub fn compile(source: &str, decls: &[MetaVarDecl]) -> Result<Self, SyntaxError> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(SyntaxError::invalid_template(source, "template is empty"));
        }

        let (metavariables, normalised) = normalise(trimmed)?;
        check_kinds_agree(&metavariables)?;
        let constraints = decls
            .iter()
            .map(|decl| (decl.name.clone(), decl.constraint.clone()))
            .collect();

        let mut parser = JavaParser::new()?;
        for (prefix, suffix) in WRAPPINGS {
            let wrapped = format!("{prefix}{normalised}{suffix}");
            let Some(tree) = parser.try_parse(&wrapped)? else {
                continue;
            };
            let span = prefix.len()..prefix.len() + normalised.len();
            if let Some(root) = locate_root(tree.root(), &span) {
                return Ok(Self {
                    source: trimmed.to_owned(),
                    metavariables,
                    constraints,
                    tree,
                    root,
                });
            }
        }

        Err(SyntaxError::invalid_template(
            trimmed,
            "not valid Java as an expression, statement, statement sequence or member",
        ))
    }

    /// Returns the template source as written.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the metavariable occurrences in source order.
    #[must_use]
    pub fn metavariables(&self) -> &[MetaVariable] {
        &self.metavariables
    }

    /// Returns whether `name` occurs in this template.
    #[must_use]
    pub fn uses(&self, name: &str) -> bool {
        self.metavariables.iter().any(|m| m.name == name)
    }

    /// Returns the root nodes: one node, or the statements of a sequence.
    #[must_use]
    pub fn root_nodes(&self) -> &[SyntaxNode] {
        node_at_path(self.tree.root(), &self.root.parent)
            .and_then(|parent| parent.children().get(self.root.children.clone()))
            .unwrap_or_default()
    }

    /// Returns the single root node, unless this is a sequence template.
    #[must_use]
    pub fn root(&self) -> Option<&SyntaxNode> {
        if self.root.sequence {
            return None;
        }
        self.root_nodes().first()
    }

    /// Returns whether the root is a sequence of statements.
    #[must_use]
    pub const fn is_sequence(&self) -> bool {
        self.root.sequence
    }

    /// Returns the type constraint for a metavariable.
    #[must_use]
    pub fn constraint(&self, name: &str) -> &TypeConstraint {
        const ANY: &TypeConstraint = &TypeConstraint::Any;
        self.constraints.get(name).unwrap_or(ANY)
    }

    /// Returns the metavariable a template node stands for, if any.
    ///
    /// A placeholder identifier stands for itself; an expression statement
    /// holding only a placeholder stands for a whole statement.
    pub(crate) fn metavariable_at(&self, node: &SyntaxNode) -> Option<&MetaVariable> {
        let leaf = if node.kind() == "expression_statement" {
            let mut named = node.named_children();
            let only = named.next()?;
            if named.next().is_some() {
                return None;
            }
            only
        } else {
            node
        };

        if !matches!(leaf.kind(), "identifier" | "type_identifier") {
            return None;
        }
        let name = name_from_placeholder(leaf.token_text()?)?;
        self.metavariables.iter().find(|m| m.name == name)
    }

    /// Returns the source of the wrapped template tree.
    pub(crate) fn tree_source(&self) -> &str {
        self.tree.source()
    }
}

fn check_kinds_agree(metavariables: &[MetaVariable]) -> Result<(), SyntaxError> {
    let mut kinds: HashMap<&str, MetaVarKind> = HashMap::new();
    for metavar in metavariables {
        let previous = kinds.insert(&metavar.name, metavar.kind);
        if previous.is_some_and(|kind| kind != metavar.kind) {
            return Err(SyntaxError::invalid_metavariable(format!(
                "${} is used both as a single and as a multiple metavariable",
                metavar.name
            )));
        }
    }
    Ok(())
}

fn contains(outer: &Range<usize>, inner: &Range<usize>) -> bool {
    outer.start <= inner.start && inner.end <= outer.end
}

fn node_at_path<'t>(root: &'t SyntaxNode, path: &[usize]) -> Option<&'t SyntaxNode> {
    path.iter()
        .try_fold(root, |node, idx| node.children().get(*idx))
}

/// Finds the innermost node spanning exactly `span`, falling back to the
/// run of sibling statements that covers it.
fn locate_root(root: &SyntaxNode, span: &Range<usize>) -> Option<RootLocation> {
    let mut path = Vec::new();
    if innermost_path(root, span, &mut path) {
        let last = path.pop()?;
        return Some(RootLocation {
            parent: path,
            children: last..last + 1,
            sequence: false,
        });
    }
    path.clear();
    sequence_location(root, span, &mut path)
}

fn innermost_path(node: &SyntaxNode, span: &Range<usize>, path: &mut Vec<usize>) -> bool {
    for (idx, child) in node.children().iter().enumerate() {
        if !contains(&child.span(), span) {
            continue;
        }
        path.push(idx);
        if innermost_path(child, span, path) || child.span() == *span {
            return true;
        }
        path.pop();
    }
    false
}

fn sequence_location(
    node: &SyntaxNode,
    span: &Range<usize>,
    path: &mut Vec<usize>,
) -> Option<RootLocation> {
    let children = node.children();
    if let Some(idx) = children
        .iter()
        .position(|child| contains(&child.span(), span))
    {
        path.push(idx);
        let child = children.get(idx)?;
        return sequence_location(child, span, path);
    }

    let inside = |child: &SyntaxNode| contains(span, &child.span());
    let first = children.iter().position(inside)?;
    let last = children.iter().rposition(inside)?;
    let covered = children.get(first..=last)?;
    let starts = covered.first().map(|c| c.span().start) == Some(span.start);
    let ends = covered.last().map(|c| c.span().end) == Some(span.end);
    if !(starts && ends && covered.iter().all(|c| c.is_named())) {
        return None;
    }
    Some(RootLocation {
        parent: std::mem::take(path),
        children: first..last + 1,
        sequence: true,
    })
}

/// The compiled templates of one rule.
#[derive(Debug, Clone)]
pub struct RuleTemplates {
    befores: Vec<Template>,
    after: Template,
    decls: Vec<MetaVarDecl>,
}

impl RuleTemplates {
    /// Compiles the before-templates and the after-template of a rule.
    ///
    /// # Errors
    ///
    /// Returns a template error when any template fails to compile, when a
    /// declared metavariable is used by no before-template, or when the
    /// after-template uses a metavariable that some before-template does not
    /// bind.
    pub fn compile(
        befores: &[&str],
        after: &str,
        decls: &[MetaVarDecl],
    ) -> Result<Self, SyntaxError> {
        if befores.is_empty() {
            return Err(SyntaxError::invalid_template(
                after,
                "a rule needs at least one before-template",
            ));
        }

        let mut seen = HashSet::new();
        for decl in decls {
            if !seen.insert(decl.name.as_str()) {
                return Err(SyntaxError::invalid_metavariable(format!(
                    "${} is declared more than once",
                    decl.name
                )));
            }
        }

        let compiled_befores = befores
            .iter()
            .map(|source| Template::compile(source, decls))
            .collect::<Result<Vec<_>, _>>()?;
        let compiled_after = Template::compile(after, decls)?;

        for decl in decls {
            if !compiled_befores.iter().any(|before| before.uses(&decl.name)) {
                return Err(SyntaxError::unused_metavariable(&decl.name));
            }
        }

        for metavar in compiled_after.metavariables() {
            let bound_everywhere = metavar.name != WILDCARD
                && compiled_befores.iter().all(|before| {
                    before
                        .metavariables()
                        .iter()
                        .any(|m| m.name == metavar.name && m.kind == metavar.kind)
                });
            if !bound_everywhere {
                return Err(SyntaxError::unbound_metavariable(&metavar.name));
            }
        }

        Ok(Self {
            befores: compiled_befores,
            after: compiled_after,
            decls: decls.to_vec(),
        })
    }

    /// Returns the before-templates in declaration order.
    #[must_use]
    pub fn befores(&self) -> &[Template] {
        &self.befores
    }

    /// Returns the after-template.
    #[must_use]
    pub const fn after(&self) -> &Template {
        &self.after
    }

    /// Returns the metavariable declarations.
    #[must_use]
    pub fn decls(&self) -> &[MetaVarDecl] {
        &self.decls
    }

    /// Returns whether some before-template binds `name`.
    #[must_use]
    pub fn binds(&self, name: &str) -> bool {
        name != WILDCARD && self.befores.iter().any(|before| before.uses(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn decl(name: &str, ty: &str) -> MetaVarDecl {
        MetaVarDecl::new(name, ty).expect("declaration")
    }

    #[rstest]
    #[case("$X % 2", "binary_expression")]
    #[case("assertThat($A).hasSize($B.size())", "method_invocation")]
    #[case("if ($I < 0) throw new IllegalArgumentException();", "if_statement")]
    #[case("checkIndex($I, $S);", "expression_statement")]
    #[case("return $X;", "return_statement")]
    #[case("$X", "identifier")]
    fn templates_compile_to_expected_roots(#[case] source: &str, #[case] kind: &str) {
        let template = Template::compile(source, &[]).expect("compile");
        assert!(!template.is_sequence());
        assert_eq!(template.root().map(SyntaxNode::kind), Some(kind));
    }

    #[test]
    fn statement_runs_compile_to_sequences() {
        let template = Template::compile("int $N = $X; return $N;", &[]).expect("compile");
        assert!(template.is_sequence());
        let kinds: Vec<_> = template.root_nodes().iter().map(SyntaxNode::kind).collect();
        assert_eq!(kinds, vec!["local_variable_declaration", "return_statement"]);
    }

    #[test]
    fn placeholders_are_recognised() {
        let template = Template::compile("$A.equals($B)", &[]).expect("compile");
        let placeholders: Vec<_> = template
            .root()
            .expect("root")
            .preorder()
            .into_iter()
            .filter_map(|node| template.metavariable_at(node))
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(placeholders, vec!["A", "B"]);
    }

    #[test]
    fn invalid_java_is_rejected() {
        let err = Template::compile("assertThat($X).", &[]).expect_err("should fail");
        assert!(matches!(err, SyntaxError::InvalidTemplate { .. }));
    }

    #[test]
    fn mixed_metavariable_kinds_are_rejected() {
        let err = Template::compile("f($X, $$$X)", &[]).expect_err("should fail");
        assert!(matches!(err, SyntaxError::InvalidMetavariable { .. }));
    }

    #[test]
    fn declared_constraints_are_exposed() {
        let template = Template::compile("$X % 2", &[decl("X", "int")]).expect("compile");
        assert_eq!(
            template.constraint("X"),
            &TypeConstraint::Primitive(crate::types::Primitive::Int)
        );
        assert_eq!(template.constraint("Y"), &TypeConstraint::Any);
    }

    #[test]
    fn after_may_not_use_unbound_metavariable() {
        let err = RuleTemplates::compile(&["$A.size()"], "$B.length()", &[])
            .expect_err("should fail");
        assert_eq!(err, SyntaxError::unbound_metavariable("B"));
    }

    #[test]
    fn after_variables_must_occur_in_every_before() {
        let err = RuleTemplates::compile(&["f($A, $B)", "g($A)"], "h($A, $B)", &[])
            .expect_err("should fail");
        assert_eq!(err, SyntaxError::unbound_metavariable("B"));
    }

    #[test]
    fn declared_but_unused_metavariable_is_rejected() {
        let err = RuleTemplates::compile(&["f($A)"], "g($A)", &[decl("A", "int"), decl("Z", "int")])
            .expect_err("should fail");
        assert_eq!(err, SyntaxError::unused_metavariable("Z"));
    }

    #[test]
    fn wildcard_cannot_appear_in_after_template() {
        let err = RuleTemplates::compile(&["f($_)"], "g($_)", &[]).expect_err("should fail");
        assert_eq!(err, SyntaxError::unbound_metavariable("_"));
    }

    #[rstest]
    #[case("x")]
    #[case("$$X")]
    #[case("_")]
    fn bad_declaration_names_are_rejected(#[case] name: &str) {
        assert!(MetaVarDecl::new(name, "int").is_err());
    }
}
