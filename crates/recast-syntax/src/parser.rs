//! Tree-sitter parsing wrapper for Java.
//!
//! This module wraps the raw Tree-sitter parser configured with the Java
//! grammar and converts its concrete syntax tree into the owned
//! [`SyntaxTree`] model. Strict parsing rejects any tree containing ERROR or
//! MISSING nodes; [`JavaParser::diagnose`] reports every such node instead.

use std::ops::Range;

use crate::error::SyntaxError;
use crate::position::point_to_one_based;
use crate::tree::{NodeKind, SyntaxNode, SyntaxTree};

/// Information about a syntax error found during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxErrorInfo {
    /// Byte range of the error in the source.
    pub byte_range: Range<usize>,
    /// Line number (one-based) where the error starts.
    pub line: u32,
    /// Column number (one-based) where the error starts.
    pub column: u32,
    /// A snippet of the problematic source text.
    pub context: String,
    /// Human-readable description of the error.
    pub message: String,
}

impl SyntaxErrorInfo {
    fn from_node(node: tree_sitter::Node<'_>, source: &str) -> Self {
        let byte_range = node.byte_range();

        // Extract context: the text of the error node, truncated if too long
        let context = source
            .get(byte_range.clone())
            .map(|s| {
                if s.len() > 50 {
                    let truncated: String = s.chars().take(47).collect();
                    format!("{truncated}...")
                } else {
                    s.to_owned()
                }
            })
            .unwrap_or_default();

        let message = if node.is_missing() {
            format!("missing {}", node.kind())
        } else {
            "syntax error".to_owned()
        };

        let (line, column) = point_to_one_based(node.start_position());

        Self {
            byte_range,
            line,
            column,
            context,
            message,
        }
    }
}

/// Tree-sitter parser configured for Java.
pub struct JavaParser {
    inner: tree_sitter::Parser,
}

impl JavaParser {
    /// Creates a new Java parser.
    ///
    /// # Errors
    ///
    /// Returns an error if the Tree-sitter parser cannot be initialised
    /// with the Java grammar.
    pub fn new() -> Result<Self, SyntaxError> {
        let mut inner = tree_sitter::Parser::new();
        let language: tree_sitter::Language = tree_sitter_java::LANGUAGE.into();
        inner
            .set_language(&language)
            .map_err(|e| SyntaxError::parser_init(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Parses a compilation unit.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::Parse`] located at the first ERROR or MISSING
    /// node when the source is not valid Java.
    pub fn parse(&mut self, source: &str) -> Result<SyntaxTree, SyntaxError> {
        let tree = self.parse_raw(source)?;
        let root = tree.root_node();
        if let Some(error) = first_error_node(root) {
            let info = SyntaxErrorInfo::from_node(error, source);
            return Err(SyntaxError::parse(
                source,
                info.byte_range.start,
                format!("{}: `{}`", info.message, info.context),
            ));
        }
        Ok(convert(source, root))
    }

    /// Parses a source and returns the converted tree only when it is free of
    /// syntax errors.
    pub(crate) fn try_parse(&mut self, source: &str) -> Result<Option<SyntaxTree>, SyntaxError> {
        let tree = self.parse_raw(source)?;
        let root = tree.root_node();
        if first_error_node(root).is_some() {
            return Ok(None);
        }
        Ok(Some(convert(source, root)))
    }

    /// Collects every syntax error in `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if Tree-sitter fails to produce a tree at all.
    pub fn diagnose(&mut self, source: &str) -> Result<Vec<SyntaxErrorInfo>, SyntaxError> {
        let tree = self.parse_raw(source)?;
        let mut errors = Vec::new();
        collect_error_nodes(tree.root_node(), source, &mut errors);
        Ok(errors)
    }

    fn parse_raw(&mut self, source: &str) -> Result<tree_sitter::Tree, SyntaxError> {
        self.inner
            .parse(source, None)
            .ok_or_else(|| SyntaxError::parse(source, 0, "parsing failed"))
    }
}

/// Parses `source` with a fresh parser.
///
/// # Errors
///
/// Returns an error when the parser cannot be initialised or the source is
/// not valid Java.
pub fn parse(source: &str) -> Result<SyntaxTree, SyntaxError> {
    JavaParser::new()?.parse(source)
}

/// Returns the first ERROR or MISSING node in pre-order.
fn first_error_node(node: tree_sitter::Node<'_>) -> Option<tree_sitter::Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error_node)
}

/// Recursively collects all ERROR nodes from a syntax tree.
fn collect_error_nodes(
    node: tree_sitter::Node<'_>,
    source: &str,
    errors: &mut Vec<SyntaxErrorInfo>,
) {
    if node.is_error() || node.is_missing() {
        errors.push(SyntaxErrorInfo::from_node(node, source));
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_error_nodes(child, source, errors);
    }
}

/// Converts a Tree-sitter tree into the owned model.
fn convert(source: &str, root: tree_sitter::Node<'_>) -> SyntaxTree {
    let mut builder = TreeBuilder { source, offset: 0 };
    let children = builder.children_of(root);
    let root_node = SyntaxNode::interior(
        root.kind(),
        NodeKind::CompilationUnit,
        None,
        0..source.len(),
        children,
    );
    let trailing = source.get(builder.offset..).unwrap_or_default();
    SyntaxTree::new(source.to_owned(), root_node, trailing)
}

/// Walks a Tree-sitter tree in source order, attaching the text between
/// consecutive tokens to the following token as leading trivia.
struct TreeBuilder<'s> {
    source: &'s str,
    offset: usize,
}

impl TreeBuilder<'_> {
    fn build(&mut self, node: tree_sitter::Node<'_>, field: Option<&'static str>) -> SyntaxNode {
        let kind = node.kind();
        let span = node.byte_range();
        let text = self.source.get(span.clone()).unwrap_or_default();
        let class = NodeKind::classify(kind, node.is_named(), text);

        if node.child_count() == 0 || NodeKind::is_atomic_kind(kind) {
            let leading = self
                .source
                .get(self.offset..span.start)
                .unwrap_or_default();
            self.offset = self.offset.max(span.end);
            return SyntaxNode::leaf(kind, class, field, span, leading, text);
        }

        let children = self.children_of(node);
        SyntaxNode::interior(kind, class, field, span, children)
    }

    fn children_of(&mut self, node: tree_sitter::Node<'_>) -> Vec<SyntaxNode> {
        let mut children = Vec::new();
        let mut cursor = node.walk();
        if !cursor.goto_first_child() {
            return children;
        }
        loop {
            let child = cursor.node();
            // Comments are extras; they stay in the trivia of the next token.
            if !child.is_extra() {
                let field = cursor.field_name();
                children.push(self.build(child, field));
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        children
    }
}
