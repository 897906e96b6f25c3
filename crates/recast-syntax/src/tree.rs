//! Immutable syntax tree model for Java sources.
//!
//! Trees are converted from Tree-sitter's concrete syntax tree into owned
//! [`SyntaxNode`] values so that templates, bindings and rewritten files can
//! outlive the parser. Every token keeps the trivia (whitespace and comments)
//! that precedes it, which makes [`SyntaxTree::print`] lossless.

use std::ops::Range;

/// Literal categories recognised by the type oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    /// `int` literal such as `1` or `0x1F`.
    Int,
    /// `long` literal such as `1L`.
    Long,
    /// `float` literal such as `1.0f`.
    Float,
    /// `double` literal such as `1.0`.
    Double,
    /// `char` literal such as `'a'`.
    Char,
    /// String literal or text block.
    String,
    /// `true` or `false`.
    Boolean,
    /// `null`.
    Null,
}

/// Classified syntax construct.
///
/// The grammar kind string stays available through [`SyntaxNode::kind`];
/// this sum type groups the constructs the engine reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The compilation unit root.
    CompilationUnit,
    /// `package a.b;`
    PackageDeclaration,
    /// `import a.b.C;` or `import static a.b.C.m;`
    ImportDeclaration,
    /// `receiver.method(args)` or `method(args)`.
    MethodCall,
    /// `receiver.field`.
    FieldAccess,
    /// `new T(args)`.
    ObjectCreation,
    /// Infix operator expression, including `instanceof`.
    Binary,
    /// Prefix or postfix operator expression.
    Unary,
    /// `(T) value`.
    Cast,
    /// `(expr)`.
    Parenthesized,
    /// `cond ? a : b`.
    Ternary,
    /// `x -> y`.
    Lambda,
    /// `a = b`, `a += b`, ...
    Assignment,
    /// `array[index]`.
    ArrayAccess,
    /// A literal token.
    Literal(LiteralKind),
    /// A plain identifier.
    Identifier,
    /// A type name identifier.
    TypeIdentifier,
    /// A dotted name such as `java.util.List`.
    ScopedIdentifier,
    /// A type reference (primitive, generic, array, qualified).
    TypeRef,
    /// `{ ... }` statement block.
    Block,
    /// `expr;`
    ExpressionStatement,
    /// `if (...) ... else ...`
    If,
    /// `throw expr;`
    Throw,
    /// `return expr;`
    Return,
    /// `T name = value;`
    LocalVariable,
    /// Anonymous token: keyword, operator or punctuation.
    Token,
    /// Any other named construct.
    Other,
}

const INTEGER_LITERALS: &[&str] = &[
    "decimal_integer_literal",
    "hex_integer_literal",
    "octal_integer_literal",
    "binary_integer_literal",
];

const FLOATING_LITERALS: &[&str] = &["decimal_floating_point_literal", "hex_floating_point_literal"];

impl NodeKind {
    /// Classifies a grammar kind. `text` is only consulted for literals.
    #[must_use]
    pub(crate) fn classify(kind: &str, named: bool, text: &str) -> Self {
        if !named {
            return Self::Token;
        }
        if INTEGER_LITERALS.contains(&kind) {
            return if text.ends_with(['l', 'L']) {
                Self::Literal(LiteralKind::Long)
            } else {
                Self::Literal(LiteralKind::Int)
            };
        }
        if FLOATING_LITERALS.contains(&kind) {
            return if text.ends_with(['f', 'F']) {
                Self::Literal(LiteralKind::Float)
            } else {
                Self::Literal(LiteralKind::Double)
            };
        }
        match kind {
            "program" => Self::CompilationUnit,
            "package_declaration" => Self::PackageDeclaration,
            "import_declaration" => Self::ImportDeclaration,
            "method_invocation" => Self::MethodCall,
            "field_access" => Self::FieldAccess,
            "object_creation_expression" => Self::ObjectCreation,
            "binary_expression" | "instanceof_expression" => Self::Binary,
            "unary_expression" | "update_expression" => Self::Unary,
            "cast_expression" => Self::Cast,
            "parenthesized_expression" => Self::Parenthesized,
            "ternary_expression" => Self::Ternary,
            "lambda_expression" => Self::Lambda,
            "assignment_expression" => Self::Assignment,
            "array_access" => Self::ArrayAccess,
            "character_literal" => Self::Literal(LiteralKind::Char),
            "string_literal" | "text_block" => Self::Literal(LiteralKind::String),
            "true" | "false" => Self::Literal(LiteralKind::Boolean),
            "null_literal" => Self::Literal(LiteralKind::Null),
            "identifier" => Self::Identifier,
            "type_identifier" => Self::TypeIdentifier,
            "scoped_identifier" => Self::ScopedIdentifier,
            "integral_type" | "floating_point_type" | "boolean_type" | "void_type"
            | "generic_type" | "array_type" | "scoped_type_identifier" => Self::TypeRef,
            "block" => Self::Block,
            "expression_statement" => Self::ExpressionStatement,
            "if_statement" => Self::If,
            "throw_statement" => Self::Throw,
            "return_statement" => Self::Return,
            "local_variable_declaration" => Self::LocalVariable,
            _ => Self::Other,
        }
    }

    /// Returns true for grammar kinds converted as a single atomic token.
    #[must_use]
    pub(crate) fn is_atomic_kind(kind: &str) -> bool {
        INTEGER_LITERALS.contains(&kind)
            || FLOATING_LITERALS.contains(&kind)
            || matches!(kind, "character_literal" | "string_literal" | "text_block")
    }

    /// Returns true for expression constructs that bind looser than a
    /// method-call receiver and need parentheses in operator positions.
    #[must_use]
    pub const fn is_compound_expression(self) -> bool {
        matches!(
            self,
            Self::Binary | Self::Unary | Self::Cast | Self::Ternary | Self::Lambda | Self::Assignment
        )
    }
}

/// Token payload carried by leaf nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    leading: Box<str>,
    text: Box<str>,
}

/// An immutable node of a Java syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    kind: &'static str,
    class: NodeKind,
    field: Option<&'static str>,
    span: Range<usize>,
    token: Option<Token>,
    children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub(crate) fn leaf(
        kind: &'static str,
        class: NodeKind,
        field: Option<&'static str>,
        span: Range<usize>,
        leading: &str,
        text: &str,
    ) -> Self {
        Self {
            kind,
            class,
            field,
            span,
            token: Some(Token {
                leading: leading.into(),
                text: text.into(),
            }),
            children: Vec::new(),
        }
    }

    pub(crate) const fn interior(
        kind: &'static str,
        class: NodeKind,
        field: Option<&'static str>,
        span: Range<usize>,
        children: Vec<Self>,
    ) -> Self {
        Self {
            kind,
            class,
            field,
            span,
            token: None,
            children,
        }
    }

    /// Returns the grammar kind, for example `method_invocation`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// Returns the classified construct.
    #[must_use]
    pub const fn node_kind(&self) -> NodeKind {
        self.class
    }

    /// Returns the field name this node occupies in its parent, if any.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        self.field
    }

    /// Returns the byte range of this node in the parsed source.
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Returns true for named (non-punctuation) nodes.
    #[must_use]
    pub fn is_named(&self) -> bool {
        self.class != NodeKind::Token
    }

    /// Returns true when this node is a token.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.token.is_some()
    }

    /// Returns the token text for leaves.
    #[must_use]
    pub fn token_text(&self) -> Option<&str> {
        self.token.as_ref().map(|token| &*token.text)
    }

    /// Returns the trivia preceding a leaf token.
    #[must_use]
    pub fn leading_trivia(&self) -> Option<&str> {
        self.token.as_ref().map(|token| &*token.leading)
    }

    /// Returns the ordered children.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Returns the named children in order.
    pub fn named_children(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter(|child| child.is_named())
    }

    /// Returns the first child stored under `field`.
    #[must_use]
    pub fn child_by_field(&self, field: &str) -> Option<&Self> {
        self.children.iter().find(|child| child.field == Some(field))
    }

    /// Collects the leaf tokens of this subtree in source order.
    #[must_use]
    pub fn tokens(&self) -> Vec<&Self> {
        let mut out = Vec::new();
        collect_tokens(self, &mut out);
        out
    }

    /// Prints the subtree with its interior trivia, omitting the trivia in
    /// front of the first token.
    #[must_use]
    pub fn print(&self) -> String {
        let mut out = String::new();
        for (idx, token) in self.tokens().into_iter().enumerate() {
            if idx > 0 {
                out.push_str(token.leading_trivia().unwrap_or_default());
            }
            out.push_str(token.token_text().unwrap_or_default());
        }
        out
    }

    /// Prints the tokens of the subtree separated by single spaces.
    ///
    /// Two subtrees with equal normalised text differ at most in whitespace
    /// and comments.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.tokens()
            .iter()
            .filter_map(|token| token.token_text())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Compares two subtrees by kind and token text, ignoring trivia and
    /// positions.
    #[must_use]
    pub fn structurally_eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.token_text() == other.token_text()
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(left, right)| left.structurally_eq(right))
    }

    /// Returns the nodes of this subtree in pre-order.
    #[must_use]
    pub fn preorder(&self) -> Vec<&Self> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Finds the innermost node whose span equals `span`.
    #[must_use]
    pub fn innermost_with_span(&self, span: &Range<usize>) -> Option<&Self> {
        if !(self.span.start <= span.start && span.end <= self.span.end) {
            return None;
        }
        self.children
            .iter()
            .find_map(|child| child.innermost_with_span(span))
            .or_else(|| (self.span == *span).then_some(self))
    }
}

fn collect_tokens<'a>(node: &'a SyntaxNode, out: &mut Vec<&'a SyntaxNode>) {
    if node.is_leaf() {
        out.push(node);
        return;
    }
    for child in &node.children {
        collect_tokens(child, out);
    }
}

/// A parsed Java compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    source: String,
    root: SyntaxNode,
    trailing: Box<str>,
}

impl SyntaxTree {
    pub(crate) fn new(source: String, root: SyntaxNode, trailing: &str) -> Self {
        Self {
            source,
            root,
            trailing: trailing.into(),
        }
    }

    /// Returns the root node.
    #[must_use]
    pub const fn root(&self) -> &SyntaxNode {
        &self.root
    }

    /// Returns the parsed source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the verbatim source text covered by `node`.
    #[must_use]
    pub fn text(&self, node: &SyntaxNode) -> &str {
        self.slice(node.span())
    }

    /// Returns the source text in `range`, or an empty string when the range
    /// does not fall on character boundaries.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> &str {
        self.source.get(range).unwrap_or_default()
    }

    /// Reconstructs the source text from the tree's tokens and trivia.
    ///
    /// The output is byte-for-byte identical to the parsed source.
    #[must_use]
    pub fn print(&self) -> String {
        let mut out = String::with_capacity(self.source.len());
        for token in self.root.tokens() {
            out.push_str(token.leading_trivia().unwrap_or_default());
            out.push_str(token.token_text().unwrap_or_default());
        }
        out.push_str(&self.trailing);
        out
    }
}
