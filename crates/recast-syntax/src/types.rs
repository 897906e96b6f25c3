//! Static type approximation for metavariable constraints.
//!
//! No classpath is available, so types are inferred from what a single file
//! shows: literals, casts, object creation, operators and the declared types
//! of locals, parameters and fields. Anything else is unknown, and callers
//! decide how permissive an unknown type should be.

use std::collections::HashMap;
use std::fmt;

use crate::error::SyntaxError;
use crate::tree::{LiteralKind, NodeKind, SyntaxNode, SyntaxTree};

/// Java primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `short`
    Short,
    /// `char`
    Char,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
}

impl Primitive {
    /// Parses a primitive keyword.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "boolean" => Self::Boolean,
            "byte" => Self::Byte,
            "short" => Self::Short,
            "char" => Self::Char,
            "int" => Self::Int,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            _ => return None,
        })
    }

    /// Returns the Java keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Char => "char",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    /// Returns the simple name of the wrapper class.
    #[must_use]
    pub const fn boxed(self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Byte => "Byte",
            Self::Short => "Short",
            Self::Char => "Character",
            Self::Int => "Integer",
            Self::Long => "Long",
            Self::Float => "Float",
            Self::Double => "Double",
        }
    }

    const fn numeric_rank(self) -> Option<u8> {
        match self {
            Self::Byte => Some(0),
            Self::Short | Self::Char => Some(1),
            Self::Int => Some(2),
            Self::Long => Some(3),
            Self::Float => Some(4),
            Self::Double => Some(5),
            Self::Boolean => None,
        }
    }

    const fn is_numeric(self) -> bool {
        self.numeric_rank().is_some()
    }
}

/// Approximated static type of an expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JavaType {
    /// A primitive type.
    Primitive(Primitive),
    /// A reference type identified by its erased simple name, such as
    /// `List` or `String[]`.
    Reference(String),
    /// The type of the `null` literal.
    Null,
}

impl JavaType {
    fn string() -> Self {
        Self::Reference("String".to_owned())
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(primitive) => f.write_str(primitive.keyword()),
            Self::Reference(name) => f.write_str(name),
            Self::Null => f.write_str("null"),
        }
    }
}

/// Type constraint attached to a declared metavariable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeConstraint {
    /// No constraint, or a type variable such as `T`.
    #[default]
    Any,
    /// Exactly this primitive type.
    Primitive(Primitive),
    /// A reference type, identified by erased simple name.
    Reference(String),
}

impl TypeConstraint {
    /// Parses a constraint written as a Java type.
    ///
    /// Type variables (a single uppercase letter, optionally followed by
    /// digits) and `?` impose no constraint. Generic arguments are erased and
    /// qualified names reduce to their simple name.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::InvalidTypeConstraint`] when `text` is not a
    /// well-formed Java type.
    pub fn parse(name: &str, text: &str) -> Result<Self, SyntaxError> {
        let invalid = || SyntaxError::invalid_type_constraint(name, text);
        let trimmed = text.trim();
        if trimmed == "?" {
            return Ok(Self::Any);
        }

        let erased = erase_generics(trimmed).ok_or_else(invalid)?;
        let (base, dims) = split_array_suffix(&erased).ok_or_else(invalid)?;
        if !is_qualified_name(base) {
            return Err(invalid());
        }
        let simple = base.rsplit('.').next().unwrap_or(base);

        if dims == 0
            && let Some(primitive) = Primitive::from_keyword(simple)
        {
            return Ok(Self::Primitive(primitive));
        }
        if dims == 0 && is_type_variable(simple) {
            return Ok(Self::Any);
        }
        Ok(Self::Reference(format!("{simple}{}", "[]".repeat(dims))))
    }

    /// Returns whether an expression of type `actual` may bind a
    /// metavariable with this constraint.
    #[must_use]
    pub fn admits(&self, actual: Option<&JavaType>) -> bool {
        match self {
            Self::Any => true,
            Self::Primitive(expected) => actual == Some(&JavaType::Primitive(*expected)),
            Self::Reference(expected) => match actual {
                None | Some(JavaType::Null) => true,
                Some(JavaType::Primitive(primitive)) => {
                    is_subtype(primitive.boxed(), expected).unwrap_or(false)
                }
                Some(JavaType::Reference(name)) => is_subtype(name, expected).unwrap_or(true),
            },
        }
    }
}

impl fmt::Display for TypeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Primitive(primitive) => f.write_str(primitive.keyword()),
            Self::Reference(name) => f.write_str(name),
        }
    }
}

fn is_type_variable(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_digit())
}

fn is_qualified_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
                && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        })
}

/// Removes `<...>` groups, returning `None` when brackets are unbalanced.
fn erase_generics(text: &str) -> Option<String> {
    let mut depth = 0_usize;
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.checked_sub(1)?,
            _ if depth == 0 && !ch.is_whitespace() => out.push(ch),
            _ => {}
        }
    }
    (depth == 0).then_some(out)
}

fn split_array_suffix(text: &str) -> Option<(&str, usize)> {
    let mut base = text;
    let mut dims = 0;
    while let Some(rest) = base.strip_suffix("[]") {
        base = rest;
        dims += 1;
    }
    (!base.contains(['[', ']'])).then_some((base, dims))
}

/// Direct supertypes of well-known JDK and Guava types. `Object` is implied.
const SUPERTYPES: &[(&str, &[&str])] = &[
    ("Object", &[]),
    ("Iterable", &[]),
    ("Collection", &["Iterable"]),
    ("List", &["Collection"]),
    ("Set", &["Collection"]),
    ("SortedSet", &["Set"]),
    ("NavigableSet", &["SortedSet"]),
    ("Queue", &["Collection"]),
    ("Deque", &["Queue"]),
    ("ArrayList", &["List"]),
    ("LinkedList", &["List", "Deque"]),
    ("HashSet", &["Set"]),
    ("LinkedHashSet", &["HashSet"]),
    ("TreeSet", &["NavigableSet"]),
    ("ArrayDeque", &["Deque"]),
    ("Map", &[]),
    ("SortedMap", &["Map"]),
    ("NavigableMap", &["SortedMap"]),
    ("HashMap", &["Map"]),
    ("LinkedHashMap", &["HashMap"]),
    ("TreeMap", &["NavigableMap"]),
    ("ImmutableCollection", &["Collection"]),
    ("ImmutableList", &["ImmutableCollection", "List"]),
    ("ImmutableSet", &["ImmutableCollection", "Set"]),
    ("ImmutableSortedSet", &["ImmutableSet", "NavigableSet"]),
    ("ImmutableMap", &["Map"]),
    ("Multiset", &["Collection"]),
    ("ImmutableMultiset", &["ImmutableCollection", "Multiset"]),
    ("FluentIterable", &["Iterable"]),
    ("Optional", &[]),
    ("Stream", &[]),
    ("CharSequence", &[]),
    ("Comparable", &[]),
    ("String", &["CharSequence", "Comparable"]),
    ("StringBuilder", &["CharSequence"]),
    ("Number", &[]),
    ("Integer", &["Number", "Comparable"]),
    ("Long", &["Number", "Comparable"]),
    ("Short", &["Number", "Comparable"]),
    ("Byte", &["Number", "Comparable"]),
    ("Double", &["Number", "Comparable"]),
    ("Float", &["Number", "Comparable"]),
    ("BigInteger", &["Number", "Comparable"]),
    ("BigDecimal", &["Number", "Comparable"]),
    ("Character", &["Comparable"]),
    ("Boolean", &["Comparable"]),
];

fn direct_supertypes(name: &str) -> Option<&'static [&'static str]> {
    SUPERTYPES
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, supers)| *supers)
}

/// Returns `Some(true)` when `name` is `expected` or a known subtype of it,
/// `Some(false)` when the hierarchy of `name` is known and excludes
/// `expected`, and `None` when `name` is not a known type.
fn is_subtype(name: &str, expected: &str) -> Option<bool> {
    if name == expected || expected == "Object" {
        return Some(true);
    }
    if name.ends_with("[]") || expected.ends_with("[]") {
        // Arrays only relate to `Object` and to themselves.
        return Some(false);
    }
    let supers = direct_supertypes(name)?;
    Some(
        supers
            .iter()
            .any(|parent| is_subtype(parent, expected).unwrap_or(false)),
    )
}

/// Answers the approximate static type of expression nodes.
pub trait TypeOracle {
    /// Returns the inferred type of `node`, or `None` when unknown.
    fn type_of(&self, node: &SyntaxNode) -> Option<JavaType>;
}

/// Type oracle that knows only the declarations of one compilation unit.
#[derive(Debug, Clone, Default)]
pub struct LocalTypeOracle {
    // `None` marks names declared with conflicting types.
    declarations: HashMap<String, Option<JavaType>>,
}

impl LocalTypeOracle {
    /// Collects the declared names of `tree`.
    #[must_use]
    pub fn new(tree: &SyntaxTree) -> Self {
        let mut oracle = Self::default();
        for node in tree.root().preorder() {
            oracle.record_declaration(node);
        }
        oracle
    }

    /// Returns the declared type of a simple name, when unambiguous.
    #[must_use]
    pub fn declared_type(&self, name: &str) -> Option<&JavaType> {
        self.declarations.get(name).and_then(Option::as_ref)
    }

    fn record_declaration(&mut self, node: &SyntaxNode) {
        match node.kind() {
            "local_variable_declaration" | "field_declaration" | "constant_declaration" => {
                let Some(ty) = node.child_by_field("type").and_then(type_from_node) else {
                    return;
                };
                for declarator in node.children().iter().filter(|c| c.kind() == "variable_declarator") {
                    if let Some(name) = declarator.child_by_field("name").and_then(SyntaxNode::token_text) {
                        self.insert(name, ty.clone());
                    }
                }
            }
            "formal_parameter" | "enhanced_for_statement" => {
                let declared = node.child_by_field("type").and_then(type_from_node);
                let ident = node.child_by_field("name").and_then(SyntaxNode::token_text);
                if let (Some(ty), Some(name)) = (declared, ident) {
                    self.insert(name, ty);
                }
            }
            "catch_formal_parameter" => {
                let declared = node
                    .children()
                    .iter()
                    .find(|c| c.kind() == "catch_type")
                    .and_then(|catch| catch.named_children().next())
                    .and_then(type_from_node);
                let ident = node.child_by_field("name").and_then(SyntaxNode::token_text);
                if let (Some(ty), Some(name)) = (declared, ident) {
                    self.insert(name, ty);
                }
            }
            _ => {}
        }
    }

    fn insert(&mut self, name: &str, ty: JavaType) {
        self.declarations
            .entry(name.to_owned())
            .and_modify(|existing| {
                if existing.as_ref() != Some(&ty) {
                    *existing = None;
                }
            })
            .or_insert(Some(ty));
    }

    fn binary_type(&self, node: &SyntaxNode) -> Option<JavaType> {
        if node.kind() == "instanceof_expression" {
            return Some(JavaType::Primitive(Primitive::Boolean));
        }
        let operator = node.child_by_field("operator")?.token_text()?;
        let left = node.child_by_field("left").and_then(|n| self.type_of(n));
        let right = node.child_by_field("right").and_then(|n| self.type_of(n));
        match operator {
            "==" | "!=" | "<" | ">" | "<=" | ">=" | "&&" | "||" => {
                Some(JavaType::Primitive(Primitive::Boolean))
            }
            "+" if left == Some(JavaType::string()) || right == Some(JavaType::string()) => {
                Some(JavaType::string())
            }
            "<<" | ">>" | ">>>" => unary_promotion(left?),
            "&" | "|" | "^"
                if left == Some(JavaType::Primitive(Primitive::Boolean))
                    && right == Some(JavaType::Primitive(Primitive::Boolean)) =>
            {
                Some(JavaType::Primitive(Primitive::Boolean))
            }
            _ => binary_promotion(left?, right?),
        }
    }

    fn unary_type(&self, node: &SyntaxNode) -> Option<JavaType> {
        let operand = node.named_children().next()?;
        if node.kind() == "update_expression" {
            return self.type_of(operand);
        }
        let operator = node.child_by_field("operator")?.token_text()?;
        if operator == "!" {
            return Some(JavaType::Primitive(Primitive::Boolean));
        }
        unary_promotion(self.type_of(operand)?)
    }

    fn ternary_type(&self, node: &SyntaxNode) -> Option<JavaType> {
        let consequence = self.type_of(node.child_by_field("consequence")?)?;
        let alternative = self.type_of(node.child_by_field("alternative")?)?;
        if consequence == alternative {
            return Some(consequence);
        }
        binary_promotion(consequence, alternative)
    }

    fn method_call_type(&self, node: &SyntaxNode) -> Option<JavaType> {
        let name = node.child_by_field("name")?.token_text()?;
        let argument_count = node
            .child_by_field("arguments")
            .map_or(0, |args| args.named_children().count());
        let receiver = node.child_by_field("object");
        match (name, argument_count) {
            ("size" | "length" | "hashCode", 0) => receiver.map(|_| JavaType::Primitive(Primitive::Int)),
            ("isEmpty", 0) | ("equals" | "contains" | "startsWith" | "endsWith", 1) => {
                receiver.map(|_| JavaType::Primitive(Primitive::Boolean))
            }
            ("toString", 0) => Some(JavaType::string()),
            _ => None,
        }
    }
}

impl TypeOracle for LocalTypeOracle {
    fn type_of(&self, node: &SyntaxNode) -> Option<JavaType> {
        match node.node_kind() {
            NodeKind::Literal(literal) => Some(literal_type(literal)),
            NodeKind::Parenthesized => self.type_of(node.named_children().next()?),
            NodeKind::Cast | NodeKind::ObjectCreation => {
                node.child_by_field("type").and_then(type_from_node)
            }
            NodeKind::Identifier => self.declared_type(node.token_text()?).cloned(),
            NodeKind::Binary => self.binary_type(node),
            NodeKind::Unary => self.unary_type(node),
            NodeKind::Ternary => self.ternary_type(node),
            NodeKind::Assignment => self.type_of(node.child_by_field("left")?),
            NodeKind::MethodCall => self.method_call_type(node),
            NodeKind::ArrayAccess => match self.type_of(node.child_by_field("array")?)? {
                JavaType::Reference(name) => element_type(&name),
                JavaType::Primitive(_) | JavaType::Null => None,
            },
            _ => None,
        }
    }
}

fn literal_type(kind: LiteralKind) -> JavaType {
    match kind {
        LiteralKind::Int => JavaType::Primitive(Primitive::Int),
        LiteralKind::Long => JavaType::Primitive(Primitive::Long),
        LiteralKind::Float => JavaType::Primitive(Primitive::Float),
        LiteralKind::Double => JavaType::Primitive(Primitive::Double),
        LiteralKind::Char => JavaType::Primitive(Primitive::Char),
        LiteralKind::Boolean => JavaType::Primitive(Primitive::Boolean),
        LiteralKind::String => JavaType::string(),
        LiteralKind::Null => JavaType::Null,
    }
}

fn element_type(array: &str) -> Option<JavaType> {
    let element = array.strip_suffix("[]")?;
    Some(Primitive::from_keyword(element).map_or_else(
        || JavaType::Reference(element.to_owned()),
        JavaType::Primitive,
    ))
}

/// Converts a type node into a [`JavaType`]. `var` and type variables are
/// unknown.
pub(crate) fn type_from_node(node: &SyntaxNode) -> Option<JavaType> {
    let text = node.normalized().replace(' ', "");
    let erased = erase_generics(&text)?;
    let (base, dims) = split_array_suffix(&erased)?;
    let simple = base.rsplit('.').next()?;
    if simple == "var" || (dims == 0 && is_type_variable(simple)) {
        return None;
    }
    if dims == 0
        && let Some(primitive) = Primitive::from_keyword(simple)
    {
        return Some(JavaType::Primitive(primitive));
    }
    Some(JavaType::Reference(format!("{simple}{}", "[]".repeat(dims))))
}

fn unary_promotion(ty: JavaType) -> Option<JavaType> {
    let JavaType::Primitive(primitive) = ty else {
        return unboxed(&ty).and_then(|p| unary_promotion(JavaType::Primitive(p)));
    };
    match primitive.numeric_rank()? {
        0..=2 => Some(JavaType::Primitive(Primitive::Int)),
        _ => Some(JavaType::Primitive(primitive)),
    }
}

fn binary_promotion(left: JavaType, right: JavaType) -> Option<JavaType> {
    let left_primitive = as_primitive(&left)?;
    let right_primitive = as_primitive(&right)?;
    if !left_primitive.is_numeric() || !right_primitive.is_numeric() {
        return None;
    }
    let wider = if left_primitive.numeric_rank() >= right_primitive.numeric_rank() {
        left_primitive
    } else {
        right_primitive
    };
    unary_promotion(JavaType::Primitive(wider))
}

fn as_primitive(ty: &JavaType) -> Option<Primitive> {
    match ty {
        JavaType::Primitive(primitive) => Some(*primitive),
        JavaType::Reference(_) | JavaType::Null => unboxed(ty),
    }
}

fn unboxed(ty: &JavaType) -> Option<Primitive> {
    let JavaType::Reference(name) = ty else {
        return None;
    };
    [
        Primitive::Boolean,
        Primitive::Byte,
        Primitive::Short,
        Primitive::Char,
        Primitive::Int,
        Primitive::Long,
        Primitive::Float,
        Primitive::Double,
    ]
    .into_iter()
    .find(|primitive| primitive.boxed() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use rstest::rstest;

    fn expression_type(body: &str, expression: &str) -> Option<JavaType> {
        let source = format!("class A {{ void f(int i, char c, long l, String s, java.util.List<String> xs) {{ {body} Object probe = {expression}; }} }}");
        let tree = parse(&source).expect("parse");
        let oracle = LocalTypeOracle::new(&tree);
        let declarator = tree
            .root()
            .preorder()
            .into_iter()
            .filter(|n| n.kind() == "variable_declarator")
            .last()
            .expect("probe declarator");
        let value = declarator.child_by_field("value").expect("value");
        oracle.type_of(value)
    }

    #[rstest]
    #[case("", "1", Some(JavaType::Primitive(Primitive::Int)))]
    #[case("", "1L", Some(JavaType::Primitive(Primitive::Long)))]
    #[case("", "'x'", Some(JavaType::Primitive(Primitive::Char)))]
    #[case("", "\"x\"", Some(JavaType::Reference("String".to_owned())))]
    #[case("", "null", Some(JavaType::Null))]
    #[case("", "i", Some(JavaType::Primitive(Primitive::Int)))]
    #[case("", "c", Some(JavaType::Primitive(Primitive::Char)))]
    #[case("", "i % 2", Some(JavaType::Primitive(Primitive::Int)))]
    #[case("", "c + 1", Some(JavaType::Primitive(Primitive::Int)))]
    #[case("", "i + l", Some(JavaType::Primitive(Primitive::Long)))]
    #[case("", "s + i", Some(JavaType::Reference("String".to_owned())))]
    #[case("", "i < 3", Some(JavaType::Primitive(Primitive::Boolean)))]
    #[case("", "(long) i", Some(JavaType::Primitive(Primitive::Long)))]
    #[case("", "(i)", Some(JavaType::Primitive(Primitive::Int)))]
    #[case("", "new java.util.ArrayList<String>()", Some(JavaType::Reference("ArrayList".to_owned())))]
    #[case("", "xs", Some(JavaType::Reference("List".to_owned())))]
    #[case("", "xs.size()", Some(JavaType::Primitive(Primitive::Int)))]
    #[case("double d = 1;", "d", Some(JavaType::Primitive(Primitive::Double)))]
    #[case("", "unknown", None)]
    #[case("", "i > 0 ? i : l", Some(JavaType::Primitive(Primitive::Long)))]
    fn oracle_infers_expression_types(
        #[case] body: &str,
        #[case] expression: &str,
        #[case] expected: Option<JavaType>,
    ) {
        assert_eq!(expression_type(body, expression), expected);
    }

    #[test]
    fn conflicting_declarations_are_unknown() {
        let tree = parse("class A { void f(int x) {} void g(String x) {} }").expect("parse");
        let oracle = LocalTypeOracle::new(&tree);
        assert_eq!(oracle.declared_type("x"), None);
    }

    #[rstest]
    #[case("int", TypeConstraint::Primitive(Primitive::Int))]
    #[case("T", TypeConstraint::Any)]
    #[case("?", TypeConstraint::Any)]
    #[case("Iterable<?>", TypeConstraint::Reference("Iterable".to_owned()))]
    #[case("java.util.Map<K, V>", TypeConstraint::Reference("Map".to_owned()))]
    #[case("int[]", TypeConstraint::Reference("int[]".to_owned()))]
    fn constraints_parse(#[case] text: &str, #[case] expected: TypeConstraint) {
        assert_eq!(TypeConstraint::parse("X", text).expect("parse"), expected);
    }

    #[rstest]
    #[case("")]
    #[case("List<String")]
    #[case("int[")]
    #[case("9lives")]
    fn malformed_constraints_are_rejected(#[case] text: &str) {
        let err = TypeConstraint::parse("X", text).expect_err("should reject");
        assert!(matches!(err, SyntaxError::InvalidTypeConstraint { .. }));
    }

    #[rstest]
    #[case(TypeConstraint::Primitive(Primitive::Int), Some(JavaType::Primitive(Primitive::Int)), true)]
    #[case(TypeConstraint::Primitive(Primitive::Int), Some(JavaType::Primitive(Primitive::Char)), false)]
    #[case(TypeConstraint::Primitive(Primitive::Int), None, false)]
    #[case(TypeConstraint::Reference("Iterable".to_owned()), Some(JavaType::Reference("ArrayList".to_owned())), true)]
    #[case(TypeConstraint::Reference("Iterable".to_owned()), Some(JavaType::Reference("String".to_owned())), false)]
    #[case(TypeConstraint::Reference("Iterable".to_owned()), Some(JavaType::Reference("MyBag".to_owned())), true)]
    #[case(TypeConstraint::Reference("Iterable".to_owned()), None, true)]
    #[case(TypeConstraint::Reference("Integer".to_owned()), Some(JavaType::Primitive(Primitive::Int)), true)]
    #[case(TypeConstraint::Reference("Integer".to_owned()), Some(JavaType::Primitive(Primitive::Long)), false)]
    #[case(TypeConstraint::Reference("Object".to_owned()), Some(JavaType::Primitive(Primitive::Char)), true)]
    #[case(TypeConstraint::Reference("String".to_owned()), Some(JavaType::Null), true)]
    fn constraints_admit_compatible_types(
        #[case] constraint: TypeConstraint,
        #[case] actual: Option<JavaType>,
        #[case] expected: bool,
    ) {
        assert_eq!(constraint.admits(actual.as_ref()), expected);
    }
}
