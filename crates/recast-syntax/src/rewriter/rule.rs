//! Rewrite rules: templates plus applicability predicates and imports.

use std::fmt;
use std::str::FromStr;

use crate::error::SyntaxError;
use crate::matcher::Binding;
use crate::template::{MetaVarDecl, RuleTemplates};
use crate::tree::{NodeKind, SyntaxNode};
use crate::types::{JavaType, TypeConstraint, TypeOracle};

/// Extra condition a match must satisfy before it is rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Both metavariables have the same known static type.
    SameType(String, String),
    /// The metavariable is bound to a literal.
    Literal(String),
    /// The metavariable is bound to something other than a literal.
    NotLiteral(String),
    /// The metavariable has a known static type that is not the given one.
    /// `null` counts as any reference type.
    NotType(String, TypeConstraint),
}

impl Predicate {
    /// Returns the metavariable names the predicate refers to.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::SameType(left, right) => vec![left, right],
            Self::Literal(name) | Self::NotLiteral(name) | Self::NotType(name, _) => vec![name],
        }
    }

    /// Evaluates the predicate against a completed binding.
    #[must_use]
    pub fn holds(&self, binding: &Binding<'_>, oracle: &dyn TypeOracle) -> bool {
        match self {
            Self::SameType(left, right) => {
                let left_type = binding.node(left).and_then(|node| oracle.type_of(node));
                let right_type = binding.node(right).and_then(|node| oracle.type_of(node));
                left_type.is_some() && left_type == right_type
            }
            Self::Literal(name) => binding.node(name).is_some_and(is_literal),
            Self::NotLiteral(name) => binding.node(name).is_some_and(|node| !is_literal(node)),
            Self::NotType(name, excluded) => binding
                .node(name)
                .and_then(|node| oracle.type_of(node))
                .is_some_and(|actual| differs_from(&actual, excluded)),
        }
    }
}

fn is_literal(node: &SyntaxNode) -> bool {
    matches!(node.node_kind(), NodeKind::Literal(_))
}

fn differs_from(actual: &JavaType, excluded: &TypeConstraint) -> bool {
    match (actual, excluded) {
        (JavaType::Null, TypeConstraint::Reference(_)) => false,
        (JavaType::Primitive(primitive), TypeConstraint::Primitive(other)) => primitive != other,
        (JavaType::Reference(name), TypeConstraint::Reference(other)) => name != other,
        _ => true,
    }
}

impl FromStr for Predicate {
    type Err = SyntaxError;

    /// Parses `same_type($A, $B)`, `literal($A)`, `not_literal($A)` or
    /// `not_type($A, Type)`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            SyntaxError::invalid_predicate(format!(
                "`{text}`: expected same_type($A, $B), literal($A), not_literal($A) \
                 or not_type($A, Type)"
            ))
        };
        let trimmed = text.trim();
        let (function, rest) = trimmed.split_once('(').ok_or_else(invalid)?;
        let inner = rest.strip_suffix(')').ok_or_else(invalid)?;

        if function.trim() == "not_type" {
            let (variable, type_text) = inner.split_once(',').ok_or_else(invalid)?;
            let name = variable.trim().strip_prefix('$').ok_or_else(invalid)?;
            let excluded = TypeConstraint::parse(name, type_text)?;
            if excluded == TypeConstraint::Any {
                return Err(invalid());
            }
            return Ok(Self::NotType(name.to_owned(), excluded));
        }

        let args = inner
            .split(',')
            .map(|arg| arg.trim().strip_prefix('$').map(str::to_owned))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(invalid)?;

        match (function.trim(), args.as_slice()) {
            ("same_type", [left, right]) => Ok(Self::SameType(left.clone(), right.clone())),
            ("literal", [name]) => Ok(Self::Literal(name.clone())),
            ("not_literal", [name]) => Ok(Self::NotLiteral(name.clone())),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SameType(left, right) => write!(f, "same_type(${left}, ${right})"),
            Self::Literal(name) => write!(f, "literal(${name})"),
            Self::NotLiteral(name) => write!(f, "not_literal(${name})"),
            Self::NotType(name, excluded) => write!(f, "not_type(${name}, {excluded})"),
        }
    }
}

/// An import the after-template may need.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportSpec {
    path: String,
    is_static: bool,
}

impl ImportSpec {
    /// Returns the fully qualified path, e.g. `java.util.Objects.checkIndex`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns whether this is a static member import.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.is_static
    }

    /// Returns the last segment of the path.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Returns everything before the last segment.
    #[must_use]
    pub fn qualifier(&self) -> &str {
        self.path.rsplit_once('.').map_or("", |(qualifier, _)| qualifier)
    }

    /// Renders the import as a Java declaration.
    #[must_use]
    pub fn declaration(&self) -> String {
        if self.is_static {
            format!("import static {};", self.path)
        } else {
            format!("import {};", self.path)
        }
    }
}

impl FromStr for ImportSpec {
    type Err = SyntaxError;

    /// Parses `a.b.C` or `static a.b.C.member`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim().trim_end_matches(';').trim();
        let without_keyword = trimmed.strip_prefix("import ").map_or(trimmed, str::trim);
        let (is_static, path) = without_keyword
            .strip_prefix("static ")
            .map_or((false, without_keyword), |rest| (true, rest.trim()));

        let segments: Vec<_> = path.split('.').collect();
        let well_formed = segments.len() >= 2
            && segments.iter().all(|segment| {
                let mut chars = segment.chars();
                chars
                    .next()
                    .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
                    && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
            });
        if !well_formed {
            return Err(SyntaxError::invalid_import(text));
        }
        Ok(Self {
            path: path.to_owned(),
            is_static,
        })
    }
}

impl fmt::Display for ImportSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_static {
            write!(f, "static {}", self.path)
        } else {
            f.write_str(&self.path)
        }
    }
}

/// A named rewrite rule. Immutable once built.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    name: String,
    description: Option<String>,
    templates: RuleTemplates,
    predicates: Vec<Predicate>,
    imports: Vec<ImportSpec>,
}

impl RewriteRule {
    /// Starts building a rule with the given name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> RewriteRuleBuilder {
        RewriteRuleBuilder {
            name: name.into(),
            ..RewriteRuleBuilder::default()
        }
    }

    /// Creates an unconstrained rule from one before-template and an
    /// after-template.
    ///
    /// # Errors
    ///
    /// Returns a template error when either template is invalid.
    pub fn new(
        name: impl Into<String>,
        before: &str,
        after: &str,
    ) -> Result<Self, SyntaxError> {
        Self::builder(name).before(before).after(after).build()
    }

    /// Returns the rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the compiled templates.
    #[must_use]
    pub const fn templates(&self) -> &RuleTemplates {
        &self.templates
    }

    /// Returns the applicability predicates.
    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Returns the imports the after-template may require.
    #[must_use]
    pub fn imports(&self) -> &[ImportSpec] {
        &self.imports
    }

    /// Returns whether every predicate holds for `binding`.
    #[must_use]
    pub fn accepts(&self, binding: &Binding<'_>, oracle: &dyn TypeOracle) -> bool {
        self.predicates
            .iter()
            .all(|predicate| predicate.holds(binding, oracle))
    }
}

/// Builder for [`RewriteRule`].
#[derive(Debug, Clone, Default)]
pub struct RewriteRuleBuilder {
    name: String,
    description: Option<String>,
    befores: Vec<String>,
    after: Option<String>,
    metavariables: Vec<(String, String)>,
    predicates: Vec<String>,
    imports: Vec<String>,
}

impl RewriteRuleBuilder {
    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a before-template.
    #[must_use]
    pub fn before(mut self, template: impl Into<String>) -> Self {
        self.befores.push(template.into());
        self
    }

    /// Sets the after-template.
    #[must_use]
    pub fn after(mut self, template: impl Into<String>) -> Self {
        self.after = Some(template.into());
        self
    }

    /// Declares a metavariable with a type constraint.
    #[must_use]
    pub fn metavariable(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.metavariables.push((name.into(), ty.into()));
        self
    }

    /// Adds a predicate such as `same_type($A, $B)`.
    #[must_use]
    pub fn predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicates.push(predicate.into());
        self
    }

    /// Adds an import such as `static java.util.Objects.checkIndex`.
    #[must_use]
    pub fn import(mut self, import: impl Into<String>) -> Self {
        self.imports.push(import.into());
        self
    }

    /// Compiles the templates and validates the rule.
    ///
    /// # Errors
    ///
    /// Returns a template error when a template, declaration, predicate or
    /// import is invalid.
    pub fn build(self) -> Result<RewriteRule, SyntaxError> {
        let after = self.after.ok_or_else(|| {
            SyntaxError::invalid_template("", format!("rule {} has no after-template", self.name))
        })?;
        let decls = self
            .metavariables
            .iter()
            .map(|(name, ty)| MetaVarDecl::new(name, ty))
            .collect::<Result<Vec<_>, _>>()?;
        let befores: Vec<&str> = self.befores.iter().map(String::as_str).collect();
        let templates = RuleTemplates::compile(&befores, &after, &decls)?;

        let predicates = self
            .predicates
            .iter()
            .map(|text| text.parse::<Predicate>())
            .collect::<Result<Vec<_>, _>>()?;
        for predicate in &predicates {
            if let Some(unbound) = predicate
                .names()
                .into_iter()
                .find(|name| !templates.binds(name))
            {
                return Err(SyntaxError::invalid_predicate(format!(
                    "`{predicate}` refers to ${unbound}, which no before-template binds"
                )));
            }
        }

        let imports = self
            .imports
            .iter()
            .map(|text| text.parse::<ImportSpec>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RewriteRule {
            name: self.name,
            description: self.description,
            templates,
            predicates,
            imports,
        })
    }
}
