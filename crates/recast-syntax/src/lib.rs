//! Template-based rewriting of Java sources.
//!
//! This crate parses Java with Tree-sitter into an owned, lossless syntax
//! tree and rewrites it with rules written as ordinary Java templates:
//!
//! - **Parsing** via [`JavaParser`], producing a [`SyntaxTree`] whose
//!   [`SyntaxTree::print`] reproduces the input exactly
//! - **Templates** via [`Template`] and [`RuleTemplates`], compiled from
//!   before/after sources plus metavariable declarations
//! - **Matching** via [`Matcher`], binding metavariables with consistency and
//!   static type checks answered by a [`TypeOracle`]
//! - **Rewriting** via [`Rewriter`], which substitutes every match, fixes
//!   imports and can drive a recipe to a fixed point
//!
//! # Template Language
//!
//! - `$VAR` matches any single node and binds it
//! - `$_` matches any single node without binding it
//! - `$$$VAR` matches zero or more sibling nodes
//!
//! A metavariable may be declared with a Java type such as `int`,
//! `Iterable<?>` or `T`; bindings whose static type is incompatible are
//! rejected.
//!
//! # Example
//!
//! ```
//! use recast_syntax::{RewriteRule, Rewriter};
//!
//! let rule = RewriteRule::builder("AssertJIntegerRules.AssertThatIsEvenRecipe")
//!     .before("assertThat($X % 2).isEqualTo(0)")
//!     .after("assertThat($X).isEven()")
//!     .metavariable("X", "int")
//!     .build()?;
//!
//! let result = Rewriter::new().apply(
//!     &rule,
//!     "class T { void t() { assertThat(1 % 2).isEqualTo(0); } }",
//! )?;
//! assert_eq!(result.applied(), 1);
//! # Ok::<(), recast_syntax::SyntaxError>(())
//! ```

mod error;
mod imports;
mod matcher;
mod metavariables;
mod parser;
mod position;
mod rewriter;
mod template;
mod tree;
mod types;

pub use error::SyntaxError;
pub use matcher::{Binding, Bound, MatchSite, Matcher, match_template};
pub use metavariables::{MetaVarKind, MetaVariable};
pub use parser::{JavaParser, SyntaxErrorInfo, parse};
pub use rewriter::{
    CycleReport, ImportSpec, PassState, Predicate, RewriteResult, RewriteRule,
    RewriteRuleBuilder, Rewriter,
};
pub use template::{MetaVarDecl, RuleTemplates, Template};
pub use tree::{LiteralKind, NodeKind, SyntaxNode, SyntaxTree};
pub use types::{JavaType, LocalTypeOracle, Primitive, TypeConstraint, TypeOracle};

#[cfg(test)]
mod tests;
