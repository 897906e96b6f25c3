//! Rule definitions and the rule registry for recast.
//!
//! Rules are written in YAML documents and compiled into
//! [`recast_syntax::RewriteRule`] values. A set of rules ships inside the
//! binary (AssertJ assertions, preconditions, string and math idioms); more
//! can be loaded from a file or directory named in the configuration.
//!
//! Rule names follow the `<RuleClass>.<RuleName>` convention. A recipe is
//! either one rule or every rule of a rule class:
//!
//! ```
//! use recast_rules::load_registry;
//!
//! let registry = load_registry(None)?;
//! let recipe = registry.recipe("PreconditionsRules")?;
//! assert!(!recipe.is_empty());
//! # Ok::<(), recast_rules::RuleError>(())
//! ```

mod catalog;
mod definition;
mod error;
mod registry;

pub use definition::{RuleDefinition, RuleDocument};
pub use error::RuleError;
pub use registry::{RegistryBuilder, RuleRegistry, load_registry};

#[cfg(test)]
mod tests;
