//! Error types for parsing, template compilation and rewriting.
//!
//! A single enum covers the whole crate. The variants fall into four families
//! that callers treat differently: parse errors are local to one file,
//! template errors are local to one rule, and non-convergence or invariant
//! violations are fatal for a run unless the caller opts into best effort.

use thiserror::Error;

/// Errors from parsing, template compilation and rewriting.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SyntaxError {
    /// Failed to initialise the Tree-sitter parser with the Java grammar.
    #[error("failed to initialise Java parser: {message}")]
    ParserInit {
        /// Description of the failure.
        message: String,
    },

    /// Source text is not valid Java.
    #[error("parse error at {line}:{column} (offset {offset}): {message}")]
    Parse {
        /// Byte offset of the first error.
        offset: usize,
        /// One-based line of the first error.
        line: u32,
        /// One-based column of the first error.
        column: u32,
        /// Description of the failure.
        message: String,
    },

    /// A template contains malformed metavariable syntax.
    #[error("invalid metavariable syntax: {message}")]
    InvalidMetavariable {
        /// Description of the metavariable error.
        message: String,
    },

    /// A template is not valid Java under any supported wrapping.
    #[error("invalid template `{template}`: {message}")]
    InvalidTemplate {
        /// The template source.
        template: String,
        /// Description of the failure.
        message: String,
    },

    /// A declared metavariable never occurs in a before-template.
    #[error("metavariable ${name} is declared but unused in the before-template")]
    UnusedMetavariable {
        /// Metavariable name without the `$` prefix.
        name: String,
    },

    /// The after-template references a metavariable the before-template
    /// does not bind.
    #[error("after-template references unbound metavariable ${name}")]
    UnboundMetavariable {
        /// Metavariable name without the `$` prefix.
        name: String,
    },

    /// A metavariable type constraint could not be parsed.
    #[error("invalid type constraint `{constraint}` for ${name}")]
    InvalidTypeConstraint {
        /// Metavariable name without the `$` prefix.
        name: String,
        /// The rejected constraint text.
        constraint: String,
    },

    /// An applicability predicate is malformed.
    #[error("invalid predicate: {message}")]
    InvalidPredicate {
        /// Description of the failure.
        message: String,
    },

    /// A rule import is not a qualified name.
    #[error("invalid import `{import}`: expected a qualified name, optionally prefixed by `static`")]
    InvalidImport {
        /// The rejected import text.
        import: String,
    },

    /// The cycle limit was reached while rules were still making changes.
    #[error("rewrite did not converge after {cycles} cycles; last change:\n{last_diff}")]
    NonConvergence {
        /// Number of cycles executed.
        cycles: usize,
        /// Line diff of the final cycle, for diagnosis.
        last_diff: String,
    },

    /// The engine detected a state that the template compiler should have
    /// prevented. Output is never emitted when this occurs.
    #[error("internal invariant violated: {message}")]
    InternalInvariant {
        /// Description of the violated invariant.
        message: String,
    },
}

impl SyntaxError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(message: impl Into<String>) -> Self {
        Self::ParserInit {
            message: message.into(),
        }
    }

    /// Creates a parse error located at `offset` within `source`.
    #[must_use]
    pub fn parse(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = crate::position::offset_to_one_based(source, offset);
        Self::Parse {
            offset,
            line,
            column,
            message: message.into(),
        }
    }

    /// Creates an invalid metavariable error.
    #[must_use]
    pub fn invalid_metavariable(message: impl Into<String>) -> Self {
        Self::InvalidMetavariable {
            message: message.into(),
        }
    }

    /// Creates an invalid template error.
    #[must_use]
    pub fn invalid_template(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            template: template.into(),
            message: message.into(),
        }
    }

    /// Creates an unused metavariable error.
    #[must_use]
    pub fn unused_metavariable(name: impl Into<String>) -> Self {
        Self::UnusedMetavariable { name: name.into() }
    }

    /// Creates an unbound metavariable error.
    #[must_use]
    pub fn unbound_metavariable(name: impl Into<String>) -> Self {
        Self::UnboundMetavariable { name: name.into() }
    }

    /// Creates an invalid type constraint error.
    #[must_use]
    pub fn invalid_type_constraint(name: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self::InvalidTypeConstraint {
            name: name.into(),
            constraint: constraint.into(),
        }
    }

    /// Creates an invalid predicate error.
    #[must_use]
    pub fn invalid_predicate(message: impl Into<String>) -> Self {
        Self::InvalidPredicate {
            message: message.into(),
        }
    }

    /// Creates an invalid import error.
    #[must_use]
    pub fn invalid_import(import: impl Into<String>) -> Self {
        Self::InvalidImport {
            import: import.into(),
        }
    }

    /// Creates a non-convergence error.
    #[must_use]
    pub fn non_convergence(cycles: usize, last_diff: impl Into<String>) -> Self {
        Self::NonConvergence {
            cycles,
            last_diff: last_diff.into(),
        }
    }

    /// Creates an internal invariant violation.
    #[must_use]
    pub fn internal_invariant(message: impl Into<String>) -> Self {
        Self::InternalInvariant {
            message: message.into(),
        }
    }

    /// Returns true for errors raised while compiling a rule definition.
    #[must_use]
    pub const fn is_template_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidMetavariable { .. }
                | Self::InvalidTemplate { .. }
                | Self::UnusedMetavariable { .. }
                | Self::UnboundMetavariable { .. }
                | Self::InvalidTypeConstraint { .. }
                | Self::InvalidPredicate { .. }
                | Self::InvalidImport { .. }
        )
    }

    /// Returns true for errors that abort a whole batch run by default.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NonConvergence { .. } | Self::InternalInvariant { .. } | Self::ParserInit { .. }
        )
    }
}
