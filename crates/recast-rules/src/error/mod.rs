//! Errors raised while loading, registering and resolving rules.
//!
//! I/O errors are wrapped in `Arc` so the enum stays cheap to clone and small
//! enough for the `result_large_err` lint.

use std::path::PathBuf;
use std::sync::Arc;

use recast_syntax::SyntaxError;
use thiserror::Error;

/// Errors arising from rule definitions and the registry.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum RuleError {
    /// No rule or rule class is registered under the requested name.
    #[error("unknown rule '{name}'")]
    UnknownRule {
        /// Name that was looked up.
        name: String,
    },

    /// A rule with the same name was registered twice.
    #[error("rule '{name}' is already registered")]
    DuplicateRule {
        /// Conflicting rule name.
        name: String,
    },

    /// A rule file is not a valid rule document.
    #[error("invalid rule definition in {origin}: {message}")]
    Definition {
        /// File path or label the document was read from.
        origin: String,
        /// Description of the failure.
        message: String,
    },

    /// A rule's templates failed to compile.
    #[error("rule '{name}' is invalid: {source}")]
    Template {
        /// Rule name.
        name: String,
        /// Underlying template error.
        #[source]
        source: SyntaxError,
    },

    /// A rule file or directory could not be read.
    #[error("failed to read rules from {}: {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl RuleError {
    /// Creates an [`RuleError::UnknownRule`] error.
    #[must_use]
    pub fn unknown_rule(name: impl Into<String>) -> Self {
        Self::UnknownRule { name: name.into() }
    }

    /// Creates a [`RuleError::DuplicateRule`] error.
    #[must_use]
    pub fn duplicate_rule(name: impl Into<String>) -> Self {
        Self::DuplicateRule { name: name.into() }
    }

    /// Creates a [`RuleError::Definition`] error.
    #[must_use]
    pub fn definition(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Definition {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Creates a [`RuleError::Template`] error.
    #[must_use]
    pub fn template(name: impl Into<String>, source: SyntaxError) -> Self {
        Self::Template {
            name: name.into(),
            source,
        }
    }

    /// Creates a [`RuleError::Io`] error.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}

#[cfg(test)]
mod tests;
