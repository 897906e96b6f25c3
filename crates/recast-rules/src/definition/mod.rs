//! YAML rule documents.
//!
//! A rule file holds a top-level `rules` list. Each entry names the rule and
//! gives its before-templates, after-template and optional metavariable
//! types, predicates and imports:
//!
//! ```yaml
//! rules:
//!   - name: AssertJIntegerRules.AssertThatIsEvenRecipe
//!     metavariables:
//!       X: int
//!     before:
//!       - 'assertThat($X % 2).isEqualTo(0)'
//!     after: 'assertThat($X).isEven()'
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use recast_syntax::RewriteRule;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RuleError;

/// A parsed rule file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDocument {
    rules: Vec<RuleDefinition>,
}

impl RuleDocument {
    /// Parses a YAML rule document.
    ///
    /// `origin` labels the document in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Definition`] when the text is not valid YAML or
    /// does not describe a rule list.
    pub fn parse(text: &str, origin: &str) -> Result<Self, RuleError> {
        let document: Self = serde_saphyr::from_str(text)
            .map_err(|error| RuleError::definition(origin, error.to_string()))?;
        if let Some(rule) = document.rules.iter().find(|rule| rule.before.is_empty()) {
            return Err(RuleError::definition(
                origin,
                format!("rule '{}' has no before-templates", rule.name),
            ));
        }
        debug!(origin, rules = document.rules.len(), "parsed rule document");
        Ok(document)
    }

    /// Reads and parses a YAML rule file.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Io`] when the file cannot be read and
    /// [`RuleError::Definition`] when it cannot be parsed.
    pub fn read(path: &Path) -> Result<Self, RuleError> {
        let text = std::fs::read_to_string(path).map_err(|error| RuleError::io(path, error))?;
        Self::parse(&text, &path.display().to_string())
    }

    /// Returns the rule definitions in document order.
    #[must_use]
    pub fn rules(&self) -> &[RuleDefinition] {
        &self.rules
    }

    /// Consumes the document, returning its definitions.
    #[must_use]
    pub fn into_rules(self) -> Vec<RuleDefinition> {
        self.rules
    }
}

/// One rule as written in a rule file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDefinition {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    metavariables: BTreeMap<String, String>,
    before: Vec<String>,
    after: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    imports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    predicates: Vec<String>,
}

impl RuleDefinition {
    /// Returns the rule name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the before-templates.
    #[must_use]
    pub fn before(&self) -> &[String] {
        &self.before
    }

    /// Returns the after-template.
    #[must_use]
    pub const fn after(&self) -> &str {
        self.after.as_str()
    }

    /// Compiles the definition into a [`RewriteRule`].
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Template`] when any template, type constraint,
    /// predicate or import fails to compile.
    pub fn compile(&self) -> Result<RewriteRule, RuleError> {
        let mut builder = RewriteRule::builder(&self.name).after(&self.after);
        if let Some(description) = &self.description {
            builder = builder.description(description);
        }
        for template in &self.before {
            builder = builder.before(template);
        }
        for (name, ty) in &self.metavariables {
            builder = builder.metavariable(name, ty);
        }
        for predicate in &self.predicates {
            builder = builder.predicate(predicate);
        }
        for import in &self.imports {
            builder = builder.import(import);
        }
        builder
            .build()
            .map_err(|error| RuleError::template(&self.name, error))
    }
}
