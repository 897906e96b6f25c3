//! Rule registry for rule storage and lookup.
//!
//! Rules are collected with a [`RegistryBuilder`], which rejects duplicate
//! names, and frozen into a [`RuleRegistry`]. The frozen registry never
//! changes, shares its rules through `Arc`, and can be handed to any number
//! of worker threads.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use recast_syntax::RewriteRule;
use tracing::{debug, info};

use crate::catalog;
use crate::definition::RuleDocument;
use crate::error::RuleError;

/// Collects rules before the registry is frozen.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    rules: BTreeMap<String, Arc<RewriteRule>>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder pre-populated with the built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if a catalog rule fails to compile.
    pub fn with_catalog() -> Result<Self, RuleError> {
        let mut builder = Self::new();
        for (origin, text) in catalog::SOURCES {
            builder.register_document(RuleDocument::parse(text, origin)?)?;
        }
        Ok(builder)
    }

    /// Registers a rule under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::DuplicateRule`] if the name is already taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        rule: RewriteRule,
    ) -> Result<(), RuleError> {
        let key = name.into();
        if self.rules.contains_key(&key) {
            return Err(RuleError::duplicate_rule(key));
        }
        debug!(rule = %key, "registered rule");
        self.rules.insert(key, Arc::new(rule));
        Ok(())
    }

    /// Compiles and registers every rule of a parsed document.
    ///
    /// # Errors
    ///
    /// Returns the first compilation or duplicate-name error.
    pub fn register_document(&mut self, document: RuleDocument) -> Result<(), RuleError> {
        for definition in document.into_rules() {
            let rule = definition.compile()?;
            self.register(definition.name(), rule)?;
        }
        Ok(())
    }

    /// Loads rules from a YAML file, or from every `.yaml`/`.yml` file in a
    /// directory in file-name order.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read, parsed or compiled, or if
    /// it redefines an existing rule.
    pub fn load_path(&mut self, path: &Path) -> Result<(), RuleError> {
        let files = rule_files(path)?;
        for file in &files {
            self.register_document(RuleDocument::read(file)?)?;
        }
        info!(path = %path.display(), files = files.len(), "loaded rule files");
        Ok(())
    }

    /// Returns the number of rules collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` when no rules have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Freezes the builder into a read-only registry.
    #[must_use]
    pub fn build(self) -> RuleRegistry {
        RuleRegistry { rules: self.rules }
    }
}

fn rule_files(path: &Path) -> Result<Vec<PathBuf>, RuleError> {
    let metadata = std::fs::metadata(path).map_err(|error| RuleError::io(path, error))?;
    if !metadata.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let entries = std::fs::read_dir(path).map_err(|error| RuleError::io(path, error))?;
    let mut files = Vec::new();
    for entry in entries {
        let file = entry.map_err(|error| RuleError::io(path, error))?.path();
        let is_yaml = file
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext, "yaml" | "yml"));
        if is_yaml && file.is_file() {
            files.push(file);
        }
    }
    files.sort();
    Ok(files)
}

/// Read-only map from rule names to compiled rules.
///
/// # Example
///
/// ```
/// use recast_rules::RegistryBuilder;
///
/// let registry = RegistryBuilder::with_catalog()?.build();
/// let rule = registry.lookup("AssertJIntegerRules.AssertThatIsEvenRecipe")?;
/// assert_eq!(rule.name(), "AssertJIntegerRules.AssertThatIsEvenRecipe");
/// let recipe = registry.recipe("AssertJIntegerRules")?;
/// assert!(recipe.len() >= 2);
/// # Ok::<(), recast_rules::RuleError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: BTreeMap<String, Arc<RewriteRule>>,
}

impl RuleRegistry {
    /// Looks up a single rule by its full name.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnknownRule`] if no rule has that name.
    pub fn lookup(&self, name: &str) -> Result<Arc<RewriteRule>, RuleError> {
        self.rules
            .get(name)
            .cloned()
            .ok_or_else(|| RuleError::unknown_rule(name))
    }

    /// Resolves a recipe: the named rule itself, or every rule whose name
    /// starts with `name.` in name order.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnknownRule`] if nothing matches.
    pub fn recipe(&self, name: &str) -> Result<Vec<Arc<RewriteRule>>, RuleError> {
        if let Some(rule) = self.rules.get(name) {
            return Ok(vec![Arc::clone(rule)]);
        }
        let prefix = format!("{name}.");
        let rules: Vec<_> = self
            .rules
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(_, rule)| Arc::clone(rule))
            .collect();
        if rules.is_empty() {
            return Err(RuleError::unknown_rule(name));
        }
        Ok(rules)
    }

    /// Iterates over registered names and rules in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<RewriteRule>)> {
        self.rules.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` when no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Builds the registry used by the command line: the built-in catalog plus
/// the rule file or directory at `rules_path`, when given.
///
/// # Errors
///
/// Returns an error if any rule fails to load or two rules share a name.
pub fn load_registry(rules_path: Option<&Path>) -> Result<RuleRegistry, RuleError> {
    let mut builder = RegistryBuilder::with_catalog()?;
    if let Some(path) = rules_path {
        builder.load_path(path)?;
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests;
