//! Serialisable views of rules and batch reports for JSON output.

use std::collections::BTreeMap;

use recast_runner::{BatchReport, FileReport};
use recast_syntax::{ImportSpec, RewriteRule};
use serde::Serialize;

/// One line of `recast list`.
#[derive(Debug, Serialize)]
pub(crate) struct RuleSummary<'a> {
    pub(crate) name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<&'a str>,
}

/// Everything `recast show` prints about a rule.
#[derive(Debug, Serialize)]
pub(crate) struct RuleDetail<'a> {
    pub(crate) name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<&'a str>,
    pub(crate) before: Vec<&'a str>,
    pub(crate) after: &'a str,
    pub(crate) metavariables: BTreeMap<&'a str, String>,
    pub(crate) imports: Vec<String>,
    pub(crate) predicates: Vec<String>,
}

impl<'a> From<&'a RewriteRule> for RuleDetail<'a> {
    fn from(rule: &'a RewriteRule) -> Self {
        let templates = rule.templates();
        Self {
            name: rule.name(),
            description: rule.description(),
            before: templates.befores().iter().map(|t| t.source()).collect(),
            after: templates.after().source(),
            metavariables: templates
                .decls()
                .iter()
                .map(|decl| (decl.name.as_str(), decl.constraint.to_string()))
                .collect(),
            imports: rule.imports().iter().map(import_text).collect(),
            predicates: rule.predicates().iter().map(ToString::to_string).collect(),
        }
    }
}

fn import_text(import: &ImportSpec) -> String {
    if import.is_static() {
        format!("static {}", import.path())
    } else {
        import.path().to_owned()
    }
}

/// Result of `recast run`.
#[derive(Debug, Serialize)]
pub(crate) struct RunSummary<'a> {
    pub(crate) recipe: &'a str,
    pub(crate) dry_run: bool,
    pub(crate) rewritten: usize,
    pub(crate) unchanged: usize,
    pub(crate) failed: usize,
    pub(crate) skipped: usize,
    pub(crate) files: &'a [FileReport],
}

impl<'a> RunSummary<'a> {
    pub(crate) fn new(recipe: &'a str, dry_run: bool, report: &'a BatchReport) -> Self {
        Self {
            recipe,
            dry_run,
            rewritten: report.rewritten(),
            unchanged: report.unchanged(),
            failed: report.failed(),
            skipped: report.skipped(),
            files: report.files(),
        }
    }
}
