//! Rendering of command results as text or JSON.

mod models;

use std::io::Write;

use recast_rules::RuleRegistry;
use recast_runner::{BatchReport, FileOutcome};
use recast_syntax::RewriteRule;
use serde::Serialize;

use crate::AppError;
use crate::cli::OutputFormat;
use models::{RuleDetail, RuleSummary, RunSummary};

fn write_json<W: Write>(out: &mut W, value: &impl Serialize) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(AppError::Serialise)?;
    writeln!(out)?;
    Ok(())
}

/// Writes every registered rule with its description.
pub(crate) fn render_rule_list<W: Write>(
    out: &mut W,
    registry: &RuleRegistry,
    format: OutputFormat,
) -> Result<(), AppError> {
    let rules: Vec<_> = registry
        .iter()
        .map(|(name, rule)| RuleSummary {
            name,
            description: rule.description(),
        })
        .collect();
    if format == OutputFormat::Json {
        return write_json(out, &rules);
    }

    let width = rules.iter().map(|rule| rule.name.len()).max().unwrap_or(0);
    for rule in &rules {
        match rule.description {
            Some(description) => writeln!(out, "{:<width$}  {description}", rule.name)?,
            None => writeln!(out, "{}", rule.name)?,
        }
    }
    Ok(())
}

/// Writes the templates, metavariables, imports and predicates of a rule.
pub(crate) fn render_rule<W: Write>(
    out: &mut W,
    rule: &RewriteRule,
    format: OutputFormat,
) -> Result<(), AppError> {
    let detail = RuleDetail::from(rule);
    if format == OutputFormat::Json {
        return write_json(out, &detail);
    }

    writeln!(out, "{}", detail.name)?;
    if let Some(description) = detail.description {
        writeln!(out, "  {description}")?;
    }
    write_section(out, "before", detail.before.iter())?;
    write_section(out, "after", std::iter::once(&detail.after))?;
    let metavariables = detail
        .metavariables
        .iter()
        .map(|(name, constraint)| format!("${name}: {constraint}"));
    write_section(out, "metavariables", metavariables)?;
    write_section(out, "imports", detail.imports.iter())?;
    write_section(out, "predicates", detail.predicates.iter())?;
    Ok(())
}

fn write_section<W, I>(out: &mut W, title: &str, lines: I) -> Result<(), AppError>
where
    W: Write,
    I: Iterator,
    I::Item: std::fmt::Display,
{
    let mut lines = lines.peekable();
    if lines.peek().is_none() {
        return Ok(());
    }
    writeln!(out, "{title}:")?;
    for line in lines {
        writeln!(out, "  {line}")?;
    }
    Ok(())
}

/// Writes the outcome of every file followed by a summary line.
pub(crate) fn render_batch<W: Write>(
    out: &mut W,
    recipe: &str,
    report: &BatchReport,
    dry_run: bool,
    format: OutputFormat,
) -> Result<(), AppError> {
    let summary = RunSummary::new(recipe, dry_run, report);
    if format == OutputFormat::Json {
        return write_json(out, &summary);
    }

    for file in summary.files {
        let path = file.path().display();
        match file.outcome() {
            FileOutcome::Unchanged => writeln!(out, "unchanged  {path}")?,
            FileOutcome::Rewritten { applied, cycles } => writeln!(
                out,
                "rewritten  {path} ({applied} {}, {cycles} {})",
                plural(*applied, "site", "sites"),
                plural(*cycles, "cycle", "cycles"),
            )?,
            FileOutcome::Failed { error } => writeln!(out, "failed     {path}: {error}")?,
            FileOutcome::Skipped => writeln!(out, "skipped    {path}")?,
        }
    }
    writeln!(
        out,
        "{} {}: {} rewritten, {} unchanged, {} failed, {} skipped{}",
        summary.files.len(),
        plural(summary.files.len(), "file", "files"),
        summary.rewritten,
        summary.unchanged,
        summary.failed,
        summary.skipped,
        if dry_run { " (dry run, nothing written)" } else { "" },
    )?;
    Ok(())
}

const fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}
