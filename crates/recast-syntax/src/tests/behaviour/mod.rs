//! Behaviour-driven development (BDD) step definitions for recast-syntax scenarios.

mod scenarios;

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, then, when};

use crate::{
    LocalTypeOracle, Matcher, RewriteResult, RewriteRule, RewriteRuleBuilder,
    Rewriter, Template, parse,
};

// =============================================================================
// Test World
// =============================================================================

/// State shared across BDD steps.
#[derive(Default)]
pub(super) struct TestWorld {
    /// Java source the rule is applied to.
    source: Option<String>,
    /// Rule under construction.
    rule: Option<RewriteRuleBuilder>,
    /// Rewrite result.
    rewrite_result: Option<RewriteResult>,
    /// Matched source texts.
    matches: Vec<String>,
}

#[fixture]
pub(super) fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

/// Strips surrounding double quotes from a string if present.
fn strip_quotes(s: &str) -> &str {
    s.trim_matches('"')
}

// =============================================================================
// Given Steps
// =============================================================================

#[given("Java source {code}")]
fn given_source(world: &RefCell<TestWorld>, code: String) {
    world.borrow_mut().source = Some(strip_quotes(&code).to_owned());
}

#[given("a rule {name} from {before} to {after}")]
fn given_rule(world: &RefCell<TestWorld>, name: String, before: String, after: String) {
    let builder = RewriteRule::builder(strip_quotes(&name))
        .before(strip_quotes(&before))
        .after(strip_quotes(&after));
    world.borrow_mut().rule = Some(builder);
}

#[given("the metavariable {name} has type {ty}")]
fn given_metavariable_type(world: &RefCell<TestWorld>, name: String, ty: String) {
    let mut w = world.borrow_mut();
    let builder = w.rule.take().expect("rule should be declared first");
    w.rule = Some(builder.metavariable(strip_quotes(&name), strip_quotes(&ty)));
}

#[given("the rule imports {import}")]
fn given_import(world: &RefCell<TestWorld>, import: String) {
    let mut w = world.borrow_mut();
    let builder = w.rule.take().expect("rule should be declared first");
    w.rule = Some(builder.import(strip_quotes(&import)));
}

// =============================================================================
// When Steps
// =============================================================================

#[when("the rule is applied")]
fn when_rule_applied(world: &RefCell<TestWorld>) {
    let mut w = world.borrow_mut();
    let rule = w
        .rule
        .take()
        .expect("rule should be declared before applying")
        .build()
        .expect("rule should build");
    let source = w.source.clone().expect("source should be set");
    let result = Rewriter::new()
        .apply(&rule, &source)
        .expect("rewrite should apply");
    w.rewrite_result = Some(result);
}

#[when("the template {template} is matched against the source")]
fn when_template_matched(world: &RefCell<TestWorld>, template: String) {
    let mut w = world.borrow_mut();
    let source = w.source.clone().expect("source should be set");
    let tree = parse(&source).expect("source should parse");
    let compiled = Template::compile(strip_quotes(&template), &[])
        .expect("template should compile");
    let oracle = LocalTypeOracle::new(&tree);
    w.matches = Matcher::new(&compiled, &oracle)
        .find_all(tree.root())
        .iter()
        .map(|site| tree.slice(site.span()).to_owned())
        .collect();
}

// =============================================================================
// Then Steps
// =============================================================================

#[then("the output equals {expected}")]
fn then_output_is(world: &RefCell<TestWorld>, expected: String) {
    let w = world.borrow();
    let result = w.rewrite_result.as_ref().expect("rewrite result");
    assert_eq!(result.output(), strip_quotes(&expected));
}

#[then("the output contains {text}")]
fn then_output_contains(world: &RefCell<TestWorld>, text: String) {
    let w = world.borrow();
    let expected_text = strip_quotes(&text);
    let result = w.rewrite_result.as_ref().expect("rewrite result");
    assert!(
        result.output().contains(expected_text),
        "Expected output to contain '{expected_text}', got: {}",
        result.output()
    );
}

#[then("the output is unchanged")]
fn then_output_unchanged(world: &RefCell<TestWorld>) {
    let w = world.borrow();
    let result = w.rewrite_result.as_ref().expect("rewrite result");
    assert_eq!(Some(result.output()), w.source.as_deref());
}

#[then("the number of rewritten sites is {count}")]
fn then_rewritten_sites(world: &RefCell<TestWorld>, count: usize) {
    let w = world.borrow();
    let result = w.rewrite_result.as_ref().expect("rewrite result");
    assert_eq!(result.applied(), count);
}

#[then("{count} matches are found")]
fn then_match_count(world: &RefCell<TestWorld>, count: usize) {
    let w = world.borrow();
    assert_eq!(w.matches.len(), count, "matches: {:?}", w.matches);
}
