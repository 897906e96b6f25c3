//! Unit tests for the rule registry.

use std::sync::Arc;

use recast_syntax::RewriteRule;
use rstest::{fixture, rstest};

use super::*;

fn rule(name: &str) -> RewriteRule {
    RewriteRule::new(name, "foo($X)", "bar($X)").expect("rule")
}

#[fixture]
fn populated_registry() -> RuleRegistry {
    let mut builder = RegistryBuilder::new();
    for name in ["MathRules.Max", "MathRules.Min", "MathRulesExtra.Abs", "Other.Rule"] {
        builder.register(name, rule(name)).expect("register");
    }
    builder.build()
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[test]
fn new_builder_is_empty() {
    let builder = RegistryBuilder::new();
    assert!(builder.is_empty());
    assert!(builder.build().is_empty());
}

#[test]
fn duplicate_names_are_rejected() {
    let mut builder = RegistryBuilder::new();
    builder.register("A.B", rule("A.B")).expect("first");
    let error = builder.register("A.B", rule("A.B")).expect_err("duplicate");
    assert!(matches!(error, RuleError::DuplicateRule { ref name } if name == "A.B"));
    assert_eq!(builder.len(), 1);
}

#[test]
fn catalog_rules_are_registered() {
    let builder = RegistryBuilder::with_catalog().expect("catalog");
    let registry = builder.build();
    for name in [
        "AssertJEnumerableRules.EnumerableAssertHasSameSizeAsRecipe",
        "AssertJIntegerRules.AssertThatIsEvenRecipe",
        "PreconditionsRules.CheckIndexConditionalRecipe",
    ] {
        assert!(registry.lookup(name).is_ok(), "{name} missing");
    }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

#[rstest]
fn lookup_returns_shared_rule(populated_registry: RuleRegistry) {
    let first = populated_registry.lookup("MathRules.Max").expect("lookup");
    let second = populated_registry.lookup("MathRules.Max").expect("lookup");
    assert!(Arc::ptr_eq(&first, &second));
}

#[rstest]
fn lookup_unknown_fails(populated_registry: RuleRegistry) {
    let error = populated_registry.lookup("MathRules").expect_err("unknown");
    assert!(matches!(error, RuleError::UnknownRule { ref name } if name == "MathRules"));
}

#[rstest]
#[case("MathRules.Max", &["MathRules.Max"])]
#[case("MathRules", &["MathRules.Max", "MathRules.Min"])]
#[case("Other", &["Other.Rule"])]
fn recipe_resolves_rule_or_class(
    populated_registry: RuleRegistry,
    #[case] name: &str,
    #[case] expected: &[&str],
) {
    let recipe = populated_registry.recipe(name).expect("recipe");
    let names: Vec<_> = recipe.iter().map(|rule| rule.name()).collect();
    assert_eq!(names, expected);
}

#[rstest]
#[case("Math")]
#[case("Missing")]
fn recipe_without_matches_fails(populated_registry: RuleRegistry, #[case] name: &str) {
    let error = populated_registry.recipe(name).expect_err("unknown");
    assert!(matches!(error, RuleError::UnknownRule { .. }));
}

#[rstest]
fn iterates_in_name_order(populated_registry: RuleRegistry) {
    let names: Vec<_> = populated_registry.iter().map(|(name, _)| name).collect();
    assert_eq!(
        names,
        ["MathRules.Max", "MathRules.Min", "MathRulesExtra.Abs", "Other.Rule"]
    );
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

const EXTRA: &str = "rules:\n  - name: Custom.FooToBar\n    before: ['foo($X)']\n    after: 'bar($X)'\n";

#[test]
fn loads_rules_from_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("custom.yaml"), EXTRA).expect("write");
    std::fs::write(dir.path().join("notes.txt"), "not rules").expect("write");
    let registry = load_registry(Some(dir.path())).expect("load");
    assert!(registry.lookup("Custom.FooToBar").is_ok());
    assert!(registry.lookup("MathRules.MaxTernaryRecipe").is_ok());
}

#[test]
fn loaded_rules_cannot_shadow_catalog() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("shadow.yml");
    std::fs::write(
        &path,
        "rules:\n  - name: MathRules.MaxTernaryRecipe\n    before: ['foo($X)']\n    after: 'bar($X)'\n",
    )
    .expect("write");
    let error = load_registry(Some(&path)).expect_err("duplicate");
    assert!(matches!(error, RuleError::DuplicateRule { .. }));
}

#[test]
fn missing_rules_path_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let error = load_registry(Some(&dir.path().join("absent"))).expect_err("missing");
    assert!(matches!(error, RuleError::Io { .. }));
}
