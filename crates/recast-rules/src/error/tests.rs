//! Unit tests for rule errors.

use rstest::rstest;

use super::*;

#[rstest]
#[case(RuleError::unknown_rule("Missing"), "unknown rule 'Missing'")]
#[case(RuleError::duplicate_rule("A.B"), "rule 'A.B' is already registered")]
#[case(
    RuleError::definition("rules.yaml", "missing field `after`"),
    "invalid rule definition in rules.yaml: missing field `after`"
)]
fn error_messages_name_the_rule(#[case] error: RuleError, #[case] expected: &str) {
    assert_eq!(error.to_string(), expected);
}

#[test]
fn template_error_keeps_source() {
    let error = RuleError::template(
        "Broken",
        SyntaxError::UnboundMetavariable { name: "B".into() },
    );
    assert_eq!(
        error.to_string(),
        "rule 'Broken' is invalid: after-template references unbound metavariable $B"
    );
    assert!(std::error::Error::source(&error).is_some());
}

#[test]
fn io_error_displays_path() {
    let error = RuleError::io(
        "/missing/rules.yaml",
        std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
    );
    assert_eq!(
        error.to_string(),
        "failed to read rules from /missing/rules.yaml: not found"
    );
}
