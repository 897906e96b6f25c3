//! Unit tests for command dispatch.

use std::fs;
use std::process::ExitCode;

use recast_config::Config;
use rstest::rstest;

use super::invoke;

const EVEN: &str = "class Even { void t(int n) { assertThat(n % 2).isEqualTo(0); } }";

#[test]
fn list_prints_catalog_rules() {
    let result = invoke(Config::default(), &["list"]);
    assert_eq!(result.exit_code, ExitCode::SUCCESS);
    assert!(
        result
            .stdout
            .contains("AssertJIntegerRules.AssertThatIsEvenRecipe"),
        "stdout: {}",
        result.stdout
    );
}

#[test]
fn list_as_json_is_an_array() {
    let result = invoke(Config::default(), &["list", "--format", "json"]);
    let value: serde_json::Value = serde_json::from_str(&result.stdout).expect("json");
    assert!(value.as_array().is_some_and(|rules| !rules.is_empty()));
}

#[test]
fn show_unknown_rule_fails() {
    let result = invoke(Config::default(), &["show", "NoSuchRules.Missing"]);
    assert_eq!(result.exit_code, ExitCode::FAILURE);
    assert!(result.stderr.contains("unknown rule 'NoSuchRules.Missing'"));
}

#[rstest]
#[case::help(&["--help"])]
#[case::version(&["--version"])]
fn informational_output_goes_to_stdout(#[case] args: &[&str]) {
    let result = invoke(Config::default(), args);
    assert_eq!(result.exit_code, ExitCode::SUCCESS);
    assert!(result.stdout.contains("recast"));
    assert!(result.stderr.is_empty());
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    let result = invoke(Config::default(), &[]);
    assert_eq!(result.exit_code, ExitCode::FAILURE);
    assert!(result.stderr.contains("Usage"));
}

#[test]
fn dry_run_leaves_files_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("Even.java");
    fs::write(&path, EVEN).expect("write");
    let file = path.to_str().expect("utf8 path");
    let result = invoke(
        Config::default(),
        &["run", "--dry-run", "AssertJIntegerRules", file],
    );
    assert_eq!(result.exit_code, ExitCode::SUCCESS);
    assert!(result.stdout.contains("rewritten  "));
    assert!(result.stdout.contains("(dry run, nothing written)"));
    assert_eq!(fs::read_to_string(&path).expect("read"), EVEN);
}

#[test]
fn run_commits_rewrites() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("Even.java");
    fs::write(&path, EVEN).expect("write");
    let file = path.to_str().expect("utf8 path");
    let result = invoke(Config::default(), &["run", "AssertJIntegerRules", file]);
    assert_eq!(result.exit_code, ExitCode::SUCCESS, "stderr: {}", result.stderr);
    assert_eq!(
        fs::read_to_string(&path).expect("read"),
        "class Even { void t(int n) { assertThat(n).isEven(); } }"
    );
}

#[test]
fn configured_rules_path_adds_rules() {
    let dir = tempfile::tempdir().expect("tempdir");
    let rules = dir.path().join("rules.yaml");
    fs::write(
        &rules,
        "rules:\n  - name: Custom.Rename\n    before: ['legacy($X)']\n    after: 'modern($X)'\n",
    )
    .expect("write rules");
    let config = Config {
        rules_path: Some(rules),
        ..Config::default()
    };
    let result = invoke(config, &["show", "Custom.Rename", "--format", "json"]);
    assert_eq!(result.exit_code, ExitCode::SUCCESS, "stderr: {}", result.stderr);
    let value: serde_json::Value = serde_json::from_str(&result.stdout).expect("json");
    assert_eq!(value["after"], "modern($X)");
}

#[test]
fn non_convergence_respects_best_effort() {
    let dir = tempfile::tempdir().expect("tempdir");
    let rules = dir.path().join("rules.yaml");
    fs::write(
        &rules,
        "rules:\n  - name: Custom.Grow\n    before: ['grow($X)']\n    after: 'grow(grow($X))'\n",
    )
    .expect("write rules");
    let source = dir.path().join("Grow.java");
    fs::write(&source, "class G { void t() { grow(1); } }").expect("write");
    let file = source.to_str().expect("utf8 path");
    let config = Config {
        rules_path: Some(rules),
        ..Config::default()
    };

    let aborted = invoke(config.clone(), &["run", "Custom", file]);
    assert_eq!(aborted.exit_code, ExitCode::FAILURE);
    assert!(aborted.stderr.contains("run aborted"), "stderr: {}", aborted.stderr);

    let recorded = invoke(config, &["run", "--best-effort", "--format", "json", "Custom", file]);
    assert_eq!(recorded.exit_code, ExitCode::FAILURE);
    let value: serde_json::Value = serde_json::from_str(&recorded.stdout).expect("json");
    assert_eq!(value["failed"], 1);
    assert_eq!(value["files"][0]["status"], "failed");
}

#[test]
fn single_cycle_limit_accepts_a_settled_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("Even.java");
    fs::write(&path, EVEN).expect("write");
    let file = path.to_str().expect("utf8 path");
    let result = invoke(
        Config::default(),
        &["run", "--max-cycles", "1", "AssertJIntegerRules", file],
    );
    assert_eq!(result.exit_code, ExitCode::SUCCESS, "stderr: {}", result.stderr);
    assert!(result.stdout.contains("(1 site, 1 cycle)"), "stdout: {}", result.stdout);
}
