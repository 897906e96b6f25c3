//! Integration tests for the `recast` binary entry point.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;

#[test]
fn list_succeeds() {
    let mut command = cargo_bin_cmd!("recast");
    command.arg("list");
    command
        .assert()
        .success()
        .stdout(contains("PreconditionsRules.CheckIndexConditionalRecipe"));
}

#[test]
fn show_prints_templates() {
    let mut command = cargo_bin_cmd!("recast");
    command.args(["show", "AssertJIntegerRules.AssertThatIsEvenRecipe"]);
    command
        .assert()
        .success()
        .stdout(contains("assertThat($X % 2).isEqualTo(0)"))
        .stdout(contains("$X: int"));
}

#[test]
fn unknown_recipe_exits_with_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("A.java");
    std::fs::write(&file, "class A { }").expect("write");
    let mut command = cargo_bin_cmd!("recast");
    command.arg("run").arg("NoSuchRules").arg(&file);
    command
        .assert()
        .failure()
        .stderr(contains("unknown rule 'NoSuchRules'"));
}

#[test]
fn run_rewrites_file_in_place() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("Bounds.java");
    std::fs::write(
        &file,
        "class Bounds {\n  void t(int i, int n) {\n    if (i < 0 || i >= n) throw new IndexOutOfBoundsException();\n  }\n}\n",
    )
    .expect("write");

    let mut command = cargo_bin_cmd!("recast");
    command
        .env("RECAST_LOG_FILTER", "off")
        .arg("--max-cycles")
        .arg("3")
        .arg("run")
        .arg("PreconditionsRules.CheckIndexConditionalRecipe")
        .arg(&file);
    command
        .assert()
        .success()
        .stdout(contains("rewritten  "));

    assert_eq!(
        std::fs::read_to_string(&file).expect("read"),
        "import static java.util.Objects.checkIndex;\n\nclass Bounds {\n  void t(int i, int n) {\n    checkIndex(i, n);\n  }\n}\n"
    );
}

#[test]
fn invalid_log_format_is_reported() {
    let mut command = cargo_bin_cmd!("recast");
    command.args(["--log-format", "pretty", "list"]);
    command
        .assert()
        .failure()
        .stderr(contains("failed to load configuration"));
}
