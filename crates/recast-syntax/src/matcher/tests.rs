use super::*;

use rstest::rstest;

use crate::parser::parse;
use crate::template::MetaVarDecl;
use crate::tree::SyntaxTree;
use crate::types::LocalTypeOracle;

fn java(body: &str) -> SyntaxTree {
    parse(&format!(
        "class A {{\n  void f(int i, char c, java.util.List<String> xs, java.util.List<String> ys) {{\n    {body}\n  }}\n}}\n"
    ))
    .expect("parse")
}

fn template(source: &str, decls: &[(&str, &str)]) -> Template {
    let declared: Vec<_> = decls
        .iter()
        .map(|(name, ty)| MetaVarDecl::new(name, ty).expect("decl"))
        .collect();
    Template::compile(source, &declared).expect("template")
}

fn matched_texts(tree: &SyntaxTree, template: &Template) -> Vec<String> {
    let oracle = LocalTypeOracle::new(tree);
    Matcher::new(template, &oracle)
        .find_all(tree.root())
        .iter()
        .map(|site| tree.slice(site.span()).to_owned())
        .collect()
}

#[test]
fn finds_literal_template() {
    let tree = java("foo(1); foo(2);");
    let found = matched_texts(&tree, &template("foo(1)", &[]));
    assert_eq!(found, vec!["foo(1)"]);
}

#[test]
fn binds_metavariable_text() {
    let tree = java("assertThat(xs).hasSize(ys.size());");
    let tmpl = template("assertThat($A).hasSize($B.size())", &[]);
    let oracle = LocalTypeOracle::new(&tree);
    let sites = Matcher::new(&tmpl, &oracle).find_all(tree.root());
    let site = sites.first().expect("one match");
    let a = site.binding().get("A").expect("A bound");
    let b = site.binding().get("B").expect("B bound");
    assert_eq!(a.text(tree.source()), "xs");
    assert_eq!(b.text(tree.source()), "ys");
}

#[test]
fn matching_ignores_whitespace_and_comments() {
    let tree = java("assertThat( xs )\n        .hasSize( /* n */ ys.size() );");
    let found = matched_texts(&tree, &template("assertThat($A).hasSize($B.size())", &[]));
    assert_eq!(found.len(), 1);
}

#[rstest]
#[case("equal(i, i);", 1)]
#[case("equal(i, c);", 0)]
#[case("equal(i + 1, i + 1);", 1)]
#[case("equal(i + 1, i+1);", 1)]
#[case("equal(i + 1, i - 1);", 0)]
fn repeated_metavariables_must_bind_equal_subtrees(#[case] body: &str, #[case] expected: usize) {
    let tree = java(body);
    let found = matched_texts(&tree, &template("equal($X, $X)", &[]));
    assert_eq!(found.len(), expected);
}

#[rstest]
#[case("assertThat(i % 2).isEqualTo(0);", 1)]
#[case("assertThat(c % 2).isEqualTo(0);", 0)]
#[case("assertThat('c' % 2).isEqualTo(0);", 0)]
#[case("assertThat(unknown % 2).isEqualTo(0);", 0)]
fn primitive_constraints_require_exact_type(#[case] body: &str, #[case] expected: usize) {
    let tree = java(body);
    let tmpl = template("assertThat($X % 2).isEqualTo(0)", &[("X", "int")]);
    assert_eq!(matched_texts(&tree, &tmpl).len(), expected);
}

#[rstest]
#[case("consume(xs);", 1)]
#[case("consume(unknown);", 1)]
#[case("consume(\"text\");", 0)]
#[case("consume(i);", 0)]
fn reference_constraints_admit_unknown_types(#[case] body: &str, #[case] expected: usize) {
    let tree = java(body);
    let tmpl = template("consume($X)", &[("X", "Iterable<?>")]);
    assert_eq!(matched_texts(&tree, &tmpl).len(), expected);
}

#[test]
fn multiple_metavariable_binds_argument_runs() {
    let tree = java("call(1, 2, 3); call();");
    let tmpl = template("call($$$ARGS)", &[]);
    let oracle = LocalTypeOracle::new(&tree);
    let sites = Matcher::new(&tmpl, &oracle).find_all(tree.root());
    let texts: Vec<_> = sites
        .iter()
        .map(|site| site.binding().get("ARGS").expect("ARGS").text(tree.source()))
        .collect();
    assert_eq!(texts, vec!["1, 2, 3", ""]);
}

#[test]
fn outer_match_wins_over_nested_match() {
    let tree = java("wrap(wrap(1));");
    let found = matched_texts(&tree, &template("wrap($X)", &[]));
    assert_eq!(found, vec!["wrap(wrap(1))"]);
}

#[test]
fn wildcard_matches_without_binding() {
    let tree = java("pair(1, 2);");
    let tmpl = template("pair($_, $_)", &[]);
    let oracle = LocalTypeOracle::new(&tree);
    let sites = Matcher::new(&tmpl, &oracle).find_all(tree.root());
    assert_eq!(sites.len(), 1);
    assert!(sites.first().is_some_and(|site| site.binding().is_empty()));
}

#[test]
fn sequence_templates_match_statement_runs() {
    let tree = java("int n = i; return n; ");
    let tmpl = template("int $N = $X; return $N;", &[]);
    let found = matched_texts(&tree, &tmpl);
    assert_eq!(found, vec!["int n = i; return n;"]);
}

#[test]
fn match_template_checks_a_single_candidate() {
    let tree = java("foo(i);");
    let tmpl = template("foo($X)", &[]);
    let oracle = LocalTypeOracle::new(&tree);
    let call = tree
        .root()
        .preorder()
        .into_iter()
        .find(|n| n.kind() == "method_invocation")
        .expect("call");
    let binding = match_template(&tmpl, call, &oracle).expect("match");
    assert_eq!(binding.names(), vec!["X"]);
    assert!(match_template(&tmpl, tree.root(), &oracle).is_none());
}

#[test]
fn no_match_returns_empty() {
    let tree = java("bar(1);");
    assert!(matched_texts(&tree, &template("foo($X)", &[])).is_empty());
}
