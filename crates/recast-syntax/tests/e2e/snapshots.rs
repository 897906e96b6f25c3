//! Snapshot tests for the `recast-syntax` end-to-end suite.
//!
//! These tests use `insta` to validate stable, user-facing outputs.

use std::collections::BTreeMap;

use insta::{assert_debug_snapshot, assert_snapshot};

use recast_syntax::{LocalTypeOracle, Matcher, RewriteRule, Rewriter, Template, parse};

#[test]
fn snapshot_check_index_rewrite() {
    let rule = RewriteRule::builder("PreconditionsRules.CheckIndexConditionalRecipe")
        .before("if ($INDEX < 0 || $INDEX >= $SIZE) { throw new IndexOutOfBoundsException(); }")
        .before("if ($INDEX < 0 || $INDEX >= $SIZE) throw new IndexOutOfBoundsException();")
        .after("checkIndex($INDEX, $SIZE);")
        .metavariable("INDEX", "int")
        .metavariable("SIZE", "int")
        .import("static java.util.Objects.checkIndex")
        .build()
        .unwrap_or_else(|err| panic!("rule: {err}"));
    let source = "package com.example;

import java.util.List;

class Buffer {
  int get(List<Integer> items, int i) {
    int n = items.size();
    if (i < 0 || i >= n) {
      throw new IndexOutOfBoundsException();
    }
    return items.get(i);
  }
}
";
    let result = Rewriter::new()
        .apply(&rule, source)
        .unwrap_or_else(|err| panic!("apply: {err}"));

    assert_snapshot!(result.output(), @r"
    package com.example;

    import static java.util.Objects.checkIndex;

    import java.util.List;

    class Buffer {
      int get(List<Integer> items, int i) {
        int n = items.size();
        checkIndex(i, n);
        return items.get(i);
      }
    }
    ");
}

#[test]
fn snapshot_template_errors() {
    let attempts = [
        RewriteRule::new("A", "foo($A)", "bar($B)"),
        RewriteRule::new("B", "foo($$A)", "bar()"),
        RewriteRule::builder("C")
            .before("foo($A)")
            .after("bar($A)")
            .metavariable("A", "List<")
            .build(),
        RewriteRule::builder("D")
            .before("foo($A)")
            .after("bar($A)")
            .metavariable("Z", "int")
            .build(),
        RewriteRule::builder("E")
            .before("foo($A)")
            .after("bar($A)")
            .import("Objects")
            .build(),
    ];
    let messages: Vec<_> = attempts
        .iter()
        .map(|attempt| match attempt {
            Ok(rule) => format!("ok: {}", rule.name()),
            Err(err) => err.to_string(),
        })
        .collect();

    assert_snapshot!(messages.join("\n"), @r"
    after-template references unbound metavariable $B
    invalid metavariable syntax: metavariable at offset 4 has invalid '$' prefix length (2)
    invalid type constraint `List<` for $A
    metavariable $Z is declared but unused in the before-template
    invalid import `Objects`: expected a qualified name, optionally prefixed by `static`
    ");
}

#[test]
fn snapshot_match_bindings() {
    let tree = parse("class A { void f(java.util.List<String> xs) { assertThat(xs).hasSize(other.size()); } }")
        .unwrap_or_else(|err| panic!("parse: {err}"));
    let template = Template::compile("assertThat($A).hasSize($B.size())", &[])
        .unwrap_or_else(|err| panic!("template: {err}"));
    let oracle = LocalTypeOracle::new(&tree);

    let bindings: Vec<BTreeMap<String, String>> = Matcher::new(&template, &oracle)
        .find_all(tree.root())
        .iter()
        .map(|site| {
            site.binding()
                .names()
                .into_iter()
                .filter_map(|name| {
                    let bound = site.binding().get(name)?;
                    Some((name.to_owned(), bound.text(tree.source()).to_owned()))
                })
                .collect()
        })
        .collect();

    assert_debug_snapshot!(bindings, @r#"
    [
        {
            "A": "xs",
            "B": "other",
        },
    ]
    "#);
}
