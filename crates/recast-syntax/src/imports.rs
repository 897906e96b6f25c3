//! Import fix-up after a rewrite.
//!
//! Imports are adjusted by simple name only. A rule import is added when its
//! simple name is used unqualified after the rewrite and nothing in the file
//! already provides it. A single-name import is removed when its simple name
//! was used before the rewrite and no longer is.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::ops::Range;

use crate::rewriter::ImportSpec;
use crate::tree::{SyntaxNode, SyntaxTree};

/// An import declaration present in a compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExistingImport {
    span: Range<usize>,
    path: String,
    is_static: bool,
    wildcard: bool,
}

impl ExistingImport {
    fn simple_name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    fn provides(&self, spec: &ImportSpec) -> bool {
        if self.wildcard {
            return self.is_static == spec.is_static() && self.path == spec.qualifier();
        }
        self.simple_name() == spec.simple_name()
    }
}

/// Collects the import declarations of `tree` in source order.
pub(crate) fn existing_imports(tree: &SyntaxTree) -> Vec<ExistingImport> {
    tree.root()
        .children()
        .iter()
        .filter(|node| node.kind() == "import_declaration")
        .filter_map(|node| {
            let name = node
                .named_children()
                .find(|child| matches!(child.kind(), "scoped_identifier" | "identifier"))?;
            Some(ExistingImport {
                span: node.span(),
                path: name.normalized().replace(' ', ""),
                is_static: node.children().iter().any(|c| c.token_text() == Some("static")),
                wildcard: node.children().iter().any(|c| c.kind() == "asterisk"),
            })
        })
        .collect()
}

fn package_name(tree: &SyntaxTree) -> Option<String> {
    let declaration = tree
        .root()
        .children()
        .iter()
        .find(|node| node.kind() == "package_declaration")?;
    let name = declaration
        .named_children()
        .find(|child| matches!(child.kind(), "scoped_identifier" | "identifier"))?;
    Some(name.normalized().replace(' ', ""))
}

/// Returns the simple names used unqualified outside import and package
/// declarations.
pub(crate) fn used_names(tree: &SyntaxTree) -> HashSet<&str> {
    let mut names = HashSet::new();
    collect_names(tree.root(), &mut names);
    names
}

fn collect_names<'t>(node: &'t SyntaxNode, out: &mut HashSet<&'t str>) {
    match node.kind() {
        "import_declaration" | "package_declaration" => {}
        "identifier" | "type_identifier" => {
            if let Some(text) = node.token_text() {
                out.insert(text);
            }
        }
        // Only the leftmost segment of a qualified name is unqualified.
        "scoped_identifier" | "scoped_type_identifier" => {
            if let Some(scope) = node.named_children().next() {
                collect_names(scope, out);
            }
        }
        _ => {
            let qualified = node.kind() == "method_invocation" && node.child_by_field("object").is_some()
                || node.kind() == "field_access";
            for child in node.children() {
                let member = matches!(child.field(), Some("name" | "field"));
                if qualified && member {
                    continue;
                }
                collect_names(child, out);
            }
        }
    }
}

/// A pending text edit: replace `range` with `text`.
struct Edit {
    range: Range<usize>,
    text: String,
}

/// Computes the import changes caused by rewriting `before` into `after`.
///
/// Returns the fixed source, or `None` when the imports need no change.
pub(crate) fn fix_imports(
    before: &SyntaxTree,
    after: &SyntaxTree,
    rule_imports: &[ImportSpec],
) -> Option<String> {
    let used_before = used_names(before);
    let used_after = used_names(after);
    let existing = existing_imports(after);
    let package = package_name(after);
    let source = after.source();

    let (removed, remaining): (Vec<_>, Vec<_>) = existing.iter().partition(|import| {
        !import.wildcard
            && used_before.contains(import.simple_name())
            && !used_after.contains(import.simple_name())
    });

    let mut additions: Vec<&ImportSpec> = rule_imports
        .iter()
        .filter(|spec| used_after.contains(spec.simple_name()))
        .filter(|spec| {
            spec.is_static()
                || (spec.qualifier() != "java.lang" && Some(spec.qualifier()) != package.as_deref())
        })
        .filter(|spec| !existing.iter().any(|import| import.provides(spec)))
        .collect();
    additions.sort_by(|a, b| b.path().cmp(a.path()));
    additions.dedup();

    let mut edits: Vec<Edit> = removed
        .iter()
        .map(|import| Edit {
            range: import.span.start..line_end(source, import.span.end),
            text: String::new(),
        })
        .collect();
    let fallback = removed.first().map(|import| import.span.start);
    for spec in additions {
        edits.push(insertion(after, &remaining, fallback, spec));
    }

    if edits.is_empty() {
        return None;
    }

    edits.sort_by_key(|edit| Reverse(edit.range.start));
    let mut out = source.to_owned();
    for edit in edits {
        if out.get(edit.range.clone()).is_none() {
            continue;
        }
        out.replace_range(edit.range, &edit.text);
    }
    Some(out)
}

/// Extends `end` past one trailing line break.
fn line_end(source: &str, end: usize) -> usize {
    let rest = source.get(end..).unwrap_or_default();
    if rest.starts_with("\r\n") {
        end + 2
    } else if rest.starts_with('\n') {
        end + 1
    } else {
        end
    }
}

/// Chooses where to insert `spec`: sorted among imports of the same kind,
/// else next to the other kind, else after the package declaration, else in
/// front of the first type declaration.
fn insertion(
    tree: &SyntaxTree,
    remaining: &[&ExistingImport],
    fallback: Option<usize>,
    spec: &ImportSpec,
) -> Edit {
    let declaration = spec.declaration();
    let at = |offset: usize, text: String| Edit {
        range: offset..offset,
        text,
    };

    let same_kind: Vec<_> = remaining
        .iter()
        .filter(|import| import.is_static == spec.is_static())
        .collect();
    if let Some(next) = same_kind.iter().find(|import| import.path.as_str() > spec.path()) {
        return at(next.span.start, format!("{declaration}\n"));
    }
    if let Some(last) = same_kind.last() {
        return at(last.span.end, format!("\n{declaration}"));
    }
    if spec.is_static()
        && let Some(first) = remaining.first()
    {
        return at(first.span.start, format!("{declaration}\n\n"));
    }
    if let Some(last) = remaining.last() {
        return at(last.span.end, format!("\n\n{declaration}"));
    }
    if let Some(offset) = fallback {
        return at(offset, format!("{declaration}\n"));
    }

    let root = tree.root();
    if let Some(package) = root
        .children()
        .iter()
        .find(|node| node.kind() == "package_declaration")
    {
        return at(package.span().end, format!("\n\n{declaration}"));
    }
    let first_type = root.named_children().next().map_or(0, |node| node.span().start);
    at(first_type, format!("{declaration}\n\n"))
}
