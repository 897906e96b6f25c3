//! Metavariable parsing helpers shared across modules.
//!
//! Templates use `$NAME` and `$$$NAME` metavariables. Before a template is
//! handed to the Java grammar every metavariable is replaced by a placeholder
//! identifier, so the template parses as ordinary Java.

use crate::error::SyntaxError;

pub(crate) const METAVAR_PLACEHOLDER_PREFIX: &str = "__RECAST_MV_";
pub(crate) const METAVAR_PLACEHOLDER_SUFFIX: &str = "__";

/// Name of the uncaptured wildcard metavariable.
pub(crate) const WILDCARD: &str = "_";

/// A metavariable occurrence in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaVariable {
    /// The name of the metavariable (without the `$` prefix).
    pub name: String,
    /// Whether the metavariable binds one node or a run of siblings.
    pub kind: MetaVarKind,
    /// Byte offset where this metavariable appears in the template source.
    pub offset: usize,
}

/// The kind of metavariable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaVarKind {
    /// Matches a single node (`$VAR`).
    Single,
    /// Matches zero or more sibling nodes (`$$$VAR`).
    Multiple,
}

const fn starts_name(c: char) -> bool {
    c.is_ascii_uppercase() || c == '_'
}

const fn continues_name(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'
}

/// Returns whether `name` is a well-formed metavariable name.
#[must_use]
pub(crate) fn is_metavariable_name(name: &str) -> bool {
    name.strip_prefix(starts_name)
        .is_some_and(|rest| rest.chars().all(continues_name))
}

/// Returns the metavariable name at the start of `text`, or `""`.
fn leading_name(text: &str) -> &str {
    if !text.starts_with(starts_name) {
        return "";
    }
    let end = text
        .char_indices()
        .find(|(_, c)| !continues_name(*c))
        .map_or(text.len(), |(index, _)| index);
    text.get(..end).unwrap_or_default()
}

/// Byte length of the string or character literal opening `text`,
/// including both quotes. An unterminated literal runs to the end.
fn literal_len(text: &str, quote: char) -> usize {
    let mut chars = text.char_indices().skip(1);
    while let Some((index, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == quote {
            return index + c.len_utf8();
        }
    }
    text.len()
}

/// Builds the identifier standing in for a metavariable in normalised source.
#[must_use]
pub(crate) fn placeholder_name(name: &str) -> String {
    format!("{METAVAR_PLACEHOLDER_PREFIX}{name}{METAVAR_PLACEHOLDER_SUFFIX}")
}

/// Recovers the metavariable name from a placeholder identifier.
#[must_use]
pub(crate) fn name_from_placeholder(text: &str) -> Option<&str> {
    text.strip_prefix(METAVAR_PLACEHOLDER_PREFIX)?
        .strip_suffix(METAVAR_PLACEHOLDER_SUFFIX)
}

/// Scans a template, returning its metavariables and the normalised source in
/// which each metavariable is replaced by its placeholder identifier.
///
/// Dollar signs inside string and character literals are left alone so that
/// templates may mention `"$"` verbatim.
///
/// # Errors
///
/// Returns [`SyntaxError::InvalidMetavariable`] for `$$`, `$$$$` or a `$`
/// that is not followed by a valid name.
pub(crate) fn normalise(source: &str) -> Result<(Vec<MetaVariable>, String), SyntaxError> {
    let mut metavariables = Vec::new();
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(index) = rest.find(['$', '"', '\'']) {
        let Some((plain, tail)) = rest.split_at_checked(index) else {
            break;
        };
        out.push_str(plain);

        if let Some(quote) = tail.chars().next().filter(|c| *c != '$') {
            let (literal, after) = tail
                .split_at_checked(literal_len(tail, quote))
                .unwrap_or((tail, ""));
            out.push_str(literal);
            rest = after;
            continue;
        }

        let offset = source.len() - tail.len();
        let named = tail.trim_start_matches('$');
        let kind = match tail.len() - named.len() {
            1 => MetaVarKind::Single,
            3 => MetaVarKind::Multiple,
            dollars => {
                return Err(SyntaxError::invalid_metavariable(format!(
                    "metavariable at offset {offset} has invalid '$' prefix length ({dollars})"
                )));
            }
        };
        let name = leading_name(named);
        if name.is_empty() {
            return Err(SyntaxError::invalid_metavariable(format!(
                "metavariable at offset {offset} has no valid name"
            )));
        }

        out.push_str(&placeholder_name(name));
        metavariables.push(MetaVariable {
            name: name.to_owned(),
            kind,
            offset,
        });
        rest = named.get(name.len()..).unwrap_or_default();
    }
    out.push_str(rest);

    Ok((metavariables, out))
}
