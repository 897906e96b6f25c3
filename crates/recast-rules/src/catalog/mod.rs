//! Built-in rules embedded in the binary.

/// Embedded rule documents with the labels used in error messages.
pub(crate) const SOURCES: [(&str, &str); 4] = [
    ("catalog/assertj.yaml", include_str!("../../rules/assertj.yaml")),
    (
        "catalog/preconditions.yaml",
        include_str!("../../rules/preconditions.yaml"),
    ),
    ("catalog/strings.yaml", include_str!("../../rules/strings.yaml")),
    ("catalog/math.yaml", include_str!("../../rules/math.yaml")),
];
