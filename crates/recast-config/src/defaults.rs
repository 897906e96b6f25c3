use std::path::PathBuf;

use crate::logging::LogFormat;

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Default limit on rewrite cycles per file.
pub const DEFAULT_MAX_CYCLES: usize = 2;

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default cycle limit.
#[must_use]
pub const fn default_max_cycles() -> usize {
    DEFAULT_MAX_CYCLES
}

/// Default worker count; `0` selects the available parallelism.
#[must_use]
pub const fn default_jobs() -> usize {
    0
}

/// Default location of extra rule files: none.
#[must_use]
pub const fn default_rules_path() -> Option<PathBuf> {
    None
}
