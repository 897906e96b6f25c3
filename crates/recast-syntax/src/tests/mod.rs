//! Crate-level tests for recast-syntax.

mod behaviour;
