//! Scenario bindings for the `recast-syntax` BDD feature file.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::scenario;

use super::TestWorld;

/// Fixture providing the shared BDD world.
#[fixture]
fn world() -> RefCell<TestWorld> {
    super::world()
}

#[scenario(
    path = "tests/features/recast_syntax.feature",
    name = "Iterables.size comparison becomes hasSameSizeAs"
)]
fn has_same_size_as(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/recast_syntax.feature",
    name = "Modulo check on an int becomes isEven"
)]
fn is_even(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/recast_syntax.feature",
    name = "Modulo check on a char is left alone"
)]
fn is_even_excludes_char(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/recast_syntax.feature",
    name = "If-throw bounds check becomes checkIndex"
)]
fn check_index(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/recast_syntax.feature",
    name = "A rule without matches leaves the file untouched"
)]
fn zero_matches(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/recast_syntax.feature",
    name = "Repeated metavariables must bind equal code"
)]
fn repeated_metavariables(world: RefCell<TestWorld>) {
    drop(world);
}
