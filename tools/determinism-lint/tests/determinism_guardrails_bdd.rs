//! Behaviour tests for the determinism guardrails.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use std::fs;
use std::path::PathBuf;

use determinism_lint::{DeterminismLintError, LintSource, Violation};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use tempfile::TempDir;

#[derive(Default, ScenarioState)]
struct World {
    sources: Slot<Vec<LintSource>>,
    violations: Slot<Option<Vec<Violation>>>,
}

#[fixture]
fn world() -> World {
    World::default()
}

fn add_source(world: &World, file: &str, contents: &str) {
    let mut sources = world.sources.get().unwrap_or_default();
    sources.push(LintSource {
        file: PathBuf::from(file),
        contents: contents.to_owned(),
    });
    world.sources.set(sources);
}

fn add_clean_modules(world: &World) {
    add_source(
        world,
        "prng.rs",
        "use rand::{Rng, SeedableRng}; use rand_chacha::ChaCha8Rng; pub fn draw(key: u64) -> f64 { ChaCha8Rng::seed_from_u64(key).random() }",
    );
    add_source(
        world,
        "seed.rs",
        "pub fn fold(input: &str) -> u64 { input.chars().fold(0, |h, c| h ^ u64::from(u32::from(c))) }",
    );
    add_source(
        world,
        "geometry.rs",
        "use std::f64::consts::TAU; pub fn angle(i: u32, n: u32) -> f64 { f64::from(i) / f64::from(n) * TAU }",
    );
}

// ============================================================================
// Given steps
// ============================================================================

#[given("a sampler and pure modules that follow the rules")]
fn clean_modules(world: &World) {
    add_clean_modules(world);
}

#[given("a geometry module that imports rand directly")]
fn geometry_imports_rand(world: &World) {
    add_source(
        world,
        "geometry.rs",
        "use rand::Rng; pub fn jitter(rng: &mut impl Rng) -> f64 { rng.random() }",
    );
}

#[given("a colour module that reads the system clock")]
fn colour_reads_clock(world: &World) {
    add_source(
        world,
        "color.rs",
        "use std::time::SystemTime; pub fn hue() -> bool { SystemTime::now().elapsed().is_ok() }",
    );
}

#[given("a sampler module that seeds from thread_rng")]
fn sampler_uses_thread_rng(world: &World) {
    add_source(
        world,
        "prng.rs",
        "use rand::Rng; pub fn draw() -> f64 { rand::thread_rng().random() }",
    );
}

#[given("clean modules mixed with multiple violations")]
fn clean_modules_with_violations(world: &World) {
    add_clean_modules(world);
    add_source(
        world,
        "render.rs",
        "use std::collections::HashMap; pub fn attrs() -> HashMap<String, String> { HashMap::new() }",
    );
    add_source(
        world,
        "tier.rs",
        "pub fn level() -> Option<String> { std::env::var(\"TIER\").ok() }",
    );
}

// ============================================================================
// When steps
// ============================================================================

#[when("the determinism lint runs")]
fn run_determinism_lint(world: &World) {
    let sources = world.sources.get().unwrap_or_default();

    let temp_dir = TempDir::new().expect("tempdir");
    let src_dir = temp_dir.path().join("src");
    fs::create_dir_all(&src_dir).expect("create src dir");
    for source in &sources {
        fs::write(src_dir.join(&source.file), &source.contents).expect("write source file");
    }

    let violations = match determinism_lint::lint_crate_sources(temp_dir.path()) {
        Ok(()) => None,
        Err(DeterminismLintError::Violations(violations)) => Some(violations),
        Err(other) => panic!("expected violations or success, got: {other:?}"),
    };
    world.violations.set(violations);
}

// ============================================================================
// Then steps
// ============================================================================

#[then("the lint succeeds")]
fn lint_succeeds(world: &World) {
    let outcome = world.violations.get().expect("lint must have run");
    assert!(outcome.is_none(), "expected success, got: {outcome:?}");
}

fn assert_violation_in_file_contains(world: &World, expected_file: &str, expected: &str) {
    let expected_file = PathBuf::from(expected_file);
    let violations = violations(world);
    assert!(
        violations
            .iter()
            .any(|violation| violation.file == expected_file && violation.message.contains(expected)),
        "expected violation in '{expected_file:?}' containing '{expected}', got: {violations:?}"
    );
}

fn violations(world: &World) -> Vec<Violation> {
    world
        .violations
        .get()
        .expect("lint must have run")
        .expect("expected violations")
}

#[then("the lint fails due to PRNG crate usage outside the sampler")]
fn lint_fails_due_to_prng_crate(world: &World) {
    assert_violation_in_file_contains(world, "geometry.rs", "external crate `rand`");
}

#[then("the lint fails due to clock access")]
fn lint_fails_due_to_clock_access(world: &World) {
    assert_violation_in_file_contains(world, "color.rs", "`std::time`");
    assert_violation_in_file_contains(world, "color.rs", "`SystemTime`");
}

#[then("the lint fails due to OS entropy")]
fn lint_fails_due_to_os_entropy(world: &World) {
    assert_violation_in_file_contains(world, "prng.rs", "`thread_rng`");
}

#[then("all determinism violations are reported")]
fn all_determinism_violations_are_reported(world: &World) {
    let violations = violations(world);
    assert!(
        violations.len() >= 2,
        "expected at least 2 violations, got: {violations:?}"
    );
    assert_violation_in_file_contains(world, "render.rs", "`HashMap`");
    assert_violation_in_file_contains(world, "tier.rs", "`std::env`");
}

// ============================================================================
// Scenario bindings
// ============================================================================

#[scenario(
    path = "tests/features/determinism_guardrails.feature",
    name = "Clean synthesis modules pass"
)]
fn clean_synthesis_modules_pass(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/determinism_guardrails.feature",
    name = "A pure module importing the PRNG crate fails"
)]
fn pure_module_importing_prng_fails(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/determinism_guardrails.feature",
    name = "A pure module reading the clock fails"
)]
fn pure_module_reading_clock_fails(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/determinism_guardrails.feature",
    name = "The sampler drawing OS entropy fails"
)]
fn sampler_drawing_os_entropy_fails(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/determinism_guardrails.feature",
    name = "Every violation is reported"
)]
fn every_violation_is_reported(world: World) {
    let _ = world;
}
