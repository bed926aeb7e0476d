//! Repo-local lint keeping glyph synthesis deterministic.
//!
//! Glyphs must be a pure function of their inputs. This crate parses the
//! generator's source files with `syn` and rejects anything that would let
//! ambient state leak into the output:
//!
//! - clocks, environment variables, and OS entropy (`std::time`, `std::env`,
//!   `SystemTime`, `Instant`, `thread_rng`, `rand::rng`, `OsRng`)
//! - hash collections with randomised iteration order (`HashMap`, `HashSet`,
//!   `RandomState`)
//! - direct use of `rand` or `rand_chacha` anywhere but the sampler module
//!
//! The lint runs via `cargo run -p determinism-lint`.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use syn::visit::Visit;
use thiserror::Error;

/// A single determinism violation discovered by the linter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File path relative to the crate's `src` directory.
    pub file: PathBuf,
    /// Human-readable description of the violated rule.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}

/// Failure modes returned by the determinism lint.
#[derive(Debug, Error)]
pub enum DeterminismLintError {
    /// Filesystem traversal or reading failed.
    #[error("I/O error while linting determinism: {0}")]
    Io(#[from] io::Error),
    /// Rust source parsing failed.
    #[error("failed to parse Rust source while linting determinism ({}): {message}", .file.display())]
    Parse {
        /// File that failed to parse.
        file: PathBuf,
        /// Parser error message.
        message: String,
    },
    /// One or more determinism violations were found.
    #[error("{}", format_violations(.0))]
    Violations(Vec<Violation>),
}

fn format_violations(violations: &[Violation]) -> String {
    let mut report = String::from("Determinism violations:");
    for violation in violations {
        report.push_str("\n- ");
        report.push_str(&violation.to_string());
    }
    report
}

/// A Rust source file to be linted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to the crate's `src` directory.
    pub file: PathBuf,
    /// File contents.
    pub contents: String,
}

/// Lint the generator crate's sources on disk.
///
/// `crate_dir` must be the generator crate directory (containing `src/`).
/// Files outside the synthesis pipeline are skipped.
///
/// # Errors
///
/// Returns [`DeterminismLintError`] when sources cannot be read or parsed, or
/// when any violation is found.
pub fn lint_crate_sources(crate_dir: &Path) -> Result<(), DeterminismLintError> {
    let src_dir = crate_dir.join("src");
    let mut sources = Vec::new();
    for role_file in ModuleRole::FILES {
        let path = src_dir.join(role_file);
        if !path.is_file() {
            continue;
        }
        sources.push(LintSource {
            file: PathBuf::from(role_file),
            contents: fs::read_to_string(&path)?,
        });
    }
    lint_sources(&sources)
}

/// Lint the provided Rust sources. Intended for unit and behaviour tests.
///
/// # Errors
///
/// Returns [`DeterminismLintError::Parse`] for unparsable or unknown files and
/// [`DeterminismLintError::Violations`] when any rule is broken.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), DeterminismLintError> {
    let mut violations = Vec::new();

    for source in sources {
        let role = ModuleRole::infer_from_path(&source.file).ok_or_else(|| {
            DeterminismLintError::Parse {
                file: source.file.clone(),
                message: "file is not part of the synthesis pipeline".to_owned(),
            }
        })?;
        let parsed =
            syn::parse_file(&source.contents).map_err(|err| DeterminismLintError::Parse {
                file: source.file.clone(),
                message: err.to_string(),
            })?;
        violations.extend(lint_parsed_source(&source.file, role, &parsed));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(DeterminismLintError::Violations(violations))
    }
}

/// How strictly a pipeline file is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModuleRole {
    /// The single module allowed to touch the PRNG crates.
    Sampler,
    /// Everything else on the synthesis path.
    Pure,
}

impl ModuleRole {
    const FILES: [&'static str; 7] = [
        "prng.rs",
        "seed.rs",
        "color.rs",
        "geometry.rs",
        "render.rs",
        "raster.rs",
        "tier.rs",
    ];

    fn infer_from_path(relative_path: &Path) -> Option<Self> {
        let name = relative_path.to_str()?;
        match name {
            "prng.rs" => Some(Self::Sampler),
            "seed.rs" | "color.rs" | "geometry.rs" | "render.rs" | "raster.rs" | "tier.rs" => {
                Some(Self::Pure)
            }
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Sampler => "sampler",
            Self::Pure => "pure",
        }
    }

    fn forbidden_crate_roots(self) -> BTreeSet<&'static str> {
        match self {
            Self::Sampler => BTreeSet::new(),
            Self::Pure => BTreeSet::from(["rand", "rand_chacha", "rand_core"]),
        }
    }
}

/// Module prefixes that expose ambient state.
const FORBIDDEN_PREFIXES: [[&str; 2]; 5] = [
    ["std", "time"],
    ["core", "time"],
    ["std", "env"],
    ["rand", "rng"],
    ["rand", "thread_rng"],
];

/// Identifiers that are nondeterministic wherever they are imported from.
const FORBIDDEN_IDENTS: [&str; 7] = [
    "SystemTime",
    "Instant",
    "HashMap",
    "HashSet",
    "RandomState",
    "thread_rng",
    "OsRng",
];

fn lint_parsed_source(file: &Path, role: ModuleRole, parsed: &syn::File) -> Vec<Violation> {
    let forbidden_crates = role.forbidden_crate_roots();
    let role_name = role.name();

    let mut collector = PathCollector::default();
    collector.visit_file(parsed);

    let mut messages = BTreeSet::new();
    for segments in &collector.paths {
        if let Some(prefix) = forbidden_prefix(segments) {
            messages.insert(format!("{role_name} module must not use `{prefix}`"));
        }

        if let Some(ident) = forbidden_ident(segments) {
            messages.insert(format!("{role_name} module must not use `{ident}`"));
        }

        if let Some(root) = segments
            .first()
            .and_then(|root| forbidden_crates.get(root.as_str()))
        {
            messages.insert(format!(
                "{role_name} module must not depend on external crate `{root}`"
            ));
        }
    }

    messages
        .into_iter()
        .map(|message| Violation {
            file: file.to_path_buf(),
            message,
        })
        .collect()
}

fn forbidden_prefix(segments: &[String]) -> Option<String> {
    FORBIDDEN_PREFIXES
        .iter()
        .find(|prefix| {
            segments.len() >= prefix.len()
                && prefix
                    .iter()
                    .zip(segments)
                    .all(|(expected, actual)| *expected == actual.as_str())
        })
        .map(|prefix| prefix.join("::"))
}

fn forbidden_ident(segments: &[String]) -> Option<&'static str> {
    segments.iter().find_map(|segment| {
        FORBIDDEN_IDENTS
            .iter()
            .copied()
            .find(|ident| *ident == segment.as_str())
    })
}

#[derive(Default)]
struct PathCollector {
    paths: BTreeSet<Vec<String>>,
}

impl PathCollector {
    fn record_path(&mut self, path: &syn::Path) {
        let segments = path
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect::<Vec<_>>();
        if !segments.is_empty() {
            self.paths.insert(segments);
        }
    }

    fn record_use_tree(&mut self, tree: &syn::UseTree, mut prefix: Vec<String>) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.record_use_tree(&path.tree, prefix);
            }
            syn::UseTree::Name(name) => {
                prefix.push(name.ident.to_string());
                self.paths.insert(prefix);
            }
            syn::UseTree::Rename(rename) => {
                prefix.push(rename.ident.to_string());
                self.paths.insert(prefix);
            }
            syn::UseTree::Glob(_) => {
                prefix.push("*".to_owned());
                self.paths.insert(prefix);
            }
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.record_use_tree(item, prefix.clone());
                }
            }
        }
    }
}

impl<'ast> Visit<'ast> for PathCollector {
    fn visit_path(&mut self, node: &'ast syn::Path) {
        self.record_path(node);
        syn::visit::visit_path(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.record_use_tree(&node.tree, Vec::new());
    }
}
