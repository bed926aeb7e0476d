//! CLI support for rendering a single glyph.
//!
//! The `glyph-render` binary delegates argument resolution and output to this
//! module so the whole flow can be exercised in tests without spawning a
//! subprocess.

mod error;

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs::Dir};
use clap::{Parser, ValueEnum};
use ortho_config::OrthoConfig;
use tracing::info;

pub use self::error::CliError;
use crate::atomic_io::write_atomic;
use crate::color::Color;
use crate::config::GlyphSettings;
use crate::error::{OutputError, RegistryError};
use crate::geometry::{GlyphOptions, synthesize_with};
use crate::raster::render_png;
use crate::registry::{OptionDefaults, OptionOverrides, PresetRegistry, resolve_options};
use crate::render::{render_json, render_svg};
use crate::seed::{Identity, Seed, SubjectKind};
use crate::tier::GlyphTier;

/// Output encodings supported by the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Standalone SVG document.
    #[default]
    Svg,
    /// Pretty-printed geometry descriptor.
    Json,
    /// RGBA PNG image, one pixel per canvas unit.
    Png,
}

/// `glyph-render` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "glyph-render",
    about = "Render the deterministic glyph for a marketplace identity",
    version
)]
pub struct RenderArgs {
    /// Identifier of the subject (listing id, user id, ...).
    #[arg(value_name = "ID", value_parser = parse_subject_id)]
    id: String,
    /// Kind of subject the glyph is drawn for.
    #[arg(long, value_name = "item|user|advertiser")]
    kind: Option<SubjectKind>,
    /// Display name folded into the identity.
    #[arg(long, value_name = "name")]
    name: Option<String>,
    /// Creator handle folded into the identity.
    #[arg(long, value_name = "handle")]
    creator: Option<String>,
    /// Salt selecting a variant glyph for the same subject.
    #[arg(long, value_name = "salt")]
    salt: Option<String>,
    /// Creator signature appended after the salt.
    #[arg(long, value_name = "signature")]
    signature: Option<String>,
    /// Fail unless the identity derives this stored seed.
    #[arg(long, value_name = "u64")]
    expect_seed: Option<u64>,
    /// Detail level; clamped to `[0, 1]`.
    #[arg(long, value_name = "0..1", allow_negative_numbers = true)]
    complexity: Option<f64>,
    /// Primary colour as `#rgb` or `#rrggbb`.
    #[arg(long, value_name = "hex")]
    primary: Option<Color>,
    /// Secondary colour as `#rgb` or `#rrggbb`.
    #[arg(long, value_name = "hex")]
    secondary: Option<Color>,
    /// Tier whose default complexity applies when none is given.
    #[arg(long, value_name = "basic|enhanced|premium|mythic")]
    tier: Option<GlyphTier>,
    /// Named preset to load from the registry.
    #[arg(long, value_name = "name")]
    preset: Option<String>,
    /// Preset registry path; overrides `GLYPH_REGISTRY_PATH`.
    #[arg(long, value_name = "path")]
    registry: Option<PathBuf>,
    /// Canvas edge length in pixels.
    #[arg(long, value_name = "px")]
    size: Option<u32>,
    /// Output encoding.
    #[arg(long, value_enum, default_value_t = OutputFormat::Svg)]
    format: OutputFormat,
    /// Write to this file instead of stdout.
    #[arg(long, value_name = "path")]
    output: Option<Utf8PathBuf>,
}

/// Everything needed to render one glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    /// Composed identity string.
    pub identity: Identity,
    /// Seed derived from the identity.
    pub seed: Seed,
    /// Fully resolved synthesis options.
    pub options: GlyphOptions,
    /// Output encoding.
    pub format: OutputFormat,
    /// Destination file, or `None` for stdout.
    pub output: Option<Utf8PathBuf>,
}

/// Loads layered settings (environment and configuration files).
///
/// # Errors
///
/// Returns [`CliError::SettingsError`] when a configured value is malformed.
pub fn load_settings() -> Result<GlyphSettings, CliError> {
    GlyphSettings::load_from_iter([OsString::from("glyph-render")]).map_err(|err| {
        CliError::SettingsError {
            message: err.to_string(),
        }
    })
}

/// Resolves arguments and settings into a render plan.
///
/// Flags act as [`OptionOverrides`], the named preset sits beneath them, and
/// settings supply the [`OptionDefaults`]; [`resolve_options`] applies the
/// precedence.
///
/// # Errors
///
/// Returns [`CliError::VerificationError`] when `--expect-seed` does not
/// match the composed identity, and [`CliError::RegistryError`] when a preset
/// is requested but the registry cannot be loaded or does not contain it.
///
/// # Example
///
/// ```
/// use clap::Parser;
/// use glyph_forge::GlyphSettings;
/// use glyph_forge::render_cli::{RenderArgs, resolve_plan};
///
/// let args = RenderArgs::try_parse_from(["glyph-render", "42", "--name", "Widget"])
///     .expect("parse args");
/// let settings = GlyphSettings {
///     json_logs: false,
///     registry_path: None,
///     canvas_size: None,
///     complexity: None,
/// };
/// let plan = resolve_plan(&args, &settings).expect("resolve plan");
/// assert_eq!(plan.identity.as_str(), "item-42-Widget");
/// ```
pub fn resolve_plan(args: &RenderArgs, settings: &GlyphSettings) -> Result<RenderPlan, CliError> {
    let identity = Identity::subject(args.kind.unwrap_or_default(), &args.id)
        .with_part(args.name.as_deref().unwrap_or_default())
        .with_part(args.creator.as_deref().unwrap_or_default())
        .with_salt(args.salt.as_deref().unwrap_or_default())
        .with_signature(args.signature.as_deref().unwrap_or_default());
    if let Some(expected) = args.expect_seed {
        identity.verify(Seed::new(expected))?;
    }
    let seed = identity.seed();

    let loaded_preset = match &args.preset {
        Some(name) => {
            let registry_path = args
                .registry
                .clone()
                .unwrap_or_else(|| settings.registry_path());
            let registry = load_registry(&registry_path)?;
            Some(registry.find_preset(name)?.clone())
        }
        None => None,
    };
    let overrides = OptionOverrides {
        complexity: args.complexity,
        tier: args.tier,
        primary: args.primary,
        secondary: args.secondary,
        canvas_size: args.size,
    };
    let defaults = OptionDefaults {
        complexity: settings.complexity,
        canvas_size: Some(settings.canvas_size()),
    };
    let options = resolve_options(seed, &overrides, loaded_preset.as_ref(), &defaults);
    info!(
        identity = %identity,
        seed = seed.value(),
        complexity = options.complexity().value(),
        canvas_size = options.canvas_size(),
        preset = args.preset.as_deref().unwrap_or("none"),
        "resolved glyph render plan"
    );

    Ok(RenderPlan {
        identity,
        seed,
        options,
        format: args.format,
        output: args.output.clone(),
    })
}

/// Synthesizes and encodes the glyph described by a plan.
///
/// # Errors
///
/// Returns [`CliError::EncodeError`] if JSON encoding fails and
/// [`CliError::RasterError`] if PNG rendering fails.
pub fn render(plan: &RenderPlan) -> Result<Vec<u8>, CliError> {
    let descriptor = synthesize_with(plan.seed, &plan.options);
    match plan.format {
        OutputFormat::Svg => Ok(render_svg(&descriptor).into_bytes()),
        OutputFormat::Json => render_json(&descriptor)
            .map(String::into_bytes)
            .map_err(|err| CliError::EncodeError {
                message: err.to_string(),
            }),
        OutputFormat::Png => Ok(render_png(&descriptor)?),
    }
}

/// Renders a plan and delivers it to its destination.
///
/// When the plan names an output file the document is written atomically;
/// otherwise it is written to `stdout`.
///
/// # Errors
///
/// Returns [`CliError`] when rendering or writing fails.
pub fn execute(plan: &RenderPlan, mut stdout: impl Write) -> Result<(), CliError> {
    let document = render(plan)?;
    match &plan.output {
        Some(path) => {
            write_output(path, &document)?;
            info!(path = %path, bytes = document.len(), "wrote glyph");
        }
        None => stdout
            .write_all(&document)
            .map_err(|err| CliError::StdoutError {
                message: err.to_string(),
            })?,
    }
    Ok(())
}

fn load_registry(path: &Path) -> Result<PresetRegistry, RegistryError> {
    let io_error = |message: String| RegistryError::IoError {
        path: path.to_path_buf(),
        message,
    };
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| io_error("registry path must name a UTF-8 file".to_owned()))?;
    let parent = parent_or_current(path);
    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .map_err(|err| io_error(err.to_string()))?;
    PresetRegistry::from_file(&dir, Utf8Path::new(file_name))
}

fn write_output(path: &Utf8Path, contents: &[u8]) -> Result<(), OutputError> {
    let file_name = path.file_name().ok_or_else(|| OutputError::NotAFile {
        path: path.to_path_buf(),
    })?;
    let parent = parent_or_current(path.as_std_path());
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|err| {
        OutputError::WriteError {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    })?;
    write_atomic(&dir, Utf8Path::new(file_name), contents)
}

/// Rejects blank subject ids, which would otherwise collapse to the bare
/// kind prefix.
fn parse_subject_id(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("ID must not be blank".to_owned());
    }
    Ok(trimmed.to_owned())
}

fn parent_or_current(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
