//! Preset registry types and JSON parsing.
//!
//! A preset registry holds named, reusable glyph options (tier, complexity,
//! colours, canvas size). Registries are versioned JSON documents validated
//! up front, so a loaded registry only ever yields usable options.

use std::collections::BTreeSet;

use camino::Utf8Path;
use cap_std::fs::Dir;
use serde::Deserialize;
use tracing::debug;

use crate::color::{Color, Palette};
use crate::error::{ColorError, RegistryError};
use crate::geometry::{DEFAULT_CANVAS_SIZE, GlyphOptions};
use crate::seed::Seed;
use crate::tier::GlyphTier;

/// Current supported registry version.
const SUPPORTED_VERSION: u32 = 1;

/// Complexity used when neither the preset nor its tier supplies one.
pub const FALLBACK_COMPLEXITY: f64 = 0.5;

/// Values that outrank any preset, typically command-line flags.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OptionOverrides {
    /// Explicit complexity.
    pub complexity: Option<f64>,
    /// Tier whose default complexity applies below an explicit preset value.
    pub tier: Option<GlyphTier>,
    /// Explicit primary colour.
    pub primary: Option<Color>,
    /// Explicit secondary colour.
    pub secondary: Option<Color>,
    /// Explicit canvas edge length.
    pub canvas_size: Option<u32>,
}

/// Values consulted only after every override and preset field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OptionDefaults {
    /// Complexity used when no override, preset, or tier supplies one.
    pub complexity: Option<f64>,
    /// Canvas edge length used when no override or preset supplies one.
    pub canvas_size: Option<u32>,
}

/// Layers overrides, an optional preset, and defaults into glyph options.
///
/// Complexity comes from the first of: the override, the preset's explicit
/// value, the override tier, the preset tier, the defaults, and
/// [`FALLBACK_COMPLEXITY`]. Colours and canvas size take the override, then
/// the preset, then (for the canvas) the defaults. Colours still unset come
/// from the palette derived from `seed`.
///
/// ```
/// use glyph_forge::{GlyphTier, OptionDefaults, OptionOverrides, derive_seed, resolve_options};
///
/// let overrides = OptionOverrides {
///     tier: Some(GlyphTier::Mythic),
///     ..OptionOverrides::default()
/// };
/// let defaults = OptionDefaults {
///     complexity: Some(0.1),
///     canvas_size: Some(256),
/// };
/// let options = resolve_options(derive_seed("item-1"), &overrides, None, &defaults);
/// assert_eq!(options.complexity().value(), 1.0);
/// assert_eq!(options.canvas_size(), 256);
/// ```
#[must_use]
pub fn resolve_options(
    seed: Seed,
    overrides: &OptionOverrides,
    preset: Option<&GlyphPreset>,
    defaults: &OptionDefaults,
) -> GlyphOptions {
    let derived = Palette::derive(seed);
    let palette = Palette::new(
        overrides
            .primary
            .or_else(|| preset.and_then(GlyphPreset::primary))
            .unwrap_or(derived.primary),
        overrides
            .secondary
            .or_else(|| preset.and_then(GlyphPreset::secondary))
            .unwrap_or(derived.secondary),
    );
    let canvas_size = overrides
        .canvas_size
        .or_else(|| preset.and_then(GlyphPreset::canvas_size))
        .or(defaults.canvas_size)
        .unwrap_or(DEFAULT_CANVAS_SIZE);
    GlyphOptions::new(resolve_complexity(overrides, preset, defaults), palette)
        .with_canvas_size(canvas_size)
}

fn resolve_complexity(
    overrides: &OptionOverrides,
    preset: Option<&GlyphPreset>,
    defaults: &OptionDefaults,
) -> f64 {
    overrides
        .complexity
        .or_else(|| preset.and_then(GlyphPreset::complexity))
        .or_else(|| {
            overrides
                .tier
                .or_else(|| preset.and_then(GlyphPreset::tier))
                .map(GlyphTier::default_complexity)
        })
        .or(defaults.complexity)
        .unwrap_or(FALLBACK_COMPLEXITY)
}

/// A registry of named glyph presets.
///
/// # Example
///
/// ```
/// use glyph_forge::PresetRegistry;
///
/// let json = r##"{
///     "version": 1,
///     "presets": [{"name": "ember", "tier": "premium", "primary": "#f97316"}]
/// }"##;
///
/// let registry = PresetRegistry::from_json(json).expect("valid registry");
/// assert_eq!(registry.presets().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PresetRegistry {
    version: u32,
    presets: Vec<GlyphPreset>,
}

impl PresetRegistry {
    /// Parses a preset registry from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if:
    /// - The JSON is malformed or a required field is missing
    /// - The version is unsupported
    /// - The presets array is empty
    /// - Two presets share a name
    /// - A colour is not valid hex
    /// - A complexity lies outside `[0, 1]`
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let raw: RawPresetRegistry =
            serde_json::from_str(json).map_err(|e| RegistryError::ParseError {
                message: e.to_string(),
            })?;

        Self::from_raw(raw)
    }

    /// Loads a preset registry from a file inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the file cannot be read or parsed.
    pub fn from_file(dir: &Dir, path: &Utf8Path) -> Result<Self, RegistryError> {
        let contents = dir
            .read_to_string(path)
            .map_err(|e| RegistryError::IoError {
                path: path.as_std_path().to_path_buf(),
                message: e.to_string(),
            })?;

        let registry = Self::from_json(&contents)?;
        debug!(
            path = %path,
            presets = registry.presets.len(),
            "loaded glyph preset registry"
        );
        Ok(registry)
    }

    fn from_raw(raw: RawPresetRegistry) -> Result<Self, RegistryError> {
        if raw.version != SUPPORTED_VERSION {
            return Err(RegistryError::UnsupportedVersion {
                expected: SUPPORTED_VERSION,
                actual: raw.version,
            });
        }

        if raw.presets.is_empty() {
            return Err(RegistryError::EmptyPresets);
        }

        let mut seen = BTreeSet::new();
        let presets = raw
            .presets
            .into_iter()
            .map(|preset| {
                if !seen.insert(preset.name.clone()) {
                    return Err(RegistryError::DuplicatePreset { name: preset.name });
                }
                GlyphPreset::from_raw(preset)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            version: raw.version,
            presets,
        })
    }

    /// Returns the registry version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Returns all presets in file order.
    #[must_use]
    pub fn presets(&self) -> &[GlyphPreset] {
        &self.presets
    }

    /// Finds a preset by name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::PresetNotFound`] if no preset with the given
    /// name exists.
    pub fn find_preset(&self, name: &str) -> Result<&GlyphPreset, RegistryError> {
        self.presets
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| RegistryError::PresetNotFound {
                name: name.to_owned(),
            })
    }
}

/// A named set of glyph options.
///
/// Every field except the name is optional; missing values are resolved when
/// the preset is applied to a seed.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphPreset {
    name: String,
    tier: Option<GlyphTier>,
    complexity: Option<f64>,
    primary: Option<Color>,
    secondary: Option<Color>,
    canvas_size: Option<u32>,
}

impl GlyphPreset {
    fn from_raw(raw: RawGlyphPreset) -> Result<Self, RegistryError> {
        if let Some(value) = raw.complexity
            && !(0.0..=1.0).contains(&value)
        {
            return Err(RegistryError::ComplexityOutOfRange {
                preset: raw.name,
                value: value.to_string(),
            });
        }

        let primary = parse_color(&raw.name, "primary", raw.primary.as_deref())?;
        let secondary = parse_color(&raw.name, "secondary", raw.secondary.as_deref())?;

        Ok(Self {
            name: raw.name,
            tier: raw.tier,
            complexity: raw.complexity,
            primary,
            secondary,
            canvas_size: raw.canvas_size,
        })
    }

    /// Returns the preset name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tier, if set.
    #[must_use]
    pub const fn tier(&self) -> Option<GlyphTier> {
        self.tier
    }

    /// Returns the explicit complexity, if set.
    #[must_use]
    pub const fn complexity(&self) -> Option<f64> {
        self.complexity
    }

    /// Returns the explicit primary colour, if set.
    #[must_use]
    pub const fn primary(&self) -> Option<Color> {
        self.primary
    }

    /// Returns the explicit secondary colour, if set.
    #[must_use]
    pub const fn secondary(&self) -> Option<Color> {
        self.secondary
    }

    /// Returns the canvas size, if set.
    #[must_use]
    pub const fn canvas_size(&self) -> Option<u32> {
        self.canvas_size
    }

    /// Returns the complexity this preset resolves to.
    ///
    /// An explicit value wins, then the tier default, then
    /// [`FALLBACK_COMPLEXITY`].
    #[must_use]
    pub fn effective_complexity(&self) -> f64 {
        resolve_complexity(
            &OptionOverrides::default(),
            Some(self),
            &OptionDefaults::default(),
        )
    }

    /// Resolves the preset into glyph options for a seed.
    ///
    /// This is [`resolve_options`] with no overrides or defaults, so colours
    /// the preset leaves unset are taken from the palette derived from `seed`.
    ///
    /// ```
    /// use glyph_forge::{PresetRegistry, derive_seed};
    ///
    /// let registry = PresetRegistry::from_json(
    ///     r#"{"version": 1, "presets": [{"name": "calm", "tier": "basic"}]}"#,
    /// )
    /// .expect("valid registry");
    /// let preset = registry.find_preset("calm").expect("preset exists");
    /// let options = preset.options(derive_seed("item-1"));
    /// assert_eq!(options.complexity().value(), 0.25);
    /// ```
    #[must_use]
    pub fn options(&self, seed: Seed) -> GlyphOptions {
        resolve_options(
            seed,
            &OptionOverrides::default(),
            Some(self),
            &OptionDefaults::default(),
        )
    }
}

fn parse_color(
    preset: &str,
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<Color>, RegistryError> {
    raw.map(str::parse::<Color>)
        .transpose()
        .map_err(|source: ColorError| RegistryError::InvalidColor {
            preset: preset.to_owned(),
            field,
            source,
        })
}

/// Raw JSON representation for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPresetRegistry {
    version: u32,
    presets: Vec<RawGlyphPreset>,
}

/// Raw JSON representation of a preset.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGlyphPreset {
    name: String,
    #[serde(default)]
    tier: Option<GlyphTier>,
    #[serde(default)]
    complexity: Option<f64>,
    #[serde(default)]
    primary: Option<String>,
    #[serde(default)]
    secondary: Option<String>,
    #[serde(default)]
    canvas_size: Option<u32>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::seed::derive_seed;

    const VALID_JSON: &str = r##"{
        "version": 1,
        "presets": [
            {"name": "ember", "tier": "premium", "primary": "#f97316", "secondary": "#fed7aa"},
            {"name": "frost", "complexity": 0.3, "canvasSize": 256},
            {"name": "plain"}
        ]
    }"##;

    #[test]
    fn parses_valid_registry() {
        let registry = PresetRegistry::from_json(VALID_JSON).expect("valid registry");

        assert_eq!(registry.version(), 1);
        assert_eq!(registry.presets().len(), 3);
    }

    #[test]
    fn finds_preset_by_name() {
        let registry = PresetRegistry::from_json(VALID_JSON).expect("valid registry");
        let preset = registry.find_preset("ember").expect("preset found");

        assert_eq!(preset.name(), "ember");
        assert_eq!(preset.tier(), Some(GlyphTier::Premium));
        assert_eq!(preset.primary(), Some(Color::rgb(0xf9, 0x73, 0x16)));
        assert_eq!(preset.canvas_size(), None);
    }

    #[test]
    fn returns_error_for_unknown_preset() {
        let registry = PresetRegistry::from_json(VALID_JSON).expect("valid registry");
        let result = registry.find_preset("unknown");

        assert_eq!(
            result,
            Err(RegistryError::PresetNotFound {
                name: "unknown".to_owned()
            })
        );
    }

    #[rstest]
    #[case::malformed_json("not valid json")]
    #[case::missing_version(r#"{"presets": [{"name": "a"}]}"#)]
    #[case::missing_name(r#"{"version": 1, "presets": [{"tier": "basic"}]}"#)]
    #[case::unknown_tier(r#"{"version": 1, "presets": [{"name": "a", "tier": "legendary"}]}"#)]
    fn rejects_json_with_parse_error(#[case] json: &str) {
        let result = PresetRegistry::from_json(json);
        assert!(matches!(result, Err(RegistryError::ParseError { .. })));
    }

    #[rstest]
    #[case::unsupported_version(
        r#"{"version": 99, "presets": [{"name": "a"}]}"#,
        RegistryError::UnsupportedVersion { expected: 1, actual: 99 }
    )]
    #[case::empty_presets(r#"{"version": 1, "presets": []}"#, RegistryError::EmptyPresets)]
    #[case::duplicate_name(
        r#"{"version": 1, "presets": [{"name": "a"}, {"name": "a"}]}"#,
        RegistryError::DuplicatePreset { name: "a".to_owned() }
    )]
    #[case::bad_secondary(
        r#"{"version": 1, "presets": [{"name": "a", "secondary": "blue"}]}"#,
        RegistryError::InvalidColor {
            preset: "a".to_owned(),
            field: "secondary",
            source: ColorError::MissingHash { value: "blue".to_owned() },
        }
    )]
    #[case::complexity_too_high(
        r#"{"version": 1, "presets": [{"name": "a", "complexity": 1.5}]}"#,
        RegistryError::ComplexityOutOfRange { preset: "a".to_owned(), value: "1.5".to_owned() }
    )]
    fn rejects_invalid_registry(#[case] json: &str, #[case] expected: RegistryError) {
        let result = PresetRegistry::from_json(json);
        assert_eq!(result, Err(expected));
    }

    #[rstest]
    #[case("ember", 0.75)]
    #[case("frost", 0.3)]
    #[case("plain", FALLBACK_COMPLEXITY)]
    fn complexity_resolves_through_tier(#[case] name: &str, #[case] expected: f64) {
        let registry = PresetRegistry::from_json(VALID_JSON).expect("valid registry");
        let preset = registry.find_preset(name).expect("preset found");
        assert_eq!(preset.effective_complexity(), expected);
    }

    #[test]
    fn missing_colours_come_from_the_seed() {
        let registry = PresetRegistry::from_json(VALID_JSON).expect("valid registry");
        let seed = derive_seed("item-42-Widget");
        let options = registry
            .find_preset("frost")
            .expect("preset found")
            .options(seed);

        assert_eq!(options.palette(), Palette::derive(seed));
        assert_eq!(options.canvas_size(), 256);
    }

    #[rstest]
    #[case::flag_tier_beats_preset_tier(
        OptionOverrides { tier: Some(GlyphTier::Mythic), ..OptionOverrides::default() },
        "ember",
        OptionDefaults::default(),
        1.0
    )]
    #[case::preset_value_beats_flag_tier(
        OptionOverrides { tier: Some(GlyphTier::Mythic), ..OptionOverrides::default() },
        "frost",
        OptionDefaults::default(),
        0.3
    )]
    #[case::preset_tier_beats_defaults(
        OptionOverrides::default(),
        "ember",
        OptionDefaults { complexity: Some(0.1), canvas_size: None },
        0.75
    )]
    #[case::defaults_fill_bare_preset(
        OptionOverrides::default(),
        "plain",
        OptionDefaults { complexity: Some(0.1), canvas_size: None },
        0.1
    )]
    #[case::override_beats_everything(
        OptionOverrides { complexity: Some(0.05), ..OptionOverrides::default() },
        "frost",
        OptionDefaults { complexity: Some(0.9), canvas_size: None },
        0.05
    )]
    fn complexity_layers_in_precedence_order(
        #[case] overrides: OptionOverrides,
        #[case] name: &str,
        #[case] defaults: OptionDefaults,
        #[case] expected: f64,
    ) {
        let registry = PresetRegistry::from_json(VALID_JSON).expect("valid registry");
        let preset = registry.find_preset(name).expect("preset found");
        let options = resolve_options(derive_seed("item-1"), &overrides, Some(preset), &defaults);
        assert_eq!(options.complexity().value(), expected);
    }

    #[test]
    fn canvas_defaults_sit_below_the_preset() {
        let registry = PresetRegistry::from_json(VALID_JSON).expect("valid registry");
        let defaults = OptionDefaults {
            complexity: None,
            canvas_size: Some(512),
        };
        let seed = derive_seed("item-1");
        let overrides = OptionOverrides::default();
        let frost = registry.find_preset("frost").expect("preset found");
        let plain = registry.find_preset("plain").expect("preset found");

        assert_eq!(resolve_options(seed, &overrides, Some(frost), &defaults).canvas_size(), 256);
        assert_eq!(resolve_options(seed, &overrides, Some(plain), &defaults).canvas_size(), 512);
    }

    #[test]
    fn explicit_colours_override_the_seed() {
        let registry = PresetRegistry::from_json(VALID_JSON).expect("valid registry");
        let options = registry
            .find_preset("ember")
            .expect("preset found")
            .options(derive_seed("anything"));

        assert_eq!(options.palette().primary.to_string(), "#f97316");
        assert_eq!(options.palette().secondary.to_string(), "#fed7aa");
    }
}
