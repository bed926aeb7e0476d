//! Glyph rendering defaults loaded via OrthoConfig.

use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::geometry::DEFAULT_CANVAS_SIZE;

fn default_registry_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("presets.json")
}

/// Defaults applied when a render request leaves a value unset.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GLYPH")]
pub struct GlyphSettings {
    /// Emit logs as JSON lines instead of human-readable text.
    #[ortho_config(default = false)]
    pub json_logs: bool,
    /// Optional preset registry path override.
    pub registry_path: Option<PathBuf>,
    /// Optional default canvas edge length.
    pub canvas_size: Option<u32>,
    /// Optional default complexity.
    pub complexity: Option<f64>,
}

impl GlyphSettings {
    /// Return the configured registry path, falling back to the bundled
    /// fixture.
    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        self.registry_path
            .clone()
            .unwrap_or_else(default_registry_path)
    }

    /// Return the configured canvas size, falling back to the default.
    #[must_use]
    pub fn canvas_size(&self) -> u32 {
        self.canvas_size.unwrap_or(DEFAULT_CANVAS_SIZE)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for glyph settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> GlyphSettings {
        GlyphSettings::load_from_iter([OsString::from("glyph-render")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("GLYPH_JSON_LOGS", None::<String>),
            ("GLYPH_REGISTRY_PATH", None::<String>),
            ("GLYPH_CANVAS_SIZE", None::<String>),
            ("GLYPH_COMPLEXITY", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert!(!settings.json_logs);
        assert_eq!(settings.registry_path(), default_registry_path());
        assert_eq!(settings.canvas_size(), DEFAULT_CANVAS_SIZE);
        assert!(settings.complexity.is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("GLYPH_JSON_LOGS", Some("true".to_owned())),
            ("GLYPH_REGISTRY_PATH", Some("/tmp/glyph_presets.json".to_owned())),
            ("GLYPH_CANVAS_SIZE", Some("512".to_owned())),
            ("GLYPH_COMPLEXITY", Some("0.8".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.json_logs);
        assert_eq!(
            settings.registry_path(),
            PathBuf::from("/tmp/glyph_presets.json")
        );
        assert_eq!(settings.canvas_size(), 512);
        assert_eq!(settings.complexity, Some(0.8));
    }
}
