//! Error types for the glyph-forge crate.
//!
//! The generator itself is total and never fails. Errors only arise at the
//! edges of the crate, from parsing and loading inputs to verifying stored
//! seeds and writing rendered output.

use camino::Utf8PathBuf;
use std::path::PathBuf;

use thiserror::Error;

use crate::seed::Seed;

/// Errors raised while parsing a hex colour string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// The colour string was empty.
    #[error("colour must not be empty")]
    Empty,

    /// The colour string did not start with `#`.
    #[error("colour '{value}' must start with '#'")]
    MissingHash {
        /// The rejected input.
        value: String,
    },

    /// The colour had a digit count other than 3 or 6.
    #[error("colour '{value}' must have 3 or 6 hex digits")]
    InvalidLength {
        /// The rejected input.
        value: String,
    },

    /// The colour contained a non-hex character.
    #[error("colour '{value}' contains non-hex digits")]
    InvalidDigit {
        /// The rejected input.
        value: String,
    },
}

/// Raised when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'; expected one of: {expected}")]
pub struct ParseVariantError {
    /// Name of the enum being parsed (for example `tier`).
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
    /// Comma-separated list of accepted spellings.
    pub expected: &'static str,
}

/// Errors that can occur when parsing or querying a preset registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The registry file could not be read.
    #[error("failed to read registry file at '{path}': {message}")]
    IoError {
        /// Path to the registry file.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The registry JSON is malformed or missing required fields.
    #[error("invalid registry JSON: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },

    /// The registry version is not supported.
    #[error("unsupported registry version: expected {expected}, found {actual}")]
    UnsupportedVersion {
        /// Expected version number.
        expected: u32,
        /// Actual version found in the registry.
        actual: u32,
    },

    /// The registry contains no presets.
    #[error("registry contains no presets")]
    EmptyPresets,

    /// Two presets share a name.
    #[error("duplicate preset name '{name}'")]
    DuplicatePreset {
        /// The repeated name.
        name: String,
    },

    /// A preset colour failed to parse.
    #[error("invalid {field} colour in preset '{preset}': {source}")]
    InvalidColor {
        /// Preset carrying the bad colour.
        preset: String,
        /// Which colour field was rejected.
        field: &'static str,
        /// Underlying parse failure.
        #[source]
        source: ColorError,
    },

    /// A preset complexity fell outside `[0, 1]`.
    #[error("complexity {value} in preset '{preset}' is outside [0, 1]")]
    ComplexityOutOfRange {
        /// Preset carrying the bad value.
        preset: String,
        /// Rendered form of the rejected value.
        value: String,
    },

    /// The requested preset was not found in the registry.
    #[error("preset '{name}' not found in registry")]
    PresetNotFound {
        /// The preset name that was not found.
        name: String,
    },
}

/// Raised when an identity does not reproduce a stored seed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// The identity derives a different seed than expected.
    #[error("identity '{identity}' derives seed {actual}, expected {expected}")]
    SeedMismatch {
        /// The identity that was checked.
        identity: String,
        /// Seed the caller expected.
        expected: Seed,
        /// Seed the identity actually derives.
        actual: Seed,
    },
}

/// Errors raised while rendering a glyph to a raster image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RasterError {
    /// The descriptor's canvas is outside the supported size range.
    #[error("canvas size {size} is outside the supported raster range")]
    CanvasOutOfRange {
        /// The rejected canvas edge length.
        size: u32,
    },

    /// The PNG encoder failed.
    #[error("failed to encode PNG: {message}")]
    EncodeError {
        /// Encoder error message.
        message: String,
    },
}

/// Errors raised while writing rendered glyph output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutputError {
    /// The output path does not name a file.
    #[error("output path '{path}' must name a file")]
    NotAFile {
        /// The rejected path.
        path: Utf8PathBuf,
    },

    /// The output could not be written.
    #[error("failed to write output at '{path}': {message}")]
    WriteError {
        /// Path being written.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },
}
