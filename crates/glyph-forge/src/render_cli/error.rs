//! Error types for the glyph render CLI.

use thiserror::Error;

use crate::error::{OutputError, RasterError, RegistryError, VerificationError};

/// Errors surfaced by the render CLI's resolution and output flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CliError {
    /// Layered settings could not be loaded.
    #[error("failed to load settings: {message}")]
    SettingsError {
        /// Description of the configuration failure.
        message: String,
    },
    /// The rendered descriptor could not be encoded as JSON.
    #[error("failed to encode glyph as JSON: {message}")]
    EncodeError {
        /// Serializer error message.
        message: String,
    },
    /// Rendered output could not be written to stdout.
    #[error("failed to write glyph to stdout: {message}")]
    StdoutError {
        /// Description of the I/O error.
        message: String,
    },
    /// The composed identity does not derive the expected seed.
    #[error("seed verification failed: {source}")]
    VerificationError {
        /// Underlying mismatch.
        #[from]
        #[source]
        source: VerificationError,
    },
    /// The glyph could not be rendered as a PNG.
    #[error("raster error: {source}")]
    RasterError {
        /// Underlying raster error.
        #[from]
        #[source]
        source: RasterError,
    },
    /// An error occurred while reading the preset registry.
    #[error("registry error: {source}")]
    RegistryError {
        /// Underlying registry error.
        #[from]
        #[source]
        source: RegistryError,
    },
    /// An error occurred while writing the output file.
    #[error("output error: {source}")]
    OutputError {
        /// Underlying output error.
        #[from]
        #[source]
        source: OutputError,
    },
}
