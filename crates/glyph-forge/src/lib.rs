//! Deterministic seeded glyph generation for marketplace identicons.
//!
//! Every marketplace entity (listing, user, advertiser) gets a recognisable
//! geometric glyph derived purely from an identity string. The same identity,
//! complexity, and colours always produce the same glyph, on any platform and
//! in any process, without storing anything.
//!
//! # Overview
//!
//! The crate supports:
//!
//! - Deriving a stable 64-bit seed from an identity string
//! - Salted, order-independent pseudo-random draws from a seed
//! - Synthesizing a symmetric glyph description at a given complexity
//! - Rendering the description to SVG, JSON, or PNG
//! - Salting an identity into variants and verifying stored seeds
//! - Loading named presets from a versioned JSON registry
//! - Tier and rank lookups for storefront badge imagery
//!
//! # Example
//!
//! ```
//! use glyph_forge::{Color, LineKind, synthesize};
//!
//! let primary: Color = "#6366f1".parse().expect("valid colour");
//! let secondary: Color = "#a5b4fc".parse().expect("valid colour");
//!
//! let glyph = synthesize("item-42-Widget", 0.6, primary, secondary);
//!
//! assert!((4..=7).contains(&glyph.segment_count));
//! assert_eq!(glyph.core_points.len(), glyph.outer_points.len());
//! assert_eq!(glyph.line_count(LineKind::Chord), (0.6 * f64::from(glyph.segment_count)) as usize);
//! ```

mod atomic_io;
mod color;
mod config;
mod error;
mod geometry;
mod prng;
mod raster;
mod registry;
mod render;
pub mod render_cli;
mod seed;
mod tier;

pub use color::{Color, Palette};
pub use config::GlyphSettings;
pub use error::{
    ColorError, OutputError, ParseVariantError, RasterError, RegistryError, VerificationError,
};
pub use geometry::{
    Circle, CircleKind, Complexity, DEFAULT_CANVAS_SIZE, GeometryDescriptor, GlyphOptions, Line,
    LineKind, MAX_CANVAS_SIZE, MAX_SEGMENTS, MIN_CANVAS_SIZE, MIN_SEGMENTS, Point, Primitive,
    RingPoint, SPOKE_DASH_PATTERN, Stroke, synthesize, synthesize_with,
};
pub use prng::{FALLBACK_DRAW, pseudo_random, unit_interval};
pub use raster::{rasterize, render_png};
pub use registry::{
    FALLBACK_COMPLEXITY, GlyphPreset, OptionDefaults, OptionOverrides, PresetRegistry,
    resolve_options,
};
pub use render::{render_json, render_svg};
pub use seed::{
    DEFAULT_SEED, IDENTITY_DELIMITER, Identity, Seed, SubjectKind, VARIANT_DELIMITER, derive_seed,
    verify_seed,
};
pub use tier::{GlyphRank, GlyphTier, TierProfile};
