//! sRGB colours and glyph palettes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ColorError;
use crate::seed::Seed;

/// An opaque sRGB colour, written as lowercase `#rrggbb`.
///
/// ```
/// use glyph_forge::Color;
///
/// let indigo: Color = "#6366F1".parse().expect("valid colour");
/// assert_eq!(indigo.to_string(), "#6366f1");
/// assert_eq!("#abc".parse::<Color>(), "#aabbcc".parse::<Color>());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
}

impl Color {
    /// Builds a colour from its channels.
    #[must_use]
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Returns the `(red, green, blue)` channels.
    #[must_use]
    pub const fn channels(self) -> (u8, u8, u8) {
        (self.red, self.green, self.blue)
    }

    /// Converts HSV components in `[0, 1]` to a colour.
    ///
    /// Hue wraps around; saturation and value are clamped.
    #[must_use]
    pub fn from_hsv(hue: f64, saturation: f64, value: f64) -> Self {
        let h = finite_or_zero(hue).rem_euclid(1.0) * 6.0;
        let s = finite_or_zero(saturation).clamp(0.0, 1.0);
        let v = finite_or_zero(value).clamp(0.0, 1.0);

        let sector = h.floor();
        let f = h - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        let (r, g, b) = match sector_index(sector) {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Self::rgb(to_channel(r), to_channel(g), to_channel(b))
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "sector is the floor of a value in [0, 6)"
)]
fn sector_index(sector: f64) -> u8 {
    sector.clamp(0.0, 5.0) as u8
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "component is clamped to [0, 1] before scaling to 0..=255"
)]
#[must_use]
pub(crate) fn to_channel(component: f64) -> u8 {
    (component.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(ColorError::Empty);
        }
        let Some(digits) = value.strip_prefix('#') else {
            return Err(ColorError::MissingHash {
                value: raw.to_owned(),
            });
        };

        let nibbles = digits
            .chars()
            .map(|c| c.to_digit(16))
            .collect::<Option<Vec<u32>>>()
            .ok_or_else(|| ColorError::InvalidDigit {
                value: raw.to_owned(),
            })?;

        let channels: Vec<u8> = match nibbles.as_slice() {
            [r, g, b] => [r, g, b].iter().map(|n| expand_nibble(**n)).collect(),
            [r1, r2, g1, g2, b1, b2] => vec![
                join_nibbles(*r1, *r2),
                join_nibbles(*g1, *g2),
                join_nibbles(*b1, *b2),
            ],
            _ => {
                return Err(ColorError::InvalidLength {
                    value: raw.to_owned(),
                });
            }
        };

        match channels.as_slice() {
            [red, green, blue] => Ok(Self::rgb(*red, *green, *blue)),
            _ => Err(ColorError::InvalidLength {
                value: raw.to_owned(),
            }),
        }
    }
}

fn expand_nibble(nibble: u32) -> u8 {
    join_nibbles(nibble, nibble)
}

fn join_nibbles(high: u32, low: u32) -> u8 {
    u8::try_from((high << 4) | low).unwrap_or(u8::MAX)
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_string()
    }
}

/// Primary and secondary colours used to paint a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    /// Colour of the core polygon, outer edges, and central ornament.
    pub primary: Color,
    /// Colour of chords, spokes, and vertex nodes.
    pub secondary: Color,
}

impl Palette {
    /// Pairs two colours.
    #[must_use]
    pub const fn new(primary: Color, secondary: Color) -> Self {
        Self { primary, secondary }
    }

    /// Derives a harmonious palette from a seed.
    ///
    /// Both colours share a seed-chosen hue; the secondary is a lighter,
    /// less saturated tint of the primary.
    ///
    /// ```
    /// use glyph_forge::{Palette, derive_seed};
    ///
    /// let seed = derive_seed("user-7");
    /// assert_eq!(Palette::derive(seed), Palette::derive(seed));
    /// ```
    #[must_use]
    pub fn derive(seed: Seed) -> Self {
        let hue = seed.draw("palette-hue");
        Self {
            primary: Color::from_hsv(hue, 0.8, 0.9),
            secondary: Color::from_hsv(hue, 0.35, 0.98),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        // Indigo pairing used by the storefront.
        Self::new(Color::rgb(0x63, 0x66, 0xf1), Color::rgb(0xa5, 0xb4, 0xfc))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::seed::derive_seed;

    #[rstest]
    #[case("#6366f1", Color::rgb(0x63, 0x66, 0xf1))]
    #[case("#A5B4FC", Color::rgb(0xa5, 0xb4, 0xfc))]
    #[case("#fff", Color::rgb(0xff, 0xff, 0xff))]
    #[case(" #0a0 ", Color::rgb(0x00, 0xaa, 0x00))]
    fn parses_hex_colours(#[case] raw: &str, #[case] expected: Color) {
        assert_eq!(raw.parse::<Color>(), Ok(expected));
    }

    #[rstest]
    #[case("", ColorError::Empty)]
    #[case("6366f1", ColorError::MissingHash { value: "6366f1".to_owned() })]
    #[case("#6366f", ColorError::InvalidLength { value: "#6366f".to_owned() })]
    #[case("#", ColorError::InvalidLength { value: "#".to_owned() })]
    #[case("#zzzzzz", ColorError::InvalidDigit { value: "#zzzzzz".to_owned() })]
    fn rejects_malformed_colours(#[case] raw: &str, #[case] expected: ColorError) {
        assert_eq!(raw.parse::<Color>(), Err(expected));
    }

    #[test]
    fn displays_lowercase_hex() {
        let colour = Color::rgb(0xAB, 0x01, 0xFF);
        assert_eq!(colour.to_string(), "#ab01ff");
        assert_eq!(colour.channels(), (0xab, 0x01, 0xff));
    }

    #[test]
    fn serializes_as_hex_string() {
        let json = serde_json::to_string(&Color::rgb(0x63, 0x66, 0xf1)).expect("serialize");
        assert_eq!(json, "\"#6366f1\"");
        let parsed: Color = serde_json::from_str("\"#a5b4fc\"").expect("deserialize");
        assert_eq!(parsed, Color::rgb(0xa5, 0xb4, 0xfc));
    }

    #[rstest]
    #[case(0.0, 1.0, 1.0, Color::rgb(255, 0, 0))]
    #[case(1.0 / 3.0, 1.0, 1.0, Color::rgb(0, 255, 0))]
    #[case(2.0 / 3.0, 1.0, 1.0, Color::rgb(0, 0, 255))]
    #[case(0.5, 0.0, 1.0, Color::rgb(255, 255, 255))]
    #[case(0.25, 1.0, 0.0, Color::rgb(0, 0, 0))]
    #[case(1.0, 1.0, 1.0, Color::rgb(255, 0, 0))]
    fn converts_hsv(
        #[case] hue: f64,
        #[case] saturation: f64,
        #[case] value: f64,
        #[case] expected: Color,
    ) {
        assert_eq!(Color::from_hsv(hue, saturation, value), expected);
    }

    #[test]
    fn hsv_tolerates_nan() {
        assert_eq!(Color::from_hsv(f64::NAN, 1.0, 1.0), Color::rgb(255, 0, 0));
    }

    #[test]
    fn derived_palettes_differ_between_seeds() {
        let seeds = ["item-1", "item-2", "item-3", "item-4"].map(derive_seed);
        let palettes: Vec<Palette> = seeds.iter().map(|seed| Palette::derive(*seed)).collect();
        assert!(palettes.windows(2).any(|pair| pair.first() != pair.get(1)));
    }
}
