//! Salted, stateless pseudo-random draws.
//!
//! Every draw re-derives its value from `(seed, salt)`: the salted string is
//! folded into a 64-bit key, a fresh `ChaCha8Rng` is seeded from that key, and
//! one `f64` sample is taken. Nothing advances between calls, so the order in
//! which features request values never changes the values themselves.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::seed::{Seed, fold_code_points};

/// Value substituted when a sample is non-finite or out of range.
pub const FALLBACK_DRAW: f64 = 0.5;

/// Returns a reproducible value in `[0, 1)` for the given salted string.
///
/// ```
/// use glyph_forge::pseudo_random;
///
/// let value = pseudo_random("1234:segments");
/// assert!((0.0..1.0).contains(&value));
/// assert_eq!(value, pseudo_random("1234:segments"));
/// ```
#[must_use]
pub fn pseudo_random(seed_string: &str) -> f64 {
    let mut rng = ChaCha8Rng::seed_from_u64(fold_code_points(seed_string));
    unit_interval(rng.random::<f64>())
}

/// Clamps a raw sample into `[0, 1)`, replacing NaN and infinities.
#[must_use]
pub fn unit_interval(value: f64) -> f64 {
    if value.is_finite() && (0.0..1.0).contains(&value) {
        value
    } else {
        FALLBACK_DRAW
    }
}

impl Seed {
    /// Draws the value for one named feature of this seed.
    ///
    /// ```
    /// use glyph_forge::derive_seed;
    ///
    /// let seed = derive_seed("item-42");
    /// assert_eq!(seed.draw("outer-3"), seed.draw("outer-3"));
    /// ```
    #[must_use]
    pub fn draw(self, salt: &str) -> f64 {
        pseudo_random(&salted(self, salt))
    }

    /// Draws an index in `0..bound`. Returns `0` when `bound` is zero.
    #[must_use]
    pub fn draw_index(self, salt: &str, bound: u32) -> u32 {
        scale_draw(self.draw(salt), bound)
    }

    /// Draws a boolean that is `true` with the given probability.
    #[must_use]
    pub fn draw_chance(self, salt: &str, probability: f64) -> bool {
        self.draw(salt) < probability
    }
}

fn salted(seed: Seed, salt: &str) -> String {
    format!("{seed}:{salt}")
}

/// Maps a unit draw onto `0..bound` with floor rounding.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "draw lies in [0, 1), so the floored product is within 0..bound"
)]
#[must_use]
pub(crate) fn scale_draw(draw: f64, bound: u32) -> u32 {
    if bound == 0 {
        return 0;
    }
    let scaled = (unit_interval(draw) * f64::from(bound)).floor() as u32;
    scaled.min(bound - 1)
}
