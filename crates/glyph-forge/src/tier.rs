//! Tier and rank lookup tables.
//!
//! Storefront imagery and default detail levels are chosen by looking up a
//! row in a static table rather than branching on each tier or rank.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseVariantError;

/// Access tier of a glyph-bearing listing or account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphTier {
    /// Entry tier, open to everyone.
    Basic,
    /// Creator or subscriber tier.
    Enhanced,
    /// Advanced tier.
    Premium,
    /// Highest tier.
    Mythic,
}

/// Presentation profile attached to a [`GlyphTier`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierProfile {
    /// The tier this row describes.
    pub tier: GlyphTier,
    /// Numeric level used by listing records (1-based).
    pub level: u8,
    /// Canonical lowercase name.
    pub name: &'static str,
    /// Asset key the client resolves to badge imagery.
    pub asset_key: &'static str,
    /// Complexity used when a caller does not supply one.
    pub default_complexity: f64,
}

const TIER_PROFILES: [TierProfile; 4] = [
    TierProfile {
        tier: GlyphTier::Basic,
        level: 1,
        name: "basic",
        asset_key: "glyph-tier-basic",
        default_complexity: 0.25,
    },
    TierProfile {
        tier: GlyphTier::Enhanced,
        level: 2,
        name: "enhanced",
        asset_key: "glyph-tier-enhanced",
        default_complexity: 0.5,
    },
    TierProfile {
        tier: GlyphTier::Premium,
        level: 3,
        name: "premium",
        asset_key: "glyph-tier-premium",
        default_complexity: 0.75,
    },
    TierProfile {
        tier: GlyphTier::Mythic,
        level: 4,
        name: "mythic",
        asset_key: "glyph-tier-mythic",
        default_complexity: 1.0,
    },
];

impl GlyphTier {
    /// Every tier, lowest first.
    pub const ALL: [Self; 4] = [Self::Basic, Self::Enhanced, Self::Premium, Self::Mythic];

    /// Returns the table row for this tier.
    #[must_use]
    pub const fn profile(self) -> &'static TierProfile {
        match self {
            Self::Basic => &TIER_PROFILES[0],
            Self::Enhanced => &TIER_PROFILES[1],
            Self::Premium => &TIER_PROFILES[2],
            Self::Mythic => &TIER_PROFILES[3],
        }
    }

    /// Returns the asset key for badge imagery.
    ///
    /// ```
    /// use glyph_forge::GlyphTier;
    ///
    /// assert_eq!(GlyphTier::Premium.asset_key(), "glyph-tier-premium");
    /// ```
    #[must_use]
    pub const fn asset_key(self) -> &'static str {
        self.profile().asset_key
    }

    /// Returns the complexity used when none is supplied.
    #[must_use]
    pub const fn default_complexity(self) -> f64 {
        self.profile().default_complexity
    }

    /// Looks a tier up by its numeric listing level.
    #[must_use]
    pub fn from_level(level: u8) -> Option<Self> {
        TIER_PROFILES
            .iter()
            .find(|profile| profile.level == level)
            .map(|profile| profile.tier)
    }
}

impl fmt::Display for GlyphTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().name)
    }
}

impl FromStr for GlyphTier {
    type Err = ParseVariantError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        TIER_PROFILES
            .iter()
            .find(|profile| profile.name == wanted)
            .map(|profile| profile.tier)
            .ok_or_else(|| ParseVariantError {
                kind: "tier",
                value: value.to_owned(),
                expected: "basic, enhanced, premium, mythic",
            })
    }
}

/// Standing of a glyph holder within the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphRank {
    /// New participant.
    Novice,
    /// Established participant.
    Adept,
    /// Highly rated participant.
    Master,
    /// Top rank.
    Mythic,
}

const RANK_ASSETS: [(GlyphRank, &str, &str); 4] = [
    (GlyphRank::Novice, "novice", "glyph-rank-novice"),
    (GlyphRank::Adept, "adept", "glyph-rank-adept"),
    (GlyphRank::Master, "master", "glyph-rank-master"),
    (GlyphRank::Mythic, "mythic", "glyph-rank-mythic"),
];

impl GlyphRank {
    /// Every rank, lowest first.
    pub const ALL: [Self; 4] = [Self::Novice, Self::Adept, Self::Master, Self::Mythic];

    const fn row(self) -> &'static (Self, &'static str, &'static str) {
        match self {
            Self::Novice => &RANK_ASSETS[0],
            Self::Adept => &RANK_ASSETS[1],
            Self::Master => &RANK_ASSETS[2],
            Self::Mythic => &RANK_ASSETS[3],
        }
    }

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.row().1
    }

    /// Returns the asset key for rank imagery.
    #[must_use]
    pub const fn asset_key(self) -> &'static str {
        self.row().2
    }
}

impl fmt::Display for GlyphRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GlyphRank {
    type Err = ParseVariantError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        RANK_ASSETS
            .iter()
            .find(|(_, name, _)| *name == wanted)
            .map(|(rank, _, _)| *rank)
            .ok_or_else(|| ParseVariantError {
                kind: "rank",
                value: value.to_owned(),
                expected: "novice, adept, master, mythic",
            })
    }
}
