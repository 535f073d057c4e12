//! Narrowing Policy Configuration
//!
//! Tier thresholds, the fallback tier for unknown cities, and per-tier
//! narrowing categories with their floors.

use hotel_planner_core::{CityTier, NarrowingCategory};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::constants::{narrowing, shortlist, tiers};
use crate::ConfigError;

/// Policy section of the settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_tier_a_min")]
    pub tier_a_min_five_star: u32,
    #[serde(default = "default_tier_b_min")]
    pub tier_b_min_five_star: u32,
    /// Tier used when the city is not in the reference table
    #[serde(default = "default_fallback_tier")]
    pub default_tier: CityTier,
    #[serde(default)]
    pub narrowing: NarrowingTable,
}

fn default_tier_a_min() -> u32 {
    tiers::TIER_A_MIN_FIVE_STAR
}

fn default_tier_b_min() -> u32 {
    tiers::TIER_B_MIN_FIVE_STAR
}

fn default_fallback_tier() -> CityTier {
    CityTier::A
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            tier_a_min_five_star: default_tier_a_min(),
            tier_b_min_five_star: default_tier_b_min(),
            default_tier: default_fallback_tier(),
            narrowing: NarrowingTable::default(),
        }
    }
}

impl PolicyConfig {
    pub fn narrowing_for(&self, tier: CityTier) -> &TierNarrowing {
        self.narrowing.for_tier(tier)
    }

    /// Check thresholds and every tier's narrowing rules
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tier_b_min_five_star == 0 {
            return Err(ConfigError::InvalidPolicy(
                "tier_b_min_five_star must be at least 1".to_string(),
            ));
        }
        if self.tier_a_min_five_star <= self.tier_b_min_five_star {
            return Err(ConfigError::InvalidPolicy(format!(
                "tier_a_min_five_star ({}) must exceed tier_b_min_five_star ({})",
                self.tier_a_min_five_star, self.tier_b_min_five_star
            )));
        }
        for tier in [CityTier::A, CityTier::B, CityTier::C] {
            self.narrowing
                .for_tier(tier)
                .validate()
                .map_err(|reason| {
                    ConfigError::InvalidPolicy(format!("tier {}: {}", tier, reason))
                })?;
        }
        Ok(())
    }
}

/// Narrowing rules for each tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrowingTable {
    #[serde(default = "TierNarrowing::tier_a", alias = "A")]
    pub a: TierNarrowing,
    #[serde(default = "TierNarrowing::tier_b", alias = "B")]
    pub b: TierNarrowing,
    #[serde(default = "TierNarrowing::tier_c", alias = "C")]
    pub c: TierNarrowing,
}

impl Default for NarrowingTable {
    fn default() -> Self {
        Self {
            a: TierNarrowing::tier_a(),
            b: TierNarrowing::tier_b(),
            c: TierNarrowing::tier_c(),
        }
    }
}

impl NarrowingTable {
    pub fn for_tier(&self, tier: CityTier) -> &TierNarrowing {
        match tier {
            CityTier::A => &self.a,
            CityTier::B => &self.b,
            CityTier::C => &self.c,
        }
    }
}

/// Narrowing rules for one tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierNarrowing {
    /// How many categories must be satisfied before recommending
    pub min_satisfied: usize,
    /// Categories in the order they are asked
    #[serde(default)]
    pub categories: Vec<NarrowingCategory>,
    #[serde(default)]
    pub shortlist: ShortlistHint,
}

impl TierNarrowing {
    pub fn tier_a() -> Self {
        Self {
            min_satisfied: narrowing::TIER_A_MIN_SATISFIED,
            categories: vec![NarrowingCategory::BudgetOrStar, NarrowingCategory::AreaOrBrand],
            shortlist: ShortlistHint::from(shortlist::TIER_A),
        }
    }

    pub fn tier_b() -> Self {
        Self {
            min_satisfied: narrowing::TIER_B_MIN_SATISFIED,
            categories: vec![NarrowingCategory::BudgetOrArea],
            shortlist: ShortlistHint::from(shortlist::TIER_B),
        }
    }

    pub fn tier_c() -> Self {
        Self {
            min_satisfied: narrowing::TIER_C_MIN_SATISFIED,
            categories: Vec::new(),
            shortlist: ShortlistHint::from(shortlist::TIER_C),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.min_satisfied > self.categories.len() {
            return Err(format!(
                "min_satisfied {} exceeds the {} configured categories",
                self.min_satisfied,
                self.categories.len()
            ));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.categories.iter().find(|c| !seen.insert(**c)) {
            return Err(format!("category '{}' listed twice", dup));
        }
        if self.shortlist.min == 0 || self.shortlist.min > self.shortlist.max {
            return Err(format!(
                "shortlist {}-{} is not a valid range",
                self.shortlist.min, self.shortlist.max
            ));
        }
        Ok(())
    }
}

/// How many hotels the recommendation should list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortlistHint {
    pub min: u32,
    pub max: u32,
}

impl Default for ShortlistHint {
    fn default() -> Self {
        Self::from(shortlist::TIER_C)
    }
}

impl From<(u32, u32)> for ShortlistHint {
    fn from((min, max): (u32, u32)) -> Self {
        Self { min, max }
    }
}
