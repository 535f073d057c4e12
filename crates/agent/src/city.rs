//! City tier classification
//!
//! Maps a city name to tier A/B/C by its five-star hotel count. Names are
//! matched through the city reference table (aliases, case and full-width
//! insensitive); anything unmatched gets the configured fallback tier.

use hotel_planner_config::PolicyConfig;
use hotel_planner_core::{CityReference, CityTier};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Tier of a city plus what the table knows about it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityClassification {
    /// Canonical table name, or the name as given when unmatched
    pub name: String,
    pub tier: CityTier,
    pub five_star_hotels: Option<u32>,
    /// True when the city was not in the table and the default tier applied
    pub is_fallback: bool,
}

pub struct CityClassifier {
    reference: Arc<dyn CityReference>,
    tier_a_min: u32,
    tier_b_min: u32,
    default_tier: CityTier,
}

impl CityClassifier {
    pub fn new(
        reference: Arc<dyn CityReference>,
        tier_a_min: u32,
        tier_b_min: u32,
        default_tier: CityTier,
    ) -> Self {
        Self {
            reference,
            tier_a_min,
            tier_b_min,
            default_tier,
        }
    }

    pub fn from_policy(reference: Arc<dyn CityReference>, policy: &PolicyConfig) -> Self {
        Self::new(
            reference,
            policy.tier_a_min_five_star,
            policy.tier_b_min_five_star,
            policy.default_tier,
        )
    }

    pub fn classify(&self, city: &str) -> CityTier {
        self.classify_detailed(city).tier
    }

    pub fn classify_detailed(&self, city: &str) -> CityClassification {
        match self.reference.lookup(city) {
            Some(record) => {
                let tier = CityTier::from_five_star_count(
                    record.five_star_hotels,
                    self.tier_a_min,
                    self.tier_b_min,
                );
                tracing::debug!(
                    city = %record.name,
                    five_star_hotels = record.five_star_hotels,
                    tier = %tier,
                    "City classified"
                );
                CityClassification {
                    name: record.name.clone(),
                    tier,
                    five_star_hotels: Some(record.five_star_hotels),
                    is_fallback: false,
                }
            }
            None => {
                tracing::debug!(
                    city = %city,
                    tier = %self.default_tier,
                    "Unknown city, using fallback tier"
                );
                CityClassification {
                    name: city.trim().to_string(),
                    tier: self.default_tier,
                    five_star_hotels: None,
                    is_fallback: true,
                }
            }
        }
    }

    pub fn reference(&self) -> &Arc<dyn CityReference> {
        &self.reference
    }
}

impl std::fmt::Debug for CityClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CityClassifier")
            .field("cities", &self.reference.len())
            .field("tier_a_min", &self.tier_a_min)
            .field("tier_b_min", &self.tier_b_min)
            .field("default_tier", &self.default_tier)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotel_planner_config::CityTable;

    fn classifier() -> CityClassifier {
        CityClassifier::from_policy(
            Arc::new(CityTable::builtin().unwrap()),
            &PolicyConfig::default(),
        )
    }

    #[test]
    fn test_tiers_from_builtin_table() {
        let classifier = classifier();
        assert_eq!(classifier.classify("东京"), CityTier::A);
        assert_eq!(classifier.classify("京都"), CityTier::B);
        assert_eq!(classifier.classify("名古屋"), CityTier::B);
        assert_eq!(classifier.classify("桂林"), CityTier::C);
    }

    #[test]
    fn test_aliases_and_case() {
        let classifier = classifier();
        for name in ["Tokyo", "TOKYO", " tokyo ", "東京", "ＴＯＫＹＯ"] {
            let info = classifier.classify_detailed(name);
            assert_eq!(info.name, "东京", "{}", name);
            assert_eq!(info.tier, CityTier::A);
            assert!(!info.is_fallback);
        }
        assert_eq!(classifier.classify("上海市"), CityTier::A);
    }

    #[test]
    fn test_unknown_city_falls_back() {
        let info = classifier().classify_detailed("Smalltown123");
        assert_eq!(info.tier, CityTier::A);
        assert!(info.is_fallback);
        assert_eq!(info.five_star_hotels, None);
        assert_eq!(info.name, "Smalltown123");
    }

    #[test]
    fn test_configured_fallback_and_thresholds() {
        let policy = PolicyConfig {
            tier_a_min_five_star: 50,
            tier_b_min_five_star: 10,
            default_tier: CityTier::C,
            ..PolicyConfig::default()
        };
        let classifier =
            CityClassifier::from_policy(Arc::new(CityTable::builtin().unwrap()), &policy);
        assert_eq!(classifier.classify("东京"), CityTier::B);
        assert_eq!(classifier.classify("上海"), CityTier::A);
        assert_eq!(classifier.classify("名古屋"), CityTier::C);
        assert_eq!(classifier.classify("nowhere"), CityTier::C);
    }

    #[test]
    fn test_tier_boundaries() {
        let yaml = r#"
cities:
  - name: Thirty
    five_star_hotels: 30
  - name: TwentyNine
    five_star_hotels: 29
  - name: Five
    five_star_hotels: 5
  - name: Four
    five_star_hotels: 4
"#;
        let table = CityTable::from_yaml_str(yaml).unwrap();
        let classifier = CityClassifier::from_policy(Arc::new(table), &PolicyConfig::default());
        assert_eq!(classifier.classify("thirty"), CityTier::A);
        assert_eq!(classifier.classify("twentynine"), CityTier::B);
        assert_eq!(classifier.classify("five"), CityTier::B);
        assert_eq!(classifier.classify("four"), CityTier::C);
    }
}
