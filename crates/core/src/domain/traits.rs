//! Seam Traits
//!
//! Interfaces implemented outside core. The config crate provides the city
//! table and the template-based question renderer; tests and embedders may
//! swap in their own.

use serde::{Deserialize, Serialize};

use super::questions::Question;
use super::slots::CityTier;

/// One city in the reference table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRecord {
    /// Canonical display name
    pub name: String,
    /// Other names in any script, e.g. "Tokyo", "东京", "とうきょう"
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Number of five-star hotels
    pub five_star_hotels: u32,
}

impl CityRecord {
    /// Canonical name followed by all aliases
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(|a| a.as_str()))
    }
}

/// Read-only city reference table
pub trait CityReference: Send + Sync {
    /// Find a city by any of its names, case and script insensitive
    fn lookup(&self, name: &str) -> Option<&CityRecord>;

    /// Find the city named in free text
    ///
    /// A city introduced as the destination ("去京都", "to Paris") wins over
    /// other mentions; otherwise the earliest mention wins.
    fn find_in_text(&self, text: &str) -> Option<&CityRecord>;

    /// Number of cities in the table
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Values a question template may reference
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionContext {
    pub city: Option<String>,
    pub tier: Option<CityTier>,
    pub five_star_hotels: Option<u32>,
    /// Number of hotels to propose, as an inclusive range
    pub shortlist: Option<(u32, u32)>,
}

/// Turns a tagged question into user-facing text
pub trait QuestionRenderer: Send + Sync {
    fn render(&self, question: &Question, ctx: &QuestionContext) -> String;

    /// Optional note attached to a ready signal, e.g. the short-list notice
    /// for small cities
    fn ready_notice(&self, _tier: CityTier, _ctx: &QuestionContext) -> Option<String> {
        None
    }
}
