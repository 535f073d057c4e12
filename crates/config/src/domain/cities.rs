//! City Reference Table
//!
//! Cities with their aliases and five-star hotel counts, loaded from YAML or
//! JSON. A built-in table ships with the crate.

use hotel_planner_core::{CityRecord, CityReference, CityTier};
use hotel_planner_text_processing::{find_term, normalize_city_name, to_half_width};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::ConfigError;

const BUILTIN_CITIES: &str = include_str!("../../data/cities.yaml");

/// On-disk layout of a city table file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CityTableFile {
    #[serde(default)]
    pub cities: Vec<CityRecord>,
}

/// Validated, indexed city reference table
#[derive(Debug, Clone)]
pub struct CityTable {
    cities: Vec<CityRecord>,
    /// Normalized name or alias -> index into `cities`
    index: HashMap<String, usize>,
    /// Lowercased names for free-text search, longest first
    search_terms: Vec<(String, usize)>,
}

impl CityTable {
    /// Table embedded in the crate
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml_str(BUILTIN_CITIES)
    }

    /// Load from a file; `.json` is read as JSON, anything else as YAML
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::FileNotFound(path.display().to_string(), e.to_string())
        })?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let table = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_yaml_str(&content)?
        };
        tracing::info!(path = %path.display(), cities = table.len(), "Loaded city table");
        Ok(table)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let file: CityTableFile = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse("city table".to_string(), e.to_string()))?;
        Self::from_records(file.cities)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let file: CityTableFile = serde_json::from_str(content)
            .map_err(|e| ConfigError::Parse("city table".to_string(), e.to_string()))?;
        Self::from_records(file.cities)
    }

    /// Validate and index a list of records
    ///
    /// Fails when the list is empty, a name is blank, or one alias belongs to
    /// two different cities.
    pub fn from_records(cities: Vec<CityRecord>) -> Result<Self, ConfigError> {
        if cities.is_empty() {
            return Err(ConfigError::InvalidCityTable("table has no cities".to_string()));
        }

        let mut index: HashMap<String, usize> = HashMap::new();
        let mut search_terms = Vec::new();

        for (position, city) in cities.iter().enumerate() {
            for name in city.names() {
                let key = normalize_city_name(name);
                if key.is_empty() {
                    return Err(ConfigError::InvalidCityTable(format!(
                        "city #{} has an empty name or alias",
                        position + 1
                    )));
                }
                match index.get(&key) {
                    Some(&other) if other != position => {
                        return Err(ConfigError::InvalidCityTable(format!(
                            "alias '{}' is shared by '{}' and '{}'",
                            name, cities[other].name, city.name
                        )));
                    }
                    Some(_) => {}
                    None => {
                        index.insert(key, position);
                        search_terms.push((search_form(name), position));
                    }
                }
            }
        }

        search_terms.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));

        Ok(Self {
            cities,
            index,
            search_terms,
        })
    }

    pub fn records(&self) -> &[CityRecord] {
        &self.cities
    }

    /// Number of cities in each tier under the given thresholds
    pub fn count_by_tier(&self, tier_a_min: u32, tier_b_min: u32) -> BTreeMap<CityTier, usize> {
        let mut counts = BTreeMap::new();
        for city in &self.cities {
            let tier =
                CityTier::from_five_star_count(city.five_star_hotels, tier_a_min, tier_b_min);
            *counts.entry(tier).or_insert(0) += 1;
        }
        counts
    }
}

impl CityReference for CityTable {
    fn lookup(&self, name: &str) -> Option<&CityRecord> {
        let key = normalize_city_name(name);
        self.index.get(&key).map(|&i| &self.cities[i])
    }

    fn find_in_text(&self, text: &str) -> Option<&CityRecord> {
        let haystack = search_form(text);
        let mut best: Option<(bool, usize, usize)> = None;
        // Terms are longest first, so on a tie the longer name keeps its place
        for (term, index) in &self.search_terms {
            let Some(start) = find_term(&haystack, term) else {
                continue;
            };
            let candidate = (follows_destination_marker(&haystack, start), start, *index);
            let better = match best {
                None => true,
                Some((marked, position, _)) => {
                    (candidate.0 && !marked) || (candidate.0 == marked && start < position)
                }
            };
            if better {
                best = Some(candidate);
            }
        }
        best.map(|(_, _, index)| &self.cities[index])
    }

    fn len(&self) -> usize {
        self.cities.len()
    }
}

fn search_form(text: &str) -> String {
    to_half_width(text.trim()).to_lowercase()
}

/// Words that introduce the destination, as in "从北京去京都" or "flying to Tokyo"
const DESTINATION_MARKERS: &[&str] = &["去", "到", "飞往", "飞", "前往"];

fn follows_destination_marker(haystack: &str, start: usize) -> bool {
    let before = haystack[..start].trim_end();
    DESTINATION_MARKERS.iter().any(|marker| before.ends_with(marker))
        || before.rsplit(|c: char| !c.is_ascii_alphanumeric()).next() == Some("to")
}
