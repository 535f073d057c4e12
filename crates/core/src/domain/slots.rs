//! Hotel Slot Definitions
//!
//! Slot identifiers, filled values and the raw candidates
//! produced by extraction before schema validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Identifier of every slot the hotel dialogue knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotId {
    City,
    CheckIn,
    CheckOut,
    Party,
    BudgetRangeLocal,
    StarLevel,
    PreferredArea,
    PreferredBrands,
    SpecialNeeds,
    View,
    BreakfastNeeded,
    Style,
}

impl SlotId {
    /// Required slots, in the order the policy asks for them
    pub const REQUIRED: [SlotId; 6] = [
        SlotId::City,
        SlotId::CheckIn,
        SlotId::CheckOut,
        SlotId::Party,
        SlotId::BudgetRangeLocal,
        SlotId::StarLevel,
    ];

    /// Helpful slots, asked only through narrowing questions
    pub const OPTIONAL: [SlotId; 6] = [
        SlotId::PreferredArea,
        SlotId::PreferredBrands,
        SlotId::SpecialNeeds,
        SlotId::View,
        SlotId::BreakfastNeeded,
        SlotId::Style,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotId::City => "city",
            SlotId::CheckIn => "check_in",
            SlotId::CheckOut => "check_out",
            SlotId::Party => "party",
            SlotId::BudgetRangeLocal => "budget_range_local",
            SlotId::StarLevel => "star_level",
            SlotId::PreferredArea => "preferred_area",
            SlotId::PreferredBrands => "preferred_brands",
            SlotId::SpecialNeeds => "special_needs",
            SlotId::View => "view",
            SlotId::BreakfastNeeded => "breakfast_needed",
            SlotId::Style => "style",
        }
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }

    /// Look up a slot by its snake_case name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::REQUIRED
            .iter()
            .chain(Self::OPTIONAL.iter())
            .find(|slot| slot.as_str() == name)
            .copied()
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse city size classification by five-star hotel count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CityTier {
    /// Mega city, many five-star hotels
    A,
    /// Medium city
    B,
    /// Small city, few five-star hotels
    C,
}

impl CityTier {
    /// Derive the tier from a five-star hotel count and the two thresholds
    pub fn from_five_star_count(count: u32, tier_a_min: u32, tier_b_min: u32) -> Self {
        if count >= tier_a_min {
            CityTier::A
        } else if count >= tier_b_min {
            CityTier::B
        } else {
            CityTier::C
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CityTier::A => "A",
            CityTier::B => "B",
            CityTier::C => "C",
        }
    }
}

impl fmt::Display for CityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(CityTier::A),
            "B" => Ok(CityTier::B),
            "C" => Ok(CityTier::C),
            other => Err(format!("unknown city tier '{}'", other)),
        }
    }
}

/// Travelling party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub adults: u32,
    pub children: u32,
    pub rooms: u32,
}

impl Party {
    pub fn new(adults: u32, children: u32, rooms: u32) -> Self {
        Self {
            adults,
            children,
            rooms,
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.children > 0 {
            write!(f, "{} adults, {} children", self.adults, self.children)?;
        } else {
            write!(f, "{} adults", self.adults)?;
        }
        write!(f, ", {} room(s)", self.rooms)
    }
}

/// Per-night budget in local currency
///
/// At least one bound is always present once validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRange {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl BudgetRange {
    pub fn between(min: u32, max: u32) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn around(value: u32) -> Self {
        Self::between(value, value)
    }

    pub fn up_to(max: u32) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    pub fn at_least(min: u32) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }
}

impl fmt::Display for BudgetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min == max => write!(f, "{}", min),
            (Some(min), Some(max)) => write!(f, "{}-{}", min, max),
            (None, Some(max)) => write!(f, "<={}", max),
            (Some(min), None) => write!(f, ">={}", min),
            (None, None) => f.write_str("?"),
        }
    }
}

/// Hotel star level, one of 3, 4 or 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StarLevel(u8);

impl StarLevel {
    pub fn new(stars: i64) -> Option<Self> {
        match stars {
            3..=5 => Some(Self(stars as u8)),
            _ => None,
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

/// A validated slot value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotValue {
    Text(String),
    Date(NaiveDate),
    Party(Party),
    Budget(BudgetRange),
    Stars(StarLevel),
    Set(BTreeSet<String>),
    Flag(bool),
}

impl SlotValue {
    /// Convert back into the raw form the schema accepts
    pub fn to_raw(&self) -> RawSlotValue {
        match self {
            SlotValue::Text(text) => RawSlotValue::Text(text.clone()),
            SlotValue::Date(date) => RawSlotValue::Date(date.format("%Y-%m-%d").to_string()),
            SlotValue::Party(party) => RawSlotValue::Party {
                adults: Some(party.adults as i64),
                children: Some(party.children as i64),
                rooms: Some(party.rooms as i64),
            },
            SlotValue::Budget(budget) => RawSlotValue::Range {
                min: budget.min.map(i64::from),
                max: budget.max.map(i64::from),
            },
            SlotValue::Stars(stars) => RawSlotValue::Integer(stars.value() as i64),
            SlotValue::Set(items) => RawSlotValue::Set(items.iter().cloned().collect()),
            SlotValue::Flag(flag) => RawSlotValue::Flag(*flag),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SlotValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            SlotValue::Date(date) => Some(*date),
            _ => None,
        }
    }

    pub fn as_party(&self) -> Option<Party> {
        match self {
            SlotValue::Party(party) => Some(*party),
            _ => None,
        }
    }

    pub fn as_budget(&self) -> Option<BudgetRange> {
        match self {
            SlotValue::Budget(budget) => Some(*budget),
            _ => None,
        }
    }

    pub fn as_stars(&self) -> Option<StarLevel> {
        match self {
            SlotValue::Stars(stars) => Some(*stars),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&BTreeSet<String>> {
        match self {
            SlotValue::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            SlotValue::Flag(flag) => Some(*flag),
            _ => None,
        }
    }
}

impl fmt::Display for SlotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotValue::Text(text) => f.write_str(text),
            SlotValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            SlotValue::Party(party) => write!(f, "{}", party),
            SlotValue::Budget(budget) => write!(f, "{}", budget),
            SlotValue::Stars(stars) => write!(f, "{}-star", stars.value()),
            SlotValue::Set(items) => {
                let joined: Vec<&str> = items.iter().map(|s| s.as_str()).collect();
                f.write_str(&joined.join(", "))
            }
            SlotValue::Flag(flag) => write!(f, "{}", if *flag { "yes" } else { "no" }),
        }
    }
}

/// Unvalidated candidate produced by the extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSlotValue {
    Text(String),
    /// ISO `YYYY-MM-DD` text, possibly not a real calendar date
    Date(String),
    Integer(i64),
    Party {
        adults: Option<i64>,
        children: Option<i64>,
        rooms: Option<i64>,
    },
    Range {
        min: Option<i64>,
        max: Option<i64>,
    },
    Set(Vec<String>),
    Flag(bool),
}

impl RawSlotValue {
    pub fn party(adults: Option<i64>, children: Option<i64>, rooms: Option<i64>) -> Self {
        RawSlotValue::Party {
            adults,
            children,
            rooms,
        }
    }

    pub fn range(min: Option<i64>, max: Option<i64>) -> Self {
        RawSlotValue::Range { min, max }
    }

    /// Short name of the variant, for rejection messages
    pub fn kind(&self) -> &'static str {
        match self {
            RawSlotValue::Text(_) => "text",
            RawSlotValue::Date(_) => "date",
            RawSlotValue::Integer(_) => "integer",
            RawSlotValue::Party { .. } => "party",
            RawSlotValue::Range { .. } => "range",
            RawSlotValue::Set(_) => "set",
            RawSlotValue::Flag(_) => "flag",
        }
    }

    /// Overlay the sub-fields of a newer party candidate onto an existing party
    ///
    /// Returns `self` unchanged for non-party values.
    pub fn overlay_party(self, existing: Option<Party>) -> Self {
        match (self, existing) {
            (
                RawSlotValue::Party {
                    adults,
                    children,
                    rooms,
                },
                Some(prev),
            ) => RawSlotValue::party(
                adults.or(Some(prev.adults as i64)),
                children.or(Some(prev.children as i64)),
                rooms.or(Some(prev.rooms as i64)),
            ),
            (raw, _) => raw,
        }
    }
}
