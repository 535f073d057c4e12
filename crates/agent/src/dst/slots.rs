//! Hotel Dialogue State
//!
//! Typed slot storage for one conversation plus the bookkeeping the policy
//! needs: the cached city classification, narrowing categories already asked
//! or skipped, and the last question put to the user.

use chrono::NaiveDate;
use hotel_planner_config::Language;
use hotel_planner_core::{
    BudgetRange, CityTier, NarrowingCategory, Party, Question, SlotId, SlotValue, StarLevel,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::city::CityClassification;

/// Party sub-fields heard before the adult count
///
/// "需要两间房" alone cannot fill `party`; the rooms are held here until the
/// adults arrive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingParty {
    pub children: Option<i64>,
    pub rooms: Option<i64>,
}

impl PendingParty {
    pub fn is_empty(&self) -> bool {
        self.children.is_none() && self.rooms.is_none()
    }
}

/// Dialogue state for a hotel search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelDialogueState {
    // Required
    city: Option<String>,
    check_in: Option<NaiveDate>,
    check_out: Option<NaiveDate>,
    party: Option<Party>,
    budget: Option<BudgetRange>,
    star_level: Option<StarLevel>,

    // Optional
    preferred_area: Option<String>,
    preferred_brands: Option<BTreeSet<String>>,
    special_needs: Option<BTreeSet<String>>,
    view: Option<String>,
    breakfast_needed: Option<bool>,
    style: Option<String>,

    pending_party: PendingParty,
    city_info: Option<CityClassification>,
    asked: BTreeSet<NarrowingCategory>,
    skipped: BTreeSet<NarrowingCategory>,
    last_question: Option<Question>,
    turn: usize,
}

impl HotelDialogueState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `slot`
    pub fn get(&self, slot: SlotId) -> Option<SlotValue> {
        match slot {
            SlotId::City => self.city.clone().map(SlotValue::Text),
            SlotId::CheckIn => self.check_in.map(SlotValue::Date),
            SlotId::CheckOut => self.check_out.map(SlotValue::Date),
            SlotId::Party => self.party.map(SlotValue::Party),
            SlotId::BudgetRangeLocal => self.budget.map(SlotValue::Budget),
            SlotId::StarLevel => self.star_level.map(SlotValue::Stars),
            SlotId::PreferredArea => self.preferred_area.clone().map(SlotValue::Text),
            SlotId::PreferredBrands => self.preferred_brands.clone().map(SlotValue::Set),
            SlotId::SpecialNeeds => self.special_needs.clone().map(SlotValue::Set),
            SlotId::View => self.view.clone().map(SlotValue::Text),
            SlotId::BreakfastNeeded => self.breakfast_needed.map(SlotValue::Flag),
            SlotId::Style => self.style.clone().map(SlotValue::Text),
        }
    }

    /// Store a validated value; returns false when the value has the wrong shape
    pub(crate) fn set(&mut self, slot: SlotId, value: SlotValue) -> bool {
        match (slot, value) {
            (SlotId::City, SlotValue::Text(v)) => self.city = Some(v),
            (SlotId::CheckIn, SlotValue::Date(v)) => self.check_in = Some(v),
            (SlotId::CheckOut, SlotValue::Date(v)) => self.check_out = Some(v),
            (SlotId::Party, SlotValue::Party(v)) => {
                self.party = Some(v);
                self.pending_party = PendingParty::default();
            }
            (SlotId::BudgetRangeLocal, SlotValue::Budget(v)) => self.budget = Some(v),
            (SlotId::StarLevel, SlotValue::Stars(v)) => self.star_level = Some(v),
            (SlotId::PreferredArea, SlotValue::Text(v)) => self.preferred_area = Some(v),
            (SlotId::PreferredBrands, SlotValue::Set(v)) => self.preferred_brands = Some(v),
            (SlotId::SpecialNeeds, SlotValue::Set(v)) => self.special_needs = Some(v),
            (SlotId::View, SlotValue::Text(v)) => self.view = Some(v),
            (SlotId::BreakfastNeeded, SlotValue::Flag(v)) => self.breakfast_needed = Some(v),
            (SlotId::Style, SlotValue::Text(v)) => self.style = Some(v),
            _ => return false,
        }
        true
    }

    pub fn is_filled(&self, slot: SlotId) -> bool {
        match slot {
            SlotId::City => self.city.is_some(),
            SlotId::CheckIn => self.check_in.is_some(),
            SlotId::CheckOut => self.check_out.is_some(),
            SlotId::Party => self.party.is_some(),
            SlotId::BudgetRangeLocal => self.budget.is_some(),
            SlotId::StarLevel => self.star_level.is_some(),
            SlotId::PreferredArea => self.preferred_area.is_some(),
            SlotId::PreferredBrands => self.preferred_brands.is_some(),
            SlotId::SpecialNeeds => self.special_needs.is_some(),
            SlotId::View => self.view.is_some(),
            SlotId::BreakfastNeeded => self.breakfast_needed.is_some(),
            SlotId::Style => self.style.is_some(),
        }
    }

    /// Required slots still empty, in asking order
    pub fn missing_required(&self) -> Vec<SlotId> {
        SlotId::REQUIRED.iter().copied().filter(|s| !self.is_filled(*s)).collect()
    }

    pub fn filled_slots(&self) -> Vec<SlotId> {
        SlotId::REQUIRED
            .iter()
            .chain(SlotId::OPTIONAL.iter())
            .copied()
            .filter(|s| self.is_filled(*s))
            .collect()
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn check_in(&self) -> Option<NaiveDate> {
        self.check_in
    }

    pub fn check_out(&self) -> Option<NaiveDate> {
        self.check_out
    }

    pub fn party(&self) -> Option<Party> {
        self.party
    }

    pub fn budget(&self) -> Option<BudgetRange> {
        self.budget
    }

    pub fn star_level(&self) -> Option<StarLevel> {
        self.star_level
    }

    pub fn pending_party(&self) -> PendingParty {
        self.pending_party
    }

    pub(crate) fn hold_pending_party(&mut self, children: Option<i64>, rooms: Option<i64>) {
        self.pending_party = PendingParty {
            children: children.or(self.pending_party.children),
            rooms: rooms.or(self.pending_party.rooms),
        };
    }

    pub fn city_info(&self) -> Option<&CityClassification> {
        self.city_info.as_ref()
    }

    pub(crate) fn set_city_info(&mut self, info: CityClassification) {
        self.city_info = Some(info);
    }

    /// Tier of the current city, if one has been classified
    pub fn tier(&self) -> Option<CityTier> {
        self.city_info.as_ref().map(|info| info.tier)
    }

    pub fn asked(&self) -> &BTreeSet<NarrowingCategory> {
        &self.asked
    }

    pub fn skipped(&self) -> &BTreeSet<NarrowingCategory> {
        &self.skipped
    }

    pub(crate) fn mark_asked(&mut self, category: NarrowingCategory) -> bool {
        self.asked.insert(category)
    }

    pub(crate) fn mark_skipped(&mut self, category: NarrowingCategory) -> bool {
        self.skipped.insert(category)
    }

    pub fn last_question(&self) -> Option<Question> {
        self.last_question
    }

    pub(crate) fn set_last_question(&mut self, question: Option<Question>) {
        self.last_question = question;
    }

    pub fn turn(&self) -> usize {
        self.turn
    }

    pub(crate) fn next_turn(&mut self) -> usize {
        self.turn += 1;
        self.turn
    }

    /// Category counts as satisfied once a slot of it is filled, or once
    /// it was asked or skipped
    pub fn is_satisfied(&self, category: NarrowingCategory) -> bool {
        self.asked.contains(&category)
            || self.skipped.contains(&category)
            || category.slots().iter().any(|s| self.is_filled(*s))
    }

    pub fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            city: self.city.clone(),
            city_tier: self.tier(),
            check_in: self.check_in,
            check_out: self.check_out,
            party: self.party,
            budget_range_local: self.budget,
            star_level: self.star_level.map(|s| s.value()),
            preferred_area: self.preferred_area.clone(),
            preferred_brands: self.preferred_brands.clone(),
            special_needs: self.special_needs.clone(),
            view: self.view.clone(),
            breakfast_needed: self.breakfast_needed,
            style: self.style.clone(),
        }
    }

    /// One-line requirement summary for the recommendation step
    pub fn summary(&self, language: Language) -> String {
        match language {
            Language::Zh => self.summary_zh(),
            Language::En => self.summary_en(),
        }
    }

    fn summary_zh(&self) -> String {
        let mut parts = Vec::new();
        if let Some(party) = self.party {
            if party.children > 0 {
                parts.push(format!("{}成人{}儿童", party.adults, party.children));
            } else {
                parts.push(format!("{}人", party.adults));
            }
            if party.rooms > 1 {
                parts.push(format!("{}间房", party.rooms));
            }
        }
        if let (Some(check_in), Some(check_out)) = (self.check_in, self.check_out) {
            parts.push(format!("{}至{}", check_in, check_out));
        }
        if let Some(city) = &self.city {
            parts.push(format!("在{}", city));
        }
        if let Some(budget) = self.budget {
            parts.push(format!("预算{}/晚", budget));
        }
        if let Some(stars) = self.star_level {
            parts.push(format!("{}星", stars.value()));
        }
        if let Some(area) = &self.preferred_area {
            parts.push(format!("靠近{}", area));
        }
        if let Some(brands) = &self.preferred_brands {
            parts.push(format!("品牌{}", join(brands, "/")));
        }
        parts.join("，")
    }

    fn summary_en(&self) -> String {
        let mut parts = Vec::new();
        if let Some(party) = self.party {
            parts.push(party.to_string());
        }
        if let (Some(check_in), Some(check_out)) = (self.check_in, self.check_out) {
            parts.push(format!("{} to {}", check_in, check_out));
        }
        if let Some(city) = &self.city {
            parts.push(format!("in {}", city));
        }
        if let Some(budget) = self.budget {
            parts.push(format!("budget {}/night", budget));
        }
        if let Some(stars) = self.star_level {
            parts.push(format!("{}-star", stars.value()));
        }
        if let Some(area) = &self.preferred_area {
            parts.push(format!("near {}", area));
        }
        if let Some(brands) = &self.preferred_brands {
            parts.push(format!("brands {}", join(brands, "/")));
        }
        parts.join(", ")
    }
}

fn join(items: &BTreeSet<String>, sep: &str) -> String {
    items.iter().map(String::as_str).collect::<Vec<_>>().join(sep)
}

/// Filled slots in serializable form, handed to the recommendation step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_tier: Option<CityTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party: Option<Party>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_range_local: Option<BudgetRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub star_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_brands: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_needs: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakfast_needed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn filled_state() -> HotelDialogueState {
        let mut state = HotelDialogueState::new();
        state.set(SlotId::City, SlotValue::Text("东京".into()));
        state.set(SlotId::CheckIn, SlotValue::Date(date(2025, 10, 1)));
        state.set(SlotId::CheckOut, SlotValue::Date(date(2025, 10, 5)));
        state.set(SlotId::Party, SlotValue::Party(Party::new(2, 1, 2)));
        state.set(SlotId::BudgetRangeLocal, SlotValue::Budget(BudgetRange::between(2000, 3000)));
        state.set(SlotId::StarLevel, SlotValue::Stars(StarLevel::new(5).unwrap()));
        state
    }

    #[test]
    fn test_new_state_is_empty() {
        let state = HotelDialogueState::new();
        assert_eq!(state.missing_required(), SlotId::REQUIRED.to_vec());
        assert!(state.filled_slots().is_empty());
        assert!(state.tier().is_none());
        assert_eq!(state.turn(), 0);
    }

    #[test]
    fn test_set_rejects_wrong_shape() {
        let mut state = HotelDialogueState::new();
        assert!(!state.set(SlotId::City, SlotValue::Flag(true)));
        assert!(!state.is_filled(SlotId::City));
        assert!(state.set(SlotId::City, SlotValue::Text("巴黎".into())));
        assert_eq!(state.get(SlotId::City), Some(SlotValue::Text("巴黎".into())));
    }

    #[test]
    fn test_missing_required_order() {
        let mut state = HotelDialogueState::new();
        state.set(SlotId::City, SlotValue::Text("东京".into()));
        state.set(SlotId::StarLevel, SlotValue::Stars(StarLevel::new(4).unwrap()));
        assert_eq!(
            state.missing_required(),
            vec![SlotId::CheckIn, SlotId::CheckOut, SlotId::Party, SlotId::BudgetRangeLocal]
        );
    }

    #[test]
    fn test_party_clears_pending() {
        let mut state = HotelDialogueState::new();
        state.hold_pending_party(None, Some(2));
        assert_eq!(state.pending_party().rooms, Some(2));
        state.set(SlotId::Party, SlotValue::Party(Party::new(3, 0, 2)));
        assert!(state.pending_party().is_empty());
    }

    #[test]
    fn test_category_satisfaction() {
        let mut state = HotelDialogueState::new();
        assert!(!state.is_satisfied(NarrowingCategory::AreaOrBrand));
        state.set(SlotId::PreferredBrands, SlotValue::Set(BTreeSet::from(["万豪".to_string()])));
        assert!(state.is_satisfied(NarrowingCategory::AreaOrBrand));

        assert!(!state.is_satisfied(NarrowingCategory::Extras));
        state.mark_asked(NarrowingCategory::Extras);
        assert!(state.is_satisfied(NarrowingCategory::Extras));

        state.mark_skipped(NarrowingCategory::BudgetOrArea);
        assert!(state.is_satisfied(NarrowingCategory::BudgetOrArea));
    }

    #[test]
    fn test_summary_zh() {
        let state = filled_state();
        assert_eq!(
            state.summary(Language::Zh),
            "2成人1儿童，2间房，2025-10-01至2025-10-05，在东京，预算2000-3000/晚，5星"
        );
    }

    #[test]
    fn test_summary_en() {
        let mut state = filled_state();
        state.set(SlotId::PreferredArea, SlotValue::Text("Ginza".into()));
        assert_eq!(
            state.summary(Language::En),
            "2 adults, 1 children, 2 room(s), 2025-10-01 to 2025-10-05, in 东京, budget 2000-3000/night, 5-star, near Ginza"
        );
    }

    #[test]
    fn test_snapshot_skips_empty_slots() {
        let mut state = HotelDialogueState::new();
        state.set(SlotId::City, SlotValue::Text("东京".into()));
        state.set(SlotId::CheckIn, SlotValue::Date(date(2025, 10, 1)));
        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(json, serde_json::json!({ "city": "东京", "check_in": "2025-10-01" }));
    }

    #[test]
    fn test_snapshot_carries_party_and_budget() {
        let json = serde_json::to_value(filled_state().snapshot()).unwrap();
        assert_eq!(json["party"]["adults"], 2);
        assert_eq!(json["budget_range_local"]["max"], 3000);
        assert_eq!(json["star_level"], 5);
    }
}
