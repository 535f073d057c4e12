//! Dialogue State Tracking for Hotel Conversations
//!
//! The tracker owns one conversation's [`HotelDialogueState`] and merges
//! extracted candidates into it:
//! - every candidate is validated against the slot schema; rejected values are
//!   logged and dropped, the slot keeps its previous value
//! - absent candidates never clear a filled slot
//! - check-in and check-out are validated as a pair
//! - party counts heard before the adults are held until the adults arrive
//! - brand and special-need sets accumulate across turns
//!
//! Every effective change is recorded in the history with its source and turn.

pub mod extractor;
pub mod rules;
pub mod slots;

pub use extractor::{SlotExtractor, SlotUpdate};
pub use rules::{Gazetteer, Rule, RuleContext, RuleSet};
pub use slots::{HotelDialogueState, PendingParty, SlotSnapshot};

use chrono::{DateTime, Utc};
use hotel_planner_core::{
    validate, NarrowingCategory, Question, RawSlotValue, SlotId, SlotRejection, SlotValue,
    ValidationContext,
};
use serde::{Deserialize, Serialize};

use crate::city::CityClassification;

/// State change record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub timestamp: DateTime<Utc>,
    pub slot: SlotId,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub source: ChangeSource,
    pub turn_index: usize,
}

/// Source of a state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeSource {
    /// Extracted from the user's message
    UserUtterance,
    /// Message read as the answer to the last question
    ContextualAnswer,
}

/// What one merge did to the state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Slots whose value changed
    pub filled: Vec<SlotId>,
    pub rejected: Vec<(SlotId, SlotRejection)>,
    /// Party sub-fields held back for lack of an adult count
    pub held_party: bool,
    pub city_changed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DialogueStateTracker {
    state: HotelDialogueState,
    history: Vec<StateChange>,
}

impl DialogueStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &HotelDialogueState {
        &self.state
    }

    pub fn history(&self) -> &[StateChange] {
        &self.history
    }

    /// Start a new turn and return its index (1-based)
    pub fn begin_turn(&mut self) -> usize {
        self.state.next_turn()
    }

    /// Merge an extraction result into the state
    pub fn apply(&mut self, update: &SlotUpdate, source: ChangeSource) -> ApplyReport {
        let mut report = ApplyReport::default();
        self.apply_dates(update, source, &mut report);

        for (slot, raw) in &update.values {
            match slot {
                SlotId::CheckIn | SlotId::CheckOut => continue,
                SlotId::Party => self.apply_party(raw, source, &mut report),
                SlotId::PreferredBrands | SlotId::SpecialNeeds => {
                    let merged = self.union_with_existing(*slot, raw);
                    let ctx = ValidationContext::default();
                    self.validate_and_record(*slot, &merged, &ctx, source, &mut report);
                }
                _ => {
                    let ctx = ValidationContext::default();
                    self.validate_and_record(*slot, raw, &ctx, source, &mut report);
                }
            }
        }
        report
    }

    /// Check-out is validated against the new check-in when the message has
    /// one, and check-in against whichever check-out ends up stored
    fn apply_dates(&mut self, update: &SlotUpdate, source: ChangeSource, report: &mut ApplyReport) {
        let new_in = update.get(SlotId::CheckIn);
        let new_out = update.get(SlotId::CheckOut);
        if new_in.is_none() && new_out.is_none() {
            return;
        }

        let check_in_alone = new_in.and_then(|raw| {
            validate(SlotId::CheckIn, raw, &ValidationContext::default())
                .ok()
                .and_then(|v| v.as_date())
        });
        let anchor_in = check_in_alone.or(self.state.check_in());

        if let Some(raw) = new_out {
            let ctx = ValidationContext {
                check_in: anchor_in,
                check_out: None,
            };
            self.validate_and_record(SlotId::CheckOut, raw, &ctx, source, report);
        }

        if let Some(raw) = new_in {
            let ctx = ValidationContext {
                check_in: None,
                check_out: self.state.check_out(),
            };
            self.validate_and_record(SlotId::CheckIn, raw, &ctx, source, report);
        }
    }

    fn apply_party(&mut self, raw: &RawSlotValue, source: ChangeSource, report: &mut ApplyReport) {
        let RawSlotValue::Party {
            adults,
            children,
            rooms,
        } = raw
        else {
            let ctx = ValidationContext::default();
            self.validate_and_record(SlotId::Party, raw, &ctx, source, report);
            return;
        };

        if adults.is_none() && self.state.party().is_none() {
            self.state.hold_pending_party(*children, *rooms);
            report.held_party = true;
            tracing::debug!(
                children = ?children,
                rooms = ?rooms,
                "Holding party details until adults are known"
            );
            return;
        }

        let pending = self.state.pending_party();
        let merged = RawSlotValue::Party {
            adults: *adults,
            children: children.or(pending.children),
            rooms: rooms.or(pending.rooms),
        }
        .overlay_party(self.state.party());
        let ctx = ValidationContext::default();
        self.validate_and_record(SlotId::Party, &merged, &ctx, source, report);
    }

    fn union_with_existing(&self, slot: SlotId, raw: &RawSlotValue) -> RawSlotValue {
        match (raw, self.state.get(slot)) {
            (RawSlotValue::Set(items), Some(SlotValue::Set(existing))) => {
                let mut merged: Vec<String> = existing.into_iter().collect();
                merged.extend(items.iter().cloned());
                RawSlotValue::Set(merged)
            }
            _ => raw.clone(),
        }
    }

    fn validate_and_record(
        &mut self,
        slot: SlotId,
        raw: &RawSlotValue,
        ctx: &ValidationContext,
        source: ChangeSource,
        report: &mut ApplyReport,
    ) {
        match validate(slot, raw, ctx) {
            Ok(value) => {
                if self.record(slot, value, source) {
                    report.filled.push(slot);
                    if slot == SlotId::City {
                        report.city_changed = true;
                    }
                }
            }
            Err(rejection) => {
                tracing::debug!(
                    slot = %slot,
                    raw = ?raw,
                    reason = %rejection,
                    "Slot value rejected"
                );
                report.rejected.push((slot, rejection));
            }
        }
    }

    /// Store a validated value; returns false when nothing changed
    fn record(&mut self, slot: SlotId, value: SlotValue, source: ChangeSource) -> bool {
        let old_value = self.state.get(slot);

        // Skip if value unchanged
        if old_value.as_ref() == Some(&value) {
            return false;
        }

        self.history.push(StateChange {
            timestamp: Utc::now(),
            slot,
            old_value: old_value.as_ref().map(ToString::to_string),
            new_value: Some(value.to_string()),
            source,
            turn_index: self.state.turn(),
        });

        tracing::debug!(
            slot = %slot,
            old_value = ?old_value,
            new_value = %value,
            source = ?source,
            "Slot updated"
        );

        self.state.set(slot, value)
    }

    pub fn set_city_classification(&mut self, info: CityClassification) {
        self.state.set_city_info(info);
    }

    /// Mark a narrowing category asked; returns false if it already was
    pub fn mark_asked(&mut self, category: NarrowingCategory) -> bool {
        self.state.mark_asked(category)
    }

    pub fn mark_skipped(&mut self, category: NarrowingCategory) -> bool {
        let newly = self.state.mark_skipped(category);
        if newly {
            tracing::debug!(category = %category, "Narrowing category skipped");
        }
        newly
    }

    pub fn set_last_question(&mut self, question: Option<Question>) {
        self.state.set_last_question(question);
    }

    /// Forget everything about the conversation
    pub fn reset(&mut self) {
        self.state = HotelDialogueState::default();
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hotel_planner_core::{BudgetRange, Party};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn update(values: Vec<(SlotId, RawSlotValue)>) -> SlotUpdate {
        let mut update = SlotUpdate::default();
        for (slot, value) in values {
            update.insert(slot, value, "test");
        }
        update
    }

    fn dates(check_in: Option<&str>, check_out: Option<&str>) -> SlotUpdate {
        let mut values = Vec::new();
        if let Some(d) = check_in {
            values.push((SlotId::CheckIn, RawSlotValue::Date(d.into())));
        }
        if let Some(d) = check_out {
            values.push((SlotId::CheckOut, RawSlotValue::Date(d.into())));
        }
        update(values)
    }

    fn party(adults: Option<i64>, children: Option<i64>, rooms: Option<i64>) -> SlotUpdate {
        update(vec![(SlotId::Party, RawSlotValue::party(adults, children, rooms))])
    }

    fn one(slot: SlotId, value: RawSlotValue) -> SlotUpdate {
        update(vec![(slot, value)])
    }

    const USER: ChangeSource = ChangeSource::UserUtterance;

    #[test]
    fn test_apply_fills_and_records_history() {
        let mut tracker = DialogueStateTracker::new();
        tracker.begin_turn();
        let report = tracker.apply(
            &update(vec![
                (SlotId::City, RawSlotValue::Text("东京".into())),
                (SlotId::StarLevel, RawSlotValue::Integer(5)),
            ]),
            ChangeSource::UserUtterance,
        );
        assert_eq!(report.filled, vec![SlotId::City, SlotId::StarLevel]);
        assert!(report.city_changed);
        assert_eq!(tracker.history().len(), 2);
        assert_eq!(tracker.history()[0].slot, SlotId::City);
        assert_eq!(tracker.history()[0].turn_index, 1);
        assert_eq!(tracker.history()[0].new_value.as_deref(), Some("东京"));
    }

    #[test]
    fn test_unchanged_value_not_recorded() {
        let mut tracker = DialogueStateTracker::new();
        let city = update(vec![(SlotId::City, RawSlotValue::Text("东京".into()))]);
        tracker.apply(&city, ChangeSource::UserUtterance);
        let report = tracker.apply(&city, ChangeSource::UserUtterance);
        assert!(report.filled.is_empty());
        assert!(!report.city_changed);
        assert_eq!(tracker.history().len(), 1);
    }

    #[test]
    fn test_invalid_value_keeps_previous() {
        let mut tracker = DialogueStateTracker::new();
        tracker.apply(&one(SlotId::StarLevel, RawSlotValue::Integer(4)), USER);
        let report = tracker.apply(&one(SlotId::StarLevel, RawSlotValue::Integer(7)), USER);
        assert_eq!(
            report.rejected,
            vec![(SlotId::StarLevel, SlotRejection::StarOutOfRange(7))]
        );
        assert_eq!(tracker.state().star_level().map(|s| s.value()), Some(4));
    }

    #[test]
    fn test_empty_update_changes_nothing() {
        let mut tracker = DialogueStateTracker::new();
        tracker.apply(&one(SlotId::City, RawSlotValue::Text("东京".into())), USER);
        let before = tracker.state().clone();
        let report = tracker.apply(&SlotUpdate::default(), ChangeSource::UserUtterance);
        assert_eq!(report, ApplyReport::default());
        assert_eq!(tracker.state(), &before);
    }

    #[test]
    fn test_date_pair_validated_together() {
        let mut tracker = DialogueStateTracker::new();
        let report = tracker.apply(&dates(Some("2025-10-05"), Some("2025-10-01")), USER);
        assert_eq!(tracker.state().check_in(), Some(date(2025, 10, 5)));
        assert_eq!(tracker.state().check_out(), None);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0, SlotId::CheckOut);
    }

    #[test]
    fn test_new_pair_replaces_old_pair() {
        let mut tracker = DialogueStateTracker::new();
        tracker.apply(&dates(Some("2025-10-01"), Some("2025-10-05")), ChangeSource::UserUtterance);
        tracker.apply(&dates(Some("2025-10-10"), Some("2025-10-12")), ChangeSource::UserUtterance);
        assert_eq!(tracker.state().check_in(), Some(date(2025, 10, 10)));
        assert_eq!(tracker.state().check_out(), Some(date(2025, 10, 12)));
    }

    #[test]
    fn test_lone_check_out_against_existing_check_in() {
        let mut tracker = DialogueStateTracker::new();
        tracker.apply(&dates(Some("2025-10-01"), None), ChangeSource::UserUtterance);
        let report = tracker.apply(
            &dates(None, Some("2025-09-30")),
            ChangeSource::ContextualAnswer,
        );
        assert_eq!(report.rejected.len(), 1);
        tracker.apply(&dates(None, Some("2025-10-03")), ChangeSource::ContextualAnswer);
        assert_eq!(tracker.state().check_out(), Some(date(2025, 10, 3)));
    }

    #[test]
    fn test_conflicting_check_in_rejected() {
        let mut tracker = DialogueStateTracker::new();
        tracker.apply(&dates(Some("2025-10-01"), Some("2025-10-05")), ChangeSource::UserUtterance);
        let report = tracker.apply(&dates(Some("2025-10-08"), None), ChangeSource::UserUtterance);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(tracker.state().check_in(), Some(date(2025, 10, 1)));
    }

    #[test]
    fn test_rooms_held_until_adults() {
        let mut tracker = DialogueStateTracker::new();
        let report = tracker.apply(&party(None, None, Some(2)), USER);
        assert!(report.held_party);
        assert!(tracker.state().party().is_none());

        tracker.apply(&party(Some(3), None, None), USER);
        assert_eq!(tracker.state().party(), Some(Party::new(3, 0, 2)));
    }

    #[test]
    fn test_party_overlay_keeps_known_fields() {
        let mut tracker = DialogueStateTracker::new();
        tracker.apply(&party(Some(2), Some(1), None), USER);
        tracker.apply(&party(None, None, Some(2)), USER);
        assert_eq!(tracker.state().party(), Some(Party::new(2, 1, 2)));
    }

    #[test]
    fn test_sets_accumulate() {
        let mut tracker = DialogueStateTracker::new();
        let brands = |items: &[&str]| {
            update(vec![(
                SlotId::PreferredBrands,
                RawSlotValue::Set(items.iter().map(|s| s.to_string()).collect()),
            )])
        };
        tracker.apply(&brands(&["万豪"]), ChangeSource::UserUtterance);
        tracker.apply(&brands(&["希尔顿", "万豪"]), ChangeSource::UserUtterance);
        let value = tracker.state().get(SlotId::PreferredBrands).unwrap();
        assert_eq!(value.as_set().map(|s| s.len()), Some(2));
    }

    #[test]
    fn test_budget_overwritten_when_respecified() {
        let mut tracker = DialogueStateTracker::new();
        let budget = |min, max| one(SlotId::BudgetRangeLocal, RawSlotValue::range(min, max));
        tracker.apply(&budget(Some(2000), Some(3000)), ChangeSource::UserUtterance);
        tracker.apply(&budget(None, Some(1500)), ChangeSource::UserUtterance);
        assert_eq!(tracker.state().budget(), Some(BudgetRange::up_to(1500)));
        assert_eq!(tracker.history().len(), 2);
        assert_eq!(tracker.history()[1].old_value.as_deref(), Some("2000-3000"));
    }

    #[test]
    fn test_marks_and_reset() {
        let mut tracker = DialogueStateTracker::new();
        assert!(tracker.mark_asked(NarrowingCategory::AreaOrBrand));
        assert!(!tracker.mark_asked(NarrowingCategory::AreaOrBrand));
        assert!(tracker.mark_skipped(NarrowingCategory::BudgetOrStar));
        tracker.begin_turn();
        tracker.apply(&one(SlotId::City, RawSlotValue::Text("东京".into())), USER);

        tracker.reset();
        assert!(tracker.state().asked().is_empty());
        assert!(tracker.state().skipped().is_empty());
        assert!(tracker.history().is_empty());
        assert_eq!(tracker.state().turn(), 0);
        assert!(tracker.state().city().is_none());
    }
}
