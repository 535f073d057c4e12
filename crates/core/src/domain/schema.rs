//! Slot Schema
//!
//! Pure validation of raw candidates into slot values. A candidate that fails
//! here is never stored; the caller drops it and the slot stays unfilled.

use chrono::NaiveDate;
use std::collections::BTreeSet;
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

use super::slots::{BudgetRange, Party, RawSlotValue, SlotId, SlotValue, StarLevel};

/// Upper limits on party sizes and text lengths
pub mod limits {
    pub const MAX_ADULTS: i64 = 50;
    pub const MAX_CHILDREN: i64 = 20;
    pub const MAX_ROOMS: i64 = 30;
    pub const MAX_CITY_GRAPHEMES: usize = 40;
}

/// Why a raw candidate was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotRejection {
    #[error("{slot} expects a {expected} value, got {got}")]
    ShapeMismatch {
        slot: SlotId,
        expected: &'static str,
        got: &'static str,
    },

    #[error("'{0}' is not a valid calendar date")]
    InvalidDate(String),

    #[error("check-out {check_out} must be after check-in {check_in}")]
    CheckOutNotAfterCheckIn {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("star level {0} is not one of 3, 4, 5")]
    StarOutOfRange(i64),

    #[error("party has no adult count")]
    MissingAdults,

    #[error("party {field} = {value} is out of range")]
    PartyOutOfRange { field: &'static str, value: i64 },

    #[error("invalid budget: {0}")]
    InvalidBudget(&'static str),

    #[error("{0} is empty")]
    Empty(SlotId),

    #[error("'{0}' is not a usable city name")]
    InvalidCity(String),
}

/// Already-filled values some validators compare against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationContext {
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
}

/// Validate a raw candidate for `slot`
pub fn validate(
    slot: SlotId,
    raw: &RawSlotValue,
    ctx: &ValidationContext,
) -> Result<SlotValue, SlotRejection> {
    match slot {
        SlotId::City => validate_city(as_text(slot, raw)?),
        SlotId::PreferredArea | SlotId::View | SlotId::Style => {
            let text = as_text(slot, raw)?.trim();
            if text.is_empty() {
                return Err(SlotRejection::Empty(slot));
            }
            Ok(SlotValue::Text(text.to_string()))
        }
        SlotId::CheckIn => {
            let date = parse_date(slot, raw)?;
            match ctx.check_out {
                Some(check_out) if date >= check_out => Err(SlotRejection::CheckOutNotAfterCheckIn {
                    check_in: date,
                    check_out,
                }),
                _ => Ok(SlotValue::Date(date)),
            }
        }
        SlotId::CheckOut => {
            let date = parse_date(slot, raw)?;
            match ctx.check_in {
                Some(check_in) if date <= check_in => Err(SlotRejection::CheckOutNotAfterCheckIn {
                    check_in,
                    check_out: date,
                }),
                _ => Ok(SlotValue::Date(date)),
            }
        }
        SlotId::Party => validate_party(raw),
        SlotId::BudgetRangeLocal => validate_budget(raw),
        SlotId::StarLevel => match raw {
            RawSlotValue::Integer(stars) => StarLevel::new(*stars)
                .map(SlotValue::Stars)
                .ok_or(SlotRejection::StarOutOfRange(*stars)),
            other => Err(mismatch(slot, "integer", other)),
        },
        SlotId::PreferredBrands | SlotId::SpecialNeeds => match raw {
            RawSlotValue::Set(items) => {
                let set: BTreeSet<String> = items
                    .iter()
                    .map(|item| item.trim())
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect();
                if set.is_empty() {
                    Err(SlotRejection::Empty(slot))
                } else {
                    Ok(SlotValue::Set(set))
                }
            }
            other => Err(mismatch(slot, "set", other)),
        },
        SlotId::BreakfastNeeded => match raw {
            RawSlotValue::Flag(flag) => Ok(SlotValue::Flag(*flag)),
            other => Err(mismatch(slot, "flag", other)),
        },
    }
}

fn mismatch(slot: SlotId, expected: &'static str, got: &RawSlotValue) -> SlotRejection {
    SlotRejection::ShapeMismatch {
        slot,
        expected,
        got: got.kind(),
    }
}

fn as_text(slot: SlotId, raw: &RawSlotValue) -> Result<&str, SlotRejection> {
    match raw {
        RawSlotValue::Text(text) => Ok(text.as_str()),
        other => Err(mismatch(slot, "text", other)),
    }
}

fn parse_date(slot: SlotId, raw: &RawSlotValue) -> Result<NaiveDate, SlotRejection> {
    match raw {
        RawSlotValue::Date(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .map_err(|_| SlotRejection::InvalidDate(text.clone())),
        other => Err(mismatch(slot, "date", other)),
    }
}

fn validate_city(text: &str) -> Result<SlotValue, SlotRejection> {
    let name = text.trim();
    if name.is_empty() {
        return Err(SlotRejection::Empty(SlotId::City));
    }
    if name.graphemes(true).count() > limits::MAX_CITY_GRAPHEMES {
        return Err(SlotRejection::InvalidCity(name.to_string()));
    }
    // Needs at least one letter or CJK character
    if !name.chars().any(char::is_alphabetic) {
        return Err(SlotRejection::InvalidCity(name.to_string()));
    }
    Ok(SlotValue::Text(name.to_string()))
}

fn validate_party(raw: &RawSlotValue) -> Result<SlotValue, SlotRejection> {
    let (adults, children, rooms) = match raw {
        RawSlotValue::Party {
            adults,
            children,
            rooms,
        } => (*adults, *children, *rooms),
        other => return Err(mismatch(SlotId::Party, "party", other)),
    };

    let adults = adults.ok_or(SlotRejection::MissingAdults)?;
    let children = children.unwrap_or(0);
    let rooms = rooms.unwrap_or(1);

    check_range("adults", adults, 1, limits::MAX_ADULTS)?;
    check_range("children", children, 0, limits::MAX_CHILDREN)?;
    check_range("rooms", rooms, 1, limits::MAX_ROOMS)?;

    Ok(SlotValue::Party(Party {
        adults: adults as u32,
        children: children as u32,
        rooms: rooms as u32,
    }))
}

fn check_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<(), SlotRejection> {
    if value < min || value > max {
        return Err(SlotRejection::PartyOutOfRange { field, value });
    }
    Ok(())
}

fn validate_budget(raw: &RawSlotValue) -> Result<SlotValue, SlotRejection> {
    let (min, max) = match raw {
        RawSlotValue::Range { min, max } => (*min, *max),
        other => return Err(mismatch(SlotId::BudgetRangeLocal, "range", other)),
    };

    let bound = |value: Option<i64>| -> Result<Option<u32>, SlotRejection> {
        match value {
            None => Ok(None),
            Some(v) if v <= 0 => Err(SlotRejection::InvalidBudget("bounds must be positive")),
            Some(v) => u32::try_from(v)
                .map(Some)
                .map_err(|_| SlotRejection::InvalidBudget("bound too large")),
        }
    };

    let range = BudgetRange {
        min: bound(min)?,
        max: bound(max)?,
    };
    match (range.min, range.max) {
        (None, None) => Err(SlotRejection::InvalidBudget("no bound given")),
        (Some(lo), Some(hi)) if lo > hi => Err(SlotRejection::InvalidBudget("min exceeds max")),
        _ => Ok(SlotValue::Budget(range)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_ctx() -> ValidationContext {
        ValidationContext::default()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ====================================================================
    // Dates
    // ====================================================================

    #[test]
    fn test_date_parsing() {
        let ok = validate(SlotId::CheckIn, &RawSlotValue::Date("2025-10-01".into()), &no_ctx());
        assert_eq!(ok, Ok(SlotValue::Date(date(2025, 10, 1))));

        let bad = validate(SlotId::CheckIn, &RawSlotValue::Date("2025-02-30".into()), &no_ctx());
        assert!(matches!(bad, Err(SlotRejection::InvalidDate(_))));
    }

    #[test]
    fn test_check_out_must_follow_check_in() {
        let ctx = ValidationContext {
            check_in: Some(date(2025, 10, 5)),
            check_out: None,
        };

        let same_day = validate(SlotId::CheckOut, &RawSlotValue::Date("2025-10-05".into()), &ctx);
        assert!(matches!(same_day, Err(SlotRejection::CheckOutNotAfterCheckIn { .. })));

        let earlier = validate(SlotId::CheckOut, &RawSlotValue::Date("2025-10-01".into()), &ctx);
        assert!(earlier.is_err());

        let later = validate(SlotId::CheckOut, &RawSlotValue::Date("2025-10-06".into()), &ctx);
        assert_eq!(later, Ok(SlotValue::Date(date(2025, 10, 6))));
    }

    #[test]
    fn test_check_in_must_precede_existing_check_out() {
        let ctx = ValidationContext {
            check_in: None,
            check_out: Some(date(2025, 10, 5)),
        };

        let after = validate(SlotId::CheckIn, &RawSlotValue::Date("2025-10-07".into()), &ctx);
        assert!(after.is_err());

        let before = validate(SlotId::CheckIn, &RawSlotValue::Date("2025-10-02".into()), &ctx);
        assert!(before.is_ok());
    }

    // ====================================================================
    // Party
    // ====================================================================

    #[test]
    fn test_party_defaults() {
        let raw = RawSlotValue::party(Some(2), None, None);
        let value = validate(SlotId::Party, &raw, &no_ctx()).unwrap();
        assert_eq!(value.as_party(), Some(Party::new(2, 0, 1)));
    }

    #[test]
    fn test_party_rejections() {
        let no_adults = RawSlotValue::party(None, Some(1), Some(1));
        assert_eq!(
            validate(SlotId::Party, &no_adults, &no_ctx()),
            Err(SlotRejection::MissingAdults)
        );

        let zero_adults = RawSlotValue::party(Some(0), None, None);
        assert!(validate(SlotId::Party, &zero_adults, &no_ctx()).is_err());

        let zero_rooms = RawSlotValue::party(Some(2), None, Some(0));
        assert!(validate(SlotId::Party, &zero_rooms, &no_ctx()).is_err());

        let negative_children = RawSlotValue::party(Some(2), Some(-1), None);
        assert!(validate(SlotId::Party, &negative_children, &no_ctx()).is_err());
    }

    // ====================================================================
    // Budget, stars, text, sets
    // ====================================================================

    #[test]
    fn test_budget_rules() {
        let range = RawSlotValue::range(Some(2000), Some(3000));
        assert_eq!(
            validate(SlotId::BudgetRangeLocal, &range, &no_ctx()),
            Ok(SlotValue::Budget(BudgetRange::between(2000, 3000)))
        );

        let upper_only = RawSlotValue::range(None, Some(800));
        assert_eq!(
            validate(SlotId::BudgetRangeLocal, &upper_only, &no_ctx()),
            Ok(SlotValue::Budget(BudgetRange::up_to(800)))
        );

        let inverted = RawSlotValue::range(Some(3000), Some(2000));
        assert!(validate(SlotId::BudgetRangeLocal, &inverted, &no_ctx()).is_err());

        let empty = RawSlotValue::range(None, None);
        assert!(validate(SlotId::BudgetRangeLocal, &empty, &no_ctx()).is_err());

        let zero = RawSlotValue::range(Some(0), Some(100));
        assert!(validate(SlotId::BudgetRangeLocal, &zero, &no_ctx()).is_err());
    }

    #[test]
    fn test_star_level_range() {
        for stars in [3, 4, 5] {
            assert!(validate(SlotId::StarLevel, &RawSlotValue::Integer(stars), &no_ctx()).is_ok());
        }
        assert_eq!(
            validate(SlotId::StarLevel, &RawSlotValue::Integer(6), &no_ctx()),
            Err(SlotRejection::StarOutOfRange(6))
        );
        assert!(validate(SlotId::StarLevel, &RawSlotValue::Integer(2), &no_ctx()).is_err());
    }

    #[test]
    fn test_city_rules() {
        let city = validate(SlotId::City, &RawSlotValue::Text("  东京 ".into()), &no_ctx());
        assert_eq!(city, Ok(SlotValue::Text("东京".into())));

        assert!(validate(SlotId::City, &RawSlotValue::Text("   ".into()), &no_ctx()).is_err());
        assert!(validate(SlotId::City, &RawSlotValue::Text("12345".into()), &no_ctx()).is_err());
        assert!(validate(SlotId::City, &RawSlotValue::Text("x".repeat(41)), &no_ctx()).is_err());
        let unknown = RawSlotValue::Text("Smalltown123".into());
        assert!(validate(SlotId::City, &unknown, &no_ctx()).is_ok());
    }

    #[test]
    fn test_set_trimmed_and_deduplicated() {
        let raw = RawSlotValue::Set(vec!["万豪".into(), " 万豪 ".into(), "希尔顿".into()]);
        let value = validate(SlotId::PreferredBrands, &raw, &no_ctx()).unwrap();
        assert_eq!(value.as_set().map(|s| s.len()), Some(2));

        let empty = RawSlotValue::Set(vec!["  ".into()]);
        assert_eq!(
            validate(SlotId::SpecialNeeds, &empty, &no_ctx()),
            Err(SlotRejection::Empty(SlotId::SpecialNeeds))
        );
    }

    #[test]
    fn test_shape_mismatch() {
        let result = validate(SlotId::StarLevel, &RawSlotValue::Text("five".into()), &no_ctx());
        assert!(matches!(result, Err(SlotRejection::ShapeMismatch { .. })));
    }

    // ====================================================================
    // Idempotence
    // ====================================================================

    #[test]
    fn test_validation_is_idempotent() {
        let samples = vec![
            (SlotId::City, RawSlotValue::Text(" Tokyo ".into())),
            (SlotId::CheckIn, RawSlotValue::Date("2025-10-01".into())),
            (SlotId::Party, RawSlotValue::party(Some(2), None, None)),
            (SlotId::BudgetRangeLocal, RawSlotValue::range(None, Some(900))),
            (SlotId::StarLevel, RawSlotValue::Integer(4)),
            (SlotId::SpecialNeeds, RawSlotValue::Set(vec!["无障碍".into(), "婴儿床".into()])),
            (SlotId::BreakfastNeeded, RawSlotValue::Flag(true)),
        ];

        for (slot, raw) in samples {
            let first = validate(slot, &raw, &no_ctx()).unwrap();
            let second = validate(slot, &first.to_raw(), &no_ctx()).unwrap();
            assert_eq!(first, second, "slot {} not idempotent", slot);
        }
    }
}
