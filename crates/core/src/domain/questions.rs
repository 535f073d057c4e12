//! Tagged questions and dialogue phases

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::slots::SlotId;

/// Question for a missing required slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredPrompt {
    City,
    /// Both dates missing, asked together
    StayDates,
    CheckIn,
    CheckOut,
    Party,
    Budget,
    StarLevel,
}

impl RequiredPrompt {
    pub fn slots(&self) -> &'static [SlotId] {
        match self {
            RequiredPrompt::City => &[SlotId::City],
            RequiredPrompt::StayDates => &[SlotId::CheckIn, SlotId::CheckOut],
            RequiredPrompt::CheckIn => &[SlotId::CheckIn],
            RequiredPrompt::CheckOut => &[SlotId::CheckOut],
            RequiredPrompt::Party => &[SlotId::Party],
            RequiredPrompt::Budget => &[SlotId::BudgetRangeLocal],
            RequiredPrompt::StarLevel => &[SlotId::StarLevel],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredPrompt::City => "city",
            RequiredPrompt::StayDates => "stay_dates",
            RequiredPrompt::CheckIn => "check_in",
            RequiredPrompt::CheckOut => "check_out",
            RequiredPrompt::Party => "party",
            RequiredPrompt::Budget => "budget",
            RequiredPrompt::StarLevel => "star_level",
        }
    }
}

/// Optional-slot category used to narrow the search in bigger cities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrowingCategory {
    BudgetOrStar,
    AreaOrBrand,
    BudgetOrArea,
    Extras,
}

impl NarrowingCategory {
    /// Slots whose value satisfies this category
    pub fn slots(&self) -> &'static [SlotId] {
        match self {
            NarrowingCategory::BudgetOrStar => &[SlotId::BudgetRangeLocal, SlotId::StarLevel],
            NarrowingCategory::AreaOrBrand => &[SlotId::PreferredArea, SlotId::PreferredBrands],
            NarrowingCategory::BudgetOrArea => &[SlotId::BudgetRangeLocal, SlotId::PreferredArea],
            NarrowingCategory::Extras => &[
                SlotId::SpecialNeeds,
                SlotId::View,
                SlotId::BreakfastNeeded,
                SlotId::Style,
            ],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NarrowingCategory::BudgetOrStar => "budget_or_star",
            NarrowingCategory::AreaOrBrand => "area_or_brand",
            NarrowingCategory::BudgetOrArea => "budget_or_area",
            NarrowingCategory::Extras => "extras",
        }
    }
}

impl fmt::Display for NarrowingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NarrowingCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "budget_or_star" => Ok(NarrowingCategory::BudgetOrStar),
            "area_or_brand" => Ok(NarrowingCategory::AreaOrBrand),
            "budget_or_area" => Ok(NarrowingCategory::BudgetOrArea),
            "extras" => Ok(NarrowingCategory::Extras),
            other => Err(format!("unknown narrowing category '{}'", other)),
        }
    }
}

/// A question tagged with what it asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum Question {
    Required(RequiredPrompt),
    Narrowing(NarrowingCategory),
}

impl Question {
    /// Stable tag such as `required:city` or `narrowing:area_or_brand`
    pub fn tag(&self) -> String {
        match self {
            Question::Required(prompt) => format!("required:{}", prompt.as_str()),
            Question::Narrowing(category) => format!("narrowing:{}", category.as_str()),
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Question::Required(_))
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

/// Phase derived from the dialogue state at each turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialoguePhase {
    CollectingRequired,
    Narrowing,
    Ready,
}

impl DialoguePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialoguePhase::CollectingRequired => "collecting_required",
            DialoguePhase::Narrowing => "narrowing",
            DialoguePhase::Ready => "ready",
        }
    }
}

impl fmt::Display for DialoguePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_tags() {
        assert_eq!(Question::Required(RequiredPrompt::City).tag(), "required:city");
        assert_eq!(
            Question::Narrowing(NarrowingCategory::AreaOrBrand).tag(),
            "narrowing:area_or_brand"
        );
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("budget_or_area".parse(), Ok(NarrowingCategory::BudgetOrArea));
        assert!("budget".parse::<NarrowingCategory>().is_err());
    }

    #[test]
    fn test_category_yaml_names() {
        let categories: Vec<NarrowingCategory> =
            serde_json::from_str(r#"["budget_or_star", "extras"]"#).unwrap();
        assert_eq!(categories, vec![NarrowingCategory::BudgetOrStar, NarrowingCategory::Extras]);
    }

    #[test]
    fn test_stay_dates_covers_both() {
        assert_eq!(RequiredPrompt::StayDates.slots(), &[SlotId::CheckIn, SlotId::CheckOut]);
    }
}
