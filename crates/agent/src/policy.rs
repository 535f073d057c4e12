//! Question policy
//!
//! Decides, from the dialogue state alone, whether to ask for a missing
//! required slot, ask a narrowing question, or signal that the request is
//! ready for recommendation.

use hotel_planner_config::{ConfigError, PolicyConfig, TierNarrowing};
use hotel_planner_core::{
    CityTier, DialoguePhase, NarrowingCategory, Question, RequiredPrompt, SlotId,
};

use crate::dst::HotelDialogueState;

/// What the engine should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    Ask(Question),
    Recommend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyDecision {
    pub phase: DialoguePhase,
    pub action: NextAction,
    /// Tier the decision was made for; the fallback tier before a city is known
    pub tier: CityTier,
}

#[derive(Debug, Clone)]
pub struct PolicyEngine {
    config: PolicyConfig,
}

impl PolicyEngine {
    pub fn new(config: PolicyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn effective_tier(&self, state: &HotelDialogueState) -> CityTier {
        state.tier().unwrap_or(self.config.default_tier)
    }

    pub fn narrowing(&self, tier: CityTier) -> &TierNarrowing {
        self.config.narrowing_for(tier)
    }

    /// Highest-priority missing required slot, as a question
    pub fn next_required(state: &HotelDialogueState) -> Option<RequiredPrompt> {
        let prompt = if !state.is_filled(SlotId::City) {
            RequiredPrompt::City
        } else if !state.is_filled(SlotId::CheckIn) && !state.is_filled(SlotId::CheckOut) {
            RequiredPrompt::StayDates
        } else if !state.is_filled(SlotId::CheckIn) {
            RequiredPrompt::CheckIn
        } else if !state.is_filled(SlotId::CheckOut) {
            RequiredPrompt::CheckOut
        } else if !state.is_filled(SlotId::Party) {
            RequiredPrompt::Party
        } else if !state.is_filled(SlotId::BudgetRangeLocal) {
            RequiredPrompt::Budget
        } else if !state.is_filled(SlotId::StarLevel) {
            RequiredPrompt::StarLevel
        } else {
            return None;
        };
        Some(prompt)
    }

    /// Satisfied categories among those configured for `tier`
    pub fn satisfied_count(&self, state: &HotelDialogueState, tier: CityTier) -> usize {
        self.narrowing(tier)
            .categories
            .iter()
            .filter(|c| state.is_satisfied(**c))
            .count()
    }

    /// Next narrowing category to ask, if the tier floor is not met yet
    pub fn next_narrowing(
        &self,
        state: &HotelDialogueState,
        tier: CityTier,
    ) -> Option<NarrowingCategory> {
        let narrowing = self.narrowing(tier);
        if self.satisfied_count(state, tier) >= narrowing.min_satisfied {
            return None;
        }
        narrowing.categories.iter().copied().find(|c| !state.is_satisfied(*c))
    }

    /// Most distinct questions a cooperative conversation can see for `tier`
    pub fn question_bound(&self, tier: CityTier) -> usize {
        SlotId::REQUIRED.len() + self.narrowing(tier).categories.len()
    }

    pub fn decide(&self, state: &HotelDialogueState) -> PolicyDecision {
        let tier = self.effective_tier(state);

        let decision = if let Some(prompt) = Self::next_required(state) {
            PolicyDecision {
                phase: DialoguePhase::CollectingRequired,
                action: NextAction::Ask(Question::Required(prompt)),
                tier,
            }
        } else if let Some(category) = self.next_narrowing(state, tier) {
            PolicyDecision {
                phase: DialoguePhase::Narrowing,
                action: NextAction::Ask(Question::Narrowing(category)),
                tier,
            }
        } else {
            PolicyDecision {
                phase: DialoguePhase::Ready,
                action: NextAction::Recommend,
                tier,
            }
        };

        tracing::debug!(
            phase = %decision.phase,
            tier = %tier,
            action = ?decision.action,
            satisfied = self.satisfied_count(state, tier),
            "Policy decision"
        );
        decision
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self {
            config: PolicyConfig::default(),
        }
    }
}
