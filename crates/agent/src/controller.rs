//! Conversation controller
//!
//! Runs one turn: extract, read the message in the context of the last
//! question, merge, reclassify the city when it changed, then ask the policy
//! for the next step. The only state touched is the tracker passed in.

use chrono::{NaiveDate, Utc};
use hotel_planner_config::{Language, Settings, ShortlistHint};
use hotel_planner_core::{
    CityReference, CityTier, NarrowingCategory, Question, QuestionContext, QuestionRenderer,
    RawSlotValue, RequiredPrompt, SlotId,
};
use hotel_planner_text_processing::{normalize_message, parse_number, NUMBER_PATTERN};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;

use crate::city::{CityClassification, CityClassifier};
use crate::dst::extractor::MIN_PLAUSIBLE_BUDGET;
use crate::dst::{
    ChangeSource, DialogueStateTracker, HotelDialogueState, SlotExtractor, SlotSnapshot, SlotUpdate,
};
use crate::policy::{NextAction, PolicyEngine};
use crate::Result;

/// A head count and nothing else, e.g. "2" or "两位"
static BARE_COUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^({})\s*(?:个人|位|人)?\s*[.。!！]?$", NUMBER_PATTERN)).unwrap()
});

/// A star rating and nothing else, e.g. "4" or "5星"
static BARE_STARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^({})\s*(?:星级|星)?\s*[.。!！]?$", NUMBER_PATTERN)).unwrap()
});

/// An amount and nothing else, optionally with a currency sign or unit
static BARE_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^(?:¥|￥|\$)?\s*({})\s*(?:元|块|日元|円|美元|欧元|yuan|yen|dollars?)?\s*[.。!！]?$",
        NUMBER_PATTERN
    ))
    .unwrap()
});

/// Everything the recommendation step needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationRequest {
    pub tier: CityTier,
    pub city: Option<CityClassification>,
    pub slots: SlotSnapshot,
    pub summary: String,
    pub skipped: Vec<NarrowingCategory>,
    pub shortlist: ShortlistHint,
    /// Extra note for the user, e.g. the small-city short-list notice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Result of one turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnOutcome {
    Ask { question: Question, text: String },
    Ready(RecommendationRequest),
}

impl TurnOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, TurnOutcome::Ready(_))
    }

    pub fn question(&self) -> Option<Question> {
        match self {
            TurnOutcome::Ask { question, .. } => Some(*question),
            TurnOutcome::Ready(_) => None,
        }
    }

    pub fn recommendation(&self) -> Option<&RecommendationRequest> {
        match self {
            TurnOutcome::Ready(request) => Some(request),
            TurnOutcome::Ask { .. } => None,
        }
    }
}

pub struct ConversationController {
    extractor: SlotExtractor,
    classifier: CityClassifier,
    policy: PolicyEngine,
    renderer: Arc<dyn QuestionRenderer>,
    language: Language,
    /// Fixed "today" for date resolution; the current UTC date when unset
    reference_date: Option<NaiveDate>,
}

impl ConversationController {
    pub fn new(
        cities: Arc<dyn CityReference>,
        policy: PolicyEngine,
        renderer: Arc<dyn QuestionRenderer>,
        language: Language,
    ) -> Self {
        Self {
            extractor: SlotExtractor::with_city_reference(cities.clone()),
            classifier: CityClassifier::from_policy(cities, policy.config()),
            policy,
            renderer,
            language,
            reference_date: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let cities = settings.city_table()?;
        tracing::info!(
            cities = cities.len(),
            language = %settings.language,
            "Conversation controller ready"
        );
        let policy = PolicyEngine::new(settings.policy.clone())?;
        Ok(Self::new(
            Arc::new(cities),
            policy,
            Arc::new(settings.renderer()),
            settings.language,
        ))
    }

    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn policy(&self) -> &PolicyEngine {
        &self.policy
    }

    fn today(&self) -> NaiveDate {
        self.reference_date.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Process one user message
    pub fn handle_turn(&self, tracker: &mut DialogueStateTracker, message: &str) -> TurnOutcome {
        let turn = tracker.begin_turn();
        let mut update = self.extractor.extract_at(message, self.today());
        let source = self.read_in_context(tracker.state(), message, &mut update);
        let report = tracker.apply(&update, source);

        if report.city_changed {
            if let Some(city) = tracker.state().city() {
                let info = self.classifier.classify_detailed(city);
                tracker.set_city_classification(info);
            }
        }

        if update.skip {
            if let Some(Question::Narrowing(category)) = tracker.state().last_question() {
                // "万豪或者Hilton都行" answers the question rather than skipping it
                if !category.slots().iter().any(|slot| report.filled.contains(slot)) {
                    tracker.mark_skipped(category);
                }
            }
        }

        let decision = self.policy.decide(tracker.state());
        tracing::debug!(
            turn,
            filled = ?report.filled,
            rejected = report.rejected.len(),
            phase = %decision.phase,
            "Turn handled"
        );

        match decision.action {
            NextAction::Ask(question) => {
                if let Question::Narrowing(category) = question {
                    tracker.mark_asked(category);
                }
                tracker.set_last_question(Some(question));
                let text = self.renderer.render(&question, &question_context(tracker.state()));
                TurnOutcome::Ask { question, text }
            }
            NextAction::Recommend => {
                tracker.set_last_question(None);
                TurnOutcome::Ready(self.build_request(tracker.state(), decision.tier))
            }
        }
    }

    /// Reinterpret short answers using the question that was just asked
    fn read_in_context(
        &self,
        state: &HotelDialogueState,
        message: &str,
        update: &mut SlotUpdate,
    ) -> ChangeSource {
        let Some(Question::Required(prompt)) = state.last_question() else {
            return ChangeSource::UserUtterance;
        };

        match prompt {
            RequiredPrompt::CheckOut => {
                if !update.contains(SlotId::CheckOut) {
                    if let Some(date) = update.remove(SlotId::CheckIn) {
                        update.insert(SlotId::CheckOut, date, "answer_check_out");
                        return ChangeSource::ContextualAnswer;
                    }
                }
            }
            RequiredPrompt::City => {
                if update.values.is_empty() {
                    if let Some(city) = self.extractor.city_from_bare_reply(message) {
                        update.insert(SlotId::City, RawSlotValue::Text(city), "answer_city");
                        return ChangeSource::ContextualAnswer;
                    }
                }
            }
            // A number only answers the open question when nothing else was read
            _ if !update.values.is_empty() => {}
            RequiredPrompt::Party => {
                if let Some(n) = bare_number(&BARE_COUNT, message) {
                    let party = RawSlotValue::party(Some(n), None, None);
                    update.insert(SlotId::Party, party, "answer_party");
                    return ChangeSource::ContextualAnswer;
                }
            }
            RequiredPrompt::StarLevel => {
                if let Some(n) = bare_number(&BARE_STARS, message) {
                    update.insert(SlotId::StarLevel, RawSlotValue::Integer(n), "answer_star_level");
                    return ChangeSource::ContextualAnswer;
                }
            }
            RequiredPrompt::Budget => {
                let amount =
                    bare_number(&BARE_AMOUNT, message).filter(|n| *n >= MIN_PLAUSIBLE_BUDGET);
                if let Some(n) = amount {
                    let budget = RawSlotValue::range(None, Some(n));
                    update.insert(SlotId::BudgetRangeLocal, budget, "answer_budget");
                    return ChangeSource::ContextualAnswer;
                }
            }
            RequiredPrompt::StayDates | RequiredPrompt::CheckIn => {}
        }
        ChangeSource::UserUtterance
    }

    fn build_request(&self, state: &HotelDialogueState, tier: CityTier) -> RecommendationRequest {
        let shortlist = self.policy.narrowing(tier).shortlist;
        let ctx = QuestionContext {
            shortlist: Some((shortlist.min, shortlist.max)),
            ..question_context(state)
        };
        RecommendationRequest {
            tier,
            city: state.city_info().cloned(),
            slots: state.snapshot(),
            summary: state.summary(self.language),
            skipped: state.skipped().iter().copied().collect(),
            shortlist,
            notice: self.renderer.ready_notice(tier, &ctx),
        }
    }
}

fn question_context(state: &HotelDialogueState) -> QuestionContext {
    let info = state.city_info();
    QuestionContext {
        city: info.map(|i| i.name.clone()).or_else(|| state.city().map(str::to_string)),
        tier: info.map(|i| i.tier),
        five_star_hotels: info.and_then(|i| i.five_star_hotels),
        shortlist: None,
    }
}

fn bare_number(pattern: &Regex, message: &str) -> Option<i64> {
    let text = normalize_message(message);
    let caps = pattern.captures(&text)?;
    parse_number(&caps[1])
}
