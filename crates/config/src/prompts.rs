//! Question templates
//!
//! Built-in Chinese and English templates keyed by question tag
//! (`required:city`, `narrowing:area_or_brand`, ...), with optional overrides
//! from settings. Placeholders: `{city}`, `{hotel_count}` and `{shortlist}`.

use hotel_planner_core::{CityTier, Question, QuestionContext, QuestionRenderer};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Output language for rendered questions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Zh,
    En,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Zh => f.write_str("zh"),
            Language::En => f.write_str("en"),
        }
    }
}

/// Key of the notice rendered for tier C ready signals
pub const READY_SMALL_CITY: &str = "ready:small_city";

static ZH_TEMPLATES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("required:city", "请问您要去哪个城市？"),
        ("required:stay_dates", "请告诉我入住和退房日期（如：10月1日到10月5日）？"),
        ("required:check_in", "请告诉我入住日期（如：2025-10-01）？"),
        ("required:check_out", "请告诉我退房日期（如：2025-10-05）？"),
        ("required:party", "同行有几位成人？有孩子吗？需要几间房？"),
        ("required:budget", "您的每晚预算大概多少？（当地货币即可，比如 ¥1,000-2,000）"),
        ("required:star_level", "对酒店星级有要求吗？比如4星或5星？"),
        (
            "narrowing:budget_or_star",
            "{city}的酒店选择非常多，为便于筛选，请给一个每晚预算范围，或者告诉我偏好的酒店星级？",
        ),
        (
            "narrowing:area_or_brand",
            "更想住在{city}哪片区域/靠近什么地标（如车站、商圈或景点）？有偏好的酒店品牌吗？比如万豪、希尔顿、凯悦等？",
        ),
        ("narrowing:budget_or_area", "大概预算是多少？或者更想靠近车站、市中心还是某个景点？"),
        ("narrowing:extras", "还有其他特殊需求吗？比如家庭房、含早餐、景观房等？"),
        (READY_SMALL_CITY, "{city}酒店数量有限，以下是可行的{shortlist}家推荐"),
    ])
});

static EN_TEMPLATES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("required:city", "Which city are you travelling to?"),
        (
            "required:stay_dates",
            "What are your check-in and check-out dates (e.g. Oct 1 to Oct 5)?",
        ),
        ("required:check_in", "What is your check-in date (e.g. 2025-10-01)?"),
        ("required:check_out", "What is your check-out date (e.g. 2025-10-05)?"),
        (
            "required:party",
            "How many adults are travelling? Any children? How many rooms do you need?",
        ),
        ("required:budget", "What is your budget per night, in local currency?"),
        ("required:star_level", "Which hotel star level do you prefer, 4 or 5 stars?"),
        (
            "narrowing:budget_or_star",
            "{city} has a lot of hotels. To narrow it down, what is your nightly budget range or preferred star level?",
        ),
        (
            "narrowing:area_or_brand",
            "Which area of {city} or landmark would you like to stay near? Any preferred hotel brand, such as Marriott, Hilton or Hyatt?",
        ),
        (
            "narrowing:budget_or_area",
            "Roughly what budget do you have, or would you rather stay near the station, downtown or a sight?",
        ),
        (
            "narrowing:extras",
            "Anything else we should know, like a family room, breakfast or a room with a view?",
        ),
        (
            READY_SMALL_CITY,
            "{city} has a limited number of hotels, here are {shortlist} workable options",
        ),
    ])
});

fn builtin(language: Language) -> &'static HashMap<&'static str, &'static str> {
    match language {
        Language::Zh => &ZH_TEMPLATES,
        Language::En => &EN_TEMPLATES,
    }
}

/// Template-based [`QuestionRenderer`]
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    language: Language,
    overrides: HashMap<String, String>,
}

impl TemplateRenderer {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            overrides: HashMap::new(),
        }
    }

    /// Replace built-in templates; unknown keys are ignored with a warning
    pub fn with_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        let known = builtin(self.language);
        for (key, template) in overrides {
            if known.contains_key(key.as_str()) {
                self.overrides.insert(key.clone(), template.clone());
            } else {
                tracing::warn!(key = %key, "Ignoring override for unknown question template");
            }
        }
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    fn template(&self, key: &str) -> Option<&str> {
        self.overrides
            .get(key)
            .map(|s| s.as_str())
            .or_else(|| builtin(self.language).get(key).copied())
    }

    fn fill(&self, template: &str, ctx: &QuestionContext) -> String {
        let city = match (&ctx.city, self.language) {
            (Some(city), _) => city.clone(),
            (None, Language::Zh) => "该城市".to_string(),
            (None, Language::En) => "The city".to_string(),
        };
        let count = match (ctx.five_star_hotels, self.language) {
            (Some(count), _) => count.to_string(),
            (None, Language::Zh) => "多".to_string(),
            (None, Language::En) => "many".to_string(),
        };
        let shortlist = match (ctx.shortlist, self.language) {
            (Some((min, max)), _) if min == max => min.to_string(),
            (Some((min, max)), _) => format!("{}-{}", min, max),
            (None, Language::Zh) => "几".to_string(),
            (None, Language::En) => "a few".to_string(),
        };
        template
            .replace("{city}", &city)
            .replace("{hotel_count}", &count)
            .replace("{shortlist}", &shortlist)
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

impl QuestionRenderer for TemplateRenderer {
    fn render(&self, question: &Question, ctx: &QuestionContext) -> String {
        let tag = question.tag();
        match self.template(&tag) {
            Some(template) => self.fill(template, ctx),
            // Every built-in tag has a template; this only guards custom maps
            None => tag,
        }
    }

    fn ready_notice(&self, tier: CityTier, ctx: &QuestionContext) -> Option<String> {
        if tier != CityTier::C {
            return None;
        }
        self.template(READY_SMALL_CITY).map(|t| self.fill(t, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotel_planner_core::{NarrowingCategory, RequiredPrompt};

    fn tokyo() -> QuestionContext {
        QuestionContext {
            city: Some("东京".to_string()),
            tier: Some(CityTier::A),
            five_star_hotels: Some(45),
            shortlist: Some((5, 8)),
        }
    }

    #[test]
    fn test_every_question_has_a_template() {
        let questions = [
            Question::Required(RequiredPrompt::City),
            Question::Required(RequiredPrompt::StayDates),
            Question::Required(RequiredPrompt::CheckIn),
            Question::Required(RequiredPrompt::CheckOut),
            Question::Required(RequiredPrompt::Party),
            Question::Required(RequiredPrompt::Budget),
            Question::Required(RequiredPrompt::StarLevel),
            Question::Narrowing(NarrowingCategory::BudgetOrStar),
            Question::Narrowing(NarrowingCategory::AreaOrBrand),
            Question::Narrowing(NarrowingCategory::BudgetOrArea),
            Question::Narrowing(NarrowingCategory::Extras),
        ];
        for language in [Language::Zh, Language::En] {
            for question in &questions {
                assert!(
                    builtin(language).contains_key(question.tag().as_str()),
                    "{} missing for {}",
                    question.tag(),
                    language
                );
            }
        }
    }

    #[test]
    fn test_city_placeholder() {
        let renderer = TemplateRenderer::new(Language::Zh);
        let text = renderer.render(&Question::Narrowing(NarrowingCategory::BudgetOrStar), &tokyo());
        assert!(text.starts_with("东京的酒店选择非常多"));

        let text = renderer.render(
            &Question::Narrowing(NarrowingCategory::AreaOrBrand),
            &QuestionContext::default(),
        );
        assert!(text.contains("该城市"));
    }

    #[test]
    fn test_overrides() {
        let overrides = HashMap::from([
            ("required:city".to_string(), "去哪儿？{city}".to_string()),
            ("required:nonsense".to_string(), "x".to_string()),
        ]);
        let renderer = TemplateRenderer::new(Language::Zh).with_overrides(&overrides);

        let text = renderer.render(&Question::Required(RequiredPrompt::City), &tokyo());
        assert_eq!(text, "去哪儿？东京");
        assert!(renderer.template("required:nonsense").is_none());
    }

    #[test]
    fn test_hotel_count_placeholder() {
        let overrides = HashMap::from([(
            "narrowing:budget_or_star".to_string(),
            "{city} has about {hotel_count} five-star hotels".to_string(),
        )]);
        let renderer = TemplateRenderer::new(Language::En).with_overrides(&overrides);
        let ctx = QuestionContext {
            city: Some("Tokyo".to_string()),
            ..tokyo()
        };
        let text = renderer.render(&Question::Narrowing(NarrowingCategory::BudgetOrStar), &ctx);
        assert_eq!(text, "Tokyo has about 45 five-star hotels");
    }

    #[test]
    fn test_ready_notice_only_for_small_cities() {
        let renderer = TemplateRenderer::new(Language::Zh);
        let guilin = QuestionContext {
            city: Some("桂林".to_string()),
            tier: Some(CityTier::C),
            five_star_hotels: Some(3),
            shortlist: Some((3, 5)),
        };
        assert_eq!(
            renderer.ready_notice(CityTier::C, &guilin).as_deref(),
            Some("桂林酒店数量有限，以下是可行的3-5家推荐")
        );
        assert!(renderer.ready_notice(CityTier::A, &tokyo()).is_none());
    }

    #[test]
    fn test_ready_notice_follows_shortlist() {
        let ctx = QuestionContext {
            city: Some("Lhasa".to_string()),
            tier: Some(CityTier::C),
            five_star_hotels: Some(2),
            shortlist: Some((2, 4)),
        };
        let renderer = TemplateRenderer::new(Language::En);
        assert_eq!(
            renderer.ready_notice(CityTier::C, &ctx).as_deref(),
            Some("Lhasa has a limited number of hotels, here are 2-4 workable options")
        );

        let single = QuestionContext {
            shortlist: Some((3, 3)),
            ..ctx.clone()
        };
        let text = TemplateRenderer::new(Language::Zh).ready_notice(CityTier::C, &single);
        assert_eq!(text.as_deref(), Some("Lhasa酒店数量有限，以下是可行的3家推荐"));

        let unknown = QuestionContext {
            shortlist: None,
            ..ctx
        };
        let text = renderer.ready_notice(CityTier::C, &unknown);
        assert_eq!(
            text.as_deref(),
            Some("Lhasa has a limited number of hotels, here are a few workable options")
        );
    }
}
