//! Ordered extraction rules
//!
//! A rule pairs a compiled pattern with a function turning its captures into
//! a candidate. Rules of one slot live in a [`RuleSet`], sorted by specificity
//! on construction; the first rule that yields a candidate wins.

use chrono::NaiveDate;
use hotel_planner_text_processing::find_term;
use regex::{Captures, Regex};

/// Inputs a rule may need besides its captures
#[derive(Debug, Clone, Copy)]
pub struct RuleContext {
    /// Day that relative and year-less dates resolve against
    pub today: NaiveDate,
}

pub type ExtractFn<T> = fn(&Captures<'_>, &RuleContext) -> Option<T>;

pub struct Rule<T> {
    pub name: &'static str,
    /// Higher runs first
    pub specificity: u8,
    pattern: Regex,
    extract: ExtractFn<T>,
}

impl<T> Rule<T> {
    pub fn new(name: &'static str, specificity: u8, pattern: Regex, extract: ExtractFn<T>) -> Self {
        Self {
            name,
            specificity,
            pattern,
            extract,
        }
    }

    /// Candidate from the first match of this rule that yields one
    fn apply(&self, text: &str, ctx: &RuleContext) -> Option<T> {
        self.pattern
            .captures_iter(text)
            .find_map(|caps| (self.extract)(&caps, ctx))
    }
}

impl<T> std::fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("specificity", &self.specificity)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// Rules for one slot, most specific first
#[derive(Debug)]
pub struct RuleSet<T> {
    rules: Vec<Rule<T>>,
}

impl<T> RuleSet<T> {
    /// Sort by descending specificity; ties keep declaration order
    pub fn new(mut rules: Vec<Rule<T>>) -> Self {
        rules.sort_by(|a, b| b.specificity.cmp(&a.specificity));
        Self { rules }
    }

    /// First rule yielding a candidate, with its name
    pub fn first_match(&self, text: &str, ctx: &RuleContext) -> Option<(&'static str, T)> {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(text, ctx).map(|value| (rule.name, value)))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    pub fn specificities(&self) -> Vec<u8> {
        self.rules.iter().map(|r| r.specificity).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Keyword list mapping surface terms to canonical labels
///
/// Longest terms are tried first and a matched span is consumed, so
/// "park hyatt" does not also count as "hyatt". ASCII terms only match on
/// word boundaries.
#[derive(Debug, Clone)]
pub struct Gazetteer {
    entries: Vec<(String, &'static str)>,
}

impl Gazetteer {
    /// Build from `(canonical label, surface terms)` groups
    pub fn new(groups: &[(&'static str, &[&str])]) -> Self {
        let mut entries: Vec<(String, &'static str)> = groups
            .iter()
            .flat_map(|(label, terms)| terms.iter().map(move |t| (t.to_lowercase(), *label)))
            .collect();
        entries.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
        Self { entries }
    }

    /// All distinct labels found in `text`, in order of first detection
    pub fn collect(&self, text: &str) -> Vec<&'static str> {
        let mut haystack = text.to_lowercase();
        let mut labels = Vec::new();
        for (term, label) in &self.entries {
            while let Some(start) = find_term(&haystack, term) {
                if !labels.contains(label) {
                    labels.push(*label);
                }
                let blank = " ".repeat(term.len());
                haystack.replace_range(start..start + term.len(), &blank);
            }
        }
        labels
    }

    /// Label of the longest term found in `text`
    pub fn first(&self, text: &str) -> Option<&'static str> {
        let haystack = text.to_lowercase();
        self.entries
            .iter()
            .find(|(term, _)| find_term(&haystack, term).is_some())
            .map(|(_, label)| *label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RuleContext {
        RuleContext {
            today: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
        }
    }

    fn number(caps: &Captures<'_>, _: &RuleContext) -> Option<u32> {
        caps.get(1)?.as_str().parse().ok()
    }

    fn doubled(caps: &Captures<'_>, _: &RuleContext) -> Option<u32> {
        caps.get(1)?.as_str().parse::<u32>().ok().map(|n| n * 2)
    }

    #[test]
    fn test_rules_sorted_by_specificity() {
        let set = RuleSet::new(vec![
            Rule::new("loose", 10, Regex::new(r"(\d+)").unwrap(), number),
            Rule::new("strict", 90, Regex::new(r"x(\d+)").unwrap(), doubled),
            Rule::new("middle", 50, Regex::new(r"y(\d+)").unwrap(), number),
        ]);
        assert_eq!(set.names(), vec!["strict", "middle", "loose"]);
        assert_eq!(set.specificities(), vec![90, 50, 10]);
    }

    #[test]
    fn test_first_match_wins() {
        let set = RuleSet::new(vec![
            Rule::new("loose", 10, Regex::new(r"(\d+)").unwrap(), number),
            Rule::new("strict", 90, Regex::new(r"x(\d+)").unwrap(), doubled),
        ]);
        assert_eq!(set.first_match("7 and x4", &ctx()), Some(("strict", 8)));
        assert_eq!(set.first_match("only 7", &ctx()), Some(("loose", 7)));
        assert_eq!(set.first_match("nothing", &ctx()), None);
    }

    #[test]
    fn test_rule_falls_through_when_extract_declines() {
        fn small(caps: &Captures<'_>, _: &RuleContext) -> Option<u32> {
            caps.get(1)?.as_str().parse::<u32>().ok().filter(|n| *n < 10)
        }
        let set = RuleSet::new(vec![Rule::new("small", 50, Regex::new(r"(\d+)").unwrap(), small)]);
        // the second occurrence is tried when the first is declined
        assert_eq!(set.first_match("42 then 3", &ctx()), Some(("small", 3)));
    }

    #[test]
    fn test_gazetteer_longest_match_consumes_span() {
        let gazetteer = Gazetteer::new(&[
            ("凯悦", &["凯悦", "hyatt"]),
            ("柏悦", &["柏悦", "park hyatt"]),
            ("希尔顿", &["希尔顿", "hilton"]),
        ]);
        assert_eq!(gazetteer.collect("Park Hyatt or Hilton"), vec!["柏悦", "希尔顿"]);
        assert_eq!(gazetteer.collect("万豪"), Vec::<&str>::new());
        assert_eq!(gazetteer.first("凯悦和希尔顿都行"), Some("希尔顿"));
    }

    #[test]
    fn test_gazetteer_ascii_word_boundary() {
        let gazetteer = Gazetteer::new(&[("宠物", &["pet"])]);
        assert!(gazetteer.collect("carpet cleaning").is_empty());
        assert_eq!(gazetteer.collect("we travel with a pet"), vec!["宠物"]);
    }
}
