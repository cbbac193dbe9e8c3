//! Career rules using fixed score thresholds.
//!
//! Fast deterministic recommendations for the clearest profiles.
//! No model required - pure threshold predicates, first match wins.

use std::fmt;

use crate::models::Sample;

/// A pure boolean function of the four scores.
pub type RulePredicate = fn(&Sample) -> bool;

/// One (predicate, recommendation) pair.
#[derive(Clone)]
pub struct Rule {
    name: &'static str,
    predicate: RulePredicate,
    recommendation: String,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("recommendation", &self.recommendation)
            .finish()
    }
}

impl Rule {
    pub fn new(name: &'static str, predicate: RulePredicate, recommendation: impl Into<String>) -> Self {
        Self {
            name,
            predicate,
            recommendation: recommendation.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn recommendation(&self) -> &str {
        &self.recommendation
    }

    pub fn matches(&self, sample: &Sample) -> bool {
        (self.predicate)(sample)
    }
}

fn strong_math_and_science(sample: &Sample) -> bool {
    sample.math_score > 8.0 && sample.science_score > 7.0
}

fn strong_art_and_communication(sample: &Sample) -> bool {
    sample.art_score > 7.0 && sample.communication_score > 6.0
}

/// Ordered list of rules evaluated in priority order.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    /// Create a rule engine with the standard career rules
    pub fn new() -> Self {
        Self::from_rules(vec![
            Rule::new("engineering", strong_math_and_science, "Engineering"),
            Rule::new(
                "design_or_advertising",
                strong_art_and_communication,
                "Graphic Design or Advertising",
            ),
        ])
    }

    /// Create a rule engine from an explicit priority list
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Append a rule with the lowest priority
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Remove a rule by name, keeping the relative order of the others
    pub fn remove(&mut self, name: &str) -> Option<Rule> {
        let index = self.rules.iter().position(|r| r.name == name)?;
        Some(self.rules.remove(index))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// First rule whose predicate holds for `sample`
    pub fn first_match(&self, sample: &Sample) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(sample))
    }

    /// Recommendation of the first matching rule, if any
    pub fn evaluate(&self, sample: &Sample) -> Option<&str> {
        self.first_match(sample).map(Rule::recommendation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engineering_rule() {
        let engine = RuleEngine::new();
        assert_eq!(engine.evaluate(&Sample::query(9.0, 8.0, 3.0, 5.0)), Some("Engineering"));
        assert_eq!(engine.evaluate(&Sample::query(8.5, 7.1, 1.0, 1.0)), Some("Engineering"));
    }

    #[test]
    fn test_thresholds_are_strict() {
        let engine = RuleEngine::new();
        assert_eq!(engine.evaluate(&Sample::query(8.0, 10.0, 1.0, 1.0)), None);
        assert_eq!(engine.evaluate(&Sample::query(10.0, 7.0, 1.0, 1.0)), None);
        assert_eq!(engine.evaluate(&Sample::query(1.0, 1.0, 7.0, 10.0)), None);
        assert_eq!(engine.evaluate(&Sample::query(1.0, 1.0, 10.0, 6.0)), None);
    }

    #[test]
    fn test_design_rule() {
        let engine = RuleEngine::new();
        assert_eq!(
            engine.evaluate(&Sample::query(4.0, 3.0, 8.0, 7.0)),
            Some("Graphic Design or Advertising")
        );
    }

    #[test]
    fn test_first_match_wins() {
        let engine = RuleEngine::new();
        let both = Sample::query(9.0, 9.0, 9.0, 9.0);
        let rule = engine.first_match(&both).unwrap();
        assert_eq!(rule.name(), "engineering");
        assert_eq!(rule.recommendation(), "Engineering");
    }

    #[test]
    fn test_no_match() {
        let engine = RuleEngine::new();
        assert_eq!(engine.evaluate(&Sample::query(5.0, 7.0, 4.0, 8.0)), None);
    }

    #[test]
    fn test_push_and_remove_preserve_order() {
        let mut engine = RuleEngine::new();
        engine.push(Rule::new("anything", |_| true, "Fallback"));
        assert_eq!(engine.evaluate(&Sample::query(1.0, 1.0, 1.0, 1.0)), Some("Fallback"));
        assert_eq!(engine.evaluate(&Sample::query(9.0, 9.0, 9.0, 9.0)), Some("Engineering"));

        let removed = engine.remove("engineering").unwrap();
        assert_eq!(removed.name(), "engineering");
        assert_eq!(
            engine.evaluate(&Sample::query(9.0, 9.0, 9.0, 9.0)),
            Some("Graphic Design or Advertising")
        );
        assert!(engine.remove("missing").is_none());
    }
}
