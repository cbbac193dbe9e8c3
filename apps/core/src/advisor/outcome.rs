//! Decision outcome - what the engine hands back to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which branch produced the recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionSource {
    /// A threshold rule matched
    Rule,
    /// The fitted classifier was consulted
    Ml,
}

impl DecisionSource {
    /// Prefix used on the output boundary
    pub fn label(&self) -> &'static str {
        match self {
            DecisionSource::Rule => "Rule",
            DecisionSource::Ml => "ML",
        }
    }
}

impl fmt::Display for DecisionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Stages of a single decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionStage {
    Start,
    RuleCheck,
    RuleMatched,
    MlFallback,
    Record,
    Done,
}

impl fmt::Display for DecisionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DecisionStage::Start => "START",
            DecisionStage::RuleCheck => "RULE_CHECK",
            DecisionStage::RuleMatched => "RULE_MATCHED",
            DecisionStage::MlFallback => "ML_FALLBACK",
            DecisionStage::Record => "RECORD",
            DecisionStage::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// Result of one call to `DecisionEngine::decide`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    /// Recommended career
    pub recommendation: String,
    /// Branch that produced the recommendation
    pub source: DecisionSource,
    /// Whether the input was appended to the corpus
    pub recorded_for_retraining: bool,
    /// Name of the matching rule (rule branch only)
    pub rule: Option<String>,
    /// Softmax probability of the predicted label (ML branch only)
    pub confidence: Option<f32>,
}

impl DecisionResult {
    pub fn is_rule(&self) -> bool {
        self.source == DecisionSource::Rule
    }
}

impl fmt::Display for DecisionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source.label(), self.recommendation)
    }
}
