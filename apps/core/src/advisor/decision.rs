//! Decision Engine - main orchestrator of the advisor.
//!
//! Two-tier recommendation:
//! 1. Threshold rules, first match wins
//! 2. Fitted classifier fallback when no rule matches
//!
//! Every decision then records the input in the corpus for future retraining.

use std::sync::Arc;
use tracing::{debug, info};

use super::classifier::{Classifier, FittedClassifier, TrainingOptions};
use super::outcome::{DecisionResult, DecisionSource, DecisionStage};
use super::rules::RuleEngine;
use crate::corpus::Corpus;
use crate::error::AppError;
use crate::models::{Sample, UNCLASSIFIED_LABEL};

/// Orchestrates rules, the fitted classifier and the corpus feedback loop.
pub struct DecisionEngine {
    rules: RuleEngine,
    model: Arc<FittedClassifier>,
    corpus: Corpus,
    always_record_as_unclassified: bool,
}

impl DecisionEngine {
    /// Create an engine around an already fitted model.
    pub fn new(corpus: Corpus, model: Arc<FittedClassifier>) -> Self {
        Self {
            rules: RuleEngine::new(),
            model,
            corpus,
            always_record_as_unclassified: true,
        }
    }

    /// Fit a model on `corpus` and build an engine around it.
    pub fn train(corpus: Corpus, options: TrainingOptions) -> Result<Self, AppError> {
        let model = Classifier::new(options).fit(&corpus)?;
        Ok(Self::new(corpus, Arc::new(model)))
    }

    pub fn with_rules(mut self, rules: RuleEngine) -> Self {
        self.rules = rules;
        self
    }

    /// When `false`, only cases resolved by the classifier are recorded.
    pub fn with_record_policy(mut self, always_record_as_unclassified: bool) -> Self {
        self.always_record_as_unclassified = always_record_as_unclassified;
        self
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn model(&self) -> &Arc<FittedClassifier> {
        &self.model
    }

    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    pub fn always_record_as_unclassified(&self) -> bool {
        self.always_record_as_unclassified
    }

    /// Swap in a freshly fitted model.
    pub fn replace_model(&mut self, model: Arc<FittedClassifier>) {
        info!(
            "Replacing model ({} labels) with one fitted on {} samples ({} labels)",
            self.model.label_space().len(),
            model.samples_seen(),
            model.label_space().len()
        );
        self.model = model;
    }

    /// Refit on the current corpus. On error the current model is kept.
    pub fn retrain(&mut self, options: TrainingOptions) -> Result<(), AppError> {
        let model = Classifier::new(options).fit(&self.corpus)?;
        self.replace_model(Arc::new(model));
        Ok(())
    }

    /// Recommend a career for `sample` and record it for retraining.
    ///
    /// Invalid input is rejected before the corpus is touched.
    pub fn decide(&mut self, sample: &Sample) -> Result<DecisionResult, AppError> {
        let result = self.recommend(sample)?;
        if result.recorded_for_retraining {
            self.record(sample)?;
        }
        debug!(stage = %DecisionStage::Done, result = %result);
        Ok(result)
    }

    /// Resolve `sample` without touching the corpus.
    ///
    /// `recorded_for_retraining` on the result tells the caller whether the record
    /// policy wants the case appended with [`DecisionEngine::record`].
    pub fn recommend(&self, sample: &Sample) -> Result<DecisionResult, AppError> {
        debug!(stage = %DecisionStage::Start, scores = ?sample.scores());
        sample.ensure_numeric()?;
        if sample.label.is_some() {
            return Err(AppError::InvalidInput(
                "a query sample must not carry a label".to_string(),
            ));
        }

        debug!(stage = %DecisionStage::RuleCheck);
        let mut result = match self.rules.first_match(sample) {
            Some(rule) => {
                debug!(stage = %DecisionStage::RuleMatched, rule = rule.name());
                DecisionResult {
                    recommendation: rule.recommendation().to_string(),
                    source: DecisionSource::Rule,
                    recorded_for_retraining: false,
                    rule: Some(rule.name().to_string()),
                    confidence: None,
                }
            }
            None => {
                debug!(stage = %DecisionStage::MlFallback);
                let features = self.model.encoder().encode(sample);
                let prediction = self.model.predict_with_confidence(&features)?;
                DecisionResult {
                    recommendation: prediction.label,
                    source: DecisionSource::Ml,
                    recorded_for_retraining: false,
                    rule: None,
                    confidence: Some(prediction.confidence),
                }
            }
        };
        result.recorded_for_retraining = self.should_record(result.source);
        Ok(result)
    }

    /// The corpus entry recorded for a decided query.
    pub fn recorded_sample(sample: &Sample) -> Sample {
        sample.with_label(UNCLASSIFIED_LABEL)
    }

    /// Append a decided query to the corpus as unclassified.
    pub fn record(&mut self, sample: &Sample) -> Result<(), AppError> {
        debug!(stage = %DecisionStage::Record);
        self.corpus.append(Self::recorded_sample(sample))
    }

    fn should_record(&self, source: DecisionSource) -> bool {
        self.always_record_as_unclassified || source == DecisionSource::Ml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> DecisionEngine {
        DecisionEngine::train(Corpus::seed(), TrainingOptions::default()).unwrap()
    }

    #[test]
    fn test_rule_path_records_unclassified() {
        let mut engine = engine();
        let result = engine.decide(&Sample::query(9.0, 8.0, 3.0, 5.0)).unwrap();

        assert_eq!(result.to_string(), "Rule: Engineering");
        assert!(result.recorded_for_retraining);
        assert_eq!(engine.corpus().len(), 6);
        assert_eq!(
            engine.corpus().last().unwrap(),
            &Sample::labeled(9.0, 8.0, 3.0, 5.0, "unclassified")
        );
    }

    #[test]
    fn test_ml_fallback() {
        let mut engine = engine();
        let result = engine.decide(&Sample::query(5.0, 7.0, 4.0, 8.0)).unwrap();

        assert_eq!(result.source, DecisionSource::Ml);
        assert!(result.confidence.is_some());
        assert!(engine.model().label_space().contains(&result.recommendation));
    }

    #[test]
    fn test_invalid_input_does_not_touch_corpus() {
        let mut engine = engine();
        let err = engine
            .decide(&Sample::query(f32::NAN, 8.0, 3.0, 5.0))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let labeled = Sample::labeled(1.0, 1.0, 1.0, 1.0, "Medicina");
        assert!(engine.decide(&labeled).is_err());
        assert_eq!(engine.corpus().len(), 5);
    }

    #[test]
    fn test_ml_only_record_policy() {
        let mut engine = engine().with_record_policy(false);

        let rule = engine.decide(&Sample::query(9.0, 9.0, 1.0, 1.0)).unwrap();
        assert!(!rule.recorded_for_retraining);
        assert_eq!(engine.corpus().len(), 5);

        let ml = engine.decide(&Sample::query(5.0, 5.0, 5.0, 5.0)).unwrap();
        assert!(ml.recorded_for_retraining);
        assert_eq!(engine.corpus().len(), 6);
    }

    #[test]
    fn test_recommend_leaves_corpus_alone() {
        let mut engine = engine();
        let sample = Sample::query(5.0, 7.0, 4.0, 8.0);
        let result = engine.recommend(&sample).unwrap();
        assert!(result.recorded_for_retraining);
        assert_eq!(engine.corpus().len(), 5);

        engine.record(&sample).unwrap();
        assert_eq!(
            engine.corpus().last().unwrap(),
            &Sample::labeled(5.0, 7.0, 4.0, 8.0, "unclassified")
        );
    }

    #[test]
    fn test_retrain_picks_up_unclassified() {
        let mut engine = engine();
        assert!(!engine.model().label_space().contains("unclassified"));

        engine.decide(&Sample::query(5.0, 5.0, 5.0, 5.0)).unwrap();
        assert!(!engine.model().label_space().contains("unclassified"));

        engine.retrain(TrainingOptions::default()).unwrap();
        assert!(engine.model().label_space().contains("unclassified"));
        assert_eq!(engine.model().samples_seen(), 6);
    }
}
