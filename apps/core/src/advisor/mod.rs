//! # Advisor Module
//!
//! Hybrid career recommendation engine.
//!
//! ## Components
//! - `rules`: Threshold rules (fast path, first match wins)
//! - `features`: Score encoding and label space
//! - `classifier`: Multiclass maximum-entropy model (fallback)
//! - `outcome`: Output data structure
//! - `decision`: Main orchestrator and corpus feedback loop

pub mod classifier;
pub mod decision;
pub mod features;
pub mod outcome;
pub mod rules;

pub use classifier::{Classifier, FittedClassifier, Prediction, TrainingOptions};
pub use decision::DecisionEngine;
pub use features::{FeatureEncoder, FeatureVector, LabelKey, LabelSpace};
pub use outcome::{DecisionResult, DecisionSource, DecisionStage};
pub use rules::{Rule, RuleEngine};
