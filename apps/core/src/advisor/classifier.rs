//! Multiclass career classifier.
//!
//! Multinomial logistic regression (maximum entropy) trained with deterministic
//! full-batch gradient descent on the raw score vector. Used as the fallback when
//! no rule matches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::features::{FeatureEncoder, FeatureVector, LabelKey, LabelSpace, FEATURE_COUNT};
use crate::corpus::Corpus;
use crate::error::AppError;

/// Fixed training options. No tuning is performed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingOptions {
    /// Full passes over the corpus.
    pub epochs: u32,
    /// Gradient descent step size.
    pub learning_rate: f64,
    /// L2 penalty on the weights (biases are not penalised).
    pub l2: f64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            epochs: 2000,
            learning_rate: 0.01,
            l2: 0.001,
        }
    }
}

/// A predicted label with its softmax probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub key: LabelKey,
    pub confidence: f32,
}

/// Trainer for the multiclass model
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    options: TrainingOptions,
}

impl Classifier {
    pub fn new(options: TrainingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TrainingOptions {
        &self.options
    }

    /// Fit a model on every sample of `corpus`.
    pub fn fit(&self, corpus: &Corpus) -> Result<FittedClassifier, AppError> {
        if corpus.is_empty() {
            return Err(AppError::EmptyCorpus);
        }

        let encoder = FeatureEncoder::fit(corpus);
        let classes = encoder.label_space().len();
        if classes < 2 {
            return Err(AppError::InsufficientLabelDiversity { found: classes });
        }

        let mut rows = Vec::with_capacity(corpus.len());
        for sample in corpus.iter() {
            let label = sample.label.as_deref().ok_or_else(|| {
                AppError::Internal("corpus sample without label".to_string())
            })?;
            let features = widen(&encoder.encode(sample));
            rows.push((features, encoder.label_to_key(label)?.index()));
        }

        info!(
            "Training classifier on {} samples, {} labels",
            rows.len(),
            classes
        );

        let mut weights = vec![[0.0f64; FEATURE_COUNT]; classes];
        let mut biases = vec![0.0f64; classes];
        let n = rows.len() as f64;
        let mut probs = vec![0.0f64; classes];

        for epoch in 0..self.options.epochs {
            let mut grad_w = vec![[0.0f64; FEATURE_COUNT]; classes];
            let mut grad_b = vec![0.0f64; classes];
            let mut loss = 0.0f64;

            for (x, y) in &rows {
                for (k, p) in probs.iter_mut().enumerate() {
                    *p = dot(&weights[k], x) + biases[k];
                }
                softmax_in_place(&mut probs);
                loss -= probs[*y].max(f64::MIN_POSITIVE).ln();

                for k in 0..classes {
                    let diff = probs[k] - if k == *y { 1.0 } else { 0.0 };
                    for (g, xi) in grad_w[k].iter_mut().zip(x.iter()) {
                        *g += diff * xi;
                    }
                    grad_b[k] += diff;
                }
            }

            let step = self.options.learning_rate;
            for k in 0..classes {
                for j in 0..FEATURE_COUNT {
                    let g = grad_w[k][j] / n + self.options.l2 * weights[k][j];
                    weights[k][j] -= step * g;
                }
                biases[k] -= step * grad_b[k] / n;
            }

            if epoch % 500 == 0 {
                debug!("epoch {}: mean loss {:.4}", epoch, loss / n);
            }
        }

        Ok(FittedClassifier {
            encoder,
            weights,
            biases,
            options: self.options,
            samples_seen: corpus.len(),
            trained_at: Utc::now(),
        })
    }
}

/// Immutable trained model. Replaced wholesale on retraining, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredClassifier")]
pub struct FittedClassifier {
    encoder: FeatureEncoder,
    weights: Vec<[f64; FEATURE_COUNT]>,
    biases: Vec<f64>,
    options: TrainingOptions,
    samples_seen: usize,
    trained_at: DateTime<Utc>,
}

/// Artifact layout of a `FittedClassifier`, checked before use.
#[derive(Deserialize)]
struct StoredClassifier {
    encoder: FeatureEncoder,
    weights: Vec<[f64; FEATURE_COUNT]>,
    biases: Vec<f64>,
    options: TrainingOptions,
    samples_seen: usize,
    trained_at: DateTime<Utc>,
}

impl TryFrom<StoredClassifier> for FittedClassifier {
    type Error = AppError;

    fn try_from(stored: StoredClassifier) -> Result<Self, Self::Error> {
        let labels = stored.encoder.label_space().len();
        if labels < 2 {
            return Err(AppError::InsufficientLabelDiversity { found: labels });
        }
        if stored.weights.len() != labels || stored.biases.len() != labels {
            return Err(AppError::InvalidInput(format!(
                "model has {} labels but {} weight rows and {} biases",
                labels,
                stored.weights.len(),
                stored.biases.len()
            )));
        }
        Ok(Self {
            encoder: stored.encoder,
            weights: stored.weights,
            biases: stored.biases,
            options: stored.options,
            samples_seen: stored.samples_seen,
            trained_at: stored.trained_at,
        })
    }
}

impl FittedClassifier {
    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn label_space(&self) -> &LabelSpace {
        self.encoder.label_space()
    }

    pub fn options(&self) -> &TrainingOptions {
        &self.options
    }

    /// Number of corpus samples the model was fitted on.
    pub fn samples_seen(&self) -> usize {
        self.samples_seen
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    /// Class probabilities indexed by label key.
    pub fn probabilities(&self, features: &FeatureVector) -> Vec<f64> {
        let x = widen(features);
        let mut scores: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.biases)
            .map(|(w, b)| dot(w, &x) + b)
            .collect();
        softmax_in_place(&mut scores);
        scores
    }

    /// Most probable label. Ties go to the lowest key.
    pub fn predict(&self, features: &FeatureVector) -> Result<&str, AppError> {
        let probs = self.probabilities(features);
        self.encoder.key_to_label(argmax(&probs))
    }

    pub fn predict_with_confidence(&self, features: &FeatureVector) -> Result<Prediction, AppError> {
        let probs = self.probabilities(features);
        let key = argmax(&probs);
        let label = self.encoder.key_to_label(key)?.to_string();
        Ok(Prediction {
            label,
            key,
            confidence: probs[key.index()] as f32,
        })
    }
}

fn widen(features: &FeatureVector) -> [f64; FEATURE_COUNT] {
    let mut out = [0.0f64; FEATURE_COUNT];
    for (o, f) in out.iter_mut().zip(features.iter()) {
        *o = f64::from(*f);
    }
    out
}

fn dot(a: &[f64; FEATURE_COUNT], b: &[f64; FEATURE_COUNT]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Numerically stable softmax.
pub fn softmax_in_place(values: &mut [f64]) {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for v in values.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    if sum > 0.0 {
        for v in values.iter_mut() {
            *v /= sum;
        }
    }
}

fn argmax(values: &[f64]) -> LabelKey {
    let mut best = 0usize;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    LabelKey(best as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sample;

    fn separable_corpus() -> Corpus {
        Corpus::from_samples(vec![
            Sample::labeled(9.0, 9.0, 1.0, 1.0, "Sciences"),
            Sample::labeled(8.0, 9.0, 2.0, 1.0, "Sciences"),
            Sample::labeled(9.0, 8.0, 1.0, 2.0, "Sciences"),
            Sample::labeled(1.0, 1.0, 9.0, 9.0, "Arts"),
            Sample::labeled(2.0, 1.0, 8.0, 9.0, "Arts"),
            Sample::labeled(1.0, 2.0, 9.0, 8.0, "Arts"),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_corpus_fails() {
        let err = Classifier::default().fit(&Corpus::new()).unwrap_err();
        assert!(matches!(err, AppError::EmptyCorpus));
    }

    #[test]
    fn test_single_label_fails() {
        let corpus = Corpus::from_samples(vec![
            Sample::labeled(1.0, 2.0, 3.0, 4.0, "Medicina"),
            Sample::labeled(4.0, 3.0, 2.0, 1.0, "Medicina"),
        ])
        .unwrap();
        let err = Classifier::default().fit(&corpus).unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientLabelDiversity { found: 1 }
        ));
    }

    #[test]
    fn test_learns_separable_classes() {
        let model = Classifier::default().fit(&separable_corpus()).unwrap();
        assert_eq!(model.predict(&[8.0, 8.0, 2.0, 2.0]).unwrap(), "Sciences");
        assert_eq!(model.predict(&[2.0, 2.0, 8.0, 8.0]).unwrap(), "Arts");

        let prediction = model.predict_with_confidence(&[9.0, 9.0, 1.0, 1.0]).unwrap();
        assert_eq!(prediction.label, "Sciences");
        assert!(prediction.confidence > 0.5 && prediction.confidence <= 1.0);
    }

    #[test]
    fn test_prediction_is_in_label_space() {
        let corpus = Corpus::seed();
        let model = Classifier::default().fit(&corpus).unwrap();
        let label = model.predict(&[5.0, 7.0, 4.0, 8.0]).unwrap();
        assert!(model.label_space().contains(label));
        assert_eq!(model.samples_seen(), 5);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let model = Classifier::default().fit(&Corpus::seed()).unwrap();
        let probs = model.probabilities(&[3.0, 3.0, 3.0, 3.0]);
        assert_eq!(probs.len(), 5);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_training_is_deterministic() {
        let a = Classifier::default().fit(&Corpus::seed()).unwrap();
        let b = Classifier::default().fit(&Corpus::seed()).unwrap();
        assert_eq!(a.weights, b.weights);
        assert_eq!(a.biases, b.biases);
    }

    #[test]
    fn test_ties_go_to_lowest_key() {
        assert_eq!(argmax(&[0.25, 0.25, 0.5, 0.5]), LabelKey(2));
        assert_eq!(argmax(&[0.5, 0.5]), LabelKey(0));
    }

    #[test]
    fn test_zero_epochs_gives_uniform_model() {
        let options = TrainingOptions {
            epochs: 0,
            ..TrainingOptions::default()
        };
        let model = Classifier::new(options).fit(&Corpus::seed()).unwrap();
        assert_eq!(model.predict(&[1.0, 1.0, 1.0, 1.0]).unwrap(), "Engineering");
    }

    #[test]
    fn test_model_survives_json() {
        let model = Classifier::default().fit(&Corpus::seed()).unwrap();
        let json = serde_json::to_string(&model).unwrap();
        let back: FittedClassifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back.label_space(), model.label_space());
        assert_eq!(
            back.predict(&[5.0, 7.0, 4.0, 8.0]).unwrap(),
            model.predict(&[5.0, 7.0, 4.0, 8.0]).unwrap()
        );
    }

    #[test]
    fn test_mismatched_artifact_is_rejected() {
        let model = Classifier::default().fit(&Corpus::seed()).unwrap();
        let mut json = serde_json::to_value(&model).unwrap();
        json["biases"].as_array_mut().unwrap().pop();
        assert!(serde_json::from_value::<FittedClassifier>(json).is_err());

        let mut json = serde_json::to_value(&model).unwrap();
        json["encoder"]["label_space"] = serde_json::json!(["A", "B"]);
        assert!(serde_json::from_value::<FittedClassifier>(json).is_err());
    }
}
