//! Feature encoding and the label space.
//!
//! Samples become a fixed-order `[math, science, art, communication]` vector with no
//! scaling. Labels map to dense integer keys in order of first appearance in the corpus.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::corpus::Corpus;
use crate::error::AppError;
use crate::models::Sample;

/// Number of features produced per sample.
pub const FEATURE_COUNT: usize = 4;

/// Encoded scores in canonical order.
pub type FeatureVector = [f32; FEATURE_COUNT];

/// Dense integer key of a label inside one label space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelKey(pub u32);

impl LabelKey {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LabelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Distinct labels observed in a corpus at fit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LabelSpace {
    labels: Vec<String>,
    keys: HashMap<String, LabelKey>,
}

impl TryFrom<Vec<String>> for LabelSpace {
    type Error = AppError;

    /// Rebuilds a stored label space. Keys are positions, so duplicates are rejected.
    fn try_from(values: Vec<String>) -> Result<Self, Self::Error> {
        let mut space = LabelSpace::empty();
        for label in values {
            if space.contains(&label) {
                return Err(AppError::InvalidInput(format!(
                    "label '{}' appears twice in the label space",
                    label
                )));
            }
            space.insert(label);
        }
        Ok(space)
    }
}

impl From<LabelSpace> for Vec<String> {
    fn from(space: LabelSpace) -> Self {
        space.labels
    }
}

impl LabelSpace {
    /// Derives the label space from every label in the corpus.
    pub fn from_corpus(corpus: &Corpus) -> Self {
        let mut space = LabelSpace::empty();
        for label in corpus.labels() {
            space.insert(label.to_string());
        }
        space
    }

    fn empty() -> Self {
        Self {
            labels: Vec::new(),
            keys: HashMap::new(),
        }
    }

    fn insert(&mut self, label: String) {
        if self.keys.contains_key(&label) {
            return;
        }
        let key = LabelKey(self.labels.len() as u32);
        self.keys.insert(label.clone(), key);
        self.labels.push(label);
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.keys.contains_key(label)
    }

    /// Labels ordered by key.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn key_of(&self, label: &str) -> Option<LabelKey> {
        self.keys.get(label).copied()
    }

    pub fn label_of(&self, key: LabelKey) -> Result<&str, AppError> {
        self.labels
            .get(key.index())
            .map(String::as_str)
            .ok_or(AppError::UnknownLabel(key.0))
    }
}

/// Encodes samples and maps labels to and from keys.
///
/// The same encoder is used at fit time and at prediction time; it is stored inside
/// the fitted classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEncoder {
    label_space: LabelSpace,
}

impl FeatureEncoder {
    /// Builds an encoder whose label space is derived from `corpus`.
    pub fn fit(corpus: &Corpus) -> Self {
        Self {
            label_space: LabelSpace::from_corpus(corpus),
        }
    }

    pub fn encode(&self, sample: &Sample) -> FeatureVector {
        sample.scores()
    }

    pub fn label_to_key(&self, label: &str) -> Result<LabelKey, AppError> {
        self.label_space.key_of(label).ok_or_else(|| {
            AppError::InvalidInput(format!("label '{}' is not in the fitted label space", label))
        })
    }

    pub fn key_to_label(&self, key: LabelKey) -> Result<&str, AppError> {
        self.label_space.label_of(key)
    }

    pub fn label_space(&self) -> &LabelSpace {
        &self.label_space
    }
}
