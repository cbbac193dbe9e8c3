//! Training corpus: the ordered, append-only collection of labeled samples.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::AppError;
use crate::models::Sample;

/// Reference seed data: (math, science, art, communication, career).
pub const SEED_SAMPLES: [(f32, f32, f32, f32, &str); 5] = [
    (9.0, 8.0, 3.0, 5.0, "Engineering"),
    (5.0, 7.0, 4.0, 8.0, "Medicina"),
    (4.0, 3.0, 8.0, 7.0, "Diseño Gráfico"),
    (6.0, 5.0, 7.0, 8.0, "Publicidad"),
    (9.0, 8.0, 2.0, 4.0, "Economía"),
];

/// Ordered collection of labeled samples.
///
/// Every element carries a non-empty label. Insertion order is kept for auditing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Sample>", into = "Vec<Sample>")]
pub struct Corpus {
    samples: Vec<Sample>,
}

impl TryFrom<Vec<Sample>> for Corpus {
    type Error = AppError;

    fn try_from(samples: Vec<Sample>) -> Result<Self, Self::Error> {
        Self::from_samples(samples)
    }
}

impl From<Corpus> for Vec<Sample> {
    fn from(corpus: Corpus) -> Self {
        corpus.samples
    }
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// The five reference records.
    pub fn seed() -> Self {
        let samples = SEED_SAMPLES
            .iter()
            .map(|&(m, s, a, c, label)| Sample::labeled(m, s, a, c, label))
            .collect();
        Self { samples }
    }

    /// Builds a corpus from samples, rejecting any without a label.
    pub fn from_samples(samples: Vec<Sample>) -> Result<Self, AppError> {
        let mut corpus = Self::new();
        for sample in samples {
            corpus.append(sample)?;
        }
        Ok(corpus)
    }

    /// Appends a labeled sample at the end of the corpus.
    pub fn append(&mut self, sample: Sample) -> Result<(), AppError> {
        match sample.label.as_deref() {
            Some(label) if !label.trim().is_empty() => {}
            _ => {
                return Err(AppError::InvalidInput(
                    "corpus samples must carry a non-empty label".to_string(),
                ))
            }
        }
        sample.ensure_numeric()?;
        self.samples.push(sample);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Labels in corpus order, including the unclassified sentinel.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.samples.iter().filter_map(|s| s.label.as_deref())
    }

    /// Number of samples per label, sorted by label.
    pub fn count_by_label(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for label in self.labels() {
            *counts.entry(label.to_string()).or_insert(0) += 1;
        }
        counts
    }
}
