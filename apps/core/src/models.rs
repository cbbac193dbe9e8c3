use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::AppError;

/// Sentinel label attached to every case recorded for later relabeling.
pub const UNCLASSIFIED_LABEL: &str = "unclassified";

/// One observation of the four self-reported aptitude scores.
///
/// Scores are documented as 1-10 but the engine does not enforce the range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Mathematics aptitude.
    pub math_score: f32,
    /// Science aptitude.
    pub science_score: f32,
    /// Art aptitude.
    pub art_score: f32,
    /// Communication aptitude.
    pub communication_score: f32,
    /// Career label. Present for training data, absent for a query.
    #[serde(default)]
    pub label: Option<String>,
}

impl Sample {
    /// Creates an unlabeled query sample.
    pub fn query(math: f32, science: f32, art: f32, communication: f32) -> Self {
        Self {
            math_score: math,
            science_score: science,
            art_score: art,
            communication_score: communication,
            label: None,
        }
    }

    /// Creates a labeled training sample.
    pub fn labeled(
        math: f32,
        science: f32,
        art: f32,
        communication: f32,
        label: impl Into<String>,
    ) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::query(math, science, art, communication)
        }
    }

    /// Returns a copy of this sample carrying `label`.
    pub fn with_label(&self, label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..self.clone()
        }
    }

    /// Scores in canonical order: math, science, art, communication.
    pub fn scores(&self) -> [f32; 4] {
        [
            self.math_score,
            self.science_score,
            self.art_score,
            self.communication_score,
        ]
    }

    /// Checks that every score is a finite number.
    pub fn ensure_numeric(&self) -> Result<(), AppError> {
        for (name, value) in SCORE_FIELDS.iter().zip(self.scores()) {
            if !value.is_finite() {
                return Err(AppError::InvalidInput(format!(
                    "{} must be a finite number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Human names for the four score fields, in canonical order.
pub const SCORE_FIELDS: [&str; 4] = ["math", "science", "art", "communication"];

/// Raw score fields as they arrive from the console or command line.
#[derive(Debug, Clone, Default)]
pub struct ScoreInput {
    pub math: String,
    pub science: String,
    pub art: String,
    pub communication: String,
}

/// Parsed scores checked against the documented 1-10 range.
#[derive(Debug, Clone, Validate)]
struct RangedScores {
    #[validate(range(min = 1.0, max = 10.0))]
    math: f32,
    #[validate(range(min = 1.0, max = 10.0))]
    science: f32,
    #[validate(range(min = 1.0, max = 10.0))]
    art: f32,
    #[validate(range(min = 1.0, max = 10.0))]
    communication: f32,
}

impl ScoreInput {
    /// Parses the raw fields into an unlabeled query sample.
    ///
    /// When `strict_range` is set, scores outside 1-10 are rejected as well.
    pub fn parse(&self, strict_range: bool) -> Result<Sample, AppError> {
        let math = parse_score("math", &self.math)?;
        let science = parse_score("science", &self.science)?;
        let art = parse_score("art", &self.art)?;
        let communication = parse_score("communication", &self.communication)?;

        if strict_range {
            RangedScores {
                math,
                science,
                art,
                communication,
            }
            .validate()?;
        }

        Ok(Sample::query(math, science, art, communication))
    }
}

fn parse_score(field: &str, raw: &str) -> Result<f32, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(format!("{} score is missing", field)));
    }
    let value: f32 = trimmed
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("{} score '{}' is not a number", field, trimmed)))?;
    if !value.is_finite() {
        return Err(AppError::InvalidInput(format!(
            "{} score '{}' is not a finite number",
            field, trimmed
        )));
    }
    Ok(value)
}

/// A persisted corpus sample.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct SampleRecord {
    /// Insertion sequence number (corpus order).
    pub seq: i64,
    /// The unique identifier for the record (UUID).
    pub id: String,
    pub math: f64,
    pub science: f64,
    pub art: f64,
    pub communication: f64,
    /// Career label, or the unclassified sentinel.
    pub label: String,
    /// Unix timestamp of when the record was stored.
    pub recorded_at: i64,
}

impl From<SampleRecord> for Sample {
    fn from(record: SampleRecord) -> Self {
        Sample::labeled(
            record.math as f32,
            record.science as f32,
            record.art as f32,
            record.communication as f32,
            record.label,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(math: &str, science: &str, art: &str, communication: &str) -> ScoreInput {
        ScoreInput {
            math: math.to_string(),
            science: science.to_string(),
            art: art.to_string(),
            communication: communication.to_string(),
        }
    }

    #[test]
    fn test_parse_valid_input() {
        let sample = input(" 9", "8 ", "3", "5.5").parse(false).unwrap();
        assert_eq!(sample.scores(), [9.0, 8.0, 3.0, 5.5]);
        assert!(sample.label.is_none());
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        let err = input("9", "eight", "3", "5").parse(false).unwrap_err();
        match err {
            AppError::InvalidInput(msg) => assert!(msg.contains("science")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_missing_and_nan() {
        assert!(input("", "1", "1", "1").parse(false).is_err());
        assert!(input("NaN", "1", "1", "1").parse(false).is_err());
        assert!(input("1", "1", "1", "inf").parse(false).is_err());
    }

    #[test]
    fn test_range_only_enforced_when_strict() {
        let raw = input("11", "0", "5", "5");
        assert!(raw.parse(false).is_ok());
        assert!(matches!(raw.parse(true), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_with_label_keeps_scores() {
        let query = Sample::query(1.0, 2.0, 3.0, 4.0);
        let labeled = query.with_label(UNCLASSIFIED_LABEL);
        assert_eq!(labeled.scores(), query.scores());
        assert_eq!(labeled.label.as_deref(), Some("unclassified"));
    }

    #[test]
    fn test_ensure_numeric() {
        assert!(Sample::query(1.0, 2.0, 3.0, 4.0).ensure_numeric().is_ok());
        assert!(Sample::query(1.0, f32::NAN, 3.0, 4.0).ensure_numeric().is_err());
    }
}
