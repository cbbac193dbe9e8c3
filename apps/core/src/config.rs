//! Runtime configuration read from the environment.
//!
//! A `.env` file is loaded by the binary before `AppConfig::from_env` runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use validator::Validate;

use crate::advisor::TrainingOptions;
use crate::error::AppError;

pub const ENV_DATA_DIR: &str = "PATHFINDER_DATA_DIR";
pub const ENV_RECORD_ALL: &str = "PATHFINDER_RECORD_ALL";
pub const ENV_TRAIN_EPOCHS: &str = "PATHFINDER_TRAIN_EPOCHS";
pub const ENV_LEARNING_RATE: &str = "PATHFINDER_LEARNING_RATE";
pub const ENV_L2: &str = "PATHFINDER_L2";
pub const ENV_TRAIN_TIMEOUT_MS: &str = "PATHFINDER_TRAIN_TIMEOUT_MS";
pub const ENV_STRICT_RANGE: &str = "PATHFINDER_STRICT_RANGE";
pub const ENV_REUSE_MODEL: &str = "PATHFINDER_REUSE_MODEL";

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    /// Root of the `db/` and `models/` directories.
    pub data_dir: PathBuf,
    /// Record every decided case as unclassified, not only classifier fallbacks.
    pub always_record_as_unclassified: bool,
    /// Gradient descent passes.
    #[validate(range(min = 1, max = 1000000))]
    pub train_epochs: u32,
    /// Gradient descent step size.
    #[validate(range(min = 0.000001, max = 10.0))]
    pub learning_rate: f64,
    /// L2 penalty.
    #[validate(range(min = 0.0, max = 10.0))]
    pub l2: f64,
    /// Upper bound for background retraining, in milliseconds.
    #[validate(range(min = 1))]
    pub train_timeout_ms: u64,
    /// Reject scores outside 1-10 at the input boundary.
    pub strict_score_range: bool,
    /// Load the saved model at startup instead of retraining.
    pub reuse_saved_model: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let training = TrainingOptions::default();
        Self {
            data_dir: PathBuf::from("data"),
            always_record_as_unclassified: true,
            train_epochs: training.epochs,
            learning_rate: training.learning_rate,
            l2: training.l2,
            train_timeout_ms: 5_000,
            strict_score_range: false,
            reuse_saved_model: false,
        }
    }
}

impl AppConfig {
    /// Builds the configuration from `PATHFINDER_*` variables, falling back to defaults.
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();
        let config = Self {
            data_dir: std::env::var(ENV_DATA_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            always_record_as_unclassified: env_or(
                ENV_RECORD_ALL,
                defaults.always_record_as_unclassified,
            )?,
            train_epochs: env_or(ENV_TRAIN_EPOCHS, defaults.train_epochs)?,
            learning_rate: env_or(ENV_LEARNING_RATE, defaults.learning_rate)?,
            l2: env_or(ENV_L2, defaults.l2)?,
            train_timeout_ms: env_or(ENV_TRAIN_TIMEOUT_MS, defaults.train_timeout_ms)?,
            strict_score_range: env_or(ENV_STRICT_RANGE, defaults.strict_score_range)?,
            reuse_saved_model: env_or(ENV_REUSE_MODEL, defaults.reuse_saved_model)?,
        };
        config
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;
        Ok(config)
    }

    pub fn training_options(&self) -> TrainingOptions {
        TrainingOptions {
            epochs: self.train_epochs,
            learning_rate: self.learning_rate,
            l2: self.l2,
        }
    }

    pub fn train_timeout(&self) -> Duration {
        Duration::from_millis(self.train_timeout_ms)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value: '{}'", key, raw))),
        _ => Ok(default),
    }
}
