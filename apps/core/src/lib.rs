//! Pathfinder core: career recommendation from four aptitude scores.
//!
//! Threshold rules answer the clearest profiles; a multiclass classifier trained on
//! the corpus answers the rest. Every decided case is fed back into the corpus for
//! future retraining.

pub mod actors;
pub mod advisor;
pub mod config;
pub mod corpus;
pub mod database;
pub mod error;
pub mod fs_manager;
pub mod model_store;
pub mod models;

#[cfg(test)]
mod tests;

pub use advisor::{DecisionEngine, DecisionResult, DecisionSource};
pub use config::AppConfig;
pub use corpus::Corpus;
pub use error::AppError;
pub use models::{Sample, ScoreInput, UNCLASSIFIED_LABEL};
