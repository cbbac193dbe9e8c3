use crate::advisor::FittedClassifier;
use crate::corpus::Corpus;
use crate::error::AppError;
use crate::models::Sample;
use async_trait::async_trait;

/// Defines the public interface for the corpus store.
///
/// The store is the source of truth for training data. The advisor actor loads it once
/// and persists every sample it records.
#[async_trait]
pub trait CorpusStore: Send + Sync + 'static {
    /// Loads every stored sample in insertion order.
    async fn load(&self) -> Result<Corpus, AppError>;

    /// Persists one labeled sample at the end of the corpus.
    async fn append_and_persist(&self, sample: &Sample) -> Result<(), AppError>;
}

/// Defines the public interface for the model artifact store.
#[async_trait]
pub trait ModelArtifactStore: Send + Sync + 'static {
    /// Saves the model, replacing any previous artifact.
    async fn save_model(&self, model: &FittedClassifier) -> Result<(), AppError>;

    /// Loads the saved model, or `None` if nothing has been saved yet.
    async fn load_model(&self) -> Result<Option<FittedClassifier>, AppError>;
}
