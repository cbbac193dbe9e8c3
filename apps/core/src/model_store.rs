//! Model artifact persistence.
//!
//! The fitted classifier is written as pretty-printed JSON. Writes go to a sibling
//! temp file first and are then renamed over the artifact, so a reader sees either
//! the old model or the new one.

use crate::actors::traits::ModelArtifactStore;
use crate::advisor::{Classifier, FittedClassifier, TrainingOptions};
use crate::corpus::Corpus;
use crate::error::AppError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Model store writing a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonModelStore {
    path: PathBuf,
}

impl JsonModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

#[async_trait]
impl ModelArtifactStore for JsonModelStore {
    async fn save_model(&self, model: &FittedClassifier) -> Result<(), AppError> {
        let json = serde_json::to_vec_pretty(model)?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        info!(
            "Saved model ({} labels, {} samples) to {:?}",
            model.label_space().len(),
            model.samples_seen(),
            self.path
        );
        Ok(())
    }

    async fn load_model(&self) -> Result<Option<FittedClassifier>, AppError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let model: FittedClassifier = serde_json::from_slice(&bytes)?;
        info!("Loaded model trained at {} from {:?}", model.trained_at(), self.path);
        Ok(Some(model))
    }
}

/// Startup model: the saved artifact when `reuse` is set and it loads cleanly,
/// otherwise a fresh fit on `corpus`.
///
/// An unreadable artifact is logged and replaced by a fit. Training errors propagate.
pub async fn load_or_fit(
    store: &dyn ModelArtifactStore,
    corpus: &Corpus,
    options: TrainingOptions,
    reuse: bool,
) -> Result<FittedClassifier, AppError> {
    if reuse {
        match store.load_model().await {
            Ok(Some(model)) => return Ok(model),
            Ok(None) => info!("No saved model found, training a new one"),
            Err(e) => warn!("Ignoring unusable saved model: {}", e),
        }
    }
    Classifier::new(options).fit(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_artifact_is_none() {
        let dir = tempdir().expect("Failed to create temp dir");
        let store = JsonModelStore::new(dir.path().join("model.json"));
        assert!(store.load_model().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempdir().expect("Failed to create temp dir");
        let store = JsonModelStore::new(dir.path().join("models").join("model.json"));
        let model = Classifier::default().fit(&Corpus::seed()).unwrap();

        store.save_model(&model).await.unwrap();
        assert!(!store.temp_path().exists());

        let loaded = store.load_model().await.unwrap().expect("model missing");
        assert_eq!(loaded.label_space(), model.label_space());
        assert_eq!(loaded.samples_seen(), 5);
    }

    #[tokio::test]
    async fn test_corrupt_artifact_is_an_error() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("model.json");
        std::fs::write(&path, b"{ not json").unwrap();
        let store = JsonModelStore::new(path);
        assert!(matches!(store.load_model().await, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_artifact_with_duplicate_labels_is_rejected() {
        let dir = tempdir().expect("Failed to create temp dir");
        let store = JsonModelStore::new(dir.path().join("model.json"));
        let model = Classifier::default().fit(&Corpus::seed()).unwrap();

        let mut json = serde_json::to_value(&model).unwrap();
        json["encoder"]["label_space"] = serde_json::json!(["A", "A", "B", "C", "D"]);
        std::fs::write(store.path(), serde_json::to_vec(&json).unwrap()).unwrap();

        assert!(matches!(store.load_model().await, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_load_or_fit_replaces_unusable_artifact() {
        let dir = tempdir().expect("Failed to create temp dir");
        let store = JsonModelStore::new(dir.path().join("model.json"));
        std::fs::write(store.path(), b"{ not json").unwrap();

        let model = load_or_fit(&store, &Corpus::seed(), TrainingOptions::default(), true)
            .await
            .unwrap();
        assert_eq!(model.samples_seen(), 5);
    }

    #[tokio::test]
    async fn test_load_or_fit_prefers_saved_model() {
        let dir = tempdir().expect("Failed to create temp dir");
        let store = JsonModelStore::new(dir.path().join("model.json"));
        let saved = Classifier::default().fit(&Corpus::seed()).unwrap();
        store.save_model(&saved).await.unwrap();

        let mut grown = Corpus::seed();
        grown
            .append(crate::models::Sample::labeled(5.0, 5.0, 5.0, 5.0, "unclassified"))
            .unwrap();
        let reused = load_or_fit(&store, &grown, TrainingOptions::default(), true)
            .await
            .unwrap();
        assert_eq!(reused.samples_seen(), 5);

        let fitted = load_or_fit(&store, &grown, TrainingOptions::default(), false)
            .await
            .unwrap();
        assert_eq!(fitted.samples_seen(), 6);
    }

    #[tokio::test]
    async fn test_load_or_fit_propagates_training_errors() {
        let dir = tempdir().expect("Failed to create temp dir");
        let store = JsonModelStore::new(dir.path().join("model.json"));
        let err = load_or_fit(&store, &Corpus::new(), TrainingOptions::default(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyCorpus));
    }
}
