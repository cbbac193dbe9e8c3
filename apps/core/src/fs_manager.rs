use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the SQLite corpus database.
pub const CORPUS_DB_FILENAME: &str = "corpus.sqlite";

/// File name of the persisted model artifact.
pub const MODEL_FILENAME: &str = "career_model.json";

/// Layout of the data directory (`<data>/db`, `<data>/models`).
#[derive(Debug, Clone)]
pub struct PortablePathManager {
    data_dir: PathBuf,
}

impl PortablePathManager {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Main data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Database directory (`<data>/db`).
    pub fn db_dir(&self) -> PathBuf {
        self.data_dir.join("db")
    }

    /// Model artifact directory (`<data>/models`).
    pub fn models_dir(&self) -> PathBuf {
        self.data_dir.join("models")
    }

    pub fn corpus_db_path(&self) -> PathBuf {
        self.db_dir().join(CORPUS_DB_FILENAME)
    }

    pub fn model_path(&self) -> PathBuf {
        self.models_dir().join(MODEL_FILENAME)
    }

    /// Creates the data, db and models directories if they don't exist.
    pub fn init(&self) -> Result<(), std::io::Error> {
        for dir in [self.data_dir.clone(), self.db_dir(), self.models_dir()] {
            if !dir.exists() {
                info!("Creating directory: {:?}", dir);
                fs::create_dir_all(&dir)?;
            }
        }
        Ok(())
    }
}
