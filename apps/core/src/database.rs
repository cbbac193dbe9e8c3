use crate::actors::traits::CorpusStore;
use crate::corpus::Corpus;
use crate::error::AppError;
use crate::models::{Sample, SampleRecord};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

pub async fn init_db(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    let db_url = format!("sqlite://{}", db_path.to_string_lossy());

    info!("Initializing corpus database at: {}", db_url);

    let options = SqliteConnectOptions::from_str(&db_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;

    info!("Database initialized and migrations applied.");

    Ok(pool)
}

/// Creates the `samples` table if it does not exist.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS samples (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            math REAL NOT NULL,
            science REAL NOT NULL,
            art REAL NOT NULL,
            communication REAL NOT NULL,
            label TEXT NOT NULL,
            recorded_at INTEGER NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

// --- Samples CRUD ---

pub async fn add_sample(pool: &SqlitePool, sample: &Sample) -> Result<SampleRecord, AppError> {
    let label = sample
        .label
        .as_deref()
        .filter(|l| !l.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("stored samples must carry a label".to_string()))?;
    let id = Uuid::new_v4().to_string();
    let recorded_at = Utc::now().timestamp();

    let record = sqlx::query_as::<_, SampleRecord>(
        r#"
        INSERT INTO samples (id, math, science, art, communication, label, recorded_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING seq, id, math, science, art, communication, label, recorded_at
        "#,
    )
    .bind(&id)
    .bind(f64::from(sample.math_score))
    .bind(f64::from(sample.science_score))
    .bind(f64::from(sample.art_score))
    .bind(f64::from(sample.communication_score))
    .bind(label)
    .bind(recorded_at)
    .fetch_one(pool)
    .await?;

    Ok(record)
}

pub async fn get_all_samples(pool: &SqlitePool) -> Result<Vec<SampleRecord>, sqlx::Error> {
    sqlx::query_as::<_, SampleRecord>(
        r#"
        SELECT seq, id, math, science, art, communication, label, recorded_at
        FROM samples
        ORDER BY seq ASC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn count_samples(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM samples")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Inserts the seed corpus when the table is empty. Returns the number of rows inserted.
pub async fn seed_if_empty(pool: &SqlitePool) -> Result<usize, AppError> {
    if count_samples(pool).await? > 0 {
        return Ok(0);
    }
    let seed = Corpus::seed();
    for sample in seed.iter() {
        add_sample(pool, sample).await?;
    }
    info!("Seeded corpus with {} samples", seed.len());
    Ok(seed.len())
}

/// Corpus store backed by SQLite.
#[derive(Clone)]
pub struct SqliteCorpusStore {
    pool: SqlitePool,
}

impl SqliteCorpusStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (and migrates) the database at `db_path`.
    pub async fn open(db_path: &Path) -> Result<Self, AppError> {
        Ok(Self::new(init_db(db_path).await?))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn records(&self) -> Result<Vec<SampleRecord>, AppError> {
        Ok(get_all_samples(&self.pool).await?)
    }
}

#[async_trait]
impl CorpusStore for SqliteCorpusStore {
    async fn load(&self) -> Result<Corpus, AppError> {
        seed_if_empty(&self.pool).await?;
        let records = get_all_samples(&self.pool).await?;
        Corpus::from_samples(records.into_iter().map(Sample::from).collect())
    }

    async fn append_and_persist(&self, sample: &Sample) -> Result<(), AppError> {
        add_sample(&self.pool, sample).await?;
        Ok(())
    }
}

/// In-memory corpus store, seeded on first load.
#[derive(Default)]
pub struct MemoryCorpusStore {
    samples: Mutex<Option<Corpus>>,
}

impl MemoryCorpusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_corpus(corpus: Corpus) -> Self {
        Self {
            samples: Mutex::new(Some(corpus)),
        }
    }

    pub async fn snapshot(&self) -> Corpus {
        self.samples.lock().await.clone().unwrap_or_default()
    }
}

#[async_trait]
impl CorpusStore for MemoryCorpusStore {
    async fn load(&self) -> Result<Corpus, AppError> {
        let mut guard = self.samples.lock().await;
        Ok(guard.get_or_insert_with(Corpus::seed).clone())
    }

    async fn append_and_persist(&self, sample: &Sample) -> Result<(), AppError> {
        let mut guard = self.samples.lock().await;
        guard.get_or_insert_with(Corpus::seed).append(sample.clone())
    }
}
