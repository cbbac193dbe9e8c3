// Pathfinder entry point
// Loads the corpus, fits the model and runs one recommendation per invocation.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use pathfinder_core::actors::{AdvisorHandle, CorpusStore, ModelArtifactStore, RetrainSettings};
use pathfinder_core::advisor::{Classifier, DecisionEngine};
use pathfinder_core::database::SqliteCorpusStore;
use pathfinder_core::fs_manager::PortablePathManager;
use pathfinder_core::model_store::{load_or_fit, JsonModelStore};
use pathfinder_core::{AppConfig, ScoreInput};

#[derive(Parser)]
#[command(name = "pathfinder", about = "Career recommendation from aptitude scores")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend a career (prompts for any score not given)
    Recommend(RecommendArgs),
    /// Refit the model on the stored corpus and save it
    Retrain,
    /// List the stored corpus
    Corpus,
}

#[derive(Args)]
struct RecommendArgs {
    /// Mathematics score (1-10)
    #[arg(long)]
    math: Option<String>,
    /// Science score (1-10)
    #[arg(long)]
    science: Option<String>,
    /// Art score (1-10)
    #[arg(long)]
    art: Option<String>,
    /// Communication score (1-10)
    #[arg(long)]
    communication: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    let config = AppConfig::from_env()?;
    let paths = PortablePathManager::new(&config.data_dir);
    paths
        .init()
        .with_context(|| format!("Failed to create data directory {:?}", paths.data_dir()))?;

    match cli.command {
        Commands::Recommend(args) => recommend(&config, &paths, args).await,
        Commands::Retrain => retrain(&config, &paths).await,
        Commands::Corpus => list_corpus(&paths).await,
    }
}

fn init_tracing(verbose: bool, json: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
}

async fn recommend(config: &AppConfig, paths: &PortablePathManager, args: RecommendArgs) -> Result<()> {
    let store = Arc::new(SqliteCorpusStore::open(&paths.corpus_db_path()).await?);
    let model_store = JsonModelStore::new(paths.model_path());
    let corpus = store.load().await?;
    let model = load_or_fit(
        &model_store,
        &corpus,
        config.training_options(),
        config.reuse_saved_model,
    )
    .await
    .context("Startup training failed")?;

    let engine = DecisionEngine::new(corpus, Arc::new(model))
        .with_record_policy(config.always_record_as_unclassified);
    let settings = RetrainSettings {
        options: config.training_options(),
        timeout: config.train_timeout(),
    };
    let handle = AdvisorHandle::spawn(engine, store, Some(Arc::new(model_store)), settings);

    let input = collect_scores(args)?;
    let sample = input.parse(config.strict_score_range)?;
    let result = handle.decide(sample).await?;

    println!("{}", result);
    if result.recorded_for_retraining {
        println!("Case recorded for retraining.");
    }

    handle.shutdown().await?;
    Ok(())
}

/// Fills in any score not passed as a flag by prompting on the console.
fn collect_scores(args: RecommendArgs) -> Result<ScoreInput> {
    let missing = args.math.is_none()
        || args.science.is_none()
        || args.art.is_none()
        || args.communication.is_none();
    if missing {
        println!("Enter your scores (1-10) in the following areas:");
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock();
    let mut ask = |given: Option<String>, prompt: &str| -> Result<String> {
        if let Some(value) = given {
            return Ok(value);
        }
        print!("{}: ", prompt);
        io::stdout().flush()?;
        let mut line = String::new();
        lines.read_line(&mut line)?;
        Ok(line)
    };

    Ok(ScoreInput {
        math: ask(args.math, "Mathematics")?,
        science: ask(args.science, "Science")?,
        art: ask(args.art, "Art")?,
        communication: ask(args.communication, "Communication")?,
    })
}

async fn retrain(config: &AppConfig, paths: &PortablePathManager) -> Result<()> {
    let store = SqliteCorpusStore::open(&paths.corpus_db_path()).await?;
    let corpus = store.load().await?;
    let model = Classifier::new(config.training_options()).fit(&corpus)?;
    JsonModelStore::new(paths.model_path()).save_model(&model).await?;

    println!(
        "Model fitted on {} samples. Labels: {}",
        model.samples_seen(),
        model.label_space().labels().join(", ")
    );
    Ok(())
}

async fn list_corpus(paths: &PortablePathManager) -> Result<()> {
    let store = SqliteCorpusStore::open(&paths.corpus_db_path()).await?;
    let corpus = store.load().await?;

    for record in store.records().await? {
        println!(
            "{:>4}  {:>4} {:>4} {:>4} {:>4}  {}",
            record.seq, record.math, record.science, record.art, record.communication, record.label
        );
    }
    println!();
    for (label, count) in corpus.count_by_label() {
        println!("{}: {}", label, count);
    }
    Ok(())
}
