use crate::actors::messages::{AdvisorMessage, RetrainReport};
use crate::actors::traits::{CorpusStore, ModelArtifactStore};
use crate::advisor::{Classifier, DecisionEngine, DecisionResult, LabelSpace, TrainingOptions};
use crate::error::AppError;
use crate::models::Sample;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};
use tracing::{error, info, instrument, warn};

const DECIDE_TIMEOUT: Duration = Duration::from_secs(30);

/// A handle to the `AdvisorActor`.
///
/// The actor exclusively owns the `DecisionEngine` (and with it the corpus), so every
/// append is serialised through its mailbox. Handles are cheap to clone.
#[derive(Clone)]
pub struct AdvisorHandle {
    sender: mpsc::Sender<AdvisorMessage>,
}

/// Settings for the retraining path of the actor.
#[derive(Debug, Clone, Copy)]
pub struct RetrainSettings {
    pub options: TrainingOptions,
    pub timeout: Duration,
}

impl AdvisorHandle {
    /// Spawns the actor around an engine and its corpus store and returns a handle.
    ///
    /// # Arguments
    ///
    /// * `engine` - A decision engine with a fitted model and the loaded corpus.
    /// * `store` - The corpus store that receives every recorded sample.
    /// * `model_store` - Optional artifact store; retrained models are saved there.
    /// * `settings` - Training options and the retraining time bound.
    pub fn spawn<S>(
        engine: DecisionEngine,
        store: Arc<S>,
        model_store: Option<Arc<dyn ModelArtifactStore>>,
        settings: RetrainSettings,
    ) -> Self
    where
        S: CorpusStore,
    {
        let (sender, receiver) = mpsc::channel(32);
        let actor = AdvisorRunner {
            receiver,
            engine,
            store,
            model_store,
            settings,
        };
        tokio::spawn(async move { actor.run().await });
        Self { sender }
    }

    async fn send(&self, msg: AdvisorMessage) -> Result<(), AppError> {
        self.sender
            .send(msg)
            .await
            .map_err(|e| AppError::Actor(e.to_string()))
    }

    /// Recommends a career for `sample` and records it through the corpus store.
    #[instrument(skip(self))]
    pub async fn decide(&self, sample: Sample) -> Result<DecisionResult, AppError> {
        let (send, recv) = oneshot::channel();
        self.send(AdvisorMessage::Decide {
            sample,
            responder: send,
        })
        .await?;
        timeout(DECIDE_TIMEOUT, recv)
            .await
            .map_err(|_| AppError::Actor("decision timed out".to_string()))?
            .map_err(|e| AppError::Actor(e.to_string()))?
    }

    /// Refits the model on the current corpus and publishes it.
    ///
    /// On `TrainingTimeout` or any training error the previous model stays live.
    #[instrument(skip(self))]
    pub async fn retrain(&self) -> Result<RetrainReport, AppError> {
        let (send, recv) = oneshot::channel();
        self.send(AdvisorMessage::Retrain { responder: send }).await?;
        recv.await.map_err(|e| AppError::Actor(e.to_string()))?
    }

    pub async fn corpus_len(&self) -> Result<usize, AppError> {
        let (send, recv) = oneshot::channel();
        self.send(AdvisorMessage::CorpusLen { responder: send }).await?;
        recv.await.map_err(|e| AppError::Actor(e.to_string()))
    }

    pub async fn label_space(&self) -> Result<LabelSpace, AppError> {
        let (send, recv) = oneshot::channel();
        self.send(AdvisorMessage::LabelSpace { responder: send }).await?;
        recv.await.map_err(|e| AppError::Actor(e.to_string()))
    }

    pub async fn shutdown(&self) -> Result<(), AppError> {
        self.send(AdvisorMessage::Shutdown).await
    }
}

// --- Actor Runner ---
struct AdvisorRunner<S>
where
    S: CorpusStore,
{
    receiver: mpsc::Receiver<AdvisorMessage>,
    engine: DecisionEngine,
    store: Arc<S>,
    model_store: Option<Arc<dyn ModelArtifactStore>>,
    settings: RetrainSettings,
}

impl<S> AdvisorRunner<S>
where
    S: CorpusStore,
{
    async fn run(mut self) {
        info!("Advisor started");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                AdvisorMessage::Decide { sample, responder } => {
                    let result = self.handle_decide(sample).await;
                    if let Err(e) = &result {
                        error!("Error deciding sample: {}", e);
                    }
                    let _ = responder.send(result);
                }
                AdvisorMessage::Retrain { responder } => {
                    let result = self.handle_retrain().await;
                    if let Err(e) = &result {
                        warn!("Retraining failed, keeping previous model: {}", e);
                    }
                    let _ = responder.send(result);
                }
                AdvisorMessage::CorpusLen { responder } => {
                    let _ = responder.send(self.engine.corpus().len());
                }
                AdvisorMessage::LabelSpace { responder } => {
                    let _ = responder.send(self.engine.model().label_space().clone());
                }
                AdvisorMessage::Shutdown => break,
            }
        }
        info!("Advisor stopped");
    }

    async fn handle_decide(&mut self, sample: Sample) -> Result<DecisionResult, AppError> {
        let result = self.engine.recommend(&sample)?;
        if result.recorded_for_retraining {
            // The in-memory corpus only grows once the store has the sample.
            let recorded = DecisionEngine::recorded_sample(&sample);
            self.store.append_and_persist(&recorded).await?;
            self.engine.record(&sample)?;
        }
        info!("{} (recorded: {})", result, result.recorded_for_retraining);
        Ok(result)
    }

    async fn handle_retrain(&mut self) -> Result<RetrainReport, AppError> {
        let corpus = self.engine.corpus().clone();
        let samples = corpus.len();
        let options = self.settings.options;
        let task = tokio::task::spawn_blocking(move || Classifier::new(options).fit(&corpus));

        let model = match timeout(self.settings.timeout, task).await {
            Ok(Ok(fitted)) => fitted?,
            Ok(Err(join_err)) => return Err(AppError::Internal(join_err.to_string())),
            Err(_) => return Err(AppError::TrainingTimeout(self.settings.timeout)),
        };

        let model = Arc::new(model);
        if let Some(model_store) = &self.model_store {
            model_store.save_model(&model).await?;
        }
        let label_space = model.label_space().clone();
        self.engine.replace_model(model);

        Ok(RetrainReport {
            samples,
            label_space,
        })
    }
}
