use crate::advisor::{DecisionResult, LabelSpace};
use crate::error::AppError;
use crate::models::Sample;
use tokio::sync::oneshot;

/// Summary returned after a successful retraining.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrainReport {
    /// Corpus size the new model was fitted on.
    pub samples: usize,
    /// Label space of the new model.
    pub label_space: LabelSpace,
}

/// Messages that can be sent to the `AdvisorActor`.
#[derive(Debug)]
pub enum AdvisorMessage {
    /// A request to recommend a career for one query sample.
    Decide {
        sample: Sample,
        /// A channel to send the decision back.
        responder: oneshot::Sender<Result<DecisionResult, AppError>>,
    },
    /// A request to refit the model on the current corpus and swap it in.
    Retrain {
        responder: oneshot::Sender<Result<RetrainReport, AppError>>,
    },
    /// A request for the current corpus size.
    CorpusLen {
        responder: oneshot::Sender<usize>,
    },
    /// A request for the label space of the live model.
    LabelSpace {
        responder: oneshot::Sender<LabelSpace>,
    },
    /// A command to stop the actor loop.
    Shutdown,
}
