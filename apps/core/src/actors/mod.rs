//! Actor layer: a single-writer owner of the decision engine.

pub mod advisor;
pub mod messages;
pub mod traits;

pub use advisor::{AdvisorHandle, RetrainSettings};
pub use messages::{AdvisorMessage, RetrainReport};
pub use traits::{CorpusStore, ModelArtifactStore};
