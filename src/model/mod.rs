//! Model module - artifact loading, feature alignment and scoring

pub mod align;
pub mod artifact;
pub mod inference;
pub mod scoring;

use thiserror::Error;

// Re-export common types
pub use artifact::{ModelArtifact, ModelMeta, ModelSource};
pub use inference::{Classifier, OnnxClassifier};
pub use scoring::{BatchScoring, Scoring, ScoringService, DECISION_THRESHOLD};

/// Scoring failure on an otherwise well-formed record.
///
/// These cross the service boundary as client errors; they never crash the
/// process.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("unseen categorical value '{value}' for column '{column}'")]
    UnseenCategory { column: String, value: String },

    #[error("value {value} for column '{column}' is not coercible to a feature")]
    BadValue { column: String, value: String },

    #[error("model inference failed: {0}")]
    Inference(String),
}
