//! Error taxonomy for the segmentation demo

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A model artifact is missing, unreadable, or structurally incompatible.
    /// Fatal at startup; the process cannot serve predictions without it.
    #[error("Artifact load failed: {0}")]
    ArtifactLoad(String),

    /// A delegated scaler/classifier/explainer call failed at request time.
    #[error("Inference failed: {0}")]
    Inference(String),

    /// An encoded vector's width disagrees with what the artifacts were
    /// fitted on. Configuration fault, not recoverable per request.
    #[error("Invalid feature dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Classifier returned an index outside the label table's domain.
    /// Indicates the classifier and table are out of sync.
    #[error("Unknown cluster index: {0}")]
    UnknownCluster(usize),

    /// Request-level validation failure, rejected before inference runs.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
