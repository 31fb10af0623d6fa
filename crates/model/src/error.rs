use std::io;
use thiserror::Error;

/// Errors surfaced while fitting, scoring, or persisting a model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Solver or model parameters are out of range.
    #[error("invalid model config: {0}")]
    InvalidConfig(String),
    /// Training targets are not a usable binary labelling.
    #[error("invalid training targets: {0}")]
    InvalidTargets(String),
    /// Input vector length differs from the model's feature count.
    #[error("expected {expected} features, got {got}")]
    FeatureCountMismatch { expected: usize, got: usize },
    /// Input vector holds a NaN or infinity.
    #[error("feature {index} is not a finite number")]
    NonFiniteFeature { index: usize },
    /// Finite inputs that still drive the linear score to NaN or infinity.
    #[error("features produce a non-finite score")]
    NonFiniteScore,
    /// The Newton system could not be factorized.
    #[error("hessian is not positive definite")]
    Singular,
    /// Low-level IO failures while touching the artifact file.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// Artifact JSON could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Artifact was written by an incompatible format revision.
    #[error("unsupported artifact format version {0}")]
    UnsupportedVersion(u32),
    /// Artifact decoded but its parameters are inconsistent.
    #[error("corrupt model artifact: {0}")]
    CorruptArtifact(String),
}

impl ModelError {
    /// Whether the error was caused by the caller's input rather than the model.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ModelError::FeatureCountMismatch { .. }
                | ModelError::NonFiniteFeature { .. }
                | ModelError::NonFiniteScore
        )
    }
}
