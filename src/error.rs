//! Error types for grid access, selections and transform execution.

use thiserror::Error;

/// Errors raised by the grid, selection and execution layers.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Coordinate outside the grid extent
    #[error("coordinate ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    /// Aggregate requested on a selection with no members
    #[error("operation requires a non-empty selection")]
    EmptySelection,
    /// A transform aborted while visiting or processing the image
    #[error("transform '{transform}' failed: {message}")]
    TransformFailure { transform: String, message: String },
    /// Handle used out of order (result before success, double submit)
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Rejected configuration values
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The worker thread could not be started
    #[error("failed to spawn transform worker: {0}")]
    Spawn(#[from] std::io::Error),
}

impl TransformError {
    pub fn failure(transform: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransformFailure {
            transform: transform.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for TransformError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;

/// Errors raised while running a multi-stage pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A stage finished in the failure state
    #[error("stage '{stage}' failed: {}", messages.join("; "))]
    StageFailed { stage: String, messages: Vec<String> },
    /// A stage did not finish within the configured wait
    #[error("stage '{stage}' did not finish within the stage timeout")]
    StageTimedOut { stage: String },
    #[error(transparent)]
    Transform(#[from] TransformError),
}
