use thiserror::Error as ThisError;

/// Error type for layered
#[derive(ThisError, Debug, PartialEq, Clone)]
pub enum Error {
    /// Indicates some dimension is incorrect in a matrix, network or example.
    #[error("shape mismatch during {operation}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        operation: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    /// A batch computation was handed zero examples.
    #[error("cannot compute the gradient of an empty batch")]
    EmptyBatch,
    #[error("invalid network: {0}")]
    InvalidNetwork(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The worker pool of a parallel computation could not be started.
    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
    #[error("unknown activation function `{0}`")]
    UnknownActivation(String),
    #[error("unknown cost function `{0}`")]
    UnknownCost(String),
}

pub type Result<T> = std::result::Result<T, Error>;
