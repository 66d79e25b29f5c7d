use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorrelationError {
    #[error("Failed to reserve conjugate scratch buffer of {len} samples")]
    ScratchAllocation { len: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, CorrelationError>;
