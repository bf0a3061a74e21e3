use crate::types::{Classification, Segment};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No behavioral profile registered for {segment}/{classification}")]
    Configuration {
        segment:        Segment,
        classification: Classification,
    },

    #[error("Malformed profile {segment}/{classification}: {reason}")]
    InvalidProfile {
        segment:        Segment,
        classification: Classification,
        reason:         String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invariant violated: {detail} [inputs: {inputs}]")]
    InvariantViolation { detail: String, inputs: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
