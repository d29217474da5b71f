use crate::workflow::WorkflowState;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChurnError {
    #[error("Invalid value for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Gateway error: {cause}")]
    Gateway { cause: String },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Workflow busy: command rejected while {state:?}")]
    Busy { state: WorkflowState },

    #[error("No baseline prediction: submit before simulating")]
    NoBaseline,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChurnError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), reason: reason.into() }
    }

    pub fn gateway(cause: impl Into<String>) -> Self {
        Self::Gateway { cause: cause.into() }
    }
}

pub type ChurnResult<T> = Result<T, ChurnError>;
