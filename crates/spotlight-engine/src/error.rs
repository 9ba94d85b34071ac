//! Engine error types.
//!
//! Degenerate inputs (no signal data, no qualifying runs, a budget too small
//! for one segment) are not errors: they yield an empty result. These
//! variants cover real faults.

use thiserror::Error;

use crate::validate::InvariantViolation;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Keyword data error: {0}")]
    Keywords(String),

    #[error("Selection strategy '{strategy}' failed: {message}")]
    Strategy { strategy: String, message: String },

    #[error("Result violates invariant: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl EngineError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn keywords(msg: impl Into<String>) -> Self {
        Self::Keywords(msg.into())
    }

    pub fn strategy(strategy: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Strategy {
            strategy: strategy.into(),
            message: msg.into(),
        }
    }
}
