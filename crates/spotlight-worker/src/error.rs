//! Worker error types.

use thiserror::Error;

use spotlight_engine::EngineError;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Analysis task failed: {0}")]
    TaskFailed(String),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn task_failed(msg: impl Into<String>) -> Self {
        Self::TaskFailed(msg.into())
    }

    /// Check if error is retryable.
    ///
    /// Bad input stays bad; a crashed task or a transient read failure may not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WorkerError::TaskFailed(_)
                | WorkerError::Io(_)
                | WorkerError::Engine(EngineError::Strategy { .. })
        )
    }
}
