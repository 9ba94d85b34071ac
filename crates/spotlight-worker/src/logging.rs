//! Structured analysis logging utilities.
//!
//! Provides consistent, structured logging for per-video analysis with
//! tracing spans and contextual information.

use tracing::{error, info, warn, Span};
use uuid::Uuid;

/// Logger for one video's analysis run.
///
/// Every event carries the video ID, the operation and a run ID unique to
/// this run, so repeated analyses of the same video can be told apart.
#[derive(Debug, Clone)]
pub struct AnalysisLogger {
    video_id: String,
    operation: String,
    run_id: Uuid,
}

impl AnalysisLogger {
    /// Create a logger for a video and operation (e.g. "highlights").
    pub fn new(video_id: &str, operation: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            operation: operation.to_string(),
            run_id: Uuid::new_v4(),
        }
    }

    /// Log the start of an analysis.
    pub fn log_start(&self, message: &str) {
        info!(
            video_id = %self.video_id,
            operation = %self.operation,
            run_id = %self.run_id,
            "Analysis started: {}", message
        );
    }

    /// Log a warning during analysis.
    pub fn log_warning(&self, message: &str) {
        warn!(
            video_id = %self.video_id,
            operation = %self.operation,
            run_id = %self.run_id,
            "Analysis warning: {}", message
        );
    }

    /// Log an analysis failure.
    pub fn log_error(&self, message: &str) {
        error!(
            video_id = %self.video_id,
            operation = %self.operation,
            run_id = %self.run_id,
            "Analysis error: {}", message
        );
    }

    /// Log the completion of an analysis.
    pub fn log_completion(&self, message: &str) {
        info!(
            video_id = %self.video_id,
            operation = %self.operation,
            run_id = %self.run_id,
            "Analysis completed: {}", message
        );
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Create a tracing span for this run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "analysis",
            video_id = %self.video_id,
            operation = %self.operation,
            run_id = %self.run_id
        )
    }
}
