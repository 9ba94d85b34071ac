//! The highlight pipeline: fusion, detection, deduplication, budget.

use std::sync::Arc;

use tracing::{debug, info};

use spotlight_models::{DurationBounds, HighlightResult, SignalInputs, TimeSeries};

use crate::budget::select_within_budget;
use crate::config::EngineConfig;
use crate::dedup::deduplicate;
use crate::detector::detect;
use crate::error::EngineResult;
use crate::fusion::fuse;
use crate::metrics;
use crate::normalize::{comment_scores, secondary_scores};

/// Statistical highlight engine.
///
/// Stateless apart from its configuration; cloning is cheap and a single
/// engine can serve concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct HighlightEngine {
    config: Arc<EngineConfig>,
}

impl HighlightEngine {
    /// Create an engine, rejecting unusable configuration.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Create an engine from environment variables.
    pub fn from_env() -> EngineResult<Self> {
        Self::new(EngineConfig::from_env()?)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Select highlights from already-normalized signals.
    ///
    /// All series are keyed by bucket start time. `retention` may be absent
    /// when the producer has no retention data.
    pub fn compute_highlights(
        &self,
        comment: &TimeSeries,
        secondary: &TimeSeries,
        retention: Option<&TimeSeries>,
        bounds: &DurationBounds,
    ) -> HighlightResult {
        let fused = fuse(comment, secondary, retention, &self.config.weights);
        debug!(
            comment_buckets = comment.len(),
            secondary_buckets = secondary.len(),
            retention_buckets = retention.map_or(0, TimeSeries::len),
            fused_buckets = fused.len(),
            "Fused signals"
        );
        self.detect_from_fused(&fused, bounds)
    }

    /// Select highlights from a fused score series.
    pub fn detect_from_fused(&self, fused: &TimeSeries, bounds: &DurationBounds) -> HighlightResult {
        let detection = detect(fused, bounds, &self.config);
        let deduped = deduplicate(&detection.candidates, self.config.dedup_overlap_secs);
        debug!(
            candidates = detection.candidates.len(),
            kept = deduped.len(),
            "Deduplicated candidates"
        );

        let selected = select_within_budget(&deduped, bounds);
        let result = HighlightResult::new(selected, detection.outcome);

        let total_secs = result.total_duration();
        metrics::record_detection(result.outcome.as_str(), result.len(), total_secs);
        info!(
            outcome = result.outcome.as_str(),
            segments = result.len(),
            total_secs,
            target_secs = bounds.target_secs,
            "Highlight selection complete"
        );

        result
    }

    /// Normalize raw signal data and select highlights.
    pub fn analyze(&self, inputs: &SignalInputs, bounds: &DurationBounds) -> HighlightResult {
        let duration = inputs.video_duration_secs;
        let comment = comment_scores(&inputs.comments, duration, &self.config);
        let secondary = secondary_scores(&inputs.secondary, duration);
        debug!(
            video_duration_secs = duration,
            secondary_kind = inputs.secondary.kind(),
            has_retention = inputs.retention.is_some(),
            "Normalized raw signals"
        );
        self.compute_highlights(&comment, &secondary, inputs.retention.as_ref(), bounds)
    }
}

/// [`HighlightEngine::compute_highlights`] with the default configuration.
pub fn compute_highlights(
    comment: &TimeSeries,
    secondary: &TimeSeries,
    retention: Option<&TimeSeries>,
    bounds: &DurationBounds,
) -> HighlightResult {
    HighlightEngine::default().compute_highlights(comment, secondary, retention, bounds)
}
