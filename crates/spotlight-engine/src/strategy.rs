//! Pluggable highlight selection.
//!
//! [`StatisticalSelector`] runs the built-in pipeline. Other selectors (for
//! example a model-driven one) can be wrapped in [`FallbackSelector`], which
//! falls back to the statistical pipeline whenever they fail or return
//! something unusable. [`CachingSelector`] memoizes any selector.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use spotlight_models::{DurationBounds, HighlightResult, SignalInputs};

use crate::cache::HighlightCache;
use crate::engine::HighlightEngine;
use crate::error::{EngineError, EngineResult};
use crate::metrics;
use crate::validate::check_result;

/// Everything a selector needs for one video.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionRequest {
    pub video_id: String,
    pub signals: SignalInputs,
    #[serde(default)]
    pub bounds: DurationBounds,
}

impl SelectionRequest {
    pub fn new(video_id: impl Into<String>, signals: SignalInputs, bounds: DurationBounds) -> Self {
        Self {
            video_id: video_id.into(),
            signals,
            bounds,
        }
    }
}

/// A strategy that picks highlight segments for a video.
pub trait HighlightSelector: Send + Sync {
    /// Short name for logs and metrics.
    fn name(&self) -> &str;

    fn select(&self, request: &SelectionRequest) -> EngineResult<HighlightResult>;
}

impl<S: HighlightSelector + ?Sized> HighlightSelector for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn select(&self, request: &SelectionRequest) -> EngineResult<HighlightResult> {
        (**self).select(request)
    }
}

impl<S: HighlightSelector + ?Sized> HighlightSelector for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn select(&self, request: &SelectionRequest) -> EngineResult<HighlightResult> {
        (**self).select(request)
    }
}

// =============================================================================
// Statistical
// =============================================================================

/// The statistical fusion pipeline.
#[derive(Debug, Clone, Default)]
pub struct StatisticalSelector {
    engine: HighlightEngine,
}

impl StatisticalSelector {
    pub fn new(engine: HighlightEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &HighlightEngine {
        &self.engine
    }
}

impl HighlightSelector for StatisticalSelector {
    fn name(&self) -> &str {
        "statistical"
    }

    fn select(&self, request: &SelectionRequest) -> EngineResult<HighlightResult> {
        debug!(video_id = %request.video_id, "Running statistical selection");
        Ok(self.engine.analyze(&request.signals, &request.bounds))
    }
}

// =============================================================================
// Fallback
// =============================================================================

/// Runs `primary`, using the statistical pipeline when it errors, returns no
/// segments, or returns segments that break the selection rules.
pub struct FallbackSelector<P> {
    primary: P,
    fallback: StatisticalSelector,
    name: String,
}

impl<P: HighlightSelector> FallbackSelector<P> {
    pub fn new(primary: P, fallback: StatisticalSelector) -> Self {
        let name = format!("{}+{}", primary.name(), fallback.name());
        Self {
            primary,
            fallback,
            name,
        }
    }

    /// Primary output, with rule-breaking output turned into
    /// [`EngineError::Invariant`].
    fn select_primary(&self, request: &SelectionRequest) -> EngineResult<HighlightResult> {
        let result = self.primary.select(request)?;
        if !result.is_empty() {
            let overlap_limit = self.fallback.engine().config().dedup_overlap_secs;
            check_result(&result, &request.bounds, overlap_limit)?;
        }
        Ok(result)
    }

    fn fall_back(
        &self,
        request: &SelectionRequest,
        reason: &'static str,
    ) -> EngineResult<HighlightResult> {
        metrics::record_fallback(self.primary.name(), reason);
        self.fallback.select(request)
    }
}

impl<P: HighlightSelector> HighlightSelector for FallbackSelector<P> {
    fn name(&self) -> &str {
        &self.name
    }

    fn select(&self, request: &SelectionRequest) -> EngineResult<HighlightResult> {
        match self.select_primary(request) {
            Ok(result) if result.is_empty() => {
                warn!(
                    video_id = %request.video_id,
                    selector = self.primary.name(),
                    "Selector returned no highlights, using statistical selection"
                );
                self.fall_back(request, "empty")
            }
            Ok(result) => Ok(result),
            Err(EngineError::Invariant(violation)) => {
                warn!(
                    video_id = %request.video_id,
                    selector = self.primary.name(),
                    %violation,
                    "Selector output rejected, using statistical selection"
                );
                self.fall_back(request, "invariant")
            }
            Err(e) => {
                warn!(
                    video_id = %request.video_id,
                    selector = self.primary.name(),
                    error = %e,
                    "Selector failed, using statistical selection"
                );
                self.fall_back(request, "error")
            }
        }
    }
}

// =============================================================================
// Caching
// =============================================================================

/// Serves repeated requests for the same video and bounds from a cache.
///
/// Only successful results are cached.
pub struct CachingSelector<S> {
    inner: S,
    cache: Arc<HighlightCache>,
}

impl<S: HighlightSelector> CachingSelector<S> {
    pub fn new(inner: S, cache: Arc<HighlightCache>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &HighlightCache {
        &self.cache
    }
}

impl<S: HighlightSelector> HighlightSelector for CachingSelector<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn select(&self, request: &SelectionRequest) -> EngineResult<HighlightResult> {
        if let Some(cached) = self.cache.get(&request.video_id, &request.bounds) {
            debug!(video_id = %request.video_id, "Using cached highlights");
            return Ok(cached);
        }

        let result = self.inner.select(request)?;
        self.cache
            .insert(&request.video_id, &request.bounds, result.clone());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use spotlight_models::{DetectionOutcome, Segment, TimeSeries};

    use crate::validate::InvariantViolation;

    /// Selector returning a fixed outcome and counting calls.
    struct Scripted {
        output: Option<HighlightResult>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn returning(result: HighlightResult) -> Self {
            Self {
                output: Some(result),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                output: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl HighlightSelector for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn select(&self, _request: &SelectionRequest) -> EngineResult<HighlightResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.output
                .clone()
                .ok_or_else(|| EngineError::strategy("scripted", "model unavailable"))
        }
    }

    fn request() -> SelectionRequest {
        // Flat retention only: the statistical pipeline ends in rank fallback
        let signals = SignalInputs {
            video_duration_secs: 900,
            retention: Some((0..30u32).map(|i| (i * 30, 0.2)).collect::<TimeSeries>()),
            ..Default::default()
        };
        SelectionRequest::new("vid-1", signals, DurationBounds::default())
    }

    fn valid_result() -> HighlightResult {
        HighlightResult::new(
            vec![Segment::new(200, 260, 0.9), Segment::new(400, 480, 0.8)],
            DetectionOutcome::Threshold { threshold: 0.7 },
        )
    }

    #[test]
    fn test_statistical_selector() {
        let selector = StatisticalSelector::default();
        let result = selector.select(&request()).unwrap();

        assert_eq!(selector.name(), "statistical");
        assert_eq!(result.outcome, DetectionOutcome::RankFallback);
        assert!(!result.is_empty());
    }

    #[test]
    fn test_fallback_keeps_valid_primary_output() {
        let selector =
            FallbackSelector::new(Scripted::returning(valid_result()), StatisticalSelector::default());
        assert_eq!(selector.name(), "scripted+statistical");
        assert_eq!(selector.select(&request()).unwrap(), valid_result());
    }

    #[test]
    fn test_fallback_on_error() {
        let selector = FallbackSelector::new(Scripted::failing(), StatisticalSelector::default());
        let result = selector.select(&request()).unwrap();
        assert_eq!(result.outcome, DetectionOutcome::RankFallback);
    }

    #[test]
    fn test_fallback_on_empty_output() {
        let selector = FallbackSelector::new(
            Scripted::returning(HighlightResult::empty()),
            StatisticalSelector::default(),
        );
        let result = selector.select(&request()).unwrap();
        assert!(!result.is_empty());
    }

    #[test]
    fn test_fallback_on_invalid_output() {
        // Overlapping, unordered and inside the skipped opening
        let bad = HighlightResult::new(
            vec![Segment::new(100, 160, 0.9), Segment::new(90, 150, 0.8)],
            DetectionOutcome::Threshold { threshold: 0.7 },
        );
        let selector = FallbackSelector::new(Scripted::returning(bad), StatisticalSelector::default());
        let result = selector.select(&request()).unwrap();
        assert_eq!(result.outcome, DetectionOutcome::RankFallback);
    }

    #[test]
    fn test_rejected_primary_output_is_invariant_error() {
        let bad = HighlightResult::new(
            vec![Segment::new(300, 360, 0.9), Segment::new(200, 260, 0.8)],
            DetectionOutcome::Threshold { threshold: 0.7 },
        );
        let selector = FallbackSelector::new(Scripted::returning(bad), StatisticalSelector::default());

        let err = selector.select_primary(&request()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Invariant(InvariantViolation::OutOfOrder { .. })
        ));
        assert!(err.to_string().starts_with("Result violates invariant"));

        // Empty output is not a violation; it falls back on its own path
        let selector = FallbackSelector::new(
            Scripted::returning(HighlightResult::empty()),
            StatisticalSelector::default(),
        );
        assert!(selector.select_primary(&request()).unwrap().is_empty());
    }

    #[test]
    fn test_caching_selector_calls_inner_once() {
        let inner = Arc::new(Scripted::returning(valid_result()));
        let selector = CachingSelector::new(inner.clone(), Arc::new(HighlightCache::default()));

        let first = selector.select(&request()).unwrap();
        let second = selector.select(&request()).unwrap();

        assert_eq!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(selector.cache().len(), 1);
    }

    #[test]
    fn test_caching_selector_does_not_cache_errors() {
        let inner = Arc::new(Scripted::failing());
        let selector = CachingSelector::new(inner.clone(), Arc::new(HighlightCache::default()));

        assert!(selector.select(&request()).is_err());
        assert!(selector.select(&request()).is_err());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert!(selector.cache().is_empty());
    }
}
