//! Bounded-concurrency batch analysis.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, Instrument};

use spotlight_engine::{
    CachingSelector, HighlightCache, HighlightEngine, HighlightSelector, StatisticalSelector,
};
use spotlight_models::{DurationBounds, HighlightsReport};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::AnalysisLogger;
use crate::metrics;
use crate::request::AnalysisRequest;

/// Runs analysis requests through a selector, a bounded number at a time.
///
/// Selection is CPU-bound, so each request runs on the blocking pool while
/// holding a semaphore permit.
pub struct BatchRunner {
    selector: Arc<dyn HighlightSelector>,
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
    default_bounds: DurationBounds,
}

impl BatchRunner {
    pub fn new(selector: Arc<dyn HighlightSelector>, config: &WorkerConfig) -> Self {
        let max_concurrent = config.max_concurrent.max(1);
        Self {
            selector,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            default_bounds: config.default_bounds,
        }
    }

    /// Statistical selection with engine settings from the environment,
    /// cached when the config enables it.
    pub fn from_config(config: &WorkerConfig) -> WorkerResult<Self> {
        let statistical = StatisticalSelector::new(HighlightEngine::from_env()?);

        let selector: Arc<dyn HighlightSelector> = if config.cache_enabled {
            let cache = HighlightCache::new(config.cache_ttl, config.cache_max_entries);
            Arc::new(CachingSelector::new(statistical, Arc::new(cache)))
        } else {
            Arc::new(statistical)
        };

        Ok(Self::new(selector, config))
    }

    pub fn selector_name(&self) -> &str {
        self.selector.name()
    }

    /// Analyze one video.
    pub async fn run_one(&self, request: AnalysisRequest) -> WorkerResult<HighlightsReport> {
        let result = self.analyze(request).await;
        metrics::record_request(match &result {
            Ok(_) => "ok",
            Err(WorkerError::InvalidRequest(_)) => "invalid",
            Err(_) => "failed",
        });
        result
    }

    async fn analyze(&self, request: AnalysisRequest) -> WorkerResult<HighlightsReport> {
        let logger = AnalysisLogger::new(&request.video_id, "highlights");
        let span = logger.create_span();

        async {
            if let Err(e) = request.validate(&self.default_bounds) {
                logger.log_error(&e.to_string());
                return Err(e);
            }

            let _permit = self
                .semaphore
                .acquire()
                .await
                .map_err(|_| WorkerError::task_failed("worker is shutting down"))?;

            logger.log_start(&format!(
                "{} comments, {} secondary signal",
                request.comments.len(),
                request.secondary.kind()
            ));

            let video_id = request.video_id.clone();
            let selection = request.into_selection(&self.default_bounds);
            let selector = Arc::clone(&self.selector);

            let outcome = tokio::task::spawn_blocking(move || selector.select(&selection))
                .await
                .map_err(|e| WorkerError::task_failed(e.to_string()));

            let result = match outcome {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => {
                    logger.log_error(&e.to_string());
                    return Err(e.into());
                }
                Err(e) => {
                    logger.log_error(&e.to_string());
                    return Err(e);
                }
            };

            let report =
                HighlightsReport::from_result(video_id, &result).with_selector(self.selector.name());

            if report.is_empty() {
                logger.log_warning("no highlights found");
            } else {
                logger.log_completion(&format!(
                    "{} highlights, {}s ({})",
                    report.highlights.len(),
                    report.total_duration_secs,
                    report.outcome.as_str()
                ));
            }

            Ok(report)
        }
        .instrument(span)
        .await
    }

    /// Analyze every request; results keep the order of `requests`.
    pub async fn run_batch(
        &self,
        requests: Vec<AnalysisRequest>,
    ) -> Vec<WorkerResult<HighlightsReport>> {
        let total = requests.len();
        info!(
            requests = total,
            max_concurrent = self.max_concurrent,
            selector = self.selector.name(),
            "Starting batch analysis"
        );

        let results = join_all(requests.into_iter().map(|r| self.run_one(r))).await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(requests = total, failed, "Batch analysis finished");
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotlight_models::TimeSeries;

    fn request(video_id: &str) -> AnalysisRequest {
        AnalysisRequest {
            video_id: video_id.to_string(),
            video_duration_secs: 600,
            comments: Vec::new(),
            secondary: Default::default(),
            retention: Some((0..20u32).map(|i| (i * 30, 0.5)).collect::<TimeSeries>()),
            bounds: None,
        }
    }

    #[test]
    fn test_run_one_blocking() {
        let runner = BatchRunner::new(
            Arc::new(StatisticalSelector::default()),
            &WorkerConfig::default(),
        );

        let report = tokio_test::block_on(runner.run_one(request("abc"))).unwrap();
        assert_eq!(report.video_id, "abc");
        assert_eq!(report.selector.as_deref(), Some("statistical"));
        assert!(!report.is_empty());
    }

    #[test]
    fn test_invalid_request_rejected_before_selection() {
        let runner = BatchRunner::new(
            Arc::new(StatisticalSelector::default()),
            &WorkerConfig::default(),
        );

        let err = tokio_test::block_on(runner.run_one(request(""))).unwrap_err();
        assert!(matches!(err, WorkerError::InvalidRequest(_)));
    }
}
