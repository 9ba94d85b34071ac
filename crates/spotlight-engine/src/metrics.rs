//! Highlight engine metrics.
//!
//! - Detection counters by outcome
//! - Selected segment counts and durations
//! - Selector fallbacks and cache lookups

use metrics::{counter, histogram};

// =============================================================================
// Metric Names
// =============================================================================

/// Metric name constants for consistency.
pub mod names {
    /// Completed detections by outcome (threshold, relaxed, rank_fallback, empty).
    pub const DETECTIONS_TOTAL: &str = "highlight_detections_total";

    /// Segments in final selections.
    pub const SEGMENTS_SELECTED_TOTAL: &str = "highlight_segments_selected_total";

    /// Total selected duration per run, in seconds.
    pub const SELECTED_DURATION_SECONDS: &str = "highlight_selected_duration_seconds";

    /// Selector fallbacks by wrapped selector and reason.
    pub const SELECTOR_FALLBACKS_TOTAL: &str = "highlight_selector_fallbacks_total";

    /// Cache lookups by result (hit, miss).
    pub const CACHE_LOOKUPS_TOTAL: &str = "highlight_cache_lookups_total";
}

// =============================================================================
// Recording Functions
// =============================================================================

/// Record a finished pipeline run.
pub fn record_detection(outcome: &str, segments: usize, duration_secs: u32) {
    counter!(
        names::DETECTIONS_TOTAL,
        "outcome" => outcome.to_string()
    )
    .increment(1);

    counter!(names::SEGMENTS_SELECTED_TOTAL).increment(segments as u64);
    histogram!(names::SELECTED_DURATION_SECONDS).record(duration_secs as f64);
}

/// Record the statistical engine standing in for another selector.
pub fn record_fallback(selector: &str, reason: &str) {
    counter!(
        names::SELECTOR_FALLBACKS_TOTAL,
        "selector" => selector.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Record a cache lookup.
pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!(names::CACHE_LOOKUPS_TOTAL, "result" => result).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert!(names::DETECTIONS_TOTAL.ends_with("_total"));
        assert!(names::SEGMENTS_SELECTED_TOTAL.contains("segments"));
        assert!(names::SELECTED_DURATION_SECONDS.contains("duration"));
        assert!(names::SELECTOR_FALLBACKS_TOTAL.contains("fallbacks"));
        assert!(names::CACHE_LOOKUPS_TOTAL.contains("cache"));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_detection("threshold", 2, 120);
        record_fallback("llm", "error");
        record_cache_lookup(true);
    }
}
