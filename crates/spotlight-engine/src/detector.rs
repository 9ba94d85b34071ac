//! Threshold-run detection over a fused score series.
//!
//! # State Machine
//!
//! ```text
//!                     score >= threshold
//!     ┌───────────────────────────────────────────────┐
//!     │                                               ▼
//! ┌─────────┐                                   ┌──────────┐
//! │ Outside │                                   │  Inside  │──┐ score >= threshold:
//! └─────────┘                                   └──────────┘◄─┘ accumulate
//!     ▲                                               │
//!     └───────────────────────────────────────────────┘
//!        score < threshold (or end of series): close run,
//!        commit if min_segment <= end - start <= max_segment
//! ```
//!
//! # Degradation
//!
//! 1. Primary pass at `min_highlight_score`.
//! 2. If nothing qualifies, rerun at each relaxation threshold in turn.
//! 3. If still nothing, build fixed windows around top-ranked buckets.

use tracing::{debug, warn};

use spotlight_models::{DetectionOutcome, DurationBounds, Segment, TimeSeries};

use crate::config::EngineConfig;

/// Candidates produced by the detector.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Candidate segments in detection order
    pub candidates: Vec<Segment>,
    /// Which detection path produced them
    pub outcome: DetectionOutcome,
}

impl Detection {
    fn empty() -> Self {
        Self {
            candidates: Vec::new(),
            outcome: DetectionOutcome::Empty,
        }
    }
}

/// Internal state for the run detector.
enum RunState {
    /// Below threshold.
    Outside,
    /// Inside a run that started at `run_start`.
    Inside { run_start: u32, sum: f64, count: usize },
}

/// Converts an ascending stream of `(timestamp, score)` into threshold runs.
pub struct RunDetector {
    threshold: f64,
    min_duration: u32,
    max_duration: u32,
    state: RunState,
    last_timestamp: Option<u32>,
    segments: Vec<Segment>,
    dropped: usize,
}

impl RunDetector {
    pub fn new(threshold: f64, bounds: &DurationBounds) -> Self {
        Self {
            threshold,
            min_duration: bounds.min_segment_secs,
            max_duration: bounds.max_segment_secs,
            state: RunState::Outside,
            last_timestamp: None,
            segments: Vec::new(),
            dropped: 0,
        }
    }

    /// Process the next bucket. Timestamps must be ascending.
    pub fn ingest(&mut self, timestamp: u32, score: f64) {
        let above = score >= self.threshold;

        match self.state {
            RunState::Outside if above => {
                self.state = RunState::Inside {
                    run_start: timestamp,
                    sum: score,
                    count: 1,
                };
            }
            RunState::Inside {
                ref mut sum,
                ref mut count,
                ..
            } if above => {
                *sum += score;
                *count += 1;
            }
            RunState::Inside { .. } => {
                // The first bucket below threshold marks the run's end.
                self.close_run(timestamp);
            }
            RunState::Outside => {}
        }

        self.last_timestamp = Some(timestamp);
    }

    /// Close any open run at the last seen timestamp and return committed segments.
    pub fn finalize(mut self) -> Vec<Segment> {
        if let Some(last) = self.last_timestamp {
            self.close_run(last);
        }

        if self.dropped > 0 {
            debug!(
                threshold = self.threshold,
                dropped = self.dropped,
                kept = self.segments.len(),
                "Dropped runs outside segment length limits"
            );
        }

        self.segments
    }

    /// Number of runs committed so far.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    fn close_run(&mut self, run_end: u32) {
        let RunState::Inside {
            run_start,
            sum,
            count,
        } = std::mem::replace(&mut self.state, RunState::Outside)
        else {
            return;
        };

        let duration = run_end.saturating_sub(run_start);
        if self.min_duration <= duration && duration <= self.max_duration {
            self.segments
                .push(Segment::new(run_start, run_end, sum / count as f64));
        } else {
            self.dropped += 1;
        }
    }
}

/// Run the state machine once over `series` at `threshold`.
pub fn detect_runs(series: &TimeSeries, threshold: f64, bounds: &DurationBounds) -> Vec<Segment> {
    let mut detector = RunDetector::new(threshold, bounds);
    for (timestamp, score) in series.iter() {
        detector.ingest(timestamp, score);
    }
    detector.finalize()
}

/// Detect candidate segments with threshold relaxation and rank fallback.
pub fn detect(fused: &TimeSeries, bounds: &DurationBounds, config: &EngineConfig) -> Detection {
    // Openings carry structurally inflated retention and engagement
    let series = fused.starting_at(bounds.skip_start_secs);
    if series.is_empty() {
        debug!(
            skip_start_secs = bounds.skip_start_secs,
            buckets = fused.len(),
            "No scores left after skipping the opening"
        );
        return Detection::empty();
    }

    let primary = detect_runs(&series, config.min_highlight_score, bounds);
    if !primary.is_empty() {
        debug!(
            threshold = config.min_highlight_score,
            candidates = primary.len(),
            "Detected highlight runs"
        );
        return Detection {
            candidates: primary,
            outcome: DetectionOutcome::Threshold {
                threshold: config.min_highlight_score,
            },
        };
    }

    warn!(
        threshold = config.min_highlight_score,
        "No highlight runs at configured threshold, relaxing"
    );

    for &threshold in &config.relaxation_thresholds {
        let runs = detect_runs(&series, threshold, bounds);
        if !runs.is_empty() {
            debug!(threshold, candidates = runs.len(), "Detected runs at relaxed threshold");
            return Detection {
                candidates: runs,
                outcome: DetectionOutcome::Relaxed { threshold },
            };
        }
    }

    let fallback = rank_fallback(&series, bounds, config);
    warn!(
        candidates = fallback.len(),
        "No runs at any threshold, using top-ranked buckets"
    );
    Detection {
        candidates: fallback,
        outcome: DetectionOutcome::RankFallback,
    }
}

/// Fixed windows around top-ranked buckets, spread by striding the ranking.
///
/// Picks `max(fallback_min_picks, target / max_segment)` buckets at a stride
/// of `len / (2 * picks)` through the score-descending order and centers a
/// `2 * fallback_half_window_secs` window on each, clamped to the series and
/// never reaching back into the skipped opening. A window that collapses
/// (a lone bucket at the skip point) extends forward by the half-width.
pub fn rank_fallback(
    series: &TimeSeries,
    bounds: &DurationBounds,
    config: &EngineConfig,
) -> Vec<Segment> {
    let Some(last_timestamp) = series.last_timestamp() else {
        return Vec::new();
    };

    let mut ranked: Vec<(u32, f64)> = series.iter().collect();
    // Stable: equal scores keep ascending timestamp order
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let budget_picks = bounds
        .target_secs
        .checked_div(bounds.max_segment_secs)
        .unwrap_or(0) as usize;
    let picks = config.fallback_min_picks.max(budget_picks).max(1);
    let stride = (ranked.len() / (2 * picks)).max(1);
    let half = config.fallback_half_window_secs;

    ranked
        .iter()
        .step_by(stride)
        .take(picks)
        .filter_map(|&(t, score)| {
            let start = t.saturating_sub(half).max(bounds.skip_start_secs);
            let mut end = t.saturating_add(half).min(last_timestamp);
            if end <= start {
                end = start.saturating_add(half);
            }
            (start < end).then(|| Segment::new(start, end, score))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(pairs: &[(u32, f64)]) -> TimeSeries {
        pairs.iter().copied().collect()
    }

    fn bounds(min: u32, max: u32, target: u32, skip: u32) -> DurationBounds {
        DurationBounds {
            target_secs: target,
            min_segment_secs: min,
            max_segment_secs: max,
            skip_start_secs: skip,
        }
    }

    #[test]
    fn test_run_ends_at_first_low_bucket() {
        let s = series(&[(0, 0.9), (30, 0.9), (60, 0.2), (900, 0.95), (930, 0.9), (960, 0.2)]);
        let runs = detect_runs(&s, 0.7, &bounds(30, 90, 120, 0));

        assert_eq!(runs.len(), 2);
        assert_eq!((runs[0].start, runs[0].end), (0, 60));
        assert!((runs[0].score - 0.9).abs() < 1e-9);
        assert_eq!((runs[1].start, runs[1].end), (900, 960));
        assert!((runs[1].score - 0.925).abs() < 1e-9);
    }

    #[test]
    fn test_run_closed_at_end_of_series() {
        let s = series(&[(0, 0.1), (30, 0.8), (60, 0.8), (90, 0.9)]);
        let runs = detect_runs(&s, 0.7, &bounds(30, 90, 600, 0));

        assert_eq!(runs.len(), 1);
        assert_eq!((runs[0].start, runs[0].end), (30, 90));
        assert!((runs[0].score - 2.5 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_runs_outside_limits_dropped_not_truncated() {
        // 0..30 is too short, 100..300 too long
        let s = series(&[
            (0, 0.9),
            (30, 0.1),
            (100, 0.9),
            (200, 0.9),
            (300, 0.1),
        ]);
        let runs = detect_runs(&s, 0.7, &bounds(45, 90, 600, 0));
        assert!(runs.is_empty());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let s = series(&[(0, 0.7), (30, 0.7), (60, 0.0)]);
        let runs = detect_runs(&s, 0.7, &bounds(30, 90, 600, 0));
        assert_eq!(runs.len(), 1);
    }

    #[test]
    fn test_detector_incremental() {
        let b = bounds(30, 90, 600, 0);
        let mut detector = RunDetector::new(0.5, &b);
        detector.ingest(0, 0.6);
        detector.ingest(30, 0.6);
        assert_eq!(detector.segment_count(), 0);
        detector.ingest(60, 0.1);
        assert_eq!(detector.segment_count(), 1);
        assert_eq!(detector.finalize().len(), 1);
    }

    #[test]
    fn test_skip_prefix_emptying_series() {
        let s = series(&[(0, 0.9), (30, 0.9), (60, 0.9)]);
        let detection = detect(&s, &bounds(30, 90, 600, 120), &EngineConfig::default());
        assert_eq!(detection, Detection::empty());
    }

    #[test]
    fn test_primary_pass_outcome() {
        let s = series(&[(120, 0.8), (150, 0.8), (180, 0.1)]);
        let detection = detect(&s, &DurationBounds::default(), &EngineConfig::default());
        assert_eq!(detection.outcome, DetectionOutcome::Threshold { threshold: 0.7 });
        assert_eq!(detection.candidates.len(), 1);
    }

    #[test]
    fn test_relaxation_ladder_stops_at_first_hit() {
        // Nothing reaches 0.5; 0.35 qualifies at 0.3
        let s = series(&[(120, 0.35), (150, 0.35), (180, 0.2), (210, 0.15), (240, 0.0)]);
        let detection = detect(&s, &DurationBounds::default(), &EngineConfig::default());

        assert_eq!(detection.outcome, DetectionOutcome::Relaxed { threshold: 0.3 });
        assert_eq!(detection.candidates.len(), 1);
        assert_eq!(
            (detection.candidates[0].start, detection.candidates[0].end),
            (120, 180)
        );
    }

    #[test]
    fn test_relaxed_pass_closes_trailing_run() {
        let s = series(&[(120, 0.0), (150, 0.55), (180, 0.55)]);
        let detection = detect(&s, &DurationBounds::default(), &EngineConfig::default());
        assert_eq!(detection.outcome, DetectionOutcome::Relaxed { threshold: 0.5 });
        assert_eq!(
            (detection.candidates[0].start, detection.candidates[0].end),
            (150, 180)
        );
    }

    #[test]
    fn test_rank_fallback_on_flat_zero_series() {
        let s: TimeSeries = (0..20).map(|i| (120 + i * 30, 0.0)).collect();
        let detection = detect(&s, &DurationBounds::default(), &EngineConfig::default());

        assert_eq!(detection.outcome, DetectionOutcome::RankFallback);
        // target 600 / max 90 = 6 picks, stride 20 / 12 = 1
        assert_eq!(detection.candidates.len(), 6);
        // First window clamped to the skipped opening
        assert_eq!(detection.candidates[0], Segment::new(120, 150, 0.0));
        assert_eq!(detection.candidates[5], Segment::new(240, 300, 0.0));
    }

    #[test]
    fn test_rank_fallback_window_clamped_to_series_end() {
        let s = series(&[(120, 0.05), (150, 0.0), (180, 0.09)]);
        let windows = rank_fallback(&s, &DurationBounds::default(), &EngineConfig::default());

        // Ranked: 180 (0.09), 120 (0.05), 150 (0.0)
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0], Segment::new(150, 180, 0.09));
        assert_eq!(windows[1], Segment::new(120, 150, 0.05));
        assert_eq!(windows[2], Segment::new(120, 180, 0.0));
    }

    #[test]
    fn test_rank_fallback_stride_spreads_picks() {
        // 100 buckets with strictly descending scores; 5 picks at stride 10
        let s: TimeSeries = (0..100u32)
            .map(|i| (i * 30, 1.0 - i as f64 / 1000.0))
            .collect();
        let b = bounds(30, 90, 300, 0);
        let config = EngineConfig::default();
        let windows = rank_fallback(&s, &b, &config);

        // Picks t = 0, 300, 600, 900, 1200; the first window is clamped at 0
        let spans: Vec<(u32, u32)> = windows.iter().map(|w| (w.start, w.end)).collect();
        assert_eq!(
            spans,
            vec![(0, 30), (270, 330), (570, 630), (870, 930), (1170, 1230)]
        );
    }

    #[test]
    fn test_rank_fallback_lone_bucket_extends_forward() {
        let s = series(&[(120, 0.55)]);
        let windows = rank_fallback(&s, &DurationBounds::default(), &EngineConfig::default());
        assert_eq!(windows, vec![Segment::new(120, 150, 0.55)]);

        let s = series(&[(0, 0.0)]);
        let windows = rank_fallback(&s, &bounds(30, 90, 600, 0), &EngineConfig::default());
        assert_eq!(windows, vec![Segment::new(0, 30, 0.0)]);
    }

    #[test]
    fn test_lone_bucket_after_skip_uses_rank_fallback() {
        // Too short for a run at every threshold
        let s = series(&[(0, 0.9), (60, 0.9), (120, 0.55)]);
        let detection = detect(&s, &DurationBounds::default(), &EngineConfig::default());

        assert_eq!(detection.outcome, DetectionOutcome::RankFallback);
        assert_eq!(detection.candidates, vec![Segment::new(120, 150, 0.55)]);
    }
}
