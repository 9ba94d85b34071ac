//! Highlight segments and selection results.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A contiguous time interval with an engagement score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Segment {
    /// Start time in seconds
    pub start: u32,
    /// End time in seconds (exclusive)
    pub end: u32,
    /// Mean fused score over the segment (or the anchor score for fallback windows)
    pub score: f64,
}

impl Segment {
    pub fn new(start: u32, end: u32, score: f64) -> Self {
        Self { start, end, score }
    }

    /// Duration of this segment in seconds.
    pub fn duration(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Seconds shared with `other` (0 when disjoint).
    pub fn overlap(&self, other: &Segment) -> u32 {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        end.saturating_sub(start)
    }

    /// Copy of this segment cut down to `duration` seconds from its start.
    pub fn truncated(&self, duration: u32) -> Self {
        Self {
            start: self.start,
            end: self.start + duration.min(self.duration()),
            score: self.score,
        }
    }
}

/// How the candidate set behind a result was produced.
///
/// Purely diagnostic: an empty result means "no highlights" no matter
/// which path produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectionOutcome {
    /// Runs found at the configured minimum highlight score.
    Threshold { threshold: f64 },
    /// Runs found only after lowering the threshold.
    Relaxed { threshold: f64 },
    /// No runs at any threshold; windows built around top-ranked buckets.
    RankFallback,
    /// Nothing to detect from.
    Empty,
}

impl DetectionOutcome {
    /// Whether candidates bypassed the segment length filter.
    pub fn is_fallback(&self) -> bool {
        matches!(self, DetectionOutcome::RankFallback)
    }

    /// Short label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionOutcome::Threshold { .. } => "threshold",
            DetectionOutcome::Relaxed { .. } => "relaxed",
            DetectionOutcome::RankFallback => "rank_fallback",
            DetectionOutcome::Empty => "empty",
        }
    }
}

/// Final, chronologically ordered highlight selection for one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HighlightResult {
    /// Selected segments, ascending by start
    pub segments: Vec<Segment>,
    /// Detection path that produced the candidates
    pub outcome: DetectionOutcome,
}

impl HighlightResult {
    pub fn new(segments: Vec<Segment>, outcome: DetectionOutcome) -> Self {
        Self { segments, outcome }
    }

    /// A result with no highlights.
    pub fn empty() -> Self {
        Self {
            segments: Vec::new(),
            outcome: DetectionOutcome::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Sum of segment durations in seconds.
    pub fn total_duration(&self) -> u32 {
        self.segments.iter().map(Segment::duration).sum()
    }

    /// `(start, end)` cut points for clip extraction.
    pub fn cut_points(&self) -> Vec<(u32, u32)> {
        self.segments.iter().map(|s| (s.start, s.end)).collect()
    }
}
