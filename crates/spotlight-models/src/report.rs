//! Highlight reports handed to clip extraction.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::segment::{DetectionOutcome, HighlightResult, Segment};
use crate::timestamp::format_clock;

/// One highlight in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HighlightEntry {
    /// Position in chronological order (1-indexed)
    pub id: u32,

    /// Start time in seconds
    pub start: u32,

    /// End time in seconds
    pub end: u32,

    /// Duration in seconds
    pub duration: u32,

    /// Engagement score
    pub score: f64,

    /// Start as MM:SS or HH:MM:SS
    pub start_label: String,

    /// End as MM:SS or HH:MM:SS
    pub end_label: String,
}

impl HighlightEntry {
    pub fn from_segment(id: u32, segment: &Segment) -> Self {
        Self {
            id,
            start: segment.start,
            end: segment.end,
            duration: segment.duration(),
            score: segment.score,
            start_label: format_clock(segment.start),
            end_label: format_clock(segment.end),
        }
    }
}

/// Highlights selected for one video.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HighlightsReport {
    /// Video this belongs to
    pub video_id: String,

    /// Highlights in chronological order
    pub highlights: Vec<HighlightEntry>,

    /// Sum of highlight durations
    pub total_duration_secs: u32,

    /// Detection path that produced the highlights
    pub outcome: DetectionOutcome,

    /// Name of the selector that produced the highlights
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,

    /// When the report was produced
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

impl HighlightsReport {
    /// Build a report from a selection result.
    pub fn from_result(video_id: impl Into<String>, result: &HighlightResult) -> Self {
        let highlights = result
            .segments
            .iter()
            .enumerate()
            .map(|(idx, seg)| HighlightEntry::from_segment(idx as u32 + 1, seg))
            .collect();

        Self {
            video_id: video_id.into(),
            highlights,
            total_duration_secs: result.total_duration(),
            outcome: result.outcome,
            selector: None,
            generated_at: chrono::Utc::now(),
        }
    }

    pub fn with_selector(mut self, name: impl Into<String>) -> Self {
        self.selector = Some(name.into());
        self
    }

    /// Whether the video yielded no highlights.
    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty()
    }
}
