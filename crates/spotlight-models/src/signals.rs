//! Raw engagement signals handed over by collaborators.
//!
//! Fetching and feature extraction happen elsewhere; these types carry the
//! already-collected data into the engine.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::series::TimeSeries;

/// A viewer comment. Only the free text is used.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Comment {
    pub text: String,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A live chat message with its offset into the video.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct ChatMessage {
    pub timestamp_seconds: f64,
}

/// Aggregate video statistics.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema)]
pub struct VideoStats {
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    pub duration_secs: u32,
}

impl VideoStats {
    /// Likes plus comments per view (0 without views).
    pub fn engagement_rate(&self) -> f64 {
        if self.view_count == 0 {
            return 0.0;
        }
        (self.like_count + self.comment_count) as f64 / self.view_count as f64
    }
}

/// Mean loudness measured over one audio bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct VolumeSample {
    /// Bucket start in seconds
    pub start_secs: u32,
    /// Mean volume in dBFS (typically -60..0)
    pub mean_volume_db: f64,
}

/// A detected stretch of silence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct SilenceSpan {
    pub start_secs: f64,
    pub end_secs: f64,
}

/// The viewer/audio signal fused next to comments.
///
/// Variants are interchangeable; a caller supplies whichever one its
/// collaborators could produce.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum SecondarySignal {
    /// Already-normalized viewer or audio scores.
    Series(TimeSeries),
    /// Aggregate counts, turned into a coarse viewer estimate.
    Stats(VideoStats),
    /// Per-bucket loudness.
    AudioVolume(Vec<VolumeSample>),
    /// Silence spans, turned into per-bucket speech activity.
    SpeechActivity(Vec<SilenceSpan>),
    /// Live chat messages, turned into chat density.
    LiveChat(Vec<ChatMessage>),
}

impl SecondarySignal {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SecondarySignal::Series(_) => "series",
            SecondarySignal::Stats(_) => "stats",
            SecondarySignal::AudioVolume(_) => "audio_volume",
            SecondarySignal::SpeechActivity(_) => "speech_activity",
            SecondarySignal::LiveChat(_) => "live_chat",
        }
    }
}

impl Default for SecondarySignal {
    fn default() -> Self {
        SecondarySignal::Series(TimeSeries::new())
    }
}

/// Everything collected for one video.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SignalInputs {
    /// Video length in seconds
    pub video_duration_secs: u32,

    /// Viewer comments
    #[serde(default)]
    pub comments: Vec<Comment>,

    /// Viewer or audio signal
    #[serde(default)]
    pub secondary: SecondarySignal,

    /// Audience retention on 0..1; absent when unavailable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention: Option<TimeSeries>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engagement_rate() {
        let stats = VideoStats {
            view_count: 10_000,
            like_count: 500,
            comment_count: 200,
            duration_secs: 3600,
        };
        assert!((stats.engagement_rate() - 0.07).abs() < 1e-9);

        let no_views = VideoStats {
            view_count: 0,
            like_count: 5,
            ..stats
        };
        assert_eq!(no_views.engagement_rate(), 0.0);
    }

    #[test]
    fn test_secondary_signal_json() {
        let json = r#"{"kind":"stats","data":{"view_count":100,"like_count":5,"duration_secs":600}}"#;
        let signal: SecondarySignal = serde_json::from_str(json).unwrap();
        match signal {
            SecondarySignal::Stats(stats) => {
                assert_eq!(stats.view_count, 100);
                assert_eq!(stats.comment_count, 0);
            }
            other => panic!("unexpected variant: {}", other.kind()),
        }
    }

    #[test]
    fn test_signal_inputs_defaults() {
        let inputs: SignalInputs = serde_json::from_str(r#"{"video_duration_secs":180}"#).unwrap();
        assert!(inputs.comments.is_empty());
        assert!(inputs.retention.is_none());
        assert_eq!(inputs.secondary.kind(), "series");
    }
}
