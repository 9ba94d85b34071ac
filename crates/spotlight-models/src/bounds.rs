//! Duration limits for a highlight selection run.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Duration budget and per-segment limits, all in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DurationBounds {
    /// Total highlight duration to aim for
    pub target_secs: u32,
    /// Shortest acceptable segment
    pub min_segment_secs: u32,
    /// Longest acceptable segment
    pub max_segment_secs: u32,
    /// Leading part of the video never considered
    pub skip_start_secs: u32,
}

impl Default for DurationBounds {
    fn default() -> Self {
        Self {
            target_secs: 600, // 10 minutes
            min_segment_secs: 30,
            max_segment_secs: 90,
            skip_start_secs: 120,
        }
    }
}

impl DurationBounds {
    /// Create bounds from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            target_secs: env_u32("CLIP_DURATION_TARGET").unwrap_or(defaults.target_secs),
            min_segment_secs: env_u32("MIN_SEGMENT_DURATION")
                .unwrap_or(defaults.min_segment_secs),
            max_segment_secs: env_u32("MAX_SEGMENT_DURATION")
                .unwrap_or(defaults.max_segment_secs),
            skip_start_secs: env_u32("SKIP_START_SECONDS").unwrap_or(defaults.skip_start_secs),
        }
    }

    pub fn with_target(mut self, secs: u32) -> Self {
        self.target_secs = secs;
        self
    }

    pub fn with_segment_range(mut self, min_secs: u32, max_secs: u32) -> Self {
        self.min_segment_secs = min_secs;
        self.max_segment_secs = max_secs;
        self
    }

    pub fn with_skip_start(mut self, secs: u32) -> Self {
        self.skip_start_secs = secs;
        self
    }

    /// Whether `duration` fits the per-segment limits.
    pub fn accepts_duration(&self, duration: u32) -> bool {
        self.min_segment_secs <= duration && duration <= self.max_segment_secs
    }
}

fn env_u32(key: &str) -> Option<u32> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let bounds = DurationBounds::default();
        assert_eq!(bounds.target_secs, 600);
        assert_eq!(bounds.min_segment_secs, 30);
        assert_eq!(bounds.max_segment_secs, 90);
        assert_eq!(bounds.skip_start_secs, 120);
    }

    #[test]
    fn test_accepts_duration_inclusive() {
        let bounds = DurationBounds::default();
        assert!(bounds.accepts_duration(30));
        assert!(bounds.accepts_duration(90));
        assert!(!bounds.accepts_duration(29));
        assert!(!bounds.accepts_duration(91));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let bounds: DurationBounds = serde_json::from_str(r#"{"target_secs":120}"#).unwrap();
        assert_eq!(bounds.target_secs, 120);
        assert_eq!(bounds.skip_start_secs, 120);
    }

    #[test]
    fn test_builders() {
        let bounds = DurationBounds::default()
            .with_target(45)
            .with_segment_range(10, 20)
            .with_skip_start(0);
        assert_eq!(bounds.target_secs, 45);
        assert_eq!(bounds.min_segment_secs, 10);
        assert_eq!(bounds.max_segment_secs, 20);
        assert_eq!(bounds.skip_start_secs, 0);
    }
}
