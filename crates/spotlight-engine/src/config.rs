//! Configuration for highlight detection.
//!
//! The defaults are tuned for long-form streams and let's-play videos with
//! comment timestamps as the strongest signal.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::keywords::KeywordSet;

/// Weights applied to each normalized signal during fusion.
///
/// The weights do not have to sum to 1; scaling all of them down lowers
/// every fused score uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    pub comment: f64,
    pub viewer: f64,
    pub retention: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            comment: 0.4,
            viewer: 0.3,
            retention: 0.3,
        }
    }
}

/// Engine configuration, read-only once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fused score a bucket needs to start or extend a run (0.0-1.0).
    ///
    /// Lower thresholds are tried only when this one yields nothing.
    pub min_highlight_score: f64,

    /// Signal weights for fusion.
    pub weights: FusionWeights,

    /// Thresholds tried in order when the primary pass finds no runs.
    pub relaxation_thresholds: Vec<f64>,

    /// Two segments sharing at least this many seconds conflict.
    pub dedup_overlap_secs: u32,

    /// Bucket width for comment timestamps.
    pub comment_bucket_secs: u32,

    /// Extra count for a timestamped comment containing a keyword.
    pub keyword_bonus: u32,

    /// Half-width of the window built around a rank-fallback bucket.
    pub fallback_half_window_secs: u32,

    /// Minimum number of rank-fallback picks.
    pub fallback_min_picks: usize,

    /// Enthusiasm keywords for comment weighting.
    pub keywords: KeywordSet,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_highlight_score: 0.7,
            weights: FusionWeights::default(),
            relaxation_thresholds: vec![0.5, 0.3, 0.1],
            dedup_overlap_secs: 30,
            comment_bucket_secs: 30,
            keyword_bonus: 2,
            fallback_half_window_secs: 30,
            fallback_min_picks: 5,
            keywords: KeywordSet::bundled_japanese(),
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables.
    ///
    /// Unparseable values fall back to defaults. Fails when `KEYWORDS_FILE`
    /// points at unreadable or empty data, or the result does not validate.
    pub fn from_env() -> EngineResult<Self> {
        let defaults = Self::default();
        let config = Self {
            min_highlight_score: env_parse("MIN_HIGHLIGHT_SCORE")
                .unwrap_or(defaults.min_highlight_score),
            weights: FusionWeights {
                comment: env_parse("COMMENT_WEIGHT").unwrap_or(defaults.weights.comment),
                viewer: env_parse("VIEWER_WEIGHT").unwrap_or(defaults.weights.viewer),
                retention: env_parse("RETENTION_WEIGHT").unwrap_or(defaults.weights.retention),
            },
            relaxation_thresholds: std::env::var("RELAXATION_THRESHOLDS")
                .ok()
                .and_then(|s| parse_thresholds(&s))
                .unwrap_or(defaults.relaxation_thresholds),
            dedup_overlap_secs: env_parse("DEDUP_OVERLAP_SECS")
                .unwrap_or(defaults.dedup_overlap_secs),
            keywords: KeywordSet::from_env()?,
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }

    /// Builder-style setter for the primary threshold.
    pub fn with_min_highlight_score(mut self, score: f64) -> Self {
        self.min_highlight_score = score;
        self
    }

    /// Builder-style setter for fusion weights.
    pub fn with_weights(mut self, comment: f64, viewer: f64, retention: f64) -> Self {
        self.weights = FusionWeights {
            comment,
            viewer,
            retention,
        };
        self
    }

    /// Builder-style setter for the relaxation ladder.
    pub fn with_relaxation_thresholds(mut self, thresholds: Vec<f64>) -> Self {
        self.relaxation_thresholds = thresholds;
        self
    }

    /// Builder-style setter for the keyword set.
    pub fn with_keywords(mut self, keywords: KeywordSet) -> Self {
        self.keywords = keywords;
        self
    }

    /// Reject values the algorithm cannot work with.
    pub fn validate(&self) -> EngineResult<()> {
        let weights = [
            ("comment", self.weights.comment),
            ("viewer", self.weights.viewer),
            ("retention", self.weights.retention),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(EngineError::invalid_config(format!(
                    "{} weight must be a non-negative number, got {}",
                    name, weight
                )));
            }
        }

        if !self.min_highlight_score.is_finite() || self.min_highlight_score < 0.0 {
            return Err(EngineError::invalid_config(format!(
                "min_highlight_score must be a non-negative number, got {}",
                self.min_highlight_score
            )));
        }

        if let Some(bad) = self
            .relaxation_thresholds
            .iter()
            .find(|t| !t.is_finite() || **t < 0.0)
        {
            return Err(EngineError::invalid_config(format!(
                "relaxation threshold must be a non-negative number, got {}",
                bad
            )));
        }

        if self.comment_bucket_secs == 0 {
            return Err(EngineError::invalid_config(
                "comment_bucket_secs must be positive",
            ));
        }

        if self.fallback_half_window_secs == 0 {
            return Err(EngineError::invalid_config(
                "fallback_half_window_secs must be positive",
            ));
        }

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Parse a comma-separated threshold list such as `0.5,0.3,0.1`.
fn parse_thresholds(raw: &str) -> Option<Vec<f64>> {
    raw.split(',')
        .map(|s| s.trim().parse::<f64>().ok())
        .collect::<Option<Vec<_>>>()
        .filter(|v| !v.is_empty())
}
