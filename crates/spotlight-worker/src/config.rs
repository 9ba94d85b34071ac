//! Worker configuration.

use std::time::Duration;

use spotlight_engine::cache::{DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL};
use spotlight_models::DurationBounds;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum videos analyzed at once
    pub max_concurrent: usize,
    /// Bounds for requests that do not carry their own
    pub default_bounds: DurationBounds,
    /// Whether results are cached per video and bounds
    pub cache_enabled: bool,
    /// Lifetime of a cached result
    pub cache_ttl: Duration,
    /// Maximum cached results
    pub cache_max_entries: usize,
    /// Print rendered Prometheus metrics to stderr on exit
    pub metrics_dump: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            default_bounds: DurationBounds::default(),
            cache_enabled: true,
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            metrics_dump: false,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_concurrent: std::env::var("WORKER_MAX_CONCURRENT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.max_concurrent),
            default_bounds: DurationBounds::from_env(),
            cache_enabled: env_flag("HIGHLIGHT_CACHE_ENABLED").unwrap_or(defaults.cache_enabled),
            cache_ttl: std::env::var("HIGHLIGHT_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            cache_max_entries: std::env::var("HIGHLIGHT_CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.cache_max_entries),
            metrics_dump: env_flag("METRICS_DUMP").unwrap_or(defaults.metrics_dump),
        }
    }

    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }
}

fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|v| {
        let v = v.trim().to_lowercase();
        v == "1" || v == "true" || v == "yes"
    })
}
