//! In-memory cache of highlight results.
//!
//! Entries are keyed by video and duration bounds and expire after a fixed
//! TTL. When the cache is full the oldest insertion is evicted.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use tracing::debug;

use spotlight_models::{DurationBounds, HighlightResult};

use crate::metrics;

// =============================================================================
// Constants
// =============================================================================

/// Default entry lifetime (30 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Default maximum number of cached results.
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 256;

// =============================================================================
// Highlight Cache
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    video_id: String,
    bounds: DurationBounds,
}

struct CachedResult {
    result: HighlightResult,
    inserted_at: Instant,
    /// Insertion order, for eviction
    seq: u64,
}

impl CachedResult {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() < ttl
    }
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, CachedResult>,
    next_seq: u64,
}

/// Thread-safe TTL cache for highlight results.
pub struct HighlightCache {
    ttl: Duration,
    max_entries: usize,
    state: RwLock<CacheState>,
}

impl Default for HighlightCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL, DEFAULT_CACHE_MAX_ENTRIES)
    }
}

impl HighlightCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Cached result for `video_id` and `bounds`, if present and fresh.
    pub fn get(&self, video_id: &str, bounds: &DurationBounds) -> Option<HighlightResult> {
        let key = CacheKey {
            video_id: video_id.to_string(),
            bounds: *bounds,
        };

        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let hit = state
            .entries
            .get(&key)
            .filter(|cached| cached.is_fresh(self.ttl))
            .map(|cached| cached.result.clone());

        metrics::record_cache_lookup(hit.is_some());
        hit
    }

    /// Store a result, replacing any previous entry for the same key.
    pub fn insert(&self, video_id: &str, bounds: &DurationBounds, result: HighlightResult) {
        if self.max_entries == 0 {
            return;
        }

        let key = CacheKey {
            video_id: video_id.to_string(),
            bounds: *bounds,
        };

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        let ttl = self.ttl;
        let before = state.entries.len();
        state.entries.retain(|_, cached| cached.is_fresh(ttl));
        let expired = before - state.entries.len();

        if !state.entries.contains_key(&key) && state.entries.len() >= self.max_entries {
            let oldest = state
                .entries
                .iter()
                .min_by_key(|(_, cached)| cached.seq)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                debug!(video_id = %oldest.video_id, "Evicting oldest cached highlights");
                state.entries.remove(&oldest);
            }
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.entries.insert(
            key,
            CachedResult {
                result,
                inserted_at: Instant::now(),
                seq,
            },
        );

        if expired > 0 {
            debug!(expired, "Purged expired cached highlights");
        }
    }

    /// Drop every cached result for `video_id`.
    pub fn invalidate(&self, video_id: &str) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.entries.retain(|key, _| key.video_id != video_id);
    }

    pub fn clear(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.entries.clear();
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
