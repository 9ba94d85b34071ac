//! Bucketed score time series.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Scores keyed by bucket-start timestamp (whole seconds).
///
/// Keys need not be contiguous: a missing bucket means the signal carried no
/// data at that time. Iteration is always ascending by timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct TimeSeries(BTreeMap<u32, f64>);

impl TimeSeries {
    /// Create an empty series.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Score at `timestamp`, if the bucket is present.
    pub fn get(&self, timestamp: u32) -> Option<f64> {
        self.0.get(&timestamp).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(timestamp, score)` pairs in ascending timestamp order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.0.iter().map(|(t, s)| (*t, *s))
    }

    /// Bucket timestamps in ascending order.
    pub fn timestamps(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.keys().copied()
    }

    /// Latest bucket timestamp.
    pub fn last_timestamp(&self) -> Option<u32> {
        self.0.keys().next_back().copied()
    }

    /// Largest score in the series.
    pub fn max_score(&self) -> Option<f64> {
        self.0.values().copied().reduce(f64::max)
    }

    /// New series containing only buckets at or after `start`.
    pub fn starting_at(&self, start: u32) -> Self {
        Self(self.0.range(start..).map(|(t, s)| (*t, *s)).collect())
    }

    /// New series with every score divided by the series maximum.
    ///
    /// A series whose maximum is not positive is returned as all zeros.
    pub fn normalized_by_max(&self) -> Self {
        let max = self.max_score().unwrap_or(0.0);
        self.0
            .iter()
            .map(|(t, s)| (*t, if max > 0.0 { s / max } else { 0.0 }))
            .collect()
    }
}

impl FromIterator<(u32, f64)> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = (u32, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<u32, f64>> for TimeSeries {
    fn from(map: BTreeMap<u32, f64>) -> Self {
        Self(map)
    }
}
