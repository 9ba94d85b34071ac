//! Weighted fusion of normalized signals into one score series.

use std::collections::BTreeSet;

use spotlight_models::TimeSeries;

use crate::config::FusionWeights;

/// Retention value assumed where no retention sample exists.
///
/// Retention is the least reliably sampled signal, so a gap counts as
/// neutral instead of as negative evidence.
pub const NEUTRAL_RETENTION: f64 = 0.5;

/// Fuse comment, secondary (viewer or audio) and retention scores.
///
/// The output covers the union of all input timestamps. A bucket missing
/// from the comment or secondary series contributes 0; a bucket missing from
/// retention (or retention absent entirely) contributes
/// [`NEUTRAL_RETENTION`].
pub fn fuse(
    comment: &TimeSeries,
    secondary: &TimeSeries,
    retention: Option<&TimeSeries>,
    weights: &FusionWeights,
) -> TimeSeries {
    let mut timestamps: BTreeSet<u32> = comment.timestamps().collect();
    timestamps.extend(secondary.timestamps());
    if let Some(retention) = retention {
        timestamps.extend(retention.timestamps());
    }

    timestamps
        .into_iter()
        .map(|t| {
            let comment_score = comment.get(t).unwrap_or(0.0);
            let secondary_score = secondary.get(t).unwrap_or(0.0);
            let retention_score = retention
                .and_then(|r| r.get(t))
                .unwrap_or(NEUTRAL_RETENTION);

            let fused = weights.comment * comment_score
                + weights.viewer * secondary_score
                + weights.retention * retention_score;
            (t, fused)
        })
        .collect()
}
