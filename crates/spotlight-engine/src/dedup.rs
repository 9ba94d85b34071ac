//! Greedy overlap suppression.

use tracing::debug;

use spotlight_models::Segment;

/// Keep the strongest segments, dropping any that overlap an accepted one.
///
/// Candidates are visited by score descending (ties keep their input order).
/// A candidate is accepted only if it shares fewer than `overlap_secs`
/// seconds with every segment accepted so far; a rejected candidate is never
/// reconsidered. The result stays in score-descending order.
pub fn deduplicate(candidates: &[Segment], overlap_secs: u32) -> Vec<Segment> {
    let mut ranked = candidates.to_vec();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut accepted: Vec<Segment> = Vec::with_capacity(ranked.len());
    for candidate in ranked {
        let conflict = accepted
            .iter()
            .find(|kept| kept.overlap(&candidate) >= overlap_secs);

        match conflict {
            Some(kept) => {
                debug!(
                    start = candidate.start,
                    end = candidate.end,
                    kept_start = kept.start,
                    kept_end = kept.end,
                    "Skipping overlapping segment"
                );
            }
            None => accepted.push(candidate),
        }
    }

    accepted
}
