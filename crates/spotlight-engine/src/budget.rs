//! Fitting deduplicated segments into the target duration.

use tracing::debug;

use spotlight_models::{DurationBounds, Segment};

/// Select segments until the target duration is reached.
///
/// `ranked` must be score-descending. Each segment is taken whole while it
/// fits; the first one that does not fit is truncated if the remaining budget
/// is at least `min_segment_secs`, and selection stops there. The result is
/// sorted by start time.
pub fn select_within_budget(ranked: &[Segment], bounds: &DurationBounds) -> Vec<Segment> {
    let target = bounds.target_secs;
    let mut total: u32 = 0;
    let mut selected = Vec::new();

    for segment in ranked {
        let duration = segment.duration();
        if total.saturating_add(duration) <= target {
            selected.push(*segment);
            total += duration;
            continue;
        }

        let remaining = target - total;
        if remaining > 0 && remaining >= bounds.min_segment_secs {
            debug!(
                start = segment.start,
                original_secs = duration,
                truncated_secs = remaining,
                "Truncating final segment to fit target"
            );
            selected.push(segment.truncated(remaining));
            total = target;
        }
        break;
    }

    selected.sort_by_key(|s| s.start);

    debug!(
        selected = selected.len(),
        total_secs = total,
        target_secs = target,
        "Budget selection complete"
    );
    selected
}
