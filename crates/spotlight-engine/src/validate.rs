//! Structural checks for a finished highlight selection.
//!
//! The statistical pipeline satisfies these by construction. They exist to
//! vet output from other selectors before it reaches callers.

use thiserror::Error;

use spotlight_models::{DurationBounds, HighlightResult};

/// The first structural rule a result breaks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("segment {index} is empty or reversed ({start}..{end})")]
    EmptySegment { index: usize, start: u32, end: u32 },

    #[error("segment {index} starts at {start}, inside the skipped opening ({skip_start}s)")]
    InsideSkippedStart {
        index: usize,
        start: u32,
        skip_start: u32,
    },

    #[error("segment {index} starts before its predecessor")]
    OutOfOrder { index: usize },

    #[error("segments {first} and {second} share {overlap}s (limit {limit}s)")]
    Overlap {
        first: usize,
        second: usize,
        overlap: u32,
        limit: u32,
    },

    #[error("total duration {total}s exceeds target {target}s")]
    OverBudget { total: u32, target: u32 },

    #[error("segment {index} lasts {duration}s, outside {min}..={max}s")]
    DurationOutOfRange {
        index: usize,
        duration: u32,
        min: u32,
        max: u32,
    },
}

/// Check `result` against the selection rules for `bounds`.
///
/// Segment length limits are skipped for rank-fallback results. Any segment
/// may be shorter than the maximum (truncation), never shorter than the
/// minimum.
pub fn check_result(
    result: &HighlightResult,
    bounds: &DurationBounds,
    overlap_threshold: u32,
) -> Result<(), InvariantViolation> {
    let segments = &result.segments;

    for (index, segment) in segments.iter().enumerate() {
        if segment.start >= segment.end {
            return Err(InvariantViolation::EmptySegment {
                index,
                start: segment.start,
                end: segment.end,
            });
        }

        if segment.start < bounds.skip_start_secs {
            return Err(InvariantViolation::InsideSkippedStart {
                index,
                start: segment.start,
                skip_start: bounds.skip_start_secs,
            });
        }

        if index > 0 && segments[index - 1].start > segment.start {
            return Err(InvariantViolation::OutOfOrder { index });
        }

        if !result.outcome.is_fallback() && !bounds.accepts_duration(segment.duration()) {
            return Err(InvariantViolation::DurationOutOfRange {
                index,
                duration: segment.duration(),
                min: bounds.min_segment_secs,
                max: bounds.max_segment_secs,
            });
        }
    }

    for (first, a) in segments.iter().enumerate() {
        for (offset, b) in segments[first + 1..].iter().enumerate() {
            let overlap = a.overlap(b);
            if overlap >= overlap_threshold {
                return Err(InvariantViolation::Overlap {
                    first,
                    second: first + 1 + offset,
                    overlap,
                    limit: overlap_threshold,
                });
            }
        }
    }

    let total = result.total_duration();
    if total > bounds.target_secs {
        return Err(InvariantViolation::OverBudget {
            total,
            target: bounds.target_secs,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotlight_models::{DetectionOutcome, Segment};

    fn bounds() -> DurationBounds {
        DurationBounds::default()
            .with_target(200)
            .with_segment_range(30, 90)
            .with_skip_start(0)
    }

    fn threshold_result(segments: Vec<Segment>) -> HighlightResult {
        HighlightResult::new(segments, DetectionOutcome::Threshold { threshold: 0.7 })
    }

    #[test]
    fn test_valid_result() {
        let result = threshold_result(vec![Segment::new(0, 60, 0.9), Segment::new(100, 145, 0.8)]);
        assert_eq!(check_result(&result, &bounds(), 30), Ok(()));
        assert_eq!(check_result(&HighlightResult::empty(), &bounds(), 30), Ok(()));
    }

    #[test]
    fn test_detects_out_of_order() {
        let result = threshold_result(vec![Segment::new(100, 160, 0.9), Segment::new(0, 60, 0.8)]);
        assert_eq!(
            check_result(&result, &bounds(), 30),
            Err(InvariantViolation::OutOfOrder { index: 1 })
        );
    }

    #[test]
    fn test_detects_overlap() {
        let result = threshold_result(vec![Segment::new(0, 60, 0.9), Segment::new(20, 80, 0.8)]);
        assert!(matches!(
            check_result(&result, &bounds(), 30),
            Err(InvariantViolation::Overlap { overlap: 40, .. })
        ));
    }

    #[test]
    fn test_detects_over_budget() {
        let result = threshold_result(vec![
            Segment::new(0, 90, 0.9),
            Segment::new(100, 190, 0.8),
            Segment::new(200, 260, 0.7),
        ]);
        assert_eq!(
            check_result(&result, &bounds(), 30),
            Err(InvariantViolation::OverBudget {
                total: 240,
                target: 200
            })
        );
    }

    #[test]
    fn test_detects_skipped_start_and_empty_segment() {
        let skip = bounds().with_skip_start(120);
        let result = threshold_result(vec![Segment::new(60, 120, 0.9)]);
        assert!(matches!(
            check_result(&result, &skip, 30),
            Err(InvariantViolation::InsideSkippedStart { start: 60, .. })
        ));

        let result = threshold_result(vec![Segment::new(150, 150, 0.9)]);
        assert!(matches!(
            check_result(&result, &skip, 30),
            Err(InvariantViolation::EmptySegment { .. })
        ));
    }

    #[test]
    fn test_duration_limits_skipped_for_fallback() {
        let short = vec![Segment::new(0, 20, 0.1)];
        assert!(matches!(
            check_result(&threshold_result(short.clone()), &bounds(), 30),
            Err(InvariantViolation::DurationOutOfRange { duration: 20, .. })
        ));

        let fallback = HighlightResult::new(short, DetectionOutcome::RankFallback);
        assert_eq!(check_result(&fallback, &bounds(), 30), Ok(()));
    }
}
