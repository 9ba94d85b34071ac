//! Signal normalization onto bucketed 0..1 score series.
//!
//! Every raw signal is reduced to a [`TimeSeries`] keyed by bucket start so
//! that fusion can combine them. Bucket widths differ per signal:
//!
//! | Signal          | Bucket | Score                                      |
//! |-----------------|--------|--------------------------------------------|
//! | Comments        | 30 s   | (mentions + keyword bonus) / max           |
//! | Viewer estimate | 60 s   | position tier x engagement rate            |
//! | Live chat       | 10 s   | messages / max                             |
//! | Audio volume    | input  | dB mapped from -60..0, then / max          |
//! | Speech activity | 30 s   | non-silent fraction of the bucket          |

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use spotlight_models::{
    parse_timestamp, ChatMessage, Comment, SecondarySignal, SilenceSpan, TimeSeries, VideoStats,
    VolumeSample,
};

use crate::config::EngineConfig;

/// Bucket width for the viewer estimate.
pub const VIEWER_BUCKET_SECS: u32 = 60;

/// Bucket width for live chat density.
pub const CHAT_BUCKET_SECS: u32 = 10;

/// Bucket width for speech activity.
pub const ACTIVITY_BUCKET_SECS: u32 = 30;

/// Loudness floor mapped to a score of 0.
const VOLUME_FLOOR_DB: f64 = -60.0;

static HMS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}:\d{2}:\d{2}").unwrap());

static MS_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{1,2}:\d{2}").unwrap());

static DECIMAL_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d$").unwrap());

/// Extract the first `HH:MM:SS` (preferred) or `MM:SS` mention in a comment.
///
/// Digits from any script count, so full-width `１２:３４` reads as 12:34.
pub fn extract_comment_timestamp(text: &str) -> Option<u32> {
    let found = HMS_PATTERN
        .find(text)
        .or_else(|| MS_PATTERN.find(text))?;
    let ascii: String = found.as_str().chars().map(ascii_digit).collect();
    parse_timestamp(&ascii).ok().map(|secs| secs as u32)
}

/// Map a Unicode decimal digit onto its ASCII counterpart.
///
/// Decimal digits are encoded in contiguous runs of ten starting at zero, so
/// the value is the offset from the start of the run, modulo ten.
fn ascii_digit(c: char) -> char {
    if c.is_ascii() || !is_decimal_digit(c) {
        return c;
    }

    let mut zero = c as u32;
    while let Some(prev) = zero.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        zero -= 1;
    }

    char::from_digit((c as u32 - zero) % 10, 10).unwrap_or(c)
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DECIMAL_DIGIT.is_match(c.encode_utf8(&mut buf))
}

/// Comment density per bucket, boosted by enthusiasm keywords.
///
/// Every bucket covering the video is present; the series is all zeros when
/// no comment mentions a time inside the video.
pub fn comment_scores(
    comments: &[Comment],
    video_duration_secs: u32,
    config: &EngineConfig,
) -> TimeSeries {
    let bucket = config.comment_bucket_secs.max(1);
    let intervals = video_duration_secs.div_ceil(bucket) as usize;
    let mut counts = vec![0u32; intervals];
    let mut matched = 0usize;

    for comment in comments {
        let Some(ts) = extract_comment_timestamp(&comment.text) else {
            continue;
        };
        if ts >= video_duration_secs {
            continue;
        }

        let idx = (ts / bucket) as usize;
        counts[idx] += 1;
        if config.keywords.matches(&comment.text) {
            counts[idx] += config.keyword_bonus;
        }
        matched += 1;
    }

    debug!(
        comments = comments.len(),
        timestamped = matched,
        buckets = intervals,
        "Normalized comment density"
    );

    dense_normalized(&counts, bucket)
}

/// Coarse viewer estimate from aggregate statistics.
///
/// Without per-moment viewer data the video is split into three tiers by
/// position (opening high, middle medium, ending low) and each tier is scaled
/// by the engagement rate.
pub fn viewer_estimate(stats: &VideoStats) -> TimeSeries {
    let intervals = stats.duration_secs.div_ceil(VIEWER_BUCKET_SECS);
    let engagement = stats.engagement_rate();

    (0..intervals)
        .map(|i| {
            let progress = i as f64 / intervals as f64;
            let tier = if progress < 0.2 {
                1.0
            } else if progress < 0.8 {
                0.7
            } else {
                0.4
            };
            (i * VIEWER_BUCKET_SECS, tier * engagement)
        })
        .collect()
}

/// Live chat message density per 10 s bucket.
pub fn live_chat_scores(messages: &[ChatMessage], video_duration_secs: u32) -> TimeSeries {
    let intervals = video_duration_secs.div_ceil(CHAT_BUCKET_SECS) as usize;
    let mut counts = vec![0u32; intervals];

    for message in messages {
        let ts = message.timestamp_seconds;
        if !ts.is_finite() || ts < 0.0 || ts >= video_duration_secs as f64 {
            continue;
        }
        counts[(ts / CHAT_BUCKET_SECS as f64) as usize] += 1;
    }

    dense_normalized(&counts, CHAT_BUCKET_SECS)
}

/// Loudness per bucket, mapped from -60..0 dB and rescaled to the loudest bucket.
pub fn volume_scores(samples: &[VolumeSample]) -> TimeSeries {
    let raw: TimeSeries = samples
        .iter()
        .filter(|s| s.mean_volume_db.is_finite())
        .map(|s| {
            let score = ((s.mean_volume_db - VOLUME_FLOOR_DB) / -VOLUME_FLOOR_DB).clamp(0.0, 1.0);
            (s.start_secs, score)
        })
        .collect();

    raw.normalized_by_max()
}

/// Fraction of each bucket that is not covered by silence.
pub fn speech_activity_scores(
    silences: &[SilenceSpan],
    video_duration_secs: f64,
    bucket_secs: u32,
) -> TimeSeries {
    if bucket_secs == 0 || !video_duration_secs.is_finite() {
        return TimeSeries::new();
    }

    let mut scores = Vec::new();
    let mut start = 0u32;
    while (start as f64) < video_duration_secs {
        let bucket_start = start as f64;
        let bucket_end = (bucket_start + bucket_secs as f64).min(video_duration_secs);
        let length = bucket_end - bucket_start;

        let silent: f64 = silences
            .iter()
            .map(|s| (s.end_secs.min(bucket_end) - s.start_secs.max(bucket_start)).max(0.0))
            .sum();

        scores.push((start, ((length - silent) / length).clamp(0.0, 1.0)));
        start += bucket_secs;
    }

    scores.into_iter().collect()
}

/// Normalize whichever secondary signal the caller supplied.
pub fn secondary_scores(signal: &SecondarySignal, video_duration_secs: u32) -> TimeSeries {
    match signal {
        SecondarySignal::Series(series) => series.clone(),
        SecondarySignal::Stats(stats) => viewer_estimate(stats),
        SecondarySignal::AudioVolume(samples) => volume_scores(samples),
        SecondarySignal::SpeechActivity(silences) => {
            speech_activity_scores(silences, video_duration_secs as f64, ACTIVITY_BUCKET_SECS)
        }
        SecondarySignal::LiveChat(messages) => live_chat_scores(messages, video_duration_secs),
    }
}

/// Dense series over `counts`, each divided by the largest count.
fn dense_normalized(counts: &[u32], bucket_secs: u32) -> TimeSeries {
    let max = counts.iter().copied().max().unwrap_or(0);
    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            let score = if max > 0 {
                count as f64 / max as f64
            } else {
                0.0
            };
            (i as u32 * bucket_secs, score)
        })
        .collect()
}
