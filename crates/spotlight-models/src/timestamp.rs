//! Clock timestamp parsing and formatting.
//!
//! Comments reference moments in a video as `HH:MM:SS` or `MM:SS`; reports
//! label segment boundaries the same way.

use thiserror::Error;

/// Parse a clock timestamp to total seconds.
///
/// Supports formats:
/// - `HH:MM:SS` or `HH:MM:SS.mmm`
/// - `MM:SS` or `MM:SS.mmm`
/// - `SS` or `SS.mmm`
///
/// # Examples
/// ```
/// use spotlight_models::timestamp::parse_timestamp;
/// assert_eq!(parse_timestamp("01:30:00").unwrap(), 5400.0);
/// assert_eq!(parse_timestamp("1:05").unwrap(), 65.0);
/// assert_eq!(parse_timestamp("90").unwrap(), 90.0);
/// ```
pub fn parse_timestamp(ts: &str) -> Result<f64, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    let parts: Vec<&str> = ts.split(':').collect();
    if parts.len() > 3 {
        return Err(TimestampError::InvalidFormat(ts.to_string()));
    }

    // Components are read right to left: seconds, minutes, hours.
    const NAMES: [&str; 3] = ["seconds", "minutes", "hours"];
    const SCALES: [f64; 3] = [1.0, 60.0, 3600.0];

    let mut total = 0.0;
    for (idx, part) in parts.iter().rev().enumerate() {
        let value: f64 = part
            .parse()
            .map_err(|_| TimestampError::InvalidValue(NAMES[idx], part.to_string()))?;
        if value < 0.0 {
            return Err(TimestampError::Negative);
        }
        total += value * SCALES[idx];
    }

    Ok(total)
}

/// Format whole seconds as `MM:SS`, or `HH:MM:SS` once the hour is non-zero.
///
/// # Examples
/// ```
/// use spotlight_models::timestamp::format_clock;
/// assert_eq!(format_clock(754), "12:34");
/// assert_eq!(format_clock(3661), "01:01:01");
/// ```
pub fn format_clock(total_secs: u32) -> String {
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}", mins, secs)
    }
}

/// Timestamp parsing error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimestampError {
    #[error("Timestamp cannot be empty")]
    Empty,

    #[error("Timestamp cannot be negative")]
    Negative,

    #[error("Invalid {0} value: {1}")]
    InvalidValue(&'static str, String),

    #[error("Invalid timestamp format '{0}'. Use HH:MM:SS, MM:SS, or SS")]
    InvalidFormat(String),
}
