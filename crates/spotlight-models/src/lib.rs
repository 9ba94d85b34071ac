//! Shared data models for the Spotlight highlight engine.
//!
//! This crate provides Serde-serializable types for:
//! - Bucketed score time series
//! - Highlight segments and selection results
//! - Raw engagement signals handed over by collaborators
//! - Duration bounds for a selection run
//! - Highlight reports consumed by clip extraction

pub mod bounds;
pub mod report;
pub mod segment;
pub mod series;
pub mod signals;
pub mod timestamp;

// Re-export common types
pub use bounds::DurationBounds;
pub use report::{HighlightEntry, HighlightsReport};
pub use segment::{DetectionOutcome, HighlightResult, Segment};
pub use series::TimeSeries;
pub use signals::{
    ChatMessage, Comment, SecondarySignal, SignalInputs, SilenceSpan, VideoStats, VolumeSample,
};
pub use timestamp::{format_clock, parse_timestamp, TimestampError};
