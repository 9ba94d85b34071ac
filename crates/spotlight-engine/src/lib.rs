//! Statistical highlight detection.
//!
//! This crate provides:
//! - Normalizers turning comments, view stats, live chat and audio into 0..1 score series
//! - Weighted fusion of those series
//! - Threshold-run detection with a relaxation ladder and rank fallback
//! - Overlap suppression and target-duration selection
//! - Pluggable selectors with fallback and caching

pub mod budget;
pub mod cache;
pub mod config;
pub mod dedup;
pub mod detector;
pub mod engine;
pub mod error;
pub mod fusion;
pub mod keywords;
pub mod metrics;
pub mod normalize;
pub mod strategy;
pub mod validate;

pub use cache::HighlightCache;
pub use config::{EngineConfig, FusionWeights};
pub use detector::Detection;
pub use engine::{compute_highlights, HighlightEngine};
pub use error::{EngineError, EngineResult};
pub use keywords::KeywordSet;
pub use strategy::{
    CachingSelector, FallbackSelector, HighlightSelector, SelectionRequest, StatisticalSelector,
};
pub use validate::{check_result, InvariantViolation};
