//! Highlight analysis worker.
//!
//! This crate provides:
//! - JSON analysis requests carrying pre-fetched signals for one or more videos
//! - Bounded-concurrency batch execution over a highlight selector
//! - Per-video structured logging
//! - Request outcome counters

pub mod batch;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod request;

pub use batch::BatchRunner;
pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::AnalysisLogger;
pub use request::{load_requests, parse_requests, AnalysisRequest};
