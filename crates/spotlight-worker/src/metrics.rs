//! Worker metrics.

use metrics::counter;

/// Metric name constants for consistency.
pub mod names {
    /// Analysis requests by result (ok, invalid, failed).
    pub const REQUESTS_TOTAL: &str = "spotlight_worker_requests_total";
}

/// Record a finished analysis request.
pub fn record_request(result: &'static str) {
    counter!(names::REQUESTS_TOTAL, "result" => result).increment(1);
}
