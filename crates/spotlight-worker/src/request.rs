//! Analysis request wire format.

use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use spotlight_engine::SelectionRequest;
use spotlight_models::{Comment, DurationBounds, SecondarySignal, SignalInputs, TimeSeries};

use crate::error::{WorkerError, WorkerResult};

/// One video's pre-fetched signals, as submitted to the worker.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisRequest {
    pub video_id: String,

    pub video_duration_secs: u32,

    #[serde(default)]
    pub comments: Vec<Comment>,

    #[serde(default)]
    pub secondary: SecondarySignal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention: Option<TimeSeries>,

    /// Overrides the worker's default bounds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<DurationBounds>,
}

impl AnalysisRequest {
    /// Reject requests the engine cannot meaningfully analyze.
    pub fn validate(&self, default_bounds: &DurationBounds) -> WorkerResult<()> {
        if self.video_id.trim().is_empty() {
            return Err(WorkerError::invalid_request("video_id is empty"));
        }

        let bounds = self.bounds.unwrap_or(*default_bounds);
        if bounds.min_segment_secs > bounds.max_segment_secs {
            return Err(WorkerError::invalid_request(format!(
                "{}: min segment {}s exceeds max segment {}s",
                self.video_id, bounds.min_segment_secs, bounds.max_segment_secs
            )));
        }

        let series = self.retention.iter().chain(match &self.secondary {
            SecondarySignal::Series(series) => Some(series),
            _ => None,
        });
        for s in series {
            if s.iter().any(|(_, score)| !score.is_finite()) {
                return Err(WorkerError::invalid_request(format!(
                    "{}: score series contains non-finite values",
                    self.video_id
                )));
            }
        }

        Ok(())
    }

    /// Convert into an engine request, filling in `default_bounds`.
    pub fn into_selection(self, default_bounds: &DurationBounds) -> SelectionRequest {
        let bounds = self.bounds.unwrap_or(*default_bounds);
        SelectionRequest::new(
            self.video_id,
            SignalInputs {
                video_duration_secs: self.video_duration_secs,
                comments: self.comments,
                secondary: self.secondary,
                retention: self.retention,
            },
            bounds,
        )
    }
}

/// Parse one request or a JSON array of requests.
pub fn parse_requests(data: &str) -> WorkerResult<Vec<AnalysisRequest>> {
    if data.trim_start().starts_with('[') {
        Ok(serde_json::from_str(data)?)
    } else {
        Ok(vec![serde_json::from_str(data)?])
    }
}

/// Read and parse a request file.
pub fn load_requests(path: impl AsRef<Path>) -> WorkerResult<Vec<AnalysisRequest>> {
    let data = std::fs::read_to_string(path)?;
    parse_requests(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SINGLE: &str = r#"{
        "video_id": "abc",
        "video_duration_secs": 1800,
        "comments": [{"text": "12:30 www"}],
        "secondary": {"kind": "stats", "data": {"view_count": 1000, "like_count": 50, "duration_secs": 1800}},
        "bounds": {"target_secs": 300}
    }"#;

    #[test]
    fn test_parse_single_request() {
        let requests = parse_requests(SINGLE).unwrap();
        assert_eq!(requests.len(), 1);

        let request = &requests[0];
        assert_eq!(request.video_id, "abc");
        assert!(request.retention.is_none());
        assert!(matches!(request.secondary, SecondarySignal::Stats(_)));

        // Omitted bound fields fall back to defaults
        let bounds = request.bounds.unwrap();
        assert_eq!(bounds.target_secs, 300);
        assert_eq!(bounds.skip_start_secs, 120);
    }

    #[test]
    fn test_parse_request_list() {
        let data = r#"[
            {"video_id": "a", "video_duration_secs": 600},
            {"video_id": "b", "video_duration_secs": 900, "retention": {"0": 0.5, "30": 0.7}}
        ]"#;
        let requests = parse_requests(data).unwrap();

        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].retention.as_ref().unwrap().get(30), Some(0.7));
    }

    #[test]
    fn test_parse_error_is_json_error() {
        let err = parse_requests(r#"{"video_id": "a"}"#).unwrap_err();
        assert!(matches!(err, WorkerError::Json(_)));
        assert!(err.to_string().contains("video_duration_secs"));
    }

    #[test]
    fn test_validate() {
        let defaults = DurationBounds::default();
        let mut request = parse_requests(SINGLE).unwrap().remove(0);
        assert!(request.validate(&defaults).is_ok());

        request.bounds = Some(defaults.with_segment_range(120, 60));
        assert!(matches!(
            request.validate(&defaults),
            Err(WorkerError::InvalidRequest(_))
        ));

        request.bounds = None;
        request.video_id = "  ".to_string();
        assert!(request.validate(&defaults).is_err());
    }

    #[test]
    fn test_into_selection_uses_default_bounds() {
        let defaults = DurationBounds::default().with_target(900);
        let request = parse_requests(r#"{"video_id": "a", "video_duration_secs": 600}"#)
            .unwrap()
            .remove(0);

        let selection = request.into_selection(&defaults);
        assert_eq!(selection.video_id, "a");
        assert_eq!(selection.bounds, defaults);
        assert_eq!(selection.signals.video_duration_secs, 600);
    }

    #[test]
    fn test_load_requests_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", SINGLE).unwrap();

        let requests = load_requests(file.path()).unwrap();
        assert_eq!(requests[0].video_id, "abc");

        assert!(matches!(
            load_requests("/nonexistent/request.json"),
            Err(WorkerError::Io(_))
        ));
    }
}
