//! Result types returned across the pipeline boundary.
//!
//! These serialize to the stable `{status, data}` shape callers consume.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Status used for every failure converted at the pipeline boundary.
pub const FAILURE_STATUS: u16 = 400;

/// Fixed `error` text of a failure result.
pub const FAILURE_MESSAGE: &str = "Failed to retrieve data";

/// Shape of a successful payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Flattened plaintext.
    #[default]
    Text,
    /// The translated record itself.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown output format '{0}': expected text or json")]
pub struct UnknownFormatError(pub String);

impl FromStr for OutputFormat {
    type Err = UnknownFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(UnknownFormatError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub error: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultData {
    Text(String),
    Error(ErrorDetail),
    Record(Value),
}

/// Outcome of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub status: u16,
    pub data: ResultData,
}

impl PipelineResult {
    pub fn success(status: u16, data: ResultData) -> Self {
        Self { status, data }
    }

    /// Failure result carrying `details` under the fixed error message.
    pub fn failure(details: impl Into<String>) -> Self {
        Self {
            status: FAILURE_STATUS,
            data: ResultData::Error(ErrorDetail {
                error: FAILURE_MESSAGE.to_string(),
                details: details.into(),
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) && !matches!(self.data, ResultData::Error(_))
    }

    pub fn error(&self) -> Option<&ErrorDetail> {
        match &self.data {
            ResultData::Error(detail) => Some(detail),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_parses_case_insensitively() {
        assert_eq!(" JSON ".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        let err = "xml".parse::<OutputFormat>().expect_err("unknown format");
        assert_eq!(err.to_string(), "unknown output format 'xml': expected text or json");
    }

    #[test]
    fn failure_serializes_to_stable_shape() {
        let result = PipelineResult::failure("boom");
        let json = serde_json::to_string(&result).expect("serialize");
        assert_eq!(
            json,
            r#"{"status":400,"data":{"error":"Failed to retrieve data","details":"boom"}}"#
        );
    }

    #[test]
    fn text_success_serializes_data_as_string() {
        let result = PipelineResult::success(200, ResultData::Text("x: 1".to_string()));
        let json = serde_json::to_string(&result).expect("serialize");
        assert_eq!(json, r#"{"status":200,"data":"x: 1"}"#);
        assert!(result.is_success());
    }

    #[test]
    fn error_payload_round_trips_as_error_variant() {
        let json = r#"{"status":400,"data":{"error":"Failed to retrieve data","details":"d"}}"#;
        let result: PipelineResult = serde_json::from_str(json).expect("parse");
        assert_eq!(result.error().map(|e| e.details.as_str()), Some("d"));
        assert!(!result.is_success());
    }
}
