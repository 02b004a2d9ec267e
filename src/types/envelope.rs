//! Result envelope returned across the analysis boundary
//!
//! On the wire the envelope is a flat object: `{"success": true, ...result}`
//! or `{"success": false, "error": "...", "status": 502}`.

use serde::Serialize;

use super::analysis::AnalysisResult;
use super::error::BigoError;

/// Failure details carried by an envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

/// Single return value of the whole pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "WireEnvelope")]
pub enum ResponseEnvelope {
    Success(AnalysisResult),
    Failure(Failure),
}

impl ResponseEnvelope {
    pub fn failure(error: impl Into<String>, status: Option<u16>) -> Self {
        Self::Failure(Failure {
            error: error.into(),
            status,
        })
    }

    /// Wrap an error escaping the pipeline.
    ///
    /// Provider-chain failures keep their message and status; anything else
    /// is reported as `kind: message`.
    pub fn from_error(err: &BigoError) -> Self {
        match err {
            BigoError::ProvidersExhausted { status, .. } => Self::failure(err.to_string(), *status),
            BigoError::Llm(llm) => Self::failure(err.to_string(), llm.status),
            BigoError::Internal { .. } => Self::failure(err.to_string(), None),
            other => Self::failure(format!("{}: {}", other.kind(), other), other.status()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Self::Success(result) => Some(result),
            Self::Failure(_) => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => failure.status,
        }
    }
}

impl From<AnalysisResult> for ResponseEnvelope {
    fn from(result: AnalysisResult) -> Self {
        Self::Success(result)
    }
}

#[derive(Serialize)]
struct WireEnvelope {
    success: bool,
    #[serde(flatten)]
    result: Option<AnalysisResult>,
    #[serde(flatten)]
    failure: Option<Failure>,
}

impl From<ResponseEnvelope> for WireEnvelope {
    fn from(envelope: ResponseEnvelope) -> Self {
        match envelope {
            ResponseEnvelope::Success(result) => Self {
                success: true,
                result: Some(result),
                failure: None,
            },
            ResponseEnvelope::Failure(failure) => Self {
                success: false,
                result: None,
                failure: Some(failure),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::error::{ErrorCategory, LlmError};

    #[test]
    fn test_success_is_flat() {
        let envelope = ResponseEnvelope::from(AnalysisResult::default());
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["timeComplexity"]["average"], "O(n)");
        assert_eq!(value["provider"], "primary");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_failure_carries_status() {
        let err = BigoError::ProvidersExhausted {
            summary: "primary (chat): failed; fallback (text-endpoint): 502".to_string(),
            status: Some(502),
            failures: Vec::new(),
        };
        let envelope = ResponseEnvelope::from_error(&err);
        assert_eq!(envelope.status(), Some(502));

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["status"], 502);
        assert!(value["error"].as_str().unwrap().contains("fallback"));
        assert!(value.get("timeComplexity").is_none());
    }

    #[test]
    fn test_failure_without_status_omits_field() {
        let envelope = ResponseEnvelope::failure("nope", None);
        let value = serde_json::to_value(&envelope).unwrap();
        assert!(value.get("status").is_none());
    }

    #[test]
    fn test_unexpected_error_reports_kind() {
        let envelope = ResponseEnvelope::from_error(&BigoError::Config("bad".to_string()));
        match envelope {
            ResponseEnvelope::Failure(failure) => {
                assert!(failure.error.starts_with("ConfigError: "));
            }
            ResponseEnvelope::Success(_) => panic!("expected failure"),
        }

        let envelope = ResponseEnvelope::from_error(&BigoError::internal("panic", "boom"));
        assert_eq!(
            envelope,
            ResponseEnvelope::failure("panic: boom".to_string(), None)
        );
    }

    #[test]
    fn test_provider_error_keeps_status() {
        let err = BigoError::Llm(LlmError::new(ErrorCategory::Transient, "down").status(503));
        assert_eq!(ResponseEnvelope::from_error(&err).status(), Some(503));
    }
}
