//! Unified Error Type System
//!
//! Centralized error types for the entire crate.
//! Provides error classification for retry and fallback decisions.
//!
//! ## Error Categories
//!
//! - **Transient**: 5xx responses (retry with backoff)
//! - **Network**: Connectivity issues (retry with backoff)
//! - **RateLimit / Auth / BadRequest**: 4xx responses (fall back, no retry)
//! - **Unavailable**: Provider could not be readied (fall back, no retry)
//! - **Provider**: Provider reported a failure or returned nothing usable
//!
//! Malformed model output is never an error; the normalizer absorbs it.

use thiserror::Error;

use super::analysis::ProviderKind;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories for retry routing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Server-side 5xx failure - retry same provider
    Transient,
    /// Connection/DNS/timeout failure - retry same provider
    Network,
    /// 429 response - treated as permanent for this request
    RateLimit,
    /// 401/403 response
    Auth,
    /// Other 4xx response
    BadRequest,
    /// Provider SDK/session could not be initialized
    Unavailable,
    /// Provider body could not be decoded
    ParseError,
    /// Provider explicitly reported failure or returned empty text
    Provider,
    /// Anything else
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Network => write!(f, "NETWORK"),
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Provider => write!(f, "PROVIDER"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Only server errors and network failures are worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient | Self::Network)
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// Provider failure with category, HTTP status and provider context
#[derive(Debug, Clone)]
pub struct LlmError {
    /// Error category for routing decisions
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
    /// HTTP status, when the failure came from a response
    pub status: Option<u16>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
            status: None,
        }
    }

    /// Create error with provider context
    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
            status: None,
        }
    }

    /// Attach the HTTP status that produced this error
    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps transport-level outcomes onto error categories
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an HTTP status code
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        let category = match status {
            500..=599 => ErrorCategory::Transient,
            429 => ErrorCategory::RateLimit,
            401 | 403 => ErrorCategory::Auth,
            400..=499 => ErrorCategory::BadRequest,
            _ => ErrorCategory::Unknown,
        };
        LlmError::with_provider(category, message, provider).status(status)
    }

    /// Classify a reqwest failure raised before or while reading a response
    pub fn classify_reqwest(err: &reqwest::Error, provider: &str) -> LlmError {
        if let Some(status) = err.status() {
            return Self::classify_http_status(status.as_u16(), &err.to_string(), provider);
        }

        let category = if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
        {
            ErrorCategory::Network
        } else if err.is_decode() {
            ErrorCategory::ParseError
        } else {
            ErrorCategory::Unknown
        };
        LlmError::with_provider(category, err.to_string(), provider)
    }

    /// Classify any crate error for chain routing
    pub fn classify_error(err: &BigoError, provider: &str) -> LlmError {
        match err {
            BigoError::Llm(llm) => {
                let mut llm = llm.clone();
                if llm.provider.is_none() {
                    llm.provider = Some(provider.to_string());
                }
                llm
            }
            BigoError::Http(e) => Self::classify_reqwest(e, provider),
            BigoError::Io(_) => {
                LlmError::with_provider(ErrorCategory::Network, err.to_string(), provider)
            }
            BigoError::Json(_) => {
                LlmError::with_provider(ErrorCategory::ParseError, err.to_string(), provider)
            }
            BigoError::Config(_) => {
                LlmError::with_provider(ErrorCategory::Unavailable, err.to_string(), provider)
            }
            _ => LlmError::with_provider(ErrorCategory::Unknown, err.to_string(), provider),
        }
    }
}

// =============================================================================
// Provider Failure Summary
// =============================================================================

/// Outcome recorded for one provider after its attempts were exhausted
#[derive(Debug, Clone)]
pub struct ProviderFailure {
    /// Chain slot the provider occupied
    pub slot: ProviderKind,
    /// Provider name
    pub provider: String,
    /// Number of attempts made
    pub attempts: u32,
    /// Last error seen from this provider
    pub error: LlmError,
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum BigoError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // -------------------------------------------------------------------------
    // Provider Errors
    // -------------------------------------------------------------------------
    #[error("Provider error: {0}")]
    Llm(LlmError),

    /// Every configured provider failed
    #[error("AI services unavailable. {summary}")]
    ProvidersExhausted {
        summary: String,
        status: Option<u16>,
        failures: Vec<ProviderFailure>,
    },

    // -------------------------------------------------------------------------
    // Boundary Errors
    // -------------------------------------------------------------------------
    /// The other end of the request channel went away mid-flight
    #[error("Message channel closed before a response was received")]
    ChannelClosed,

    #[error("Config error: {0}")]
    Config(String),

    #[error("{kind}: {message}")]
    Internal { kind: String, message: String },
}

impl From<LlmError> for BigoError {
    fn from(err: LlmError) -> Self {
        BigoError::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, BigoError>;

impl BigoError {
    /// Create a provider error with category
    pub fn llm_with_category(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self::Llm(LlmError::new(category, message))
    }

    /// Create an internal error
    pub fn internal(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Internal {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Stable label naming the kind of failure
    pub fn kind(&self) -> &str {
        match self {
            Self::Io(_) => "IoError",
            Self::Json(_) => "JsonError",
            Self::Http(_) => "HttpError",
            Self::Llm(_) => "ProviderError",
            Self::ProvidersExhausted { .. } => "ProvidersExhausted",
            Self::ChannelClosed => "ChannelClosed",
            Self::Config(_) => "ConfigError",
            Self::Internal { kind, .. } => kind.as_str(),
        }
    }

    /// HTTP status associated with this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Llm(e) => e.status,
            Self::ProvidersExhausted { status, .. } => *status,
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
