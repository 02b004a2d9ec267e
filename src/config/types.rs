//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global and project (.bigology/) level configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{fallback, primary, prompt, retry};
use crate::types::{BigoError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Prompt construction settings
    pub prompt: PromptConfig,

    /// Retry/backoff applied to each provider
    pub retry: RetryConfig,

    /// Primary chat provider
    pub primary: PrimaryConfig,

    /// Fallback plain-text provider
    pub fallback: FallbackConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            prompt: PromptConfig::default(),
            retry: RetryConfig::default(),
            primary: PrimaryConfig::default(),
            fallback: FallbackConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `BigoError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.max_code_chars == 0 {
            return Err(BigoError::Config(
                "prompt.max_code_chars must be greater than 0".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(BigoError::Config(
                "retry.max_attempts must be greater than 0".to_string(),
            ));
        }

        if !(self.retry.backoff_factor >= 1.0) {
            return Err(BigoError::Config(format!(
                "retry.backoff_factor must be at least 1.0, got {}",
                self.retry.backoff_factor
            )));
        }

        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            return Err(BigoError::Config(format!(
                "retry.max_delay_ms ({}) must not be below retry.base_delay_ms ({})",
                self.retry.max_delay_ms, self.retry.base_delay_ms
            )));
        }

        if self.primary.enabled && self.primary.timeout_secs == 0 {
            return Err(BigoError::Config(
                "primary.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.fallback.enabled && self.fallback.timeout_secs == 0 {
            return Err(BigoError::Config(
                "fallback.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if !self.primary.enabled && !self.fallback.enabled {
            return Err(BigoError::Config(
                "At least one of primary or fallback must be enabled".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Prompt Configuration
// =============================================================================

/// Which instruction template to send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PromptTemplate {
    /// Full JSON schema with quality metrics and explanations
    #[default]
    Structured,
    /// Two labeled lines: time and space complexity only
    Compact,
}

impl std::fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromptTemplate::Structured => write!(f, "structured"),
            PromptTemplate::Compact => write!(f, "compact"),
        }
    }
}

impl std::str::FromStr for PromptTemplate {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "structured" => Ok(PromptTemplate::Structured),
            "compact" => Ok(PromptTemplate::Compact),
            _ => Err(format!(
                "Unknown prompt template: {}. Valid values: structured, compact",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Source characters kept before embedding
    pub max_code_chars: usize,

    pub template: PromptTemplate,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_code_chars: prompt::MAX_CODE_CHARS,
            template: PromptTemplate::default(),
        }
    }
}

// =============================================================================
// Retry Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts per provider, first call included
    pub max_attempts: u32,

    /// Delay before the first retry
    pub base_delay_ms: u64,

    /// Multiplier applied to the delay after each retry
    pub backoff_factor: f32,

    /// Upper bound for a single delay
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: retry::MAX_ATTEMPTS,
            base_delay_ms: retry::BASE_DELAY_MS,
            backoff_factor: retry::BACKOFF_FACTOR,
            max_delay_ms: retry::MAX_DELAY_MS,
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

// =============================================================================
// Provider Configuration
// =============================================================================

/// Primary chat provider settings
///
/// The API key is never serialized and is redacted in debug output.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryConfig {
    pub enabled: bool,

    /// Chat server base URL
    pub endpoint: String,

    /// Model identifier passed with every chat call
    pub model: String,

    /// Request streamed fragments instead of a single body
    pub stream: bool,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// One-time delay after the session is first readied
    pub settle_delay_ms: u64,

    /// Optional bearer token
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for PrimaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimaryConfig")
            .field("enabled", &self.enabled)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("stream", &self.stream)
            .field("timeout_secs", &self.timeout_secs)
            .field("settle_delay_ms", &self.settle_delay_ms)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for PrimaryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: primary::DEFAULT_ENDPOINT.to_string(),
            model: primary::DEFAULT_MODEL.to_string(),
            stream: true,
            timeout_secs: primary::TIMEOUT_SECS,
            settle_delay_ms: primary::SETTLE_DELAY_MS,
            api_key: None,
        }
    }
}

/// Fallback text endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub enabled: bool,

    /// Base URL; the encoded prompt is appended as the last path segment
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: fallback::DEFAULT_ENDPOINT.to_string(),
            timeout_secs: fallback::TIMEOUT_SECS,
        }
    }
}
