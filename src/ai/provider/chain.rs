//! Primary/Fallback Provider Chain
//!
//! Ordered provider attempts with per-provider retry and exponential backoff.
//!
//! ## Strategy
//!
//! 1. Try providers in fixed order (primary, then fallback)
//! 2. Retry a provider only on transient failures (5xx, network)
//! 3. Any other failure, or exhausted attempts, moves to the next provider
//! 4. The first non-empty text wins; nothing is mixed across providers
//! 5. When every provider fails, report each slot as failed or not attempted
//!
//! The chain keeps no state between executions.

use std::time::{Duration, Instant};

use backon::{BackoffBuilder, ExponentialBackoff, ExponentialBuilder};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use super::SharedProvider;
use crate::config::RetryConfig;
use crate::types::{
    BigoError, ErrorCategory, ErrorClassifier, LlmError, ProviderFailure, ProviderKind, Result,
};

/// Provider with its slot in the chain
#[derive(Clone)]
pub struct ChainedProvider {
    /// Provider instance
    pub provider: SharedProvider,
    /// Which slot this provider fills
    pub kind: ProviderKind,
    /// Attempts for this provider, first call included
    pub max_attempts: u32,
}

impl ChainedProvider {
    pub fn new(provider: SharedProvider, kind: ProviderKind, max_attempts: u32) -> Self {
        Self {
            provider,
            kind,
            max_attempts: max_attempts.max(1),
        }
    }
}

/// Backoff settings shared by every provider in the chain
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Backoff multiplier
    pub backoff_factor: f32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for ChainConfig {
    fn from(retry: &RetryConfig) -> Self {
        Self {
            base_delay: retry.base_delay(),
            max_delay: retry.max_delay(),
            backoff_factor: retry.backoff_factor,
        }
    }
}

impl ChainConfig {
    /// Delays between consecutive attempts of one provider
    fn delays(&self, max_attempts: u32) -> ExponentialBackoff {
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_max_delay(self.max_delay)
            .with_factor(self.backoff_factor)
            .with_max_times(max_attempts.saturating_sub(1) as usize)
            .build()
    }
}

/// Result of a single provider call
#[derive(Debug)]
pub struct ChainAttemptResult {
    pub provider_name: String,
    pub kind: ProviderKind,
    pub attempt_number: u32,
    pub success: bool,
    pub error: Option<LlmError>,
    pub duration_ms: u64,
}

/// Execution statistics for the chain
#[derive(Debug, Default)]
pub struct ChainStats {
    pub total_attempts: u32,
    pub successful_provider: Option<String>,
    pub attempts: Vec<ChainAttemptResult>,
    pub total_duration_ms: u64,
}

impl ChainStats {
    /// Attempts recorded against one slot
    pub fn attempts_for(&self, kind: ProviderKind) -> usize {
        self.attempts.iter().filter(|a| a.kind == kind).count()
    }
}

/// Text produced by the winning provider
#[derive(Debug)]
pub struct ChainOutcome {
    pub text: String,
    pub kind: ProviderKind,
    pub provider_name: String,
    pub stats: ChainStats,
}

/// Ordered primary/fallback chain
pub struct ProviderChain {
    providers: Vec<ChainedProvider>,
    config: ChainConfig,
}

impl ProviderChain {
    /// Create a new provider chain
    pub fn new(config: ChainConfig) -> Self {
        Self {
            providers: Vec::new(),
            config,
        }
    }

    /// Add a provider to the chain
    pub fn add_provider(mut self, provider: ChainedProvider) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Providers in execution order
    pub fn providers(&self) -> &[ChainedProvider] {
        &self.providers
    }

    /// Fetch raw analysis text, trying each provider in order
    #[instrument(skip(self, prompt), fields(providers = self.providers.len(), prompt_chars = prompt.len()))]
    pub async fn execute(&self, prompt: &str) -> Result<ChainOutcome> {
        if self.providers.is_empty() {
            return Err(BigoError::Config(
                "No providers configured in chain".to_string(),
            ));
        }

        let mut stats = ChainStats::default();
        let mut failures: Vec<ProviderFailure> = Vec::new();
        let start_time = Instant::now();

        for entry in &self.providers {
            let provider_name = entry.provider.name().to_string();
            let mut delays = self.config.delays(entry.max_attempts);
            let mut last_error: Option<LlmError> = None;
            let mut attempts = 0;

            for attempt in 1..=entry.max_attempts {
                attempts = attempt;
                stats.total_attempts += 1;
                let attempt_start = Instant::now();

                debug!(
                    provider = %provider_name,
                    model = %entry.provider.model(),
                    slot = %entry.kind,
                    attempt = attempt,
                    max_attempts = entry.max_attempts,
                    "Chain attempt"
                );

                let error = match entry.provider.complete(prompt).await {
                    Ok(text) if !text.trim().is_empty() => {
                        stats.attempts.push(ChainAttemptResult {
                            provider_name: provider_name.clone(),
                            kind: entry.kind,
                            attempt_number: attempt,
                            success: true,
                            error: None,
                            duration_ms: attempt_start.elapsed().as_millis() as u64,
                        });
                        stats.successful_provider = Some(provider_name.clone());
                        stats.total_duration_ms = start_time.elapsed().as_millis() as u64;

                        info!(
                            provider = %provider_name,
                            slot = %entry.kind,
                            attempts = stats.total_attempts,
                            duration_ms = stats.total_duration_ms,
                            "Chain succeeded"
                        );

                        return Ok(ChainOutcome {
                            text,
                            kind: entry.kind,
                            provider_name,
                            stats,
                        });
                    }
                    Ok(_) => LlmError::with_provider(
                        ErrorCategory::Provider,
                        "Provider returned an empty response",
                        provider_name.as_str(),
                    ),
                    Err(err) => ErrorClassifier::classify_error(&err, &provider_name),
                };

                warn!(
                    provider = %provider_name,
                    attempt = attempt,
                    category = %error.category,
                    status = ?error.status,
                    error = %error.message,
                    "Provider failed"
                );

                stats.attempts.push(ChainAttemptResult {
                    provider_name: provider_name.clone(),
                    kind: entry.kind,
                    attempt_number: attempt,
                    success: false,
                    error: Some(error.clone()),
                    duration_ms: attempt_start.elapsed().as_millis() as u64,
                });

                let retryable = error.is_retryable();
                last_error = Some(error);

                if !retryable {
                    info!(provider = %provider_name, "Permanent failure, trying next provider");
                    break;
                }

                match delays.next() {
                    Some(delay) => {
                        debug!(delay_ms = delay.as_millis() as u64, "Retrying after backoff");
                        sleep(delay).await;
                    }
                    None => break,
                }
            }

            if let Some(error) = last_error {
                failures.push(ProviderFailure {
                    slot: entry.kind,
                    provider: provider_name,
                    attempts,
                    error,
                });
            }
        }

        stats.total_duration_ms = start_time.elapsed().as_millis() as u64;
        warn!(
            attempts = stats.total_attempts,
            duration_ms = stats.total_duration_ms,
            "All providers failed"
        );

        Err(exhausted(failures))
    }
}

/// Aggregate per-provider failures into the chain error.
///
/// Every slot is named: either with its failures or as not attempted.
fn exhausted(failures: Vec<ProviderFailure>) -> BigoError {
    let mut parts = Vec::new();

    for slot in [ProviderKind::Primary, ProviderKind::Fallback] {
        let mut slot_failures = failures.iter().filter(|f| f.slot == slot).peekable();
        if slot_failures.peek().is_none() {
            parts.push(format!("{}: not attempted", slot));
            continue;
        }
        for failure in slot_failures {
            parts.push(format!(
                "{} ({}): failed after {} attempt{}: {}",
                slot,
                failure.provider,
                failure.attempts,
                if failure.attempts == 1 { "" } else { "s" },
                failure.error.message
            ));
        }
    }

    let status = failures.iter().rev().find_map(|f| f.error.status);

    BigoError::ProvidersExhausted {
        summary: parts.join("; "),
        status,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::TextProvider;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Replays scripted outcomes, then keeps returning the last fallback text
    struct MockProvider {
        name: String,
        script: Mutex<VecDeque<Result<String>>>,
        call_count: AtomicU32,
    }

    impl MockProvider {
        fn new(name: &str, script: Vec<Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                script: Mutex::new(script.into()),
                call_count: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextProvider for MockProvider {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("Time Complexity: O(n)".to_string()))
        }

        fn name(&self) -> &str {
            &self.name
        }

        fn model(&self) -> &str {
            "mock-model"
        }
    }

    fn http(status: u16, provider: &str) -> Result<String> {
        Err(ErrorClassifier::classify_http_status(status, &format!("HTTP {}", status), provider).into())
    }

    fn fast_config() -> ChainConfig {
        ChainConfig {
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            backoff_factor: 2.0,
        }
    }

    fn chain(primary: &Arc<MockProvider>, fallback: &Arc<MockProvider>) -> ProviderChain {
        ProviderChain::new(fast_config())
            .add_provider(ChainedProvider::new(primary.clone(), ProviderKind::Primary, 3))
            .add_provider(ChainedProvider::new(fallback.clone(), ProviderKind::Fallback, 3))
    }

    #[tokio::test]
    async fn test_transient_failures_retried_on_primary() {
        let primary = MockProvider::new(
            "mock-primary",
            vec![
                http(503, "mock-primary"),
                http(503, "mock-primary"),
                Ok("primary text".to_string()),
            ],
        );
        let fallback = MockProvider::new("mock-fallback", vec![]);

        let outcome = chain(&primary, &fallback).execute("prompt").await.unwrap();

        assert_eq!(outcome.text, "primary text");
        assert_eq!(outcome.kind, ProviderKind::Primary);
        assert_eq!(primary.calls(), 3);
        assert_eq!(fallback.calls(), 0);
        assert_eq!(outcome.stats.total_attempts, 3);
        assert_eq!(outcome.stats.attempts[2].attempt_number, 3);
        assert!(outcome.stats.attempts[2].success);
        assert_eq!(outcome.stats.successful_provider.as_deref(), Some("mock-primary"));
    }

    #[tokio::test]
    async fn test_bad_request_not_retried() {
        let primary = MockProvider::new("mock-primary", vec![http(400, "mock-primary")]);
        let fallback = MockProvider::new("mock-fallback", vec![Ok("fallback text".to_string())]);

        let outcome = chain(&primary, &fallback).execute("prompt").await.unwrap();

        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
        assert_eq!(outcome.kind, ProviderKind::Fallback);
        assert_eq!(outcome.text, "fallback text");
        assert_eq!(outcome.stats.attempts_for(ProviderKind::Primary), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_not_retried() {
        let primary = MockProvider::new("mock-primary", vec![http(429, "mock-primary")]);
        let fallback = MockProvider::new("mock-fallback", vec![]);

        let outcome = chain(&primary, &fallback).execute("prompt").await.unwrap();

        assert_eq!(primary.calls(), 1);
        assert_eq!(outcome.kind, ProviderKind::Fallback);
    }

    #[tokio::test]
    async fn test_network_errors_retried() {
        let primary = MockProvider::new(
            "mock-primary",
            vec![
                Err(BigoError::llm_with_category(ErrorCategory::Network, "connection reset")),
                Ok("recovered".to_string()),
            ],
        );
        let fallback = MockProvider::new("mock-fallback", vec![]);

        let outcome = chain(&primary, &fallback).execute("prompt").await.unwrap();

        assert_eq!(primary.calls(), 2);
        assert_eq!(outcome.text, "recovered");
    }

    #[tokio::test]
    async fn test_empty_text_moves_to_fallback() {
        let primary = MockProvider::new("mock-primary", vec![Ok("   \n".to_string())]);
        let fallback = MockProvider::new("mock-fallback", vec![Ok("fallback text".to_string())]);

        let outcome = chain(&primary, &fallback).execute("prompt").await.unwrap();

        assert_eq!(primary.calls(), 1);
        assert_eq!(outcome.kind, ProviderKind::Fallback);
        let first = outcome.stats.attempts[0].error.as_ref().unwrap();
        assert_eq!(first.category, ErrorCategory::Provider);
    }

    #[tokio::test]
    async fn test_all_failed_names_every_provider() {
        let primary = MockProvider::new(
            "mock-primary",
            vec![
                http(503, "mock-primary"),
                http(503, "mock-primary"),
                http(503, "mock-primary"),
            ],
        );
        let fallback = MockProvider::new(
            "mock-fallback",
            vec![
                http(502, "mock-fallback"),
                http(502, "mock-fallback"),
                http(500, "mock-fallback"),
            ],
        );

        let err = chain(&primary, &fallback).execute("prompt").await.unwrap_err();
        let message = err.to_string();

        assert!(message.starts_with("AI services unavailable."));
        assert!(message.contains("primary (mock-primary): failed after 3 attempts: HTTP 503"));
        assert!(message.contains("fallback (mock-fallback): failed after 3 attempts: HTTP 500"));
        assert_eq!(err.status(), Some(500));
        assert_eq!(primary.calls(), 3);
        assert_eq!(fallback.calls(), 3);

        match err {
            BigoError::ProvidersExhausted { failures, .. } => {
                assert_eq!(failures.len(), 2);
                assert_eq!(failures[0].slot, ProviderKind::Primary);
                assert_eq!(failures[1].attempts, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_primary_reported_as_not_attempted() {
        let fallback = MockProvider::new("mock-fallback", vec![http(404, "mock-fallback")]);
        let chain = ProviderChain::new(fast_config()).add_provider(ChainedProvider::new(
            fallback.clone(),
            ProviderKind::Fallback,
            3,
        ));

        let err = chain.execute("prompt").await.unwrap_err();
        let message = err.to_string();

        assert!(message.contains("primary: not attempted"));
        assert!(message.contains("fallback (mock-fallback): failed after 1 attempt: HTTP 404"));
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_empty_chain_is_config_error() {
        let chain = ProviderChain::new(fast_config());
        assert!(chain.is_empty());
        assert!(matches!(
            chain.execute("prompt").await,
            Err(BigoError::Config(_))
        ));
    }

    #[test]
    fn test_delays_double_from_base() {
        let config = ChainConfig {
            base_delay: Duration::from_millis(600),
            max_delay: Duration::from_millis(10_000),
            backoff_factor: 2.0,
        };
        let delays: Vec<u128> = config.delays(4).map(|d| d.as_millis()).collect();
        assert_eq!(delays, vec![600, 1200, 2400]);
        assert_eq!(config.delays(1).count(), 0);
    }
}
