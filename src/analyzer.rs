//! Complexity Analyzer
//!
//! The end-to-end pipeline behind `analyze(code, language)`:
//!
//! ```text
//! AnalysisRequest → build_prompt → ProviderChain → normalize → ResponseEnvelope
//! ```
//!
//! `analyze` always returns an envelope. Provider-chain failures become a
//! failure envelope carrying the last HTTP status; malformed model output is
//! absorbed by the normalizer.

use tracing::{debug, info, instrument, warn};

use crate::ai::{ProviderChain, build_prompt, create_chain, normalize};
use crate::config::{Config, PromptConfig};
use crate::types::{AnalysisRequest, AnalysisResult, ResponseEnvelope, Result};

/// Prompt → providers → normalizer pipeline
pub struct ComplexityAnalyzer {
    chain: ProviderChain,
    prompt: PromptConfig,
}

impl ComplexityAnalyzer {
    pub fn new(chain: ProviderChain, prompt: PromptConfig) -> Self {
        Self { chain, prompt }
    }

    /// Build the analyzer and its provider chain from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(create_chain(config)?, config.prompt.clone()))
    }

    /// Prompt that would be sent for a request
    pub fn prompt_for(&self, request: &AnalysisRequest) -> String {
        build_prompt(&request.code, &request.language, &self.prompt)
    }

    /// Analyze a submission, reporting any failure inside the envelope
    pub async fn analyze(&self, request: &AnalysisRequest) -> ResponseEnvelope {
        match self.try_analyze(request).await {
            Ok(result) => ResponseEnvelope::from(result),
            Err(err) => {
                warn!(request_id = %request.id, kind = err.kind(), "Analysis failed: {}", err);
                ResponseEnvelope::from_error(&err)
            }
        }
    }

    /// Analyze a submission, propagating chain failures
    #[instrument(skip(self, request), fields(request_id = %request.id, language = %request.language))]
    pub async fn try_analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let prompt = self.prompt_for(request);
        debug!(
            code_chars = request.code.chars().count(),
            prompt_chars = prompt.chars().count(),
            "Prompt built"
        );

        let outcome = self.chain.execute(&prompt).await?;
        let result = normalize(&outcome.text).with_provider(outcome.kind);

        info!(
            provider = %outcome.provider_name,
            slot = %outcome.kind,
            time = %result.time_complexity.worst,
            space = %result.space_complexity.worst,
            "Analysis complete"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{ChainConfig, ChainedProvider, TextProvider};
    use crate::types::{BigoError, ComplexityEstimate, ErrorClassifier, ProviderKind};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Returns a fixed reply and remembers the prompt it saw
    struct FixedProvider {
        reply: std::result::Result<String, u16>,
        seen: Mutex<Vec<String>>,
    }

    impl FixedProvider {
        fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn status(status: u16) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(status),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextProvider for FixedProvider {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.seen.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(ErrorClassifier::classify_http_status(
                    *status,
                    &format!("HTTP {}", status),
                    "fixed",
                )
                .into()),
            }
        }

        fn name(&self) -> &str {
            "fixed"
        }

        fn model(&self) -> &str {
            "fixed"
        }
    }

    fn analyzer(primary: Arc<FixedProvider>, fallback: Arc<FixedProvider>) -> ComplexityAnalyzer {
        let config = ChainConfig {
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            backoff_factor: 2.0,
        };
        let chain = ProviderChain::new(config)
            .add_provider(ChainedProvider::new(primary, ProviderKind::Primary, 2))
            .add_provider(ChainedProvider::new(fallback, ProviderKind::Fallback, 2));
        ComplexityAnalyzer::new(chain, PromptConfig::default())
    }

    #[tokio::test]
    async fn test_success_envelope_from_primary() {
        let primary = FixedProvider::ok(r#"{"timeComplexity": "O(n)", "spaceComplexity": "O(n)"}"#);
        let fallback = FixedProvider::ok("unused");
        let analyzer = analyzer(primary.clone(), fallback.clone());

        let envelope = analyzer
            .analyze(&AnalysisRequest::new("for x in xs: seen.add(x)", "Python"))
            .await;

        let result = envelope.result().unwrap();
        assert_eq!(result.provider, ProviderKind::Primary);
        assert_eq!(result.space_complexity, ComplexityEstimate::uniform("O(n)"));
        assert!(primary.seen.lock().unwrap()[0].contains("for x in xs: seen.add(x)"));
        assert!(fallback.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fallback_result_is_tagged() {
        let analyzer = analyzer(
            FixedProvider::status(401),
            FixedProvider::ok("Time Complexity: O(log n)\nSpace Complexity: O(1)"),
        );

        let envelope = analyzer.analyze(&AnalysisRequest::new("code", "Go")).await;
        let result = envelope.result().unwrap();

        assert_eq!(result.provider, ProviderKind::Fallback);
        assert_eq!(result.time_complexity.worst, "O(log n)");
    }

    #[tokio::test]
    async fn test_chain_failure_becomes_failure_envelope() {
        let analyzer = analyzer(FixedProvider::status(503), FixedProvider::status(502));

        let envelope = analyzer.analyze(&AnalysisRequest::new("code", "Go")).await;

        assert!(!envelope.is_success());
        assert_eq!(envelope.status(), Some(502));
        match envelope {
            ResponseEnvelope::Failure(failure) => {
                assert!(failure.error.contains("primary (fixed): failed after 2 attempts"));
                assert!(failure.error.contains("fallback (fixed): failed after 2 attempts"));
            }
            other => panic!("unexpected envelope: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unrecognizable_reply_still_succeeds() {
        let analyzer = analyzer(FixedProvider::ok("I am not sure."), FixedProvider::ok("unused"));

        let result = analyzer
            .try_analyze(&AnalysisRequest::new("code", "Go"))
            .await
            .unwrap();

        assert_eq!(result, AnalysisResult::default());
    }

    #[test]
    fn test_prompt_uses_configured_limit() {
        let mut analyzer = analyzer(FixedProvider::ok("x"), FixedProvider::ok("x"));
        analyzer.prompt.max_code_chars = 4;

        let prompt = analyzer.prompt_for(&AnalysisRequest::new("abcdefgh", "C"));
        assert!(prompt.contains("```C\nabcd\n```"));
    }

    #[test]
    fn test_from_config_rejects_invalid_endpoint() {
        let mut config = Config::default();
        config.primary.endpoint = "gopher://old".to_string();
        assert!(matches!(
            ComplexityAnalyzer::from_config(&config),
            Err(BigoError::Config(_))
        ));
    }
}
