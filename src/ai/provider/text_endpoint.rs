//! Plain-Text Endpoint Provider
//!
//! Fallback provider: the whole prompt travels as one percent-encoded path
//! segment of a GET request and the response body is the raw model text.
//! No authentication, no request body.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::{TextProvider, endpoint_with_segments, validate_endpoint};
use crate::config::FallbackConfig;
use crate::types::{BigoError, ErrorCategory, ErrorClassifier, LlmError, Result};

const PROVIDER_NAME: &str = "text-endpoint";

/// GET-based text generation endpoint
pub struct TextEndpointProvider {
    endpoint: Url,
    client: reqwest::Client,
}

impl TextEndpointProvider {
    pub fn new(config: &FallbackConfig) -> Result<Self> {
        let endpoint = validate_endpoint(&config.endpoint, "Fallback")?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BigoError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { endpoint, client })
    }

    /// Request URL for a prompt
    fn request_url(&self, prompt: &str) -> Url {
        endpoint_with_segments(&self.endpoint, &[prompt])
    }
}

#[async_trait]
impl TextProvider for TextEndpointProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = self.request_url(prompt);
        debug!(url_len = url.as_str().len(), "Sending text endpoint request");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/plain")
            .send()
            .await
            .map_err(|e| ErrorClassifier::classify_reqwest(&e, PROVIDER_NAME))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                format!("HTTP {}: {}", status.as_u16(), body.trim())
            };
            return Err(
                ErrorClassifier::classify_http_status(status.as_u16(), &message, PROVIDER_NAME)
                    .into(),
            );
        }

        let text = response
            .text()
            .await
            .map_err(|e| ErrorClassifier::classify_reqwest(&e, PROVIDER_NAME))?;

        if text.trim().is_empty() {
            return Err(LlmError::with_provider(
                ErrorCategory::Provider,
                "Text endpoint returned an empty body",
                PROVIDER_NAME,
            )
            .into());
        }

        Ok(text)
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        "default"
    }
}
