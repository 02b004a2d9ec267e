//! AI Text Provider Abstraction
//!
//! Defines the `TextProvider` trait: a prompt goes in, raw model text comes
//! out. Interpretation of that text belongs to the normalizer.
//!
//! ## Modules
//!
//! - `chain`: Primary-then-fallback chain with per-provider retry/backoff
//! - `chat`: Chat-session provider (readiness handshake + streamed fragments)
//! - `text_endpoint`: Plain HTTP GET text endpoint

mod chain;
mod chat;
mod text_endpoint;

pub use chain::{
    ChainAttemptResult, ChainConfig, ChainOutcome, ChainStats, ChainedProvider, ProviderChain,
};
pub use chat::{ChatOptions, ChatProvider, ChatSession, FragmentStream, HttpChatSession};
pub use text_endpoint::TextEndpointProvider;

// Re-export error types from centralized location
pub use crate::types::{ErrorCategory, ErrorClassifier, LlmError};

use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::types::{BigoError, ProviderKind, Result};

// =============================================================================
// Text Provider Trait
// =============================================================================

/// A source of raw analysis text for a prompt
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Produce the model's raw text for `prompt`
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;
}

/// Shared provider type held by the chain
pub type SharedProvider = Arc<dyn TextProvider>;

/// Build the provider chain described by the configuration.
///
/// Disabled providers are left out; the chain still reports them as
/// not attempted when everything else fails.
pub fn create_chain(config: &Config) -> Result<ProviderChain> {
    let max_attempts = config.retry.max_attempts;
    let mut chain = ProviderChain::new(ChainConfig::from(&config.retry));

    if config.primary.enabled {
        let session = HttpChatSession::new(&config.primary)?;
        let options = ChatOptions {
            model: config.primary.model.clone(),
            stream: config.primary.stream,
        };
        let provider = ChatProvider::new(
            session,
            options,
            Duration::from_millis(config.primary.settle_delay_ms),
        );
        chain = chain.add_provider(ChainedProvider::new(
            Arc::new(provider),
            ProviderKind::Primary,
            max_attempts,
        ));
    } else {
        debug!("Primary provider disabled by configuration");
    }

    if config.fallback.enabled {
        let provider = TextEndpointProvider::new(&config.fallback)?;
        chain = chain.add_provider(ChainedProvider::new(
            Arc::new(provider),
            ProviderKind::Fallback,
            max_attempts,
        ));
    } else {
        debug!("Fallback provider disabled by configuration");
    }

    Ok(chain)
}

/// Parse and check a provider endpoint.
///
/// Only http/https are accepted. Endpoints that cannot carry path segments
/// are rejected here so request URLs can be built infallibly later.
pub(crate) fn validate_endpoint(endpoint: &str, label: &str) -> Result<Url> {
    let url = Url::parse(endpoint).map_err(|e| {
        BigoError::Config(format!("Invalid {} endpoint URL '{}': {}", label, endpoint, e))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(BigoError::Config(format!(
            "{} endpoint must use http or https scheme, got: {}",
            label,
            url.scheme()
        )));
    }

    if url.cannot_be_a_base() {
        return Err(BigoError::Config(format!(
            "{} endpoint cannot carry a path: {}",
            label, endpoint
        )));
    }

    if url.query().is_some() || url.fragment().is_some() {
        warn!("{} endpoint query/fragment will be ignored: {}", label, endpoint);
    }

    Ok(url)
}

/// Characters `encodeURIComponent` leaves as-is: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Endpoint with `segments` appended to its path
///
/// Each segment is percent-encoded as a single path component, control
/// characters included.
pub(crate) fn endpoint_with_segments(base: &Url, segments: &[&str]) -> Url {
    let mut path = base.path().trim_end_matches('/').to_string();
    for segment in segments {
        path.push('/');
        path.extend(utf8_percent_encode(segment, URI_COMPONENT));
    }

    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.set_path(&path);
    url
}
