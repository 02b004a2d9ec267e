//! Chat Session Provider
//!
//! Primary provider backed by a chat session that lives in a separate
//! execution context. The session must be readied once before first use;
//! readiness is memoized so only the first caller pays the startup cost,
//! and concurrent first callers share a single initialization.
//!
//! Chat output arrives as a stream of text fragments which are concatenated
//! into the raw response.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

use super::{TextProvider, endpoint_with_segments, validate_endpoint};
use crate::config::PrimaryConfig;
use crate::types::{BigoError, ErrorCategory, ErrorClassifier, LlmError, Result};

/// Ordered text fragments of one chat reply
pub type FragmentStream = BoxStream<'static, Result<String>>;

/// Per-call chat options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOptions {
    pub model: String,
    pub stream: bool,
}

/// A chat capability reached through a readiness handshake
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Bring the session up. May be called again after a failure.
    async fn initialize(&self) -> Result<()>;

    /// Send one prompt and receive the reply as fragments
    async fn chat(&self, prompt: &str, options: &ChatOptions) -> Result<FragmentStream>;

    /// Session name for logging
    fn name(&self) -> &str;
}

// =============================================================================
// ChatProvider
// =============================================================================

/// `TextProvider` over a `ChatSession`
pub struct ChatProvider<S> {
    session: S,
    options: ChatOptions,
    settle_delay: Duration,
    ready: OnceCell<()>,
}

impl<S: ChatSession> ChatProvider<S> {
    pub fn new(session: S, options: ChatOptions, settle_delay: Duration) -> Self {
        Self {
            session,
            options,
            settle_delay,
            ready: OnceCell::new(),
        }
    }

    /// Whether the readiness handshake has completed
    pub fn is_ready(&self) -> bool {
        self.ready.initialized()
    }

    /// Run the readiness handshake once.
    ///
    /// A failed handshake is reported as `Unavailable` and leaves the cell
    /// empty, so the next call tries again.
    async fn ensure_ready(&self) -> Result<()> {
        self.ready
            .get_or_try_init(|| async {
                info!(session = %self.session.name(), "Initializing chat session");

                self.session.initialize().await.map_err(|e| {
                    BigoError::Llm(
                        LlmError::with_provider(
                            ErrorCategory::Unavailable,
                            format!("Chat session could not be initialized: {}", e),
                            self.session.name(),
                        ),
                    )
                })?;

                if !self.settle_delay.is_zero() {
                    debug!(
                        settle_ms = self.settle_delay.as_millis() as u64,
                        "Waiting for chat session to settle"
                    );
                    sleep(self.settle_delay).await;
                }

                Ok::<(), BigoError>(())
            })
            .await?;

        Ok(())
    }
}

#[async_trait]
impl<S: ChatSession> TextProvider for ChatProvider<S> {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.ensure_ready().await?;

        debug!(
            session = %self.session.name(),
            model = %self.options.model,
            stream = self.options.stream,
            "Sending chat request"
        );

        let mut fragments = self.session.chat(prompt, &self.options).await?;
        let mut text = String::new();
        while let Some(fragment) = fragments.next().await {
            text.push_str(&fragment?);
        }

        if text.trim().is_empty() {
            return Err(LlmError::with_provider(
                ErrorCategory::Provider,
                "Chat returned no text",
                self.session.name(),
            )
            .into());
        }

        debug!(chars = text.len(), "Chat response assembled");
        Ok(text)
    }

    fn name(&self) -> &str {
        self.session.name()
    }

    fn model(&self) -> &str {
        &self.options.model
    }
}

// =============================================================================
// HTTP Chat Session (NDJSON streaming protocol)
// =============================================================================

const SESSION_NAME: &str = "chat";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: String,
}

/// One NDJSON line (or the whole body when not streaming)
#[derive(Debug, Deserialize)]
struct ChatLine {
    #[serde(default)]
    message: Option<ChatMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Chat session against an HTTP chat server
///
/// Readiness is `GET {endpoint}/api/version`; chats are
/// `POST {endpoint}/api/chat` answered with newline-delimited JSON.
pub struct HttpChatSession {
    chat_url: Url,
    version_url: Url,
    /// Bearer token stored securely - never exposed in logs or debug output
    api_key: Option<SecretString>,
    client: reqwest::Client,
}

impl HttpChatSession {
    pub fn new(config: &PrimaryConfig) -> Result<Self> {
        let endpoint = validate_endpoint(&config.endpoint, "Primary")?;

        if let Some(host) = endpoint.host_str()
            && !matches!(host, "localhost" | "127.0.0.1" | "[::1]")
            && config.api_key.is_none()
        {
            warn!(
                "Primary endpoint {} is remote and no api_key is configured",
                host
            );
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BigoError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            chat_url: endpoint_with_segments(&endpoint, &["api", "chat"]),
            version_url: endpoint_with_segments(&endpoint, &["api", "version"]),
            api_key: config.api_key.clone().map(SecretString::from),
            client,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        }
    }
}

#[async_trait]
impl ChatSession for HttpChatSession {
    async fn initialize(&self) -> Result<()> {
        let response = self
            .authorize(self.client.get(self.version_url.clone()))
            .send()
            .await
            .map_err(|e| ErrorClassifier::classify_reqwest(&e, SESSION_NAME))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Chat server readiness check failed ({})", status),
                SESSION_NAME,
            )
            .into());
        }

        debug!(url = %self.version_url, "Chat server ready");
        Ok(())
    }

    async fn chat(&self, prompt: &str, options: &ChatOptions) -> Result<FragmentStream> {
        let request = ChatRequest {
            model: &options.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: options.stream,
        };

        let response = self
            .authorize(self.client.post(self.chat_url.clone()))
            .json(&request)
            .send()
            .await
            .map_err(|e| ErrorClassifier::classify_reqwest(&e, SESSION_NAME))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Chat API error ({}): {}", status, body),
                SESSION_NAME,
            )
            .into());
        }

        if options.stream {
            return Ok(ndjson_fragments(response.bytes_stream(), SESSION_NAME));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ErrorClassifier::classify_reqwest(&e, SESSION_NAME))?;
        let fragment = parse_line(body.as_bytes(), SESSION_NAME)?
            .map(|chunk| chunk.content)
            .unwrap_or_default();

        Ok(stream::once(async move { Ok(fragment) }).boxed())
    }

    fn name(&self) -> &str {
        SESSION_NAME
    }
}

// =============================================================================
// NDJSON Fragment Decoding
// =============================================================================

struct ChatChunk {
    content: String,
    done: bool,
}

fn parse_line(line: &[u8], provider: &str) -> Result<Option<ChatChunk>> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let parsed: ChatLine = serde_json::from_str(line).map_err(|e| {
        LlmError::with_provider(
            ErrorCategory::ParseError,
            format!("Malformed chat stream line: {}", e),
            provider,
        )
    })?;

    if let Some(error) = parsed.error.filter(|e| !e.trim().is_empty()) {
        return Err(LlmError::with_provider(ErrorCategory::Provider, error, provider).into());
    }

    Ok(Some(ChatChunk {
        content: parsed.message.map(|m| m.content).unwrap_or_default(),
        done: parsed.done,
    }))
}

struct NdjsonState<B, E> {
    bytes: Pin<Box<dyn Stream<Item = std::result::Result<B, E>> + Send>>,
    buffer: Vec<u8>,
    finished: bool,
    provider: &'static str,
}

/// Decode a byte stream of newline-delimited chat lines into fragments.
///
/// Lines may be split across chunks. Decoding stops after a `done` line,
/// an `error` line or a transport error.
fn ndjson_fragments<S, B, E>(bytes: S, provider: &'static str) -> FragmentStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<BigoError> + Send + 'static,
{
    let state = NdjsonState {
        bytes: Box::pin(bytes.fuse()),
        buffer: Vec::new(),
        finished: false,
        provider,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if state.finished {
                return None;
            }

            if let Some(pos) = state.buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = state.buffer.drain(..=pos).collect();
                match parse_line(&line, state.provider) {
                    Ok(None) => continue,
                    Ok(Some(chunk)) => {
                        state.finished = chunk.done;
                        return Some((Ok(chunk.content), state));
                    }
                    Err(e) => {
                        state.finished = true;
                        return Some((Err(e), state));
                    }
                }
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => state.buffer.extend_from_slice(chunk.as_ref()),
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(e.into()), state));
                }
                None => {
                    if state.buffer.iter().all(u8::is_ascii_whitespace) {
                        return None;
                    }
                    // Final line without a trailing newline
                    state.buffer.push(b'\n');
                }
            }
        }
    })
    .boxed()
}
