//! Messaging Bridge
//!
//! Request/response message passing between the calling context and the
//! context that runs analyses. The worker owns the backend and serves one
//! request at a time; callers hold a cloneable [`AnalysisHandle`].
//!
//! If the worker goes away before replying, the pending call fails with
//! [`BigoError::ChannelClosed`]. A panic inside an analysis is caught here
//! and returned as an internal failure envelope.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::analyzer::ComplexityAnalyzer;
use crate::constants::bridge::QUEUE_CAPACITY;
use crate::types::{AnalysisRequest, BigoError, ResponseEnvelope, Result};

/// Whatever produces envelopes on the worker side
#[async_trait]
pub trait AnalysisBackend: Send + Sync + 'static {
    async fn analyze(&self, request: &AnalysisRequest) -> ResponseEnvelope;
}

#[async_trait]
impl AnalysisBackend for ComplexityAnalyzer {
    async fn analyze(&self, request: &AnalysisRequest) -> ResponseEnvelope {
        ComplexityAnalyzer::analyze(self, request).await
    }
}

struct Job {
    request: AnalysisRequest,
    reply: oneshot::Sender<ResponseEnvelope>,
}

/// Caller side of the bridge
#[derive(Clone)]
pub struct AnalysisHandle {
    tx: mpsc::Sender<Job>,
}

impl AnalysisHandle {
    /// Submit code for analysis and wait for the envelope
    pub async fn analyze(
        &self,
        code: impl Into<String>,
        language: impl Into<String>,
    ) -> Result<ResponseEnvelope> {
        self.request(AnalysisRequest::new(code, language)).await
    }

    /// Submit a prepared request and wait for the envelope
    pub async fn request(&self, request: AnalysisRequest) -> Result<ResponseEnvelope> {
        let (reply, response) = oneshot::channel();
        let request_id = request.id;

        self.tx
            .send(Job { request, reply })
            .await
            .map_err(|_| BigoError::ChannelClosed)?;
        debug!(%request_id, "Request delivered to analysis worker");

        response.await.map_err(|_| BigoError::ChannelClosed)
    }

    /// Whether the worker side is gone
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Worker side of the bridge
pub struct AnalysisService;

impl AnalysisService {
    /// Start a worker task owning `backend`.
    ///
    /// The worker stops once every handle is dropped. Aborting the returned
    /// task tears the worker down and fails any pending call.
    pub fn spawn<B: AnalysisBackend>(backend: B) -> (AnalysisHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let worker = tokio::spawn(run(backend, rx));
        (AnalysisHandle { tx }, worker)
    }
}

async fn run<B: AnalysisBackend>(backend: B, mut rx: mpsc::Receiver<Job>) {
    info!("Analysis worker started");

    while let Some(Job { request, reply }) = rx.recv().await {
        let envelope = match AssertUnwindSafe(backend.analyze(&request))
            .catch_unwind()
            .await
        {
            Ok(envelope) => envelope,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(request_id = %request.id, "Analysis panicked: {}", message);
                ResponseEnvelope::from_error(&BigoError::internal("Panic", message))
            }
        };

        if reply.send(envelope).is_err() {
            debug!(request_id = %request.id, "Caller went away before the reply");
        }
    }

    info!("Analysis worker stopped");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnalysisResult;
    use std::time::Duration;

    enum Behavior {
        Succeed,
        Panic,
        Hang,
    }

    struct StubBackend(Behavior);

    #[async_trait]
    impl AnalysisBackend for StubBackend {
        async fn analyze(&self, request: &AnalysisRequest) -> ResponseEnvelope {
            match self.0 {
                Behavior::Succeed => {
                    let mut result = AnalysisResult::default();
                    result.pattern = request.language.clone();
                    ResponseEnvelope::from(result)
                }
                Behavior::Panic => panic!("boom"),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    ResponseEnvelope::failure("unreachable", None)
                }
            }
        }
    }

    #[tokio::test]
    async fn test_round_trip() {
        let (handle, _worker) = AnalysisService::spawn(StubBackend(Behavior::Succeed));

        let envelope = handle.analyze("code", "Rust").await.unwrap();
        assert_eq!(envelope.result().unwrap().pattern, "Rust");

        // The worker keeps serving after a reply
        let envelope = handle.clone().analyze("code", "Go").await.unwrap();
        assert_eq!(envelope.result().unwrap().pattern, "Go");
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_failure() {
        let (handle, _worker) = AnalysisService::spawn(StubBackend(Behavior::Panic));

        let envelope = handle.analyze("code", "Rust").await.unwrap();
        match envelope {
            ResponseEnvelope::Failure(failure) => {
                assert_eq!(failure.error, "Panic: boom");
                assert_eq!(failure.status, None);
            }
            other => panic!("unexpected envelope: {other:?}"),
        }

        // Worker survives the panic
        assert!(!handle.is_closed());
    }

    #[tokio::test]
    async fn test_teardown_mid_flight_is_channel_closed() {
        let (handle, worker) = AnalysisService::spawn(StubBackend(Behavior::Hang));

        let pending = tokio::spawn({
            let handle = handle.clone();
            async move { handle.analyze("code", "Rust").await }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        worker.abort();

        let result = pending.await.unwrap();
        assert!(matches!(result, Err(BigoError::ChannelClosed)));
    }

    #[tokio::test]
    async fn test_send_after_teardown_is_channel_closed() {
        let (handle, worker) = AnalysisService::spawn(StubBackend(Behavior::Succeed));
        worker.abort();
        let _ = worker.await;

        assert!(handle.is_closed());
        let result = handle.analyze("code", "Rust").await;
        assert!(matches!(result, Err(BigoError::ChannelClosed)));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(payload.as_ref()), "static str");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");

        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
