//! # Outbound Ports

use crate::domain::{Endpoint, Envelope, TransportError};
use async_trait::async_trait;
use cv_01_wire_codec::WireValue;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Replica status returned when a handle is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportStatus {
    /// Replica software version.
    pub replica_version: String,
    /// Root key (DER), only served by local replicas.
    pub root_key: Option<Vec<u8>>,
}

/// Moves envelopes to a backend.
#[async_trait]
pub trait AgentTransport: Send + Sync {
    /// Replica status for `endpoint`.
    async fn status(&self, endpoint: &Endpoint) -> Result<TransportStatus, TransportError>;

    /// Submit a state-changing call and wait for the reply.
    async fn call(&self, endpoint: &Endpoint, envelope: Envelope) -> Result<WireValue, TransportError>;

    /// Submit a read-only query.
    async fn query(&self, endpoint: &Endpoint, envelope: Envelope)
        -> Result<WireValue, TransportError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Scripted transport.
///
/// Replies are queued per method name. A method with nothing queued is
/// rejected with code 3 so a missing script fails loudly.
#[derive(Default)]
pub struct MockTransport {
    status_delay: Mutex<Duration>,
    status_error: Mutex<Option<TransportError>>,
    status_calls: AtomicUsize,
    replies: Mutex<HashMap<String, VecDeque<Result<WireValue, TransportError>>>>,
    sent: Mutex<Vec<Envelope>>,
}

impl MockTransport {
    /// Transport that answers status at once.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every status response.
    pub fn set_status_delay(&self, delay: Duration) {
        *self.status_delay.lock() = delay;
    }

    /// Fail status with `error` (or stop failing with `None`).
    pub fn set_status_error(&self, error: Option<TransportError>) {
        *self.status_error.lock() = error;
    }

    /// Queue a reply for `method`.
    pub fn push_reply(&self, method: &str, reply: Result<WireValue, TransportError>) {
        self.replies
            .lock()
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Status requests received.
    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    /// Envelopes received by call or query.
    pub fn sent(&self) -> Vec<Envelope> {
        self.sent.lock().clone()
    }

    fn answer(&self, envelope: Envelope) -> Result<WireValue, TransportError> {
        let method = envelope.content.method_name.clone();
        self.sent.lock().push(envelope);
        self.replies
            .lock()
            .get_mut(&method)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(TransportError::Rejected {
                    code: 3,
                    message: format!("no reply scripted for {method}"),
                })
            })
    }
}

#[async_trait]
impl AgentTransport for MockTransport {
    async fn status(&self, _endpoint: &Endpoint) -> Result<TransportStatus, TransportError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.status_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.status_error.lock().clone() {
            return Err(error);
        }
        Ok(TransportStatus {
            replica_version: "mock".into(),
            root_key: None,
        })
    }

    async fn call(&self, _endpoint: &Endpoint, envelope: Envelope) -> Result<WireValue, TransportError> {
        self.answer(envelope)
    }

    async fn query(
        &self,
        _endpoint: &Endpoint,
        envelope: Envelope,
    ) -> Result<WireValue, TransportError> {
        self.answer(envelope)
    }
}
