//! # Outbound Ports

use crate::domain::SessionEvent;
use async_trait::async_trait;
use cv_02_identity_providers::PersistedReference;
use parking_lot::Mutex;
use thiserror::Error;

/// Persistence failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failed.
    #[error("session store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data does not parse.
    #[error("stored session is corrupt: {0}")]
    Corrupt(String),
}

/// Where the persisted reference lives between reloads.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the persisted reference.
    async fn load(&self) -> Result<Option<PersistedReference>, StoreError>;

    /// Replace the persisted reference.
    async fn save(&self, reference: &PersistedReference) -> Result<(), StoreError>;

    /// Remove the persisted reference.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Notified when the current principal changes or goes away.
///
/// Called outside every manager lock; implementations must not block.
pub trait SessionListener: Send + Sync {
    /// Handle an identity change.
    fn on_session_event(&self, event: &SessionEvent);
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Listener that records every event.
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<SessionEvent>>,
}

impl RecordingListener {
    /// Events received so far.
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().clone()
    }
}

impl SessionListener for RecordingListener {
    fn on_session_event(&self, event: &SessionEvent) {
        self.events.lock().push(event.clone());
    }
}
