//! In-memory session store.

use crate::ports::{SessionStore, StoreError};
use async_trait::async_trait;
use cv_02_identity_providers::PersistedReference;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Keeps the reference in memory. Lost on process exit.
#[derive(Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<PersistedReference>>,
    saves: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemorySessionStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a reference.
    pub fn with_reference(reference: PersistedReference) -> Self {
        Self {
            slot: Mutex::new(Some(reference)),
            ..Self::default()
        }
    }

    /// Current contents.
    pub fn snapshot(&self) -> Option<PersistedReference> {
        self.slot.lock().clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Make `save` and `clear` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "store is read-only",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<PersistedReference>, StoreError> {
        Ok(self.slot.lock().clone())
    }

    async fn save(&self, reference: &PersistedReference) -> Result<(), StoreError> {
        self.check_writable()?;
        *self.slot.lock() = Some(reference.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.check_writable()?;
        *self.slot.lock() = None;
        Ok(())
    }
}
