//! # Session Configuration

use crate::adapters::{FileSessionStore, MemorySessionStore};
use crate::ports::SessionStore;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Where the persisted reference is kept.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum Persistence {
    /// Process memory only.
    Memory,
    /// JSON file.
    File(PathBuf),
}

/// Session manager settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Reference storage.
    pub persistence: Persistence,
    /// Run `restore_on_load` when the client starts.
    pub restore_on_start: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            persistence: Persistence::File(PathBuf::from(".civitas/session.json")),
            restore_on_start: true,
        }
    }
}

impl SessionConfig {
    /// In-memory persistence.
    pub fn for_testing() -> Self {
        Self {
            persistence: Persistence::Memory,
            restore_on_start: true,
        }
    }

    /// Build the configured store.
    pub fn build_store(&self) -> Arc<dyn SessionStore> {
        match &self.persistence {
            Persistence::Memory => Arc::new(MemorySessionStore::new()),
            Persistence::File(path) => Arc::new(FileSessionStore::new(path.clone())),
        }
    }
}
