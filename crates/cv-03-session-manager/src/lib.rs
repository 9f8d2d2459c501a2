//! # Identity Session Manager (CV-03)
//!
//! Single source of truth for who the caller is.
//!
//! ## Responsibilities
//!
//! | Operation | Behavior |
//! |-----------|----------|
//! | `login(provider)` | No-op for a live session with the same provider; otherwise runs the adapter flow and replaces the session only on success |
//! | `logout()` | Clears local state first, then disconnects and forgets the persisted reference |
//! | `restore_on_load()` | Silent restore, reported as a [`RestoreOutcome`] |
//! | `current_identity()` | Lazy expiry: an expired session reads as absent but is not removed |
//!
//! ## Module Structure
//!
//! ```text
//! cv-03-session-manager/
//! ├── domain/      # Session, SessionState, SessionPhase, RestoreOutcome, SessionEvent, SessionError
//! ├── ports/       # IdentitySessionApi (inbound), SessionStore + SessionListener (outbound)
//! ├── adapters/    # MemorySessionStore, FileSessionStore
//! ├── service.rs   # IdentitySessionManager
//! └── config.rs    # SessionConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{FileSessionStore, MemorySessionStore};
pub use config::{Persistence, SessionConfig};
pub use domain::{
    RestoreOutcome, Session, SessionError, SessionEvent, SessionPhase, SessionState,
};
pub use ports::{IdentitySessionApi, RecordingListener, SessionListener, SessionStore, StoreError};
pub use service::IdentitySessionManager;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
