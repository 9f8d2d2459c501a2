//! # Session State
//!
//! ```text
//!                  login(p)                 connect ok
//! Unauthenticated ─────────▶ Authenticating(p) ─────────▶ Authenticated(principal)
//!        ▲                          │                              │
//!        └──────── adapter failure ─┘                              │
//!        └────────────────────── logout / observed expiry ─────────┘
//! ```
//!
//! The phase is computed from the stored session, the pending flow and the
//! clock; it is never stored.

use cv_02_identity_providers::Credential;
use serde::{Deserialize, Serialize};
use shared_types::{Principal, ProviderKind, Timestamp};

/// The authenticated browser context.
#[derive(Clone, Debug)]
pub struct Session {
    /// Live signing capability.
    pub credential: Credential,
    /// Last successful authentication.
    pub created_at: Timestamp,
}

impl Session {
    /// Wrap a credential.
    pub fn new(credential: Credential, created_at: Timestamp) -> Self {
        Self {
            credential,
            created_at,
        }
    }

    /// Issuing provider.
    pub fn provider(&self) -> ProviderKind {
        self.credential.provider
    }

    /// Caller identity.
    pub fn principal(&self) -> &Principal {
        &self.credential.principal
    }

    /// Expiry.
    pub fn expires_at(&self) -> Timestamp {
        self.credential.expires_at
    }

    /// Unexpired at `now`.
    pub fn is_live(&self, now: Timestamp) -> bool {
        !self.credential.is_expired(now)
    }
}

/// Observable lifecycle phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// No live session and no flow in progress.
    Unauthenticated,
    /// An interactive flow with this provider is in progress.
    Authenticating(ProviderKind),
    /// A live session exists.
    Authenticated(Principal),
}

/// Mutable state owned by the manager.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Current session, possibly expired (expiry is read lazily).
    pub session: Option<Session>,
    /// Provider whose flow is in progress.
    pub pending: Option<ProviderKind>,
    /// Bumped by every logout. A flow that started under an older generation
    /// must not install its session.
    pub generation: u64,
}

impl SessionState {
    /// Phase at `now`.
    pub fn phase(&self, now: Timestamp) -> SessionPhase {
        if let Some(kind) = self.pending {
            return SessionPhase::Authenticating(kind);
        }
        match &self.session {
            Some(session) if session.is_live(now) => {
                SessionPhase::Authenticated(session.principal().clone())
            }
            _ => SessionPhase::Unauthenticated,
        }
    }

    /// Live session for `kind`, if any.
    pub fn live_for(&self, kind: ProviderKind, now: Timestamp) -> Option<&Session> {
        self.session
            .as_ref()
            .filter(|s| s.provider() == kind && s.is_live(now))
    }
}

/// What `restore_on_load` found. Never an error: absence of a prior session
/// is expected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RestoreOutcome {
    /// A persisted session was restored.
    Restored {
        /// Restored identity
        principal: Principal,
    },
    /// Nothing was persisted.
    NoPriorSession,
    /// A session was persisted but has expired; the user must log in again.
    Expired,
    /// The persisted session could not be used.
    Failed {
        /// Why
        reason: String,
    },
}

impl RestoreOutcome {
    /// Whether a session is live afterwards.
    pub fn is_restored(&self) -> bool {
        matches!(self, RestoreOutcome::Restored { .. })
    }
}

/// Identity changes listeners are told about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new principal became current (login or restore).
    PrincipalChanged {
        /// Principal it replaced, if any
        previous: Option<Principal>,
        /// New principal
        current: Principal,
    },
    /// Explicit logout.
    LoggedOut {
        /// Principal that logged out
        previous: Principal,
    },
    /// A read observed the session past its expiry.
    Expired {
        /// Principal whose session expired
        previous: Principal,
    },
}

impl SessionEvent {
    /// Principal whose cached resources are now stale.
    pub fn stale_principal(&self) -> Option<&Principal> {
        match self {
            SessionEvent::PrincipalChanged { previous, .. } => previous.as_ref(),
            SessionEvent::LoggedOut { previous } | SessionEvent::Expired { previous } => {
                Some(previous)
            }
        }
    }
}
