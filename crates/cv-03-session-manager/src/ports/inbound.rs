//! # Inbound Ports

use crate::domain::{RestoreOutcome, SessionError, SessionPhase};
use async_trait::async_trait;
use cv_02_identity_providers::Credential;
use shared_types::{Principal, ProviderKind};

/// Single source of truth for the current session.
#[async_trait]
pub trait IdentitySessionApi: Send + Sync {
    /// Authenticate with `provider`. Idempotent for a live session with the
    /// same provider; a failed attempt never clears the prior session.
    ///
    /// # Errors
    /// * `SessionError::AuthInProgress` - another flow is pending
    /// * `SessionError::Provider` - the adapter failed
    /// * `SessionError::Cancelled` - `logout` ran before the flow finished
    async fn login(&self, provider: ProviderKind) -> Result<Principal, SessionError>;

    /// End the session. Always locally effective.
    async fn logout(&self);

    /// Silently restore the last session at startup.
    async fn restore_on_load(&self) -> RestoreOutcome;

    /// Live credential, or `None` if absent or expired. Never mutates the
    /// stored session.
    fn current_identity(&self) -> Option<Credential>;

    /// Live credential, or why there is none.
    ///
    /// # Errors
    /// * `SessionError::AuthRequired` - nobody is signed in
    /// * `SessionError::AuthExpired` - the session has expired
    fn require_identity(&self) -> Result<Credential, SessionError>;

    /// Current lifecycle phase.
    fn phase(&self) -> SessionPhase;
}
