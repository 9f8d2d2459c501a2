//! # Inbound Ports
//!
//! The one interface the session manager sees, whatever the provider's
//! mechanics (redirect flow or extension probe).

use crate::domain::{Credential, PersistedReference, ProviderError, SessionGrant};
use async_trait::async_trait;
use shared_types::ProviderKind;

/// Capability set shared by every identity provider.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Which provider this is.
    fn kind(&self) -> ProviderKind;

    /// Run the interactive flow and return a live credential plus the
    /// reference to persist.
    ///
    /// # Errors
    /// * `ProviderError::Unavailable` - capability absent or misconfigured
    /// * `ProviderError::UserRejected` - explicit decline
    /// * `ProviderError::Timeout` - flow abandoned
    async fn connect(&self) -> Result<SessionGrant, ProviderError>;

    /// Rebuild a credential from a persisted reference without user
    /// interaction.
    ///
    /// Returns `Ok(None)` when the reference is no longer usable (expired,
    /// extension session ended) and `Err` when it cannot be read at all.
    async fn restore(
        &self,
        reference: &PersistedReference,
    ) -> Result<Option<Credential>, ProviderError>;

    /// Tear down provider-side state.
    async fn disconnect(&self) -> Result<(), ProviderError>;
}
