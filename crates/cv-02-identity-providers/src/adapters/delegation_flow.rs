//! # Delegation Flow
//!
//! Shared mechanics of the redirect-based providers:
//!
//! 1. Generate a fresh session key
//! 2. Open the identity service and wait (bounded) for it to report back
//! 3. Verify the returned chain ends at our session key
//! 4. Seal the session key seed for persistence
//!
//! Restore reverses step 4 and re-verifies the chain.

use crate::domain::{
    Credential, DelegationChain, DelegationError, KeyPairSigner, PersistedReference,
    ProviderError, ReferenceBlob, SessionGrant,
};
use crate::ports::{AuthorizeRequest, AuthorizeResponse, IdentityServiceClient};
use shared_crypto::{Ed25519KeyPair, SealedBox, SecretKey};
use shared_types::{Clock, ProviderKind};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// Flow parameters that differ between providers.
#[derive(Clone, Debug)]
pub struct FlowSettings {
    /// Identity service URL.
    pub identity_provider: String,
    /// Requested delegation lifetime.
    pub max_time_to_live: Duration,
    /// Consent-screen application name, if the provider shows one.
    pub application_name: Option<String>,
    /// Abandoned-flow timeout.
    pub flow_timeout: Duration,
}

/// Redirect-based delegation flow.
pub struct DelegationFlow {
    kind: ProviderKind,
    client: Arc<dyn IdentityServiceClient>,
    clock: Arc<dyn Clock>,
    storage_key: SecretKey,
    settings: FlowSettings,
}

impl DelegationFlow {
    /// Create a flow for `kind`.
    pub fn new(
        kind: ProviderKind,
        client: Arc<dyn IdentityServiceClient>,
        clock: Arc<dyn Clock>,
        storage_key: SecretKey,
        settings: FlowSettings,
    ) -> Self {
        Self {
            kind,
            client,
            clock,
            storage_key,
            settings,
        }
    }

    /// Flow parameters.
    pub fn settings(&self) -> &FlowSettings {
        &self.settings
    }

    /// Run the interactive flow.
    pub async fn connect(&self) -> Result<SessionGrant, ProviderError> {
        let session_key = Ed25519KeyPair::generate();
        let session_der = session_key.public_key().to_der();
        let request = AuthorizeRequest {
            identity_provider: self.settings.identity_provider.clone(),
            session_public_key: session_der.clone(),
            max_time_to_live: self.settings.max_time_to_live,
            application_name: self.settings.application_name.clone(),
        };

        info!(
            provider = %self.kind,
            url = %self.settings.identity_provider,
            "[cv-02] Opening identity service"
        );

        let response = tokio::time::timeout(self.settings.flow_timeout, self.client.authorize(request))
            .await
            .map_err(|_| {
                warn!(provider = %self.kind, "[cv-02] Interactive flow abandoned");
                ProviderError::Timeout
            })??;

        let (delegations, user_public_key) = match response {
            AuthorizeResponse::Authorized {
                delegations,
                user_public_key,
            } => (delegations, user_public_key),
            AuthorizeResponse::UserInterrupt => return Err(ProviderError::UserRejected),
            AuthorizeResponse::Failure(reason) => return Err(ProviderError::Unavailable(reason)),
        };

        let chain = DelegationChain {
            public_key: user_public_key,
            delegations,
        };
        let now = self.clock.now();
        chain
            .verify(now)
            .map_err(|e| ProviderError::unavailable(format!("invalid delegation: {e}")))?;
        if chain.session_public_key() != Some(session_der.as_slice()) {
            return Err(ProviderError::unavailable(
                "delegation was issued to a different session key",
            ));
        }
        let expires_at = chain
            .expiration()
            .ok_or_else(|| ProviderError::unavailable("delegation chain is empty"))?;

        let sealed_session_key = SealedBox::seal(&self.storage_key, session_key.to_seed().as_slice())
            .map_err(|e| ProviderError::unavailable(format!("cannot seal session key: {e}")))?;

        let credential = self.credential(&chain, session_key, expires_at);
        info!(
            provider = %self.kind,
            principal = %credential.principal,
            expires_at = %expires_at,
            "[cv-02] Delegation accepted"
        );

        let reference = PersistedReference {
            provider: self.kind,
            principal: credential.principal.clone(),
            expires_at,
            created_at: now,
            blob: ReferenceBlob::Delegation {
                chain,
                sealed_session_key,
            },
        };
        Ok(SessionGrant {
            credential,
            reference,
        })
    }

    /// Rebuild a credential from a persisted delegation.
    pub fn restore(&self, reference: &PersistedReference) -> Result<Option<Credential>, ProviderError> {
        if reference.provider != self.kind {
            return Err(ProviderError::unavailable(format!(
                "reference belongs to {}",
                reference.provider
            )));
        }
        let ReferenceBlob::Delegation {
            chain,
            sealed_session_key,
        } = &reference.blob
        else {
            return Err(ProviderError::unavailable(
                "reference does not hold a delegation",
            ));
        };

        let now = self.clock.now();
        match chain.verify(now) {
            Ok(()) => {}
            Err(DelegationError::Expired { expiration, .. }) => {
                debug!(provider = %self.kind, %expiration, "[cv-02] Persisted delegation expired");
                return Ok(None);
            }
            Err(e) => {
                return Err(ProviderError::unavailable(format!(
                    "persisted delegation is invalid: {e}"
                )))
            }
        }

        let seed = Zeroizing::new(
            sealed_session_key
                .open(&self.storage_key)
                .map_err(|e| ProviderError::unavailable(format!("cannot open session key: {e}")))?,
        );
        let session_key = Ed25519KeyPair::from_seed_slice(&seed)
            .map_err(|e| ProviderError::unavailable(format!("corrupt session key: {e}")))?;
        if chain.session_public_key() != Some(session_key.public_key().to_der().as_slice()) {
            return Err(ProviderError::unavailable(
                "persisted session key does not match its delegation",
            ));
        }

        let expires_at = chain
            .expiration()
            .ok_or_else(|| ProviderError::unavailable("delegation chain is empty"))?;
        Ok(Some(self.credential(chain, session_key, expires_at)))
    }

    fn credential(
        &self,
        chain: &DelegationChain,
        session_key: Ed25519KeyPair,
        expires_at: shared_types::Timestamp,
    ) -> Credential {
        Credential {
            provider: self.kind,
            principal: chain.principal(),
            public_key: chain.public_key.clone(),
            delegations: chain.delegations.clone(),
            signer: Arc::new(KeyPairSigner::new(session_key)),
            expires_at,
        }
    }
}
