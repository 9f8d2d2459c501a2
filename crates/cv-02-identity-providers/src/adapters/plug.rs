//! # Plug Adapter
//!
//! Plug is a browser extension that injects its capability into the page.
//! The probe is synchronous: if nothing is injected the adapter fails at once
//! with `Unavailable` instead of waiting for an extension that will never
//! answer. The wallet key never leaves the extension, so every request
//! signature is a round trip through the bridge.

use crate::config::ProviderConfig;
use crate::domain::{
    Credential, PersistedReference, ProviderError, ReferenceBlob, RequestSigner, SessionGrant,
};
use crate::ports::{ExtensionHost, PlugBridge, ProviderAdapter};
use async_trait::async_trait;
use shared_types::{Clock, Principal, ProviderKind};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Signs through the extension.
struct ExtensionSigner {
    bridge: Arc<dyn PlugBridge>,
    public_key: Vec<u8>,
}

#[async_trait]
impl RequestSigner for ExtensionSigner {
    fn public_key_der(&self) -> Vec<u8> {
        self.public_key.clone()
    }

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, ProviderError> {
        self.bridge.sign(message).await
    }
}

/// Browser-extension wallet adapter.
pub struct PlugAdapter {
    host: Arc<dyn ExtensionHost>,
    clock: Arc<dyn Clock>,
    whitelist: Vec<String>,
    backend_host: String,
    session_ttl: Duration,
    flow_timeout: Duration,
}

impl PlugAdapter {
    /// Create the adapter.
    pub fn new(config: &ProviderConfig, host: Arc<dyn ExtensionHost>, clock: Arc<dyn Clock>) -> Self {
        Self {
            host,
            clock,
            whitelist: config.plug_whitelist.clone(),
            backend_host: config.plug_host.clone(),
            session_ttl: config.plug_session_ttl,
            flow_timeout: config.flow_timeout,
        }
    }

    fn bridge(&self) -> Result<Arc<dyn PlugBridge>, ProviderError> {
        self.host
            .injected()
            .ok_or_else(|| ProviderError::unavailable("Plug extension is not installed"))
    }

    /// Read the wallet identity and check the principal really belongs to the key.
    async fn wallet_identity(
        &self,
        bridge: &Arc<dyn PlugBridge>,
    ) -> Result<(Principal, Vec<u8>), ProviderError> {
        let text = bridge.principal().await?;
        let principal = Principal::from_text(&text)
            .map_err(|e| ProviderError::unavailable(format!("extension returned a bad principal: {e}")))?;
        let public_key = bridge.public_key().await?;
        if Principal::self_authenticating(&public_key) != principal {
            return Err(ProviderError::unavailable(
                "extension principal does not match its public key",
            ));
        }
        Ok((principal, public_key))
    }

    fn credential(
        &self,
        bridge: Arc<dyn PlugBridge>,
        principal: Principal,
        public_key: Vec<u8>,
        expires_at: shared_types::Timestamp,
    ) -> Credential {
        Credential {
            provider: ProviderKind::Plug,
            principal,
            public_key: public_key.clone(),
            delegations: Vec::new(),
            signer: Arc::new(ExtensionSigner { bridge, public_key }),
            expires_at,
        }
    }
}

#[async_trait]
impl ProviderAdapter for PlugAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Plug
    }

    async fn connect(&self) -> Result<SessionGrant, ProviderError> {
        let bridge = self.bridge()?;

        info!(host = %self.backend_host, "[cv-02] Requesting Plug approval");
        let approved = tokio::time::timeout(
            self.flow_timeout,
            bridge.request_connect(&self.whitelist, &self.backend_host),
        )
        .await
        .map_err(|_| {
            warn!("[cv-02] Plug approval prompt abandoned");
            ProviderError::Timeout
        })??;
        if !approved {
            return Err(ProviderError::UserRejected);
        }

        let (principal, public_key) = self.wallet_identity(&bridge).await?;
        let now = self.clock.now();
        let expires_at = now.saturating_add(self.session_ttl);
        info!(principal = %principal, "[cv-02] Plug connected");

        let credential = self.credential(bridge, principal.clone(), public_key.clone(), expires_at);
        let reference = PersistedReference {
            provider: ProviderKind::Plug,
            principal,
            expires_at,
            created_at: now,
            blob: ReferenceBlob::Extension { public_key },
        };
        Ok(SessionGrant {
            credential,
            reference,
        })
    }

    async fn restore(
        &self,
        reference: &PersistedReference,
    ) -> Result<Option<Credential>, ProviderError> {
        let ReferenceBlob::Extension { public_key } = &reference.blob else {
            return Err(ProviderError::unavailable(
                "reference does not hold an extension session",
            ));
        };
        if reference.expires_at.has_passed(self.clock.now()) {
            return Ok(None);
        }

        let bridge = self.bridge()?;
        if !bridge.is_connected().await? {
            debug!("[cv-02] Plug no longer connected, nothing to restore");
            return Ok(None);
        }

        let (principal, current_key) = self.wallet_identity(&bridge).await?;
        if principal != reference.principal || &current_key != public_key {
            debug!(
                stored = %reference.principal,
                current = %principal,
                "[cv-02] Plug switched accounts since last session"
            );
            return Ok(None);
        }

        Ok(Some(self.credential(
            bridge,
            principal,
            current_key,
            reference.expires_at,
        )))
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        match self.host.injected() {
            Some(bridge) => bridge.disconnect().await,
            None => Ok(()),
        }
    }
}
