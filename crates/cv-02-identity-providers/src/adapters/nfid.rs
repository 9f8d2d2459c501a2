//! # NFID Adapter
//!
//! Same delegation mechanics as Internet Identity, fronted by NFID's email and
//! social login. NFID shows the application name on its consent screen and
//! issues longer-lived delegations.

use super::delegation_flow::{DelegationFlow, FlowSettings};
use crate::config::ProviderConfig;
use crate::domain::{Credential, PersistedReference, ProviderError, SessionGrant};
use crate::ports::{IdentityServiceClient, ProviderAdapter};
use async_trait::async_trait;
use shared_crypto::SecretKey;
use shared_types::{Clock, ProviderKind};
use std::sync::Arc;
use tracing::info;

/// Redirect-based delegation from NFID.
pub struct NfidAdapter {
    flow: DelegationFlow,
}

impl NfidAdapter {
    /// Create the adapter.
    pub fn new(
        config: &ProviderConfig,
        client: Arc<dyn IdentityServiceClient>,
        clock: Arc<dyn Clock>,
        storage_key: SecretKey,
    ) -> Self {
        let settings = FlowSettings {
            identity_provider: config.nfid_url.clone(),
            max_time_to_live: config.nfid_max_time_to_live,
            application_name: Some(config.application_name.clone()),
            flow_timeout: config.flow_timeout,
        };
        Self {
            flow: DelegationFlow::new(ProviderKind::Nfid, client, clock, storage_key, settings),
        }
    }
}

#[async_trait]
impl ProviderAdapter for NfidAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Nfid
    }

    async fn connect(&self) -> Result<SessionGrant, ProviderError> {
        self.flow.connect().await
    }

    async fn restore(
        &self,
        reference: &PersistedReference,
    ) -> Result<Option<Credential>, ProviderError> {
        self.flow.restore(reference)
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        info!("[cv-02] NFID session discarded");
        Ok(())
    }
}
