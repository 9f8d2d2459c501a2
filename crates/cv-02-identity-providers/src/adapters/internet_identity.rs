//! # Internet Identity Adapter

use super::delegation_flow::{DelegationFlow, FlowSettings};
use crate::config::ProviderConfig;
use crate::domain::{Credential, PersistedReference, ProviderError, SessionGrant};
use crate::ports::{IdentityServiceClient, ProviderAdapter};
use async_trait::async_trait;
use shared_crypto::SecretKey;
use shared_types::{Clock, ProviderKind};
use std::sync::Arc;
use tracing::info;

/// Redirect-based delegation from Internet Identity. Delegations last at
/// most 8 hours by default.
pub struct InternetIdentityAdapter {
    flow: DelegationFlow,
}

impl InternetIdentityAdapter {
    /// Create the adapter.
    pub fn new(
        config: &ProviderConfig,
        client: Arc<dyn IdentityServiceClient>,
        clock: Arc<dyn Clock>,
        storage_key: SecretKey,
    ) -> Self {
        let settings = FlowSettings {
            identity_provider: config.identity_provider_url.clone(),
            max_time_to_live: config.ii_max_time_to_live,
            application_name: None,
            flow_timeout: config.flow_timeout,
        };
        Self {
            flow: DelegationFlow::new(
                ProviderKind::InternetIdentity,
                client,
                clock,
                storage_key,
                settings,
            ),
        }
    }
}

#[async_trait]
impl ProviderAdapter for InternetIdentityAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::InternetIdentity
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
        // The delegation simply lapses; nothing to revoke remotely.
        info!("[cv-02] Internet Identity session discarded");
        Ok(())
    }
}
