//! # Client Container
//!
//! Holds the wired component instances.
//!
//! ## Wiring Order
//!
//! ```text
//! Clock, SessionStore, provider hosts      (external ports)
//!     ↓
//! Provider adapters: II, NFID, Plug        (cv-02)
//!     ↓
//! IdentitySessionManager                   (cv-03)
//!     ↓
//! ActorGateway ── registered as session listener (cv-04)
//!     ↓
//! RequestOrchestrator                      (cv-05)
//! ```

use std::sync::Arc;

use cv_02_identity_providers::{
    ExtensionHost, IdentityServiceClient, InternetIdentityAdapter, NfidAdapter, PlugAdapter,
};
use cv_03_session_manager::{
    IdentitySessionApi, IdentitySessionManager, RestoreOutcome, SessionStore,
};
use cv_04_actor_gateway::{ActorGateway, AgentTransport, HttpAgentTransport};
use cv_05_request_orchestrator::RequestOrchestrator;
use shared_crypto::SecretKey;
use shared_types::{Clock, SystemClock};
use tracing::{info, warn};

use crate::adapters::{HeadlessIdentityService, NoExtensionHost};
use crate::container::config::ClientConfig;
use crate::error::RuntimeError;
use crate::storage_key;

/// Everything the container needs from outside the process.
pub struct ExternalPorts {
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Backend transport.
    pub transport: Arc<dyn AgentTransport>,
    /// Internet Identity / NFID flow.
    pub identity_service: Arc<dyn IdentityServiceClient>,
    /// Wallet extension host.
    pub extension_host: Arc<dyn ExtensionHost>,
    /// Persisted session reference.
    pub store: Arc<dyn SessionStore>,
    /// Device key sealing persisted session keys.
    pub storage_key: SecretKey,
}

impl ExternalPorts {
    /// System clock, HTTP transport, configured store, headless provider hosts.
    pub fn production(config: &ClientConfig, storage_key: SecretKey) -> Result<Self, RuntimeError> {
        Ok(Self {
            clock: Arc::new(SystemClock),
            transport: Arc::new(HttpAgentTransport::new(&config.gateway)?),
            identity_service: Arc::new(HeadlessIdentityService),
            extension_host: Arc::new(NoExtensionHost),
            store: config.session.build_store(),
            storage_key,
        })
    }
}

/// Wired client components.
pub struct ClientContainer {
    /// Configuration the container was built from.
    pub config: ClientConfig,
    /// Shared time source.
    pub clock: Arc<dyn Clock>,
    /// Identity session manager (CV-03).
    pub session: Arc<IdentitySessionManager>,
    /// Actor gateway (CV-04).
    pub gateway: Arc<ActorGateway>,
    /// Request orchestrator (CV-05).
    pub orchestrator: Arc<RequestOrchestrator>,
}

impl ClientContainer {
    /// Wire the production stack, creating the device storage key on first use.
    pub fn new(config: ClientConfig) -> Result<Self, RuntimeError> {
        let storage_key = storage_key::load_or_create(&config.storage_key_path)?;
        let ports = ExternalPorts::production(&config, storage_key)?;
        Ok(Self::assemble(config, ports))
    }

    /// Wire components around the given ports.
    pub fn assemble(config: ClientConfig, ports: ExternalPorts) -> Self {
        let ExternalPorts {
            clock,
            transport,
            identity_service,
            extension_host,
            store,
            storage_key,
        } = ports;

        let internet_identity = InternetIdentityAdapter::new(
            &config.provider,
            Arc::clone(&identity_service),
            Arc::clone(&clock),
            storage_key.clone(),
        );
        let nfid = NfidAdapter::new(
            &config.provider,
            identity_service,
            Arc::clone(&clock),
            storage_key,
        );
        let plug = PlugAdapter::new(&config.provider, extension_host, Arc::clone(&clock));

        let session = Arc::new(
            IdentitySessionManager::new(store, Arc::clone(&clock))
                .with_provider(Arc::new(internet_identity))
                .with_provider(Arc::new(nfid))
                .with_provider(Arc::new(plug)),
        );

        let gateway = Arc::new(ActorGateway::new(
            transport,
            Arc::clone(&clock),
            config.gateway.clone(),
        ));
        session.register_listener(gateway.clone());

        let orchestrator = Arc::new(RequestOrchestrator::new(
            session.clone(),
            gateway.clone(),
            Arc::clone(&clock),
            config.orchestrator(),
        ));

        info!(
            target_network = %config.target,
            providers = ?session.providers(),
            "[runtime] Client components wired"
        );

        Self {
            config,
            clock,
            session,
            gateway,
            orchestrator,
        }
    }

    /// Restore the persisted session if the configuration asks for it.
    pub async fn start(&self) -> Option<RestoreOutcome> {
        if !self.config.session.restore_on_start {
            return None;
        }
        let outcome = self.session.restore_on_load().await;
        match &outcome {
            RestoreOutcome::Restored { principal } => {
                info!(principal = %principal, "[runtime] Session restored")
            }
            RestoreOutcome::NoPriorSession => info!("[runtime] No prior session"),
            RestoreOutcome::Expired => info!("[runtime] Persisted session has expired"),
            RestoreOutcome::Failed { reason } => {
                warn!(reason = %reason, "[runtime] Persisted session could not be restored")
            }
        }
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_02_identity_providers::{MockExtensionHost, MockIdentityService, MockPlugBridge};
    use cv_03_session_manager::{MemorySessionStore, SessionPhase};
    use cv_04_actor_gateway::{ActorGatewayApi, MockTransport};
    use cv_05_request_orchestrator::{CivitasApi, LocalReplica};
    use shared_types::{ErrorKind, ManualClock, ProviderKind, Timestamp};

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(Timestamp::from_millis(1_700_000_000_000)))
    }

    #[tokio::test]
    async fn test_all_providers_registered() {
        let clock = clock();
        let ports = ExternalPorts {
            clock: clock.clone(),
            transport: Arc::new(MockTransport::new()),
            identity_service: Arc::new(HeadlessIdentityService),
            extension_host: Arc::new(NoExtensionHost),
            store: Arc::new(MemorySessionStore::new()),
            storage_key: SecretKey::generate(),
        };
        let container = ClientContainer::assemble(ClientConfig::for_testing(), ports);
        assert_eq!(container.session.providers(), ProviderKind::ALL.to_vec());
        assert_eq!(
            container.start().await,
            Some(RestoreOutcome::NoPriorSession)
        );
    }

    #[tokio::test]
    async fn test_headless_login_is_unavailable() {
        let ports = ExternalPorts {
            clock: clock(),
            transport: Arc::new(MockTransport::new()),
            identity_service: Arc::new(HeadlessIdentityService),
            extension_host: Arc::new(NoExtensionHost),
            store: Arc::new(MemorySessionStore::new()),
            storage_key: SecretKey::generate(),
        };
        let container = ClientContainer::assemble(ClientConfig::for_testing(), ports);

        for provider in ProviderKind::ALL {
            let err = container.session.login(provider).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ProviderUnavailable);
        }
        assert_eq!(container.session.phase(), SessionPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_restore_disabled() {
        let mut config = ClientConfig::for_testing();
        config.session.restore_on_start = false;
        let ports = ExternalPorts {
            clock: clock(),
            transport: Arc::new(MockTransport::new()),
            identity_service: Arc::new(HeadlessIdentityService),
            extension_host: Arc::new(NoExtensionHost),
            store: Arc::new(MemorySessionStore::new()),
            storage_key: SecretKey::generate(),
        };
        let container = ClientContainer::assemble(config, ports);
        assert_eq!(container.start().await, None);
    }

    #[tokio::test]
    async fn test_wired_stack_writes_and_evicts_on_logout() {
        let clock = clock();
        let store = Arc::new(MemorySessionStore::new());
        let replica = Arc::new(LocalReplica::new("civitas-backend", clock.clone()));
        let bridge = Arc::new(MockPlugBridge::default());
        let ports = ExternalPorts {
            clock: clock.clone(),
            transport: replica.clone(),
            identity_service: Arc::new(MockIdentityService::new(clock.clone())),
            extension_host: Arc::new(MockExtensionHost::with_bridge(bridge.clone())),
            store: store.clone(),
            storage_key: SecretKey::generate(),
        };
        let container = ClientContainer::assemble(ClientConfig::for_testing(), ports);

        let principal = container.session.login(ProviderKind::Plug).await.unwrap();
        assert_eq!(principal, bridge.wallet_principal());

        let project = cv_05_request_orchestrator::NewProject {
            name: "Community garden".to_string(),
            description: "Raised beds for the block".to_string(),
            ..Default::default()
        };
        let id = container.orchestrator.create_project(&project).await.unwrap();
        let listed = container.orchestrator.list_projects().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].owner, principal);
        assert_eq!(container.gateway.cached(), 2);

        container.session.logout().await;
        assert_eq!(container.gateway.cached(), 1);
        assert!(store.load().await.unwrap().is_none());
        assert_eq!(container.gateway.stats().evictions, 1);
    }
}
