//! Shared test fixtures: one backend, many clients.

use std::sync::Arc;
use std::time::Duration;

use client_runtime::{ClientConfig, ClientContainer, ExternalPorts};
use cv_02_identity_providers::{MockExtensionHost, MockIdentityService, MockPlugBridge};
use cv_03_session_manager::{MemorySessionStore, SessionStore};
use cv_04_actor_gateway::AgentTransport;
use cv_05_request_orchestrator::{LocalReplica, NewPoll, NewProject};
use shared_crypto::SecretKey;
use shared_types::{ManualClock, Timestamp};

/// Backend id every fixture client targets.
pub const BACKEND_ID: &str = "civitas-backend";

/// 2023-11-14T22:13:20Z
pub const START_MILLIS: u64 = 1_700_000_000_000;

/// Shared clock and in-process backend.
pub struct World {
    pub clock: Arc<ManualClock>,
    pub replica: Arc<LocalReplica>,
}

impl World {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new(Timestamp::from_millis(START_MILLIS)));
        let replica = Arc::new(LocalReplica::new(BACKEND_ID, clock.clone()));
        Self { clock, replica }
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    /// A fresh user with in-memory persistence.
    pub fn client(&self) -> Client {
        self.client_with(
            Arc::new(MemorySessionStore::new()),
            Arc::new(MockIdentityService::new(self.clock.clone())),
            SecretKey::generate(),
        )
    }

    /// A client for a given user identity, store and device key.
    pub fn client_with(
        &self,
        store: Arc<dyn SessionStore>,
        identity: Arc<MockIdentityService>,
        storage_key: SecretKey,
    ) -> Client {
        self.client_over(self.replica.clone(), store, identity, storage_key)
    }

    /// Same as [`World::client_with`] over an arbitrary transport.
    pub fn client_over(
        &self,
        transport: Arc<dyn AgentTransport>,
        store: Arc<dyn SessionStore>,
        identity: Arc<MockIdentityService>,
        storage_key: SecretKey,
    ) -> Client {
        let bridge = Arc::new(MockPlugBridge::default());
        let ports = ExternalPorts {
            clock: self.clock.clone(),
            transport,
            identity_service: identity.clone(),
            extension_host: Arc::new(MockExtensionHost::with_bridge(bridge.clone())),
            store: store.clone(),
            storage_key,
        };
        Client {
            identity,
            bridge,
            store,
            app: ClientContainer::assemble(ClientConfig::for_testing(), ports),
        }
    }
}

/// One user's running client.
pub struct Client {
    pub identity: Arc<MockIdentityService>,
    pub bridge: Arc<MockPlugBridge>,
    pub store: Arc<dyn SessionStore>,
    pub app: ClientContainer,
}

pub fn project(name: &str) -> NewProject {
    NewProject {
        name: name.to_string(),
        description: format!("{name} for the neighbourhood"),
        category: Some("civic".to_string()),
        ..Default::default()
    }
}

pub fn poll(project_id: &str, reward: Option<&str>) -> NewPoll {
    NewPoll {
        project_id: project_id.to_string(),
        title: "Where should the benches go?".to_string(),
        description: String::new(),
        options: vec!["Park".to_string(), "Square".to_string(), "Station".to_string()],
        closes_at: "2023-12-01T00:00:00.000Z".to_string(),
        reward_per_vote: reward.map(str::to_string),
    }
}
