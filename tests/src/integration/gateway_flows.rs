//! # Gateway Flows
//!
//! ActorGateway (cv-04) under concurrent use from the orchestrator (cv-05):
//! at most one construction per key, failed constructions are not cached, and
//! session changes evict exactly the stale principal's handles.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use cv_01_wire_codec::WireValue;
    use cv_02_identity_providers::MockIdentityService;
    use cv_03_session_manager::{IdentitySessionApi, MemorySessionStore};
    use cv_04_actor_gateway::{
        ActorGatewayApi, AgentTransport, Endpoint, Envelope, TransportError, TransportStatus,
    };
    use cv_05_request_orchestrator::{CivitasApi, LocalReplica};
    use shared_crypto::SecretKey;
    use shared_types::{ErrorKind, ProviderKind};

    use crate::integration::fixtures::{project, World};

    /// Replica whose status probe is slow and counted.
    struct SlowStatus {
        inner: Arc<LocalReplica>,
        delay: Duration,
        probes: AtomicUsize,
    }

    #[async_trait]
    impl AgentTransport for SlowStatus {
        async fn status(&self, endpoint: &Endpoint) -> Result<TransportStatus, TransportError> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.inner.status(endpoint).await
        }

        async fn call(
            &self,
            endpoint: &Endpoint,
            envelope: Envelope,
        ) -> Result<WireValue, TransportError> {
            self.inner.call(endpoint, envelope).await
        }

        async fn query(
            &self,
            endpoint: &Endpoint,
            envelope: Envelope,
        ) -> Result<WireValue, TransportError> {
            self.inner.query(endpoint, envelope).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_reads_share_one_construction() {
        let world = World::new();
        let slow = Arc::new(SlowStatus {
            inner: world.replica.clone(),
            delay: Duration::from_millis(30),
            probes: AtomicUsize::new(0),
        });
        let client = world.client_over(
            slow.clone(),
            Arc::new(MemorySessionStore::new()),
            Arc::new(MockIdentityService::new(world.clock.clone())),
            SecretKey::generate(),
        );

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let orchestrator = client.app.orchestrator.clone();
                tokio::spawn(async move { orchestrator.list_projects().await })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap().unwrap().is_empty());
        }

        assert_eq!(slow.probes.load(Ordering::SeqCst), 1);
        let stats = client.app.gateway.stats();
        assert_eq!(stats.constructions, 1);
        assert_eq!(client.app.gateway.cached(), 1);
        assert_eq!(world.replica.query_count(), 16);
    }

    #[tokio::test]
    async fn test_concurrent_writes_share_one_signed_handle() {
        let world = World::new();
        let slow = Arc::new(SlowStatus {
            inner: world.replica.clone(),
            delay: Duration::from_millis(30),
            probes: AtomicUsize::new(0),
        });
        let client = world.client_over(
            slow.clone(),
            Arc::new(MemorySessionStore::new()),
            Arc::new(MockIdentityService::new(world.clock.clone())),
            SecretKey::generate(),
        );
        client
            .app
            .session
            .login(ProviderKind::InternetIdentity)
            .await
            .unwrap();

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let orchestrator = client.app.orchestrator.clone();
                tokio::spawn(async move {
                    orchestrator
                        .create_project(&project(&format!("Garden {i}")))
                        .await
                })
            })
            .collect();
        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap().unwrap());
        }
        ids.sort();
        ids.dedup();

        assert_eq!(ids.len(), 8);
        assert_eq!(slow.probes.load(Ordering::SeqCst), 1);
        assert_eq!(world.replica.call_count(), 8);
    }

    #[tokio::test]
    async fn test_offline_backend_is_retried_then_recovers() {
        let world = World::new();
        let client = world.client();

        world.replica.set_offline(true);
        let err = client.app.orchestrator.list_projects().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(err.is_transient());
        assert_eq!(client.app.gateway.cached(), 0);
        assert_eq!(client.app.gateway.stats().constructions, 0);

        world.replica.set_offline(false);
        assert!(client.app.orchestrator.list_projects().await.unwrap().is_empty());
        assert_eq!(client.app.gateway.stats().constructions, 1);
    }

    #[tokio::test]
    async fn test_logout_evicts_only_the_signed_handle() {
        let world = World::new();
        let client = world.client();
        let principal = client.app.session.login(ProviderKind::Nfid).await.unwrap();

        client
            .app
            .orchestrator
            .create_project(&project("Mural"))
            .await
            .unwrap();
        client.app.orchestrator.list_projects().await.unwrap();
        assert_eq!(client.app.gateway.cached(), 2);

        client.app.session.logout().await;
        assert_eq!(client.app.gateway.cached(), 1);
        assert_eq!(client.app.gateway.evict_principal(&principal), 0);

        // The anonymous handle is reused
        let before = client.app.gateway.stats();
        client.app.orchestrator.list_projects().await.unwrap();
        let after = client.app.gateway.stats();
        assert_eq!(after.constructions, before.constructions);
        assert_eq!(after.cache_hits, before.cache_hits + 1);
    }
}
