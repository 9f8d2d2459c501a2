//! # Session Flows
//!
//! IdentitySessionManager (cv-03) driving the provider adapters (cv-02) and
//! the actor gateway (cv-04) through a full client container:
//!
//! 1. Login persists a sealed reference; a reload restores the same principal
//! 2. A reload on another device key, or after expiry, does not restore
//! 3. Expiry blocks writes and evicts the signed handle
//! 4. Only one interactive flow runs at a time
//! 5. Switching provider replaces the principal and its handles

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use cv_02_identity_providers::{MockAuthBehavior, MockIdentityService};
    use cv_03_session_manager::{
        FileSessionStore, IdentitySessionApi, RecordingListener, RestoreOutcome, SessionEvent,
        SessionPhase,
    };
    use cv_04_actor_gateway::ActorGatewayApi;
    use cv_05_request_orchestrator::CivitasApi;
    use shared_crypto::SecretKey;
    use shared_types::{ErrorKind, ProviderKind};

    use crate::integration::fixtures::{poll, project, World};

    const NINE_HOURS: Duration = Duration::from_secs(9 * 60 * 60);

    #[tokio::test]
    async fn test_reload_restores_persisted_session() {
        let world = World::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let identity = Arc::new(MockIdentityService::new(world.clock.clone()));
        let key = SecretKey::generate();

        let first = world.client_with(
            Arc::new(FileSessionStore::new(path.clone())),
            identity.clone(),
            key.clone(),
        );
        let principal = first
            .app
            .session
            .login(ProviderKind::InternetIdentity)
            .await
            .unwrap();
        assert_eq!(principal, identity.principal());
        let project_id = first
            .app
            .orchestrator
            .create_project(&project("Library"))
            .await
            .unwrap();
        assert!(path.exists());

        // Same device, new process
        let reloaded = world.client_with(
            Arc::new(FileSessionStore::new(path.clone())),
            identity.clone(),
            key,
        );
        assert_eq!(
            reloaded.app.start().await,
            Some(RestoreOutcome::Restored {
                principal: principal.clone()
            })
        );
        assert_eq!(identity.authorize_calls(), 1);

        // The restored credential still owns the project
        reloaded
            .app
            .orchestrator
            .create_poll(&poll(&project_id, None))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reload_with_other_device_key_fails_and_forgets() {
        let world = World::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let identity = Arc::new(MockIdentityService::new(world.clock.clone()));

        let first = world.client_with(
            Arc::new(FileSessionStore::new(path.clone())),
            identity.clone(),
            SecretKey::generate(),
        );
        first.app.session.login(ProviderKind::Nfid).await.unwrap();

        let other_device = world.client_with(
            Arc::new(FileSessionStore::new(path.clone())),
            identity,
            SecretKey::generate(),
        );
        assert!(matches!(
            other_device.app.start().await,
            Some(RestoreOutcome::Failed { .. })
        ));
        assert_eq!(other_device.app.session.phase(), SessionPhase::Unauthenticated);
        assert!(other_device.store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reload_after_expiry() {
        let world = World::new();
        let client = world.client();
        client
            .app
            .session
            .login(ProviderKind::InternetIdentity)
            .await
            .unwrap();

        world.advance(NINE_HOURS);
        let reloaded = world.client_with(
            client.store.clone(),
            client.identity.clone(),
            SecretKey::generate(),
        );
        assert_eq!(reloaded.app.start().await, Some(RestoreOutcome::Expired));
        assert!(reloaded.store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_nfid_session_outlives_internet_identity() {
        let world = World::new();
        let ii = world.client();
        let nfid = world.client();
        ii.app
            .session
            .login(ProviderKind::InternetIdentity)
            .await
            .unwrap();
        nfid.app.session.login(ProviderKind::Nfid).await.unwrap();

        world.advance(NINE_HOURS);
        assert!(ii.app.session.current_identity().is_none());
        assert!(nfid.app.session.current_identity().is_some());
        nfid.app
            .orchestrator
            .create_project(&project("Orchard"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_expiry_blocks_writes_and_evicts_signed_handle() {
        let world = World::new();
        let client = world.client();
        let listener = Arc::new(RecordingListener::default());
        client.app.session.register_listener(listener.clone());

        let principal = client
            .app
            .session
            .login(ProviderKind::InternetIdentity)
            .await
            .unwrap();
        client
            .app
            .orchestrator
            .create_project(&project("Pool"))
            .await
            .unwrap();
        client.app.orchestrator.list_projects().await.unwrap();
        assert_eq!(client.app.gateway.cached(), 2);
        let calls = world.replica.call_count();

        world.advance(NINE_HOURS);
        let err = client
            .app
            .orchestrator
            .create_project(&project("Late"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthExpired);
        assert_eq!(world.replica.call_count(), calls);
        assert_eq!(client.app.gateway.cached(), 1);
        assert!(listener
            .events()
            .contains(&SessionEvent::Expired { previous: principal }));

        // Reads keep working anonymously
        assert_eq!(client.app.orchestrator.list_projects().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_only_one_interactive_flow_at_a_time() {
        let world = World::new();
        let client = world.client();
        client.identity.set_behavior(MockAuthBehavior::Abandon);

        let session = client.app.session.clone();
        let pending =
            tokio::spawn(async move { session.login(ProviderKind::InternetIdentity).await });

        tokio::time::timeout(Duration::from_secs(1), async {
            while !matches!(
                client.app.session.phase(),
                SessionPhase::Authenticating(ProviderKind::InternetIdentity)
            ) {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        let second = client.app.session.login(ProviderKind::Nfid).await.unwrap_err();
        assert_eq!(second.kind(), ErrorKind::AuthInProgress);

        let first = pending.await.unwrap().unwrap_err();
        assert_eq!(first.kind(), ErrorKind::ProviderTimeout);
        assert_eq!(client.app.session.phase(), SessionPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_switching_provider_replaces_principal_and_handles() {
        let world = World::new();
        let client = world.client();
        let listener = Arc::new(RecordingListener::default());
        client.app.session.register_listener(listener.clone());

        let ii_principal = client
            .app
            .session
            .login(ProviderKind::InternetIdentity)
            .await
            .unwrap();
        let ii_project = client
            .app
            .orchestrator
            .create_project(&project("Bakery"))
            .await
            .unwrap();

        let plug_principal = client.app.session.login(ProviderKind::Plug).await.unwrap();
        assert_ne!(plug_principal, ii_principal);
        assert_eq!(plug_principal, client.bridge.wallet_principal());
        assert_eq!(client.app.gateway.stats().evictions, 1);
        assert_eq!(
            listener.events(),
            vec![
                SessionEvent::PrincipalChanged {
                    previous: None,
                    current: ii_principal.clone(),
                },
                SessionEvent::PrincipalChanged {
                    previous: Some(ii_principal),
                    current: plug_principal.clone(),
                },
            ]
        );

        // The wallet is a different caller to the backend
        let err = client
            .app
            .orchestrator
            .create_poll(&poll(&ii_project, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteCall);

        let own = client
            .app
            .orchestrator
            .create_project(&project("Workshop"))
            .await
            .unwrap();
        let stored = client
            .app
            .orchestrator
            .get_project(&own)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.owner, plug_principal);
    }

    #[tokio::test]
    async fn test_logout_forgets_everything() {
        let world = World::new();
        let client = world.client();
        client.app.session.login(ProviderKind::Plug).await.unwrap();
        assert!(client.bridge.is_connected_now());

        client.app.session.logout().await;
        assert!(!client.bridge.is_connected_now());
        assert!(client.store.load().await.unwrap().is_none());
        assert_eq!(client.app.session.phase(), SessionPhase::Unauthenticated);

        let err = client
            .app
            .orchestrator
            .create_project(&project("After"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthRequired);
    }
}
