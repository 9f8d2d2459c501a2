//! # Transport Flows
//!
//! The production HTTP transport wired through the client container, and how
//! its failures reach the caller in the normalized error shape.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use client_runtime::{
        ClientConfig, ClientContainer, ExternalPorts, HeadlessIdentityService, NoExtensionHost,
    };
    use cv_03_session_manager::MemorySessionStore;
    use cv_04_actor_gateway::{ActorGatewayApi, EndpointConfig, HttpAgentTransport};
    use cv_05_request_orchestrator::CivitasApi;
    use shared_crypto::SecretKey;
    use shared_types::{ClientError, ErrorKind, ManualClock, Timestamp};

    use crate::integration::fixtures::START_MILLIS;

    fn container(endpoint: EndpointConfig) -> ClientContainer {
        let mut config = ClientConfig::for_testing();
        config.endpoint = endpoint;
        let ports = ExternalPorts {
            clock: Arc::new(ManualClock::new(Timestamp::from_millis(START_MILLIS))),
            transport: Arc::new(HttpAgentTransport::new(&config.gateway).unwrap()),
            identity_service: Arc::new(HeadlessIdentityService),
            extension_host: Arc::new(NoExtensionHost),
            store: Arc::new(MemorySessionStore::new()),
            storage_key: SecretKey::generate(),
        };
        ClientContainer::assemble(config, ports)
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let app = container(EndpointConfig::new("civitas-backend", "http://127.0.0.1:1"));

        let err = app.orchestrator.list_projects().await.unwrap_err();
        let client: ClientError = err.into();
        assert_eq!(client.kind, ErrorKind::Network);
        assert_eq!(app.gateway.stats().constructions, 0);
    }

    #[tokio::test]
    async fn test_missing_backend_id_is_configuration_error() {
        let app = container(EndpointConfig {
            backend_id: None,
            host: Some("http://127.0.0.1:1".to_string()),
        });

        let err = app.orchestrator.get_project("1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(!err.is_transient());
        assert_eq!(app.gateway.cached(), 0);
    }

    #[tokio::test]
    async fn test_missing_host_is_configuration_error() {
        let app = container(EndpointConfig {
            backend_id: Some("civitas-backend".to_string()),
            host: Some("   ".to_string()),
        });
        let err = app.orchestrator.list_polls(None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
