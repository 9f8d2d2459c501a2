//! # Actor Gateway (CV-04)
//!
//! Hands out remote actor handles bound to an endpoint and a caller
//! identity, building each at most once.
//!
//! ## Responsibilities
//!
//! | Operation | Behavior |
//! |-----------|----------|
//! | `get_actor(endpoint, identity)` | Cached handle for (endpoint, principal); concurrent callers share one construction |
//! | `evict_principal(p)` | Drops every handle bound to `p`; anonymous handles stay |
//! | `ActorHandle::call` / `query` | Builds, signs and submits an [`Envelope`] |
//!
//! The gateway registers as a session listener, so logout, expiry and
//! principal changes evict stale handles without the session manager
//! knowing the gateway exists.
//!
//! ## Module Structure
//!
//! ```text
//! cv-04-actor-gateway/
//! ├── domain/      # Endpoint, ActorKey, Envelope, GatewayError, GatewayStats
//! ├── ports/       # ActorGatewayApi (inbound), AgentTransport (outbound)
//! ├── adapters/    # HttpAgentTransport
//! ├── handle.rs    # ActorHandle
//! ├── service.rs   # ActorGateway
//! └── config.rs    # GatewayConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod handle;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{HttpAgentTransport, ReplicaResponse};
pub use config::{GatewayConfig, DEFAULT_INGRESS_EXPIRY};
pub use domain::{
    signable_message, ActorKey, Endpoint, EndpointConfig, Envelope, EnvelopeError, GatewayError,
    GatewayStats, RequestContent, RequestType, TransportError, REQUEST_DOMAIN,
};
pub use handle::ActorHandle;
pub use ports::{ActorGatewayApi, AgentTransport, MockTransport, TransportStatus};
pub use service::ActorGateway;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
