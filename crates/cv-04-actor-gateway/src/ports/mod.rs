//! # Ports Layer
//!
//! - **Inbound**: [`ActorGatewayApi`]
//! - **Outbound**: [`AgentTransport`], how envelopes reach a backend

pub mod inbound;
pub mod outbound;

pub use inbound::ActorGatewayApi;
pub use outbound::{AgentTransport, MockTransport, TransportStatus};
