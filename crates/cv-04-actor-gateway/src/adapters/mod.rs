//! # Adapters Layer

pub mod http_transport;

pub use http_transport::{HttpAgentTransport, ReplicaResponse};
