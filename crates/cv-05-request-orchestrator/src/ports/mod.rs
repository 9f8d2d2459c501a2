//! # Ports Layer
//!
//! - **Inbound**: [`CivitasApi`]
//!
//! Outbound traffic goes through the actor gateway's `AgentTransport`.

pub mod inbound;

pub use inbound::CivitasApi;
