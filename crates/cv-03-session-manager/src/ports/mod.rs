//! # Ports Layer
//!
//! - **Inbound**: [`IdentitySessionApi`], what the rest of the client calls
//! - **Outbound**: [`SessionStore`] persistence and [`SessionListener`]
//!   notifications

pub mod inbound;
pub mod outbound;

pub use inbound::IdentitySessionApi;
pub use outbound::{RecordingListener, SessionListener, SessionStore, StoreError};
