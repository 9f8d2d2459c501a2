//! # Inbound Ports

use crate::domain::{Endpoint, GatewayError, GatewayStats};
use crate::handle::ActorHandle;
use async_trait::async_trait;
use cv_02_identity_providers::Credential;
use shared_types::Principal;
use std::sync::Arc;

/// Identity-bound actor handles.
#[async_trait]
pub trait ActorGatewayApi: Send + Sync {
    /// Handle for `endpoint` acting as `identity` (`None` = anonymous).
    ///
    /// At most one handle is built per (endpoint, principal); concurrent
    /// callers for the same key share the construction.
    async fn get_actor(
        &self,
        endpoint: &Endpoint,
        identity: Option<&Credential>,
    ) -> Result<Arc<ActorHandle>, GatewayError>;

    /// Drop every handle bound to `principal`. Returns how many were dropped.
    fn evict_principal(&self, principal: &Principal) -> usize;

    /// Counters.
    fn stats(&self) -> GatewayStats;
}
