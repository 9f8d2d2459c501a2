//! # Actor Gateway Service
//!
//! Caches one [`ActorHandle`] per (endpoint, principal). Each cache slot is a
//! `OnceCell`, so concurrent `get_actor` calls for a key that is not built
//! yet wait on a single construction instead of racing their own.
//!
//! Handles are dropped when:
//! - the session manager reports the principal stale (logout, expiry,
//!   principal change)
//! - a lookup finds the bound credential expired or replaced
//!
//! Anonymous handles are never dropped by session events. A signed handle
//! whose slot was evicted while it was being built is never returned.

use crate::config::GatewayConfig;
use crate::domain::{ActorKey, Endpoint, GatewayError, GatewayStats, StatsCounters};
use crate::handle::ActorHandle;
use crate::ports::{ActorGatewayApi, AgentTransport};
use async_trait::async_trait;
use cv_02_identity_providers::Credential;
use cv_03_session_manager::{SessionEvent, SessionListener};
use parking_lot::Mutex;
use shared_types::{Clock, Principal, Timestamp};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

type Slot = Arc<OnceCell<Arc<ActorHandle>>>;

/// Identity-bound handle cache.
pub struct ActorGateway {
    transport: Arc<dyn AgentTransport>,
    clock: Arc<dyn Clock>,
    config: GatewayConfig,
    cache: Mutex<HashMap<ActorKey, Slot>>,
    stats: StatsCounters,
    next_id: AtomicU64,
}

impl ActorGateway {
    /// Create a gateway over `transport`.
    pub fn new(
        transport: Arc<dyn AgentTransport>,
        clock: Arc<dyn Clock>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            transport,
            clock,
            config,
            cache: Mutex::new(HashMap::new()),
            stats: StatsCounters::default(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Built handles currently cached.
    pub fn cached(&self) -> usize {
        self.cache
            .lock()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    /// Drop every handle.
    pub fn clear(&self) -> usize {
        let mut cache = self.cache.lock();
        let dropped = cache.values().filter(|slot| slot.initialized()).count();
        cache.clear();
        self.stats.evicted(dropped);
        dropped
    }

    /// Slot for `key`, replacing one whose handle is stale.
    fn slot(&self, key: &ActorKey, identity: Option<&Credential>, now: Timestamp) -> Slot {
        let mut cache = self.cache.lock();
        let stale = cache
            .get(key)
            .and_then(|slot| slot.get())
            .is_some_and(|handle| handle.is_expired(now) || !handle.bound_to(identity));
        if stale {
            cache.remove(key);
            self.stats.evicted(1);
            debug!(endpoint = %key.endpoint, "[cv-04] Replacing stale actor handle");
        }
        cache.entry(key.clone()).or_default().clone()
    }

    /// Whether `slot` is still the cached slot for `key`.
    fn is_current(&self, key: &ActorKey, slot: &Slot) -> bool {
        self.cache
            .lock()
            .get(key)
            .is_some_and(|cached| Arc::ptr_eq(cached, slot))
    }

    async fn construct(
        &self,
        endpoint: &Endpoint,
        identity: Option<&Credential>,
    ) -> Result<Arc<ActorHandle>, GatewayError> {
        let status = self.transport.status(endpoint).await?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.stats.constructed();

        let handle = ActorHandle::new(
            id,
            endpoint.clone(),
            identity.cloned(),
            self.transport.clone(),
            self.clock.clone(),
            self.config.ingress_expiry,
        );
        info!(
            endpoint = %endpoint,
            principal = %handle.principal(),
            replica = %status.replica_version,
            "[cv-04] Actor handle built"
        );
        Ok(Arc::new(handle))
    }
}

#[async_trait]
impl ActorGatewayApi for ActorGateway {
    async fn get_actor(
        &self,
        endpoint: &Endpoint,
        identity: Option<&Credential>,
    ) -> Result<Arc<ActorHandle>, GatewayError> {
        let now = self.clock.now();
        if identity.is_some_and(|c| c.is_expired(now)) {
            return Err(GatewayError::CredentialExpired);
        }

        let key = ActorKey {
            endpoint: endpoint.clone(),
            principal: identity.map(|c| c.principal.clone()),
        };
        let slot = self.slot(&key, identity, now);
        if let Some(handle) = slot.get() {
            self.stats.hit();
            return Ok(handle.clone());
        }

        let handle = slot
            .get_or_try_init(|| self.construct(endpoint, identity))
            .await?
            .clone();
        if key.principal.is_some() && !self.is_current(&key, &slot) {
            debug!(
                endpoint = %endpoint,
                principal = %handle.principal(),
                "[cv-04] Identity evicted while its handle was being built"
            );
            return Err(GatewayError::CredentialExpired);
        }
        Ok(handle)
    }

    fn evict_principal(&self, principal: &Principal) -> usize {
        let mut cache = self.cache.lock();
        let mut dropped = 0;
        cache.retain(|key, slot| {
            let stale = key.principal.as_ref() == Some(principal);
            if stale && slot.initialized() {
                dropped += 1;
            }
            !stale
        });
        self.stats.evicted(dropped);
        dropped
    }

    fn stats(&self) -> GatewayStats {
        self.stats.snapshot()
    }
}

impl SessionListener for ActorGateway {
    fn on_session_event(&self, event: &SessionEvent) {
        if let Some(principal) = event.stale_principal() {
            let dropped = self.evict_principal(principal);
            debug!(principal = %principal, dropped, "[cv-04] Evicted handles for stale identity");
        }
    }
}
