//! # Identity Session Manager
//!
//! Owns the single current session and funnels every mutation of it.
//!
//! ## Concurrency
//!
//! - Session state sits behind a `parking_lot::RwLock` that is never held
//!   across an `.await`
//! - Interactive flows are serialized by one `tokio::sync::Mutex`; a second
//!   `login` while one is pending fails fast with `AuthInProgress`
//! - If a login future is dropped mid-flow the pending marker is cleared and
//!   the prior session is untouched
//! - `logout` does not wait for a pending flow; it bumps the state generation
//!   and the flow discards its session when it completes

use crate::domain::{
    RestoreOutcome, Session, SessionError, SessionEvent, SessionPhase, SessionState,
};
use crate::ports::{IdentitySessionApi, SessionListener, SessionStore};
use async_trait::async_trait;
use cv_02_identity_providers::{Credential, ProviderAdapter};
use parking_lot::RwLock;
use shared_types::{Clock, Principal, ProviderKind, Timestamp};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Marks a flow as pending for as long as it is alive.
struct PendingGuard<'a> {
    state: &'a RwLock<SessionState>,
    generation: u64,
    armed: bool,
}

impl<'a> PendingGuard<'a> {
    fn begin(state: &'a RwLock<SessionState>, provider: ProviderKind) -> Self {
        let mut guard = state.write();
        guard.pending = Some(provider);
        Self {
            state,
            generation: guard.generation,
            armed: true,
        }
    }

    /// Install the new session and clear the pending marker in one step.
    ///
    /// Hands the session back if a logout ran since [`PendingGuard::begin`].
    fn complete(mut self, session: Session) -> Result<Option<Session>, Session> {
        self.armed = false;
        let state = self.state;
        let mut guard = state.write();
        guard.pending = None;
        if guard.generation != self.generation {
            return Err(session);
        }
        Ok(guard.session.replace(session))
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.write().pending = None;
        }
    }
}

/// Session manager service.
pub struct IdentitySessionManager {
    providers: HashMap<ProviderKind, Arc<dyn ProviderAdapter>>,
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    state: RwLock<SessionState>,
    auth_lock: tokio::sync::Mutex<()>,
    listeners: RwLock<Vec<Arc<dyn SessionListener>>>,
    expiry_reported: AtomicBool,
}

impl IdentitySessionManager {
    /// Manager with no providers registered.
    pub fn new(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            providers: HashMap::new(),
            store,
            clock,
            state: RwLock::new(SessionState::default()),
            auth_lock: tokio::sync::Mutex::new(()),
            listeners: RwLock::new(Vec::new()),
            expiry_reported: AtomicBool::new(false),
        }
    }

    /// Register an adapter under its own kind.
    pub fn with_provider(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.providers.insert(adapter.kind(), adapter);
        self
    }

    /// Providers that can be logged in with.
    pub fn providers(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.providers.contains_key(kind))
            .collect()
    }

    /// Subscribe to identity changes.
    pub fn register_listener(&self, listener: Arc<dyn SessionListener>) {
        self.listeners.write().push(listener);
    }

    /// Current time according to the manager's clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn notify(&self, event: &SessionEvent) {
        let listeners = self.listeners.read().clone();
        for listener in listeners {
            listener.on_session_event(event);
        }
    }

    fn live_principal_for(&self, provider: ProviderKind) -> Option<Principal> {
        let now = self.clock.now();
        self.state
            .read()
            .live_for(provider, now)
            .map(|s| s.principal().clone())
    }

    /// Tell listeners about an expiry once per session.
    fn report_expiry(&self, principal: Principal) {
        if !self.expiry_reported.swap(true, Ordering::SeqCst) {
            info!(principal = %principal, "[cv-03] Session expired");
            self.notify(&SessionEvent::Expired {
                previous: principal,
            });
        }
    }

    /// `(live credential, principal of an expired session)`.
    fn read_session(&self) -> (Option<Credential>, Option<Principal>) {
        let now = self.clock.now();
        let state = self.state.read();
        match &state.session {
            Some(session) if session.is_live(now) => (Some(session.credential.clone()), None),
            Some(session) => (None, Some(session.principal().clone())),
            None => (None, None),
        }
    }

    async fn disconnect_quietly(&self, provider: ProviderKind) {
        if let Some(adapter) = self.providers.get(&provider) {
            if let Err(e) = adapter.disconnect().await {
                warn!(provider = %provider, error = %e, "[cv-03] Provider disconnect failed");
            }
        }
    }

    async fn clear_store_quietly(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "[cv-03] Could not clear persisted session");
        }
    }
}

#[async_trait]
impl IdentitySessionApi for IdentitySessionManager {
    async fn login(&self, provider: ProviderKind) -> Result<Principal, SessionError> {
        let adapter = self
            .providers
            .get(&provider)
            .cloned()
            .ok_or(SessionError::ProviderNotConfigured(provider))?;

        if let Some(principal) = self.live_principal_for(provider) {
            debug!(provider = %provider, "[cv-03] Already signed in, login is a no-op");
            return Ok(principal);
        }

        let _flow = self.auth_lock.try_lock().map_err(|_| {
            warn!(provider = %provider, "[cv-03] Login rejected, another flow is pending");
            SessionError::AuthInProgress
        })?;

        if let Some(principal) = self.live_principal_for(provider) {
            return Ok(principal);
        }

        let pending = PendingGuard::begin(&self.state, provider);
        info!(provider = %provider, "[cv-03] Login started");

        let grant = match adapter.connect().await {
            Ok(grant) => grant,
            Err(e) => {
                warn!(provider = %provider, error = %e, "[cv-03] Login failed, prior session kept");
                return Err(e.into());
            }
        };

        let principal = grant.credential.principal.clone();
        let previous = match pending.complete(Session::new(grant.credential, self.clock.now())) {
            Ok(previous) => previous,
            Err(_discarded) => {
                info!(provider = %provider, "[cv-03] Logged out during login, new session discarded");
                self.disconnect_quietly(provider).await;
                return Err(SessionError::Cancelled);
            }
        };
        self.expiry_reported.store(false, Ordering::SeqCst);
        info!(provider = %provider, principal = %principal, "[cv-03] Login succeeded");

        let previous_principal = previous.as_ref().map(|s| s.principal().clone());
        if previous_principal.as_ref() != Some(&principal) {
            self.notify(&SessionEvent::PrincipalChanged {
                previous: previous_principal,
                current: principal.clone(),
            });
        }

        if let Err(e) = self.store.save(&grant.reference).await {
            warn!(error = %e, "[cv-03] Could not persist session, it will not survive a reload");
        }
        if let Some(old) = previous.filter(|s| s.provider() != provider) {
            self.disconnect_quietly(old.provider()).await;
        }

        Ok(principal)
    }

    async fn logout(&self) {
        let previous = {
            let mut state = self.state.write();
            state.generation = state.generation.wrapping_add(1);
            state.session.take()
        };
        self.expiry_reported.store(false, Ordering::SeqCst);

        let Some(session) = previous else {
            self.clear_store_quietly().await;
            return;
        };

        info!(principal = %session.principal(), "[cv-03] Logged out");
        self.notify(&SessionEvent::LoggedOut {
            previous: session.principal().clone(),
        });
        self.disconnect_quietly(session.provider()).await;
        self.clear_store_quietly().await;
    }

    async fn restore_on_load(&self) -> RestoreOutcome {
        let _flow = self.auth_lock.lock().await;
        let now = self.clock.now();

        let (generation, existing) = {
            let state = self.state.read();
            let live = state
                .session
                .as_ref()
                .filter(|s| s.is_live(now))
                .map(|s| s.principal().clone());
            (state.generation, live)
        };
        if let Some(principal) = existing {
            return RestoreOutcome::Restored { principal };
        }

        let reference = match self.store.load().await {
            Ok(Some(reference)) => reference,
            Ok(None) => {
                debug!("[cv-03] No prior session");
                return RestoreOutcome::NoPriorSession;
            }
            Err(e) => {
                warn!(error = %e, "[cv-03] Persisted session unreadable");
                self.clear_store_quietly().await;
                return RestoreOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        if reference.expires_at.has_passed(now) {
            info!(provider = %reference.provider, "[cv-03] Persisted session expired");
            self.clear_store_quietly().await;
            return RestoreOutcome::Expired;
        }

        let Some(adapter) = self.providers.get(&reference.provider).cloned() else {
            return RestoreOutcome::Failed {
                reason: format!("identity provider {} is not configured", reference.provider),
            };
        };

        match adapter.restore(&reference).await {
            Ok(Some(credential)) if credential.principal == reference.principal => {
                let principal = credential.principal.clone();
                let previous = {
                    let mut state = self.state.write();
                    if state.generation != generation {
                        drop(state);
                        info!(provider = %reference.provider, "[cv-03] Logged out during restore");
                        return RestoreOutcome::Failed {
                            reason: "signed out while restoring".to_string(),
                        };
                    }
                    state
                        .session
                        .replace(Session::new(credential, reference.created_at))
                };
                self.expiry_reported.store(false, Ordering::SeqCst);
                info!(provider = %reference.provider, principal = %principal, "[cv-03] Session restored");
                self.notify(&SessionEvent::PrincipalChanged {
                    previous: previous.map(|s| s.credential.principal),
                    current: principal.clone(),
                });
                RestoreOutcome::Restored { principal }
            }
            Ok(Some(credential)) => {
                warn!(
                    stored = %reference.principal,
                    restored = %credential.principal,
                    "[cv-03] Restored principal differs from persisted one"
                );
                self.clear_store_quietly().await;
                RestoreOutcome::Failed {
                    reason: "restored principal differs from the persisted one".to_string(),
                }
            }
            Ok(None) => {
                info!(provider = %reference.provider, "[cv-03] Provider reports session no longer valid");
                self.clear_store_quietly().await;
                RestoreOutcome::Expired
            }
            Err(e) => {
                warn!(provider = %reference.provider, error = %e, "[cv-03] Restore failed");
                self.clear_store_quietly().await;
                RestoreOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn current_identity(&self) -> Option<Credential> {
        let (live, expired) = self.read_session();
        if let Some(principal) = expired {
            self.report_expiry(principal);
        }
        live
    }

    fn require_identity(&self) -> Result<Credential, SessionError> {
        match self.read_session() {
            (Some(credential), _) => Ok(credential),
            (None, Some(principal)) => {
                self.report_expiry(principal);
                Err(SessionError::AuthExpired)
            }
            (None, None) => Err(SessionError::AuthRequired),
        }
    }

    fn phase(&self) -> SessionPhase {
        self.state.read().phase(self.clock.now())
    }
}
