//! # Outbound Ports
//!
//! What the adapters drive: the redirect-based identity service (Internet
//! Identity, NFID) and the browser-injected Plug capability.

use crate::domain::{Delegation, ProviderError, SignedDelegation};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_crypto::Ed25519KeyPair;
use shared_types::{Clock, Principal};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Authorization request sent to an identity service window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizeRequest {
    /// Identity service URL the flow opens.
    pub identity_provider: String,
    /// Session key to delegate to, DER-encoded.
    pub session_public_key: Vec<u8>,
    /// Requested delegation lifetime.
    pub max_time_to_live: Duration,
    /// Application name for consent screens that show one.
    pub application_name: Option<String>,
}

/// How the identity service window closed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthorizeResponse {
    /// User authenticated; the chain delegates to the session key.
    Authorized {
        /// Links from `user_public_key` to the session key.
        delegations: Vec<SignedDelegation>,
        /// User's root key, DER-encoded.
        user_public_key: Vec<u8>,
    },
    /// User closed the window or declined.
    UserInterrupt,
    /// Service reported an error.
    Failure(String),
}

/// Redirect-based identity service.
#[async_trait]
pub trait IdentityServiceClient: Send + Sync {
    /// Open the flow and wait until the window reports back.
    async fn authorize(&self, request: AuthorizeRequest) -> Result<AuthorizeResponse, ProviderError>;
}

/// Probe for a browser-injected capability. Synchronous: either it is
/// injected right now or it is not.
pub trait ExtensionHost: Send + Sync {
    /// The injected Plug bridge, if the extension is installed.
    fn injected(&self) -> Option<Arc<dyn PlugBridge>>;
}

/// Capability surface the Plug extension injects.
#[async_trait]
pub trait PlugBridge: Send + Sync {
    /// Ask the user to approve this application. `Ok(false)` means declined.
    async fn request_connect(&self, whitelist: &[String], host: &str) -> Result<bool, ProviderError>;

    /// Whether the extension still considers this application connected.
    async fn is_connected(&self) -> Result<bool, ProviderError>;

    /// Connected principal, textual form.
    async fn principal(&self) -> Result<String, ProviderError>;

    /// Wallet public key, DER-encoded.
    async fn public_key(&self) -> Result<Vec<u8>, ProviderError>;

    /// Sign with the wallet key.
    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, ProviderError>;

    /// Disconnect this application.
    async fn disconnect(&self) -> Result<(), ProviderError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Scripted outcome for [`MockIdentityService`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockAuthBehavior {
    /// Issue a delegation for the requested lifetime.
    Approve,
    /// Report `UserInterrupt`.
    Reject,
    /// Never answer.
    Abandon,
    /// Report a service failure.
    Fail(String),
    /// Sign the delegation with a key other than the user's root key.
    ForgeSignature,
}

/// Identity service that authorizes immediately with a fixed root key.
pub struct MockIdentityService {
    root: Ed25519KeyPair,
    clock: Arc<dyn Clock>,
    behavior: Mutex<MockAuthBehavior>,
    requests: Mutex<Vec<AuthorizeRequest>>,
}

impl MockIdentityService {
    /// New service with a random root key that approves every request.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_root(Ed25519KeyPair::generate(), clock)
    }

    /// New service with a given root key.
    pub fn with_root(root: Ed25519KeyPair, clock: Arc<dyn Clock>) -> Self {
        Self {
            root,
            clock,
            behavior: Mutex::new(MockAuthBehavior::Approve),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Script the next responses.
    pub fn set_behavior(&self, behavior: MockAuthBehavior) {
        *self.behavior.lock() = behavior;
    }

    /// Principal of the root key.
    pub fn principal(&self) -> Principal {
        Principal::self_authenticating(&self.root.public_key().to_der())
    }

    /// Number of interactive flows opened.
    pub fn authorize_calls(&self) -> usize {
        self.requests.lock().len()
    }

    /// Most recent request.
    pub fn last_request(&self) -> Option<AuthorizeRequest> {
        self.requests.lock().last().cloned()
    }

    fn delegate(&self, signer: &Ed25519KeyPair, request: &AuthorizeRequest) -> AuthorizeResponse {
        let delegation = Delegation {
            pubkey: request.session_public_key.clone(),
            expiration: self.clock.now().saturating_add(request.max_time_to_live),
            targets: None,
        };
        AuthorizeResponse::Authorized {
            delegations: vec![SignedDelegation::sign(signer, delegation)],
            user_public_key: self.root.public_key().to_der(),
        }
    }
}

#[async_trait]
impl IdentityServiceClient for MockIdentityService {
    async fn authorize(&self, request: AuthorizeRequest) -> Result<AuthorizeResponse, ProviderError> {
        self.requests.lock().push(request.clone());
        let behavior = self.behavior.lock().clone();
        match behavior {
            MockAuthBehavior::Approve => Ok(self.delegate(&self.root, &request)),
            MockAuthBehavior::Reject => Ok(AuthorizeResponse::UserInterrupt),
            MockAuthBehavior::Abandon => std::future::pending().await,
            MockAuthBehavior::Fail(reason) => Ok(AuthorizeResponse::Failure(reason)),
            MockAuthBehavior::ForgeSignature => {
                Ok(self.delegate(&Ed25519KeyPair::generate(), &request))
            }
        }
    }
}

/// Plug extension with a local wallet key.
pub struct MockPlugBridge {
    wallet: Ed25519KeyPair,
    approve: AtomicBool,
    connected: AtomicBool,
    connect_calls: AtomicUsize,
    disconnect_fails: AtomicBool,
    reported_principal: Mutex<Option<String>>,
}

impl Default for MockPlugBridge {
    fn default() -> Self {
        Self::with_wallet(Ed25519KeyPair::generate())
    }
}

impl MockPlugBridge {
    /// Bridge that approves connections with the given wallet key.
    pub fn with_wallet(wallet: Ed25519KeyPair) -> Self {
        Self {
            wallet,
            approve: AtomicBool::new(true),
            connected: AtomicBool::new(false),
            connect_calls: AtomicUsize::new(0),
            disconnect_fails: AtomicBool::new(false),
            reported_principal: Mutex::new(None),
        }
    }

    /// Whether the user approves connection requests.
    pub fn set_approve(&self, approve: bool) {
        self.approve.store(approve, Ordering::SeqCst);
    }

    /// Simulate the wallet ending the session on its side.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Make `disconnect` fail.
    pub fn set_disconnect_fails(&self, fails: bool) {
        self.disconnect_fails.store(fails, Ordering::SeqCst);
    }

    /// Report a principal other than the wallet key's.
    pub fn report_principal(&self, principal: impl Into<String>) {
        *self.reported_principal.lock() = Some(principal.into());
    }

    /// Principal of the wallet key.
    pub fn wallet_principal(&self) -> Principal {
        Principal::self_authenticating(&self.wallet.public_key().to_der())
    }

    /// Number of approval prompts shown.
    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    /// Whether the application is currently connected.
    pub fn is_connected_now(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlugBridge for MockPlugBridge {
    async fn request_connect(&self, _whitelist: &[String], _host: &str) -> Result<bool, ProviderError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        let approved = self.approve.load(Ordering::SeqCst);
        self.connected.store(approved, Ordering::SeqCst);
        Ok(approved)
    }

    async fn is_connected(&self) -> Result<bool, ProviderError> {
        Ok(self.connected.load(Ordering::SeqCst))
    }

    async fn principal(&self) -> Result<String, ProviderError> {
        let reported = self.reported_principal.lock().clone();
        Ok(reported.unwrap_or_else(|| self.wallet_principal().to_text()))
    }

    async fn public_key(&self) -> Result<Vec<u8>, ProviderError> {
        Ok(self.wallet.public_key().to_der())
    }

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, ProviderError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(ProviderError::unavailable("Plug is not connected"));
        }
        Ok(self.wallet.sign(message).as_bytes().to_vec())
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        self.connected.store(false, Ordering::SeqCst);
        if self.disconnect_fails.load(Ordering::SeqCst) {
            return Err(ProviderError::unavailable("extension did not respond"));
        }
        Ok(())
    }
}

/// Browser context with or without the Plug extension.
#[derive(Default)]
pub struct MockExtensionHost {
    bridge: Mutex<Option<Arc<dyn PlugBridge>>>,
}

impl MockExtensionHost {
    /// No extension installed.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Extension installed.
    pub fn with_bridge(bridge: Arc<dyn PlugBridge>) -> Self {
        Self {
            bridge: Mutex::new(Some(bridge)),
        }
    }

    /// Uninstall the extension.
    pub fn remove(&self) {
        *self.bridge.lock() = None;
    }
}

impl ExtensionHost for MockExtensionHost {
    fn injected(&self) -> Option<Arc<dyn PlugBridge>> {
        self.bridge.lock().clone()
    }
}
