//! # Identity Providers (CV-02)
//!
//! Heterogeneous authentication mechanics behind one capability set:
//! `connect`, `restore`, `disconnect`.
//!
//! ## Architecture
//!
//! ```text
//! cv-02-identity-providers/
//! ├── domain/     # Delegation chains, Credential, PersistedReference, ProviderError
//! ├── ports/      # ProviderAdapter (inbound), identity service + extension (outbound)
//! ├── adapters/   # Internet Identity, NFID, Plug
//! └── config.rs   # ProviderConfig
//! ```
//!
//! ## Failure Normalization
//!
//! Whatever goes wrong inside a provider reaches the session manager as one
//! of `Unavailable`, `UserRejected` or `Timeout`.
//!
//! ## Key Handling
//!
//! - Delegated session keys are generated per login and persisted only as a
//!   sealed box under the device storage key
//! - Plug keys never leave the extension
//! - `Credential`'s `Debug` omits the signer

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{DelegationFlow, FlowSettings, InternetIdentityAdapter, NfidAdapter, PlugAdapter};
pub use config::ProviderConfig;
pub use domain::{
    verify_links, Credential, Delegation, DelegationChain, DelegationError, KeyPairSigner,
    PersistedReference, ProviderError, ReferenceBlob, RequestSigner, SessionGrant,
    SignedDelegation,
};
pub use ports::{
    AuthorizeRequest, AuthorizeResponse, ExtensionHost, IdentityServiceClient, MockAuthBehavior,
    MockExtensionHost, MockIdentityService, MockPlugBridge, PlugBridge, ProviderAdapter,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
