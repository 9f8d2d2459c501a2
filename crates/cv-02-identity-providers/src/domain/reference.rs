//! # Persisted References
//!
//! What survives a reload. The session manager reads the envelope fields
//! (`provider`, `principal`, `expires_at`, `created_at`) and hands the blob
//! back to the adapter that produced it, without interpreting it.

use crate::domain::credential::Credential;
use crate::domain::delegation::DelegationChain;
use serde::{Deserialize, Serialize};
use shared_crypto::SealedBox;
use shared_types::{Principal, ProviderKind, Timestamp};

/// Provider-specific part of a persisted reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ReferenceBlob {
    /// Delegation chain plus the session key seed, sealed under the device
    /// storage key.
    Delegation {
        /// Chain from the user's root key to the session key.
        chain: DelegationChain,
        /// Sealed 32-byte session key seed.
        sealed_session_key: SealedBox,
    },
    /// Extension wallet; the key stays inside the extension.
    Extension {
        /// Wallet DER public key.
        public_key: Vec<u8>,
    },
}

/// Serializable session reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedReference {
    /// Adapter that can restore this reference.
    pub provider: ProviderKind,
    /// Principal at the time of login.
    pub principal: Principal,
    /// Session expiry.
    pub expires_at: Timestamp,
    /// Last successful authentication.
    pub created_at: Timestamp,
    /// Adapter-specific data.
    pub blob: ReferenceBlob,
}

/// Result of a successful `connect`.
#[derive(Clone, Debug)]
pub struct SessionGrant {
    /// Live credential.
    pub credential: Credential,
    /// What to persist for a later silent restore.
    pub reference: PersistedReference,
}
