//! # Adapters
//!
//! | Adapter | Mechanism | Default lifetime |
//! |---------|-----------|------------------|
//! | [`InternetIdentityAdapter`] | Redirect flow, delegation chain | 8 hours |
//! | [`NfidAdapter`] | Redirect flow, delegation chain | 7 days |
//! | [`PlugAdapter`] | Injected extension, wallet-held key | 24 hours |

pub mod delegation_flow;
pub mod internet_identity;
pub mod nfid;
pub mod plug;

pub use delegation_flow::{DelegationFlow, FlowSettings};
pub use internet_identity::InternetIdentityAdapter;
pub use nfid::NfidAdapter;
pub use plug::PlugAdapter;
