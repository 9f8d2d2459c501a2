//! # Domain Module
//!
//! Delegations, credentials, persisted references and provider errors.

pub mod credential;
pub mod delegation;
pub mod errors;
pub mod reference;

pub use credential::*;
pub use delegation::*;
pub use errors::*;
pub use reference::*;
