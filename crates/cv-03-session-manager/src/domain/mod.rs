//! # Domain Module
//!
//! Session state, restore outcomes, listener events and errors.

pub mod errors;
pub mod session;

pub use errors::*;
pub use session::*;
