//! # Shared Types Crate
//!
//! Types every Civitas client crate agrees on:
//!
//! - **Identity**: [`Principal`] (self-authenticating caller identifier) and
//!   [`ProviderKind`] (which identity provider produced a session).
//! - **Time**: [`Timestamp`] at wire resolution (nanoseconds since epoch) and the
//!   [`Clock`] port used for lazy expiry checks.
//! - **Errors**: the normalized `{kind, message}` shape ([`ClientError`]) that
//!   presentation code receives, and the [`ErrorKind`] taxonomy every crate-level
//!   error maps onto.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod principal;
pub mod provider;
pub mod time;

pub use errors::{ClientError, ErrorKind};
pub use principal::{Principal, PrincipalError};
pub use provider::ProviderKind;
pub use time::{Clock, ManualClock, SystemClock, Timestamp, NANOS_PER_MILLI};
