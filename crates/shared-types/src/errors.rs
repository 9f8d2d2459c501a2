//! # Error Types
//!
//! Normalized error taxonomy. Every crate-level error maps onto one
//! [`ErrorKind`]; presentation code only ever sees [`ClientError`].
//!
//! | Kind | Raised before network? | Retried? |
//! |------|------------------------|----------|
//! | `validation` | yes | never |
//! | `configuration` | yes | never |
//! | `provider_unavailable`, `user_rejected`, `provider_timeout`, `auth_in_progress` | yes | never |
//! | `auth_expired`, `auth_required` | yes | never |
//! | `codec` | either side | never |
//! | `remote_call` | no | never |
//! | `network` | no | reads only, bounded backoff |

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error classification shared by all client crates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input, caught before any remote interaction.
    Validation,
    /// Missing endpoint id or host.
    Configuration,
    /// Provider capability absent or misconfigured.
    ProviderUnavailable,
    /// User explicitly declined.
    UserRejected,
    /// Interactive flow abandoned.
    ProviderTimeout,
    /// Another authentication flow is pending.
    AuthInProgress,
    /// Session exists but has expired.
    AuthExpired,
    /// No session.
    AuthRequired,
    /// Wire encode/decode contract violated.
    Codec,
    /// Backend returned an explicit failure.
    RemoteCall,
    /// Transport failure or timeout.
    Network,
}

impl ErrorKind {
    /// Stable identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Configuration => "configuration",
            ErrorKind::ProviderUnavailable => "provider_unavailable",
            ErrorKind::UserRejected => "user_rejected",
            ErrorKind::ProviderTimeout => "provider_timeout",
            ErrorKind::AuthInProgress => "auth_in_progress",
            ErrorKind::AuthExpired => "auth_expired",
            ErrorKind::AuthRequired => "auth_required",
            ErrorKind::Codec => "codec",
            ErrorKind::RemoteCall => "remote_call",
            ErrorKind::Network => "network",
        }
    }

    /// Only transport failures are transient.
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorKind::Network)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error as surfaced to the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{kind}: {message}")]
pub struct ClientError {
    /// Classification.
    pub kind: ErrorKind,
    /// Human-readable detail.
    pub message: String,
}

impl ClientError {
    /// Create a new client error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
