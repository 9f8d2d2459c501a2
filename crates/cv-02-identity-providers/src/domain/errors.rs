//! # Provider Errors
//!
//! Every adapter failure is normalized into exactly three cases before it
//! leaves this crate. Raw transport or extension errors never cross the
//! adapter boundary.

use shared_types::{ClientError, ErrorKind};
use thiserror::Error;

/// Normalized adapter failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Capability absent or misconfigured (extension not installed, identity
    /// service unreachable, malformed delegation).
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The user explicitly declined.
    #[error("user rejected the request")]
    UserRejected,

    /// The interactive flow was abandoned.
    #[error("interactive flow timed out")]
    Timeout,
}

impl ProviderError {
    /// Taxonomy kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::Unavailable(_) => ErrorKind::ProviderUnavailable,
            ProviderError::UserRejected => ErrorKind::UserRejected,
            ProviderError::Timeout => ErrorKind::ProviderTimeout,
        }
    }

    /// Shorthand for `Unavailable`.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        ProviderError::Unavailable(reason.into())
    }
}

impl From<ProviderError> for ClientError {
    fn from(err: ProviderError) -> Self {
        ClientError::new(err.kind(), err.to_string())
    }
}
