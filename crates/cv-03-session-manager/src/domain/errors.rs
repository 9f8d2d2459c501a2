//! # Session Errors

use cv_02_identity_providers::ProviderError;
use shared_types::{ClientError, ErrorKind, ProviderKind};
use thiserror::Error;

/// Session manager failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Another login flow is already in progress.
    #[error("an authentication flow is already in progress")]
    AuthInProgress,

    /// No session at all.
    #[error("sign in required")]
    AuthRequired,

    /// The session exists but has expired.
    #[error("session expired, please sign in again")]
    AuthExpired,

    /// A logout happened while the flow was open.
    #[error("sign-in cancelled by logout")]
    Cancelled,

    /// No adapter registered for the provider.
    #[error("identity provider {0} is not configured")]
    ProviderNotConfigured(ProviderKind),

    /// Adapter failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl SessionError {
    /// Taxonomy kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::AuthInProgress => ErrorKind::AuthInProgress,
            SessionError::AuthRequired => ErrorKind::AuthRequired,
            SessionError::AuthExpired => ErrorKind::AuthExpired,
            SessionError::Cancelled => ErrorKind::UserRejected,
            SessionError::ProviderNotConfigured(_) => ErrorKind::Configuration,
            SessionError::Provider(e) => e.kind(),
        }
    }
}

impl From<SessionError> for ClientError {
    fn from(err: SessionError) -> Self {
        ClientError::new(err.kind(), err.to_string())
    }
}
