//! # Gateway Errors

use cv_01_wire_codec::CodecError;
use cv_02_identity_providers::ProviderError;
use shared_types::{ClientError, ErrorKind};
use thiserror::Error;

/// Failures below the actor handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection, timeout or 5xx.
    #[error("network failure: {0}")]
    Network(String),

    /// Backend refused the request.
    #[error("rejected ({code}): {message}")]
    Rejected {
        /// Reject code
        code: u32,
        /// Backend message
        message: String,
    },

    /// Response body could not be read.
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Actor gateway errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Endpoint id or host missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Identity passed in has already expired.
    #[error("credential expired")]
    CredentialExpired,

    /// Request signing failed.
    #[error("signing failed: {0}")]
    Signing(#[from] ProviderError),

    /// Request content could not be encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl GatewayError {
    /// Taxonomy kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Configuration(_) => ErrorKind::Configuration,
            GatewayError::CredentialExpired => ErrorKind::AuthExpired,
            GatewayError::Signing(e) => e.kind(),
            GatewayError::Codec(_) => ErrorKind::Codec,
            GatewayError::Transport(TransportError::Network(_)) => ErrorKind::Network,
            GatewayError::Transport(TransportError::Rejected { .. }) => ErrorKind::RemoteCall,
            GatewayError::Transport(TransportError::Decode(_)) => ErrorKind::Codec,
        }
    }

    /// Whether a retry might succeed.
    pub fn is_transient(&self) -> bool {
        self.kind().is_transient()
    }
}

impl From<GatewayError> for ClientError {
    fn from(err: GatewayError) -> Self {
        ClientError::new(err.kind(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            GatewayError::CredentialExpired.kind(),
            ErrorKind::AuthExpired
        );
        assert_eq!(
            GatewayError::from(TransportError::Rejected {
                code: 5,
                message: "trap".into()
            })
            .kind(),
            ErrorKind::RemoteCall
        );
        assert_eq!(
            GatewayError::from(ProviderError::unavailable("gone")).kind(),
            ErrorKind::ProviderUnavailable
        );
    }

    #[test]
    fn test_only_network_is_transient() {
        assert!(GatewayError::from(TransportError::Network("reset".into())).is_transient());
        assert!(!GatewayError::from(TransportError::Decode("eof".into())).is_transient());
    }

    #[test]
    fn test_into_client_error() {
        let err: ClientError = GatewayError::Configuration("no host".into()).into();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("no host"));
    }
}
