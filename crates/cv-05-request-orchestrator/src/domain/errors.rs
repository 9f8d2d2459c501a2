//! # Orchestrator Errors
//!
//! Each variant maps onto the client error taxonomy through
//! [`OrchestratorError::kind`].

use cv_01_wire_codec::CodecError;
use cv_03_session_manager::SessionError;
use cv_04_actor_gateway::GatewayError;
use shared_types::{ClientError, ErrorKind};
use thiserror::Error;

/// Orchestration failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    /// Input rejected before any remote interaction.
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Offending input field
        field: &'static str,
        /// What is wrong
        reason: String,
    },

    /// No usable identity.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Endpoint, actor or transport failure.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Reply does not match the schema.
    #[error("cannot decode reply: {0}")]
    Codec(#[from] CodecError),

    /// Backend answered with an explicit error.
    #[error("{method} failed: {message}")]
    Remote {
        /// Backend method
        method: &'static str,
        /// Backend message
        message: String,
    },
}

impl OrchestratorError {
    /// Validation failure for `field`.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        OrchestratorError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Map a parse failure on user input to a validation error for `field`.
    pub fn field(field: &'static str) -> impl FnOnce(CodecError) -> Self {
        move |err| OrchestratorError::invalid(field, err.to_string())
    }

    /// Taxonomy kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrchestratorError::Validation { .. } => ErrorKind::Validation,
            OrchestratorError::Session(e) => e.kind(),
            OrchestratorError::Gateway(e) => e.kind(),
            OrchestratorError::Codec(_) => ErrorKind::Codec,
            OrchestratorError::Remote { .. } => ErrorKind::RemoteCall,
        }
    }

    /// Only network failures are worth retrying.
    pub fn is_transient(&self) -> bool {
        self.kind().is_transient()
    }
}

impl From<OrchestratorError> for ClientError {
    fn from(err: OrchestratorError) -> Self {
        ClientError::new(err.kind(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_04_actor_gateway::TransportError;

    #[test]
    fn test_kinds() {
        assert_eq!(
            OrchestratorError::invalid("title", "empty").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            OrchestratorError::from(SessionError::AuthExpired).kind(),
            ErrorKind::AuthExpired
        );
        assert_eq!(
            OrchestratorError::Remote {
                method: "vote",
                message: "poll closed".into()
            }
            .kind(),
            ErrorKind::RemoteCall
        );
        assert!(
            OrchestratorError::from(GatewayError::from(TransportError::Network("reset".into())))
                .is_transient()
        );
    }

    #[test]
    fn test_field_mapping_keeps_codec_detail() {
        let err = OrchestratorError::field("closes_at")(CodecError::NegativeAmount("-1".into()));
        let client: ClientError = err.into();
        assert_eq!(client.kind, ErrorKind::Validation);
        assert!(client.message.starts_with("invalid closes_at"));
    }

    #[test]
    fn test_remote_message_is_preserved() {
        let client: ClientError = OrchestratorError::Remote {
            method: "claim_reward",
            message: "already claimed".into(),
        }
        .into();
        assert_eq!(client.message, "claim_reward failed: already claimed");
    }
}
