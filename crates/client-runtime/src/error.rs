//! # Runtime Errors

use crate::container::ConfigError;
use crate::storage_key::StorageKeyError;
use cv_04_actor_gateway::TransportError;
use thiserror::Error;

/// Failure while bringing the client up.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Invalid configuration.
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    /// Device storage key unusable.
    #[error(transparent)]
    StorageKey(#[from] StorageKeyError),

    /// HTTP client could not be built.
    #[error("transport: {0}")]
    Transport(#[from] TransportError),
}
