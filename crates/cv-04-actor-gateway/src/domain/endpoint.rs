//! # Endpoints
//!
//! Backend id and host are consumed as opaque configuration. Both are
//! checked at call time, not at startup, so a client with no backend
//! configured still boots and fails only the operations that need one.

use crate::domain::errors::GatewayError;
use serde::{Deserialize, Serialize};
use shared_types::Principal;
use std::fmt;

/// Possibly-incomplete endpoint settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Backend identifier.
    pub backend_id: Option<String>,
    /// Host URL.
    pub host: Option<String>,
}

impl EndpointConfig {
    /// Both values set.
    pub fn new(backend_id: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            backend_id: Some(backend_id.into()),
            host: Some(host.into()),
        }
    }

    /// Resolve into a usable endpoint.
    ///
    /// # Errors
    /// `GatewayError::Configuration` if either value is absent or blank.
    pub fn resolve(&self) -> Result<Endpoint, GatewayError> {
        let backend_id = non_blank(&self.backend_id)
            .ok_or_else(|| GatewayError::Configuration("backend id is not configured".into()))?;
        let host = non_blank(&self.host)
            .ok_or_else(|| GatewayError::Configuration("backend host is not configured".into()))?;
        Ok(Endpoint {
            backend_id: backend_id.to_string(),
            host: host.trim_end_matches('/').to_string(),
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Resolved endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Backend identifier.
    pub backend_id: String,
    /// Host URL without trailing slash.
    pub host: String,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.backend_id, self.host)
    }
}

/// Cache key: endpoint plus caller identity (`None` = anonymous).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ActorKey {
    /// Target.
    pub endpoint: Endpoint,
    /// Caller.
    pub principal: Option<Principal>,
}

impl ActorKey {
    /// Key for an anonymous handle.
    pub fn anonymous(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            principal: None,
        }
    }

    /// Whether this is an anonymous key.
    pub fn is_anonymous(&self) -> bool {
        self.principal.is_none()
    }
}
