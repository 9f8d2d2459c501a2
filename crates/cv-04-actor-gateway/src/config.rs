//! # Gateway Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long a signed request stays valid after it is built.
pub const DEFAULT_INGRESS_EXPIRY: Duration = Duration::from_secs(4 * 60);

/// Actor gateway settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Added to "now" for `ingress_expiry`.
    pub ingress_expiry: Duration,
    /// Whole-request HTTP timeout.
    pub request_timeout: Duration,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            ingress_expiry: DEFAULT_INGRESS_EXPIRY,
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl GatewayConfig {
    /// Short timeouts.
    pub fn for_testing() -> Self {
        Self {
            ingress_expiry: Duration::from_secs(60),
            request_timeout: Duration::from_secs(2),
            connect_timeout: Duration::from_millis(500),
        }
    }
}
