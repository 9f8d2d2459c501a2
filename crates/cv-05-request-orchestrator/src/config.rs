//! # Orchestrator Configuration

use crate::domain::RetryPolicy;
use cv_04_actor_gateway::EndpointConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Decimals of the reward token.
pub const DEFAULT_TOKEN_DECIMALS: u8 = 8;

/// Orchestrator settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Backend endpoint; resolved per call.
    pub endpoint: EndpointConfig,
    /// Reward token decimals.
    pub token_decimals: u8,
    /// Backoff for reads.
    pub retry: RetryPolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            token_decimals: DEFAULT_TOKEN_DECIMALS,
            retry: RetryPolicy::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Local endpoint and millisecond backoff.
    pub fn for_testing() -> Self {
        Self {
            endpoint: EndpointConfig::new("civitas-backend", "http://127.0.0.1:4943"),
            token_decimals: DEFAULT_TOKEN_DECIMALS,
            retry: RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
            },
        }
    }
}
