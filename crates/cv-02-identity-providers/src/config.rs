//! # Provider Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Internet Identity production URL.
pub const INTERNET_IDENTITY_URL: &str = "https://identity.ic0.app";

/// NFID production URL.
pub const NFID_URL: &str = "https://nfid.one/authenticate";

/// Maximum delegation lifetime requested from Internet Identity (8 hours).
pub const II_MAX_TIME_TO_LIVE: Duration = Duration::from_secs(8 * 60 * 60);

/// Maximum delegation lifetime requested from NFID (7 days).
pub const NFID_MAX_TIME_TO_LIVE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Lifetime of a Plug session (24 hours).
pub const PLUG_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// How long an interactive flow may stay open before it counts as abandoned.
pub const INTERACTIVE_FLOW_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Identity provider settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Internet Identity URL.
    pub identity_provider_url: String,
    /// NFID URL.
    pub nfid_url: String,
    /// Application name shown on the NFID consent screen.
    pub application_name: String,
    /// Internet Identity delegation lifetime.
    pub ii_max_time_to_live: Duration,
    /// NFID delegation lifetime.
    pub nfid_max_time_to_live: Duration,
    /// Plug session lifetime.
    pub plug_session_ttl: Duration,
    /// Interactive flow timeout.
    pub flow_timeout: Duration,
    /// Backend ids Plug is asked to whitelist.
    pub plug_whitelist: Vec<String>,
    /// Backend host Plug should talk to.
    pub plug_host: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            identity_provider_url: INTERNET_IDENTITY_URL.to_string(),
            nfid_url: NFID_URL.to_string(),
            application_name: "Civitas".to_string(),
            ii_max_time_to_live: II_MAX_TIME_TO_LIVE,
            nfid_max_time_to_live: NFID_MAX_TIME_TO_LIVE,
            plug_session_ttl: PLUG_SESSION_TTL,
            flow_timeout: INTERACTIVE_FLOW_TIMEOUT,
            plug_whitelist: Vec::new(),
            plug_host: "https://icp0.io".to_string(),
        }
    }
}

impl ProviderConfig {
    /// Short flow timeout so abandoned-flow tests finish quickly.
    pub fn for_testing() -> Self {
        Self {
            identity_provider_url: "http://localhost:4943/?canisterId=identity".to_string(),
            nfid_url: "http://localhost:9090/authenticate".to_string(),
            flow_timeout: Duration::from_millis(50),
            plug_host: "http://localhost:4943".to_string(),
            ..Self::default()
        }
    }
}
