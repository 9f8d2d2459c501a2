//! # Client Configuration
//!
//! Unified configuration for every component, with defaults per deployment
//! target and overrides from the environment.
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `CIVITAS_NETWORK` | `local` (default), `ic`/`mainnet`, or `custom` |
//! | `CIVITAS_BACKEND_ID` | Backend id the orchestrator talks to |
//! | `CIVITAS_HOST` | Replica host; required for `custom` |
//! | `CIVITAS_SESSION_FILE` | Persisted session reference; the storage key sits next to it |
//! | `CIVITAS_II_URL` | Internet Identity URL |
//! | `CIVITAS_NFID_URL` | NFID URL |

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use cv_01_wire_codec::MAX_DECIMALS;
use cv_02_identity_providers::ProviderConfig;
use cv_03_session_manager::{Persistence, SessionConfig};
use cv_04_actor_gateway::{EndpointConfig, GatewayConfig};
use cv_05_request_orchestrator::{OrchestratorConfig, RetryPolicy, DEFAULT_TOKEN_DECIMALS};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Network selector.
pub const ENV_NETWORK: &str = "CIVITAS_NETWORK";
/// Backend id override.
pub const ENV_BACKEND_ID: &str = "CIVITAS_BACKEND_ID";
/// Replica host override.
pub const ENV_HOST: &str = "CIVITAS_HOST";
/// Session file override.
pub const ENV_SESSION_FILE: &str = "CIVITAS_SESSION_FILE";
/// Internet Identity URL override.
pub const ENV_II_URL: &str = "CIVITAS_II_URL";
/// NFID URL override.
pub const ENV_NFID_URL: &str = "CIVITAS_NFID_URL";

/// Replica started by the local development toolchain.
pub const LOCAL_HOST: &str = "http://127.0.0.1:4943";
/// Public boundary nodes.
pub const MAINNET_HOST: &str = "https://icp0.io";
/// Internet Identity as deployed on the local replica.
pub const LOCAL_IDENTITY_URL: &str = "http://127.0.0.1:4943/?canisterId=rdmx6-jaaaa-aaaaa-aaadq-cai";
/// Internet Identity on mainnet.
pub const MAINNET_IDENTITY_URL: &str = "https://identity.ic0.app";
/// NFID has a single deployment.
pub const NFID_URL: &str = "https://nfid.one/authenticate";

const SESSION_FILE: &str = ".civitas/session.json";
const STORAGE_KEY_FILE: &str = "storage.key";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `CIVITAS_NETWORK` is not a known target.
    #[error("unknown network '{0}', expected local, ic or custom")]
    UnknownNetwork(String),

    /// No backend id configured.
    #[error("backend id is not configured, set CIVITAS_BACKEND_ID")]
    MissingBackendId,

    /// `custom` target without a host.
    #[error("custom network requires CIVITAS_HOST")]
    MissingHost,

    /// Host is not an http(s) URL.
    #[error("host '{0}' is not an http(s) URL")]
    InvalidHost(String),

    /// Retry policy allows no attempt at all.
    #[error("retry policy needs at least one attempt")]
    NoRetryAttempts,

    /// Token decimals out of range.
    #[error("token decimals {0} exceed the supported maximum")]
    InvalidDecimals(u8),
}

/// Where the client is deployed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentTarget {
    /// Local replica.
    #[default]
    Local,
    /// Public network.
    Mainnet,
    /// Operator-supplied host.
    Custom,
}

impl DeploymentTarget {
    /// Replica host, if the target has a well-known one.
    pub fn default_host(self) -> Option<&'static str> {
        match self {
            Self::Local => Some(LOCAL_HOST),
            Self::Mainnet => Some(MAINNET_HOST),
            Self::Custom => None,
        }
    }

    /// Internet Identity URL for this target.
    pub fn identity_provider_url(self) -> &'static str {
        match self {
            Self::Local => LOCAL_IDENTITY_URL,
            Self::Mainnet | Self::Custom => MAINNET_IDENTITY_URL,
        }
    }

    /// NFID URL for this target.
    pub fn nfid_url(self) -> &'static str {
        NFID_URL
    }
}

impl fmt::Display for DeploymentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Mainnet => write!(f, "ic"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

impl FromStr for DeploymentTarget {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "ic" | "mainnet" => Ok(Self::Mainnet),
            "custom" => Ok(Self::Custom),
            other => Err(ConfigError::UnknownNetwork(other.to_string())),
        }
    }
}

/// Complete client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Deployment target the defaults came from.
    pub target: DeploymentTarget,
    /// Backend endpoint.
    pub endpoint: EndpointConfig,
    /// Identity providers.
    pub provider: ProviderConfig,
    /// Session persistence.
    pub session: SessionConfig,
    /// Actor gateway and HTTP transport.
    pub gateway: GatewayConfig,
    /// Read backoff.
    pub retry: RetryPolicy,
    /// Reward token decimals.
    pub token_decimals: u8,
    /// Device-local key sealing persisted session keys.
    pub storage_key_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_target(DeploymentTarget::default())
    }
}

impl ClientConfig {
    /// Defaults for `target`.
    pub fn for_target(target: DeploymentTarget) -> Self {
        let host = target.default_host().map(str::to_string);
        let provider = ProviderConfig {
            identity_provider_url: target.identity_provider_url().to_string(),
            nfid_url: target.nfid_url().to_string(),
            plug_host: host.clone().unwrap_or_else(|| MAINNET_HOST.to_string()),
            ..ProviderConfig::default()
        };
        let session_file = PathBuf::from(SESSION_FILE);
        Self {
            target,
            endpoint: EndpointConfig {
                backend_id: None,
                host,
            },
            provider,
            storage_key_path: session_file.with_file_name(STORAGE_KEY_FILE),
            session: SessionConfig {
                persistence: Persistence::File(session_file),
                restore_on_start: true,
            },
            gateway: GatewayConfig::default(),
            retry: RetryPolicy::default(),
            token_decimals: DEFAULT_TOKEN_DECIMALS,
        }
    }

    /// In-memory session, local backend, short timeouts.
    pub fn for_testing() -> Self {
        let orchestrator = OrchestratorConfig::for_testing();
        Self {
            target: DeploymentTarget::Local,
            endpoint: orchestrator.endpoint,
            provider: ProviderConfig::for_testing(),
            session: SessionConfig::for_testing(),
            gateway: GatewayConfig::for_testing(),
            retry: orchestrator.retry,
            token_decimals: orchestrator.token_decimals,
            storage_key_path: std::env::temp_dir().join("civitas-test").join(STORAGE_KEY_FILE),
        }
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` for variables. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let target = match var(ENV_NETWORK) {
            Some(network) => network.parse()?,
            None => DeploymentTarget::default(),
        };
        let mut config = Self::for_target(target);

        if let Some(backend_id) = var(ENV_BACKEND_ID) {
            config.provider.plug_whitelist = vec![backend_id.clone()];
            config.endpoint.backend_id = Some(backend_id);
        }
        if let Some(host) = var(ENV_HOST) {
            info!(host = %host, "[runtime] Host overridden from environment");
            config.provider.plug_host = host.clone();
            config.endpoint.host = Some(host);
        }
        if let Some(path) = var(ENV_SESSION_FILE) {
            let path = PathBuf::from(path);
            config.storage_key_path = path.with_file_name(STORAGE_KEY_FILE);
            config.session.persistence = Persistence::File(path);
        }
        if let Some(url) = var(ENV_II_URL) {
            config.provider.identity_provider_url = url;
        }
        if let Some(url) = var(ENV_NFID_URL) {
            config.provider.nfid_url = url;
        }

        if target == DeploymentTarget::Custom && config.endpoint.host.is_none() {
            return Err(ConfigError::MissingHost);
        }
        Ok(config)
    }

    /// Check everything a backend call needs.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - the backend id is missing
    /// - the host is missing or not an http(s) URL
    /// - the retry policy allows no attempt
    /// - token decimals are out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        if blank(&self.endpoint.backend_id) {
            return Err(ConfigError::MissingBackendId);
        }
        match self.endpoint.host.as_deref().map(str::trim) {
            None | Some("") => return Err(ConfigError::MissingHost),
            Some(host) if !(host.starts_with("http://") || host.starts_with("https://")) => {
                return Err(ConfigError::InvalidHost(host.to_string()))
            }
            Some(_) => {}
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::NoRetryAttempts);
        }
        if self.token_decimals > MAX_DECIMALS {
            return Err(ConfigError::InvalidDecimals(self.token_decimals));
        }
        Ok(())
    }

    /// Orchestrator section.
    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            endpoint: self.endpoint.clone(),
            token_decimals: self.token_decimals,
            retry: self.retry,
        }
    }
}
