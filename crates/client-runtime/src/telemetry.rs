//! # Logging Setup
//!
//! `tracing-subscriber` with an `EnvFilter` and either human-readable or JSON
//! output. Logs go to stderr so command output on stdout stays clean.

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive variable.
pub const ENV_LOG: &str = "CIVITAS_LOG";
/// JSON output switch.
pub const ENV_JSON_LOGS: &str = "CIVITAS_JSON_LOGS";

const DEFAULT_FILTER: &str = "info";

/// Logging initialization errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Filter directives did not parse.
    #[error("invalid log filter '{filter}': {reason}")]
    Filter {
        /// Offending directives
        filter: String,
        /// Parser message
        reason: String,
    },

    /// A global subscriber was already installed.
    #[error("failed to install subscriber: {0}")]
    Install(String),
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// `EnvFilter` directives.
    pub filter: String,
    /// Emit JSON lines.
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            json: false,
        }
    }
}

impl LogSettings {
    /// Read `CIVITAS_LOG` (falling back to `RUST_LOG`) and `CIVITAS_JSON_LOGS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`LogSettings::from_env`] with an explicit lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let filter = set(ENV_LOG)
            .or_else(|| set(EnvFilter::DEFAULT_ENV))
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());
        let json = set(ENV_JSON_LOGS)
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(false);
        Self { filter, json }
    }
}

/// Install the global subscriber.
pub fn init_logging(settings: &LogSettings) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(&settings.filter).map_err(|e| TelemetryError::Filter {
        filter: settings.filter.clone(),
        reason: e.to_string(),
    })?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if settings.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()
    };
    installed.map_err(|e| TelemetryError::Install(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(vars: &[(&str, &str)]) -> LogSettings {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LogSettings::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
    }

    #[test]
    fn test_default_is_info_text() {
        assert_eq!(settings(&[]), LogSettings::default());
    }

    #[test]
    fn test_civitas_log_wins_over_rust_log() {
        let s = settings(&[("RUST_LOG", "warn"), (ENV_LOG, "cv_03_session_manager=debug")]);
        assert_eq!(s.filter, "cv_03_session_manager=debug");
        assert_eq!(settings(&[("RUST_LOG", "warn")]).filter, "warn");
    }

    #[test]
    fn test_json_switch() {
        assert!(settings(&[(ENV_JSON_LOGS, "1")]).json);
        assert!(settings(&[(ENV_JSON_LOGS, "true")]).json);
        assert!(!settings(&[(ENV_JSON_LOGS, "false")]).json);
        assert!(!settings(&[(ENV_JSON_LOGS, "")]).json);
    }

    #[test]
    fn test_bad_filter_rejected() {
        let bad = LogSettings {
            filter: "cv_03=notalevel".to_string(),
            json: false,
        };
        assert!(matches!(init_logging(&bad), Err(TelemetryError::Filter { .. })));
    }
}
