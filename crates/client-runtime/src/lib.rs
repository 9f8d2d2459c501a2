//! # Civitas Client Runtime
//!
//! Composition root for the Civitas client. The `civitas` binary in
//! `main.rs` is a thin command layer over [`ClientContainer`].
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging ([`telemetry::init_logging`])
//! 2. Load configuration from the environment ([`ClientConfig::from_env`])
//! 3. Load or create the device storage key
//! 4. Wire components ([`ClientContainer::new`])
//! 5. Restore the persisted session ([`ClientContainer::start`])
//!
//! ## Module Structure
//!
//! ```text
//! client-runtime/
//! ├── container/     # ClientConfig, DeploymentTarget, ClientContainer
//! ├── adapters/      # Headless identity service and extension host
//! ├── storage_key.rs # Device key file
//! ├── telemetry.rs   # tracing-subscriber setup
//! └── error.rs       # RuntimeError
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod container;
pub mod error;
pub mod storage_key;
pub mod telemetry;

// Re-exports
pub use adapters::{HeadlessIdentityService, NoExtensionHost};
pub use container::{ClientConfig, ClientContainer, ConfigError, DeploymentTarget, ExternalPorts};
pub use error::RuntimeError;
pub use telemetry::{init_logging, LogSettings, TelemetryError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
