//! # Client Container
//!
//! Configuration plus the wired component graph.

pub mod config;
pub mod services;

pub use config::{ClientConfig, ConfigError, DeploymentTarget};
pub use services::{ClientContainer, ExternalPorts};
