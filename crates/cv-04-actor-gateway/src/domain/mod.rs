//! Domain layer for the actor gateway.

pub mod endpoint;
pub mod envelope;
pub mod errors;
pub mod stats;

pub use endpoint::*;
pub use envelope::*;
pub use errors::*;
pub use stats::GatewayStats;
pub(crate) use stats::StatsCounters;
