//! Domain layer for the request orchestrator.

pub mod errors;
pub mod inputs;
pub mod records;
pub mod reply;
pub mod retry;

pub use errors::OrchestratorError;
pub use inputs::*;
pub use records::*;
pub use reply::decode_result;
pub use retry::RetryPolicy;
