//! # Request Orchestrator (CV-05)
//!
//! One fixed pipeline per user-facing operation.
//!
//! ## Operations
//!
//! | Operation | Kind | Backend method | Result |
//! |-----------|------|----------------|--------|
//! | `create_project` | write | `create_project` | project id |
//! | `create_poll` | write | `create_poll` | poll id |
//! | `create_survey` | write | `create_survey` | survey id |
//! | `vote` | write | `vote` | updated tallies |
//! | `claim_reward` | write | `claim_reward` | claimed amount |
//! | `list_projects` / `get_project` | read | same | records |
//! | `list_polls` / `get_poll` | read | same | records |
//! | `list_surveys` | read | same | records |
//! | `list_rewards` | read | same | records |
//!
//! Writes need a live identity and are never retried. Reads go through the
//! anonymous handle with bounded exponential backoff on network failures.
//!
//! ## Module Structure
//!
//! ```text
//! cv-05-request-orchestrator/
//! ├── domain/      # inputs, read models, reply decoding, RetryPolicy, OrchestratorError
//! ├── ports/       # CivitasApi (inbound)
//! ├── adapters/    # LocalReplica (in-process backend)
//! ├── service.rs   # RequestOrchestrator
//! └── config.rs    # OrchestratorConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::LocalReplica;
pub use config::{OrchestratorConfig, DEFAULT_TOKEN_DECIMALS};
pub use domain::{
    ClaimArgs, NewPoll, NewProject, NewSurvey, OrchestratorError, Poll, PollArgs, Project,
    ProjectArgs, QuestionKind, RetryPolicy, Reward, Survey, SurveyArgs, SurveyQuestion, VoteArgs,
};
pub use ports::CivitasApi;
pub use service::RequestOrchestrator;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
