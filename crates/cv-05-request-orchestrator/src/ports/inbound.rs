//! # Inbound Ports

use crate::domain::{NewPoll, NewProject, NewSurvey, OrchestratorError, Poll, Project, Reward, Survey};
use async_trait::async_trait;
use shared_types::Principal;

/// User-facing operations against the Civitas backend.
///
/// Writes require a live identity and are never retried. Reads run
/// anonymously and retry transient network failures with bounded backoff.
#[async_trait]
pub trait CivitasApi: Send + Sync {
    /// Create a project owned by the caller. Returns its id.
    async fn create_project(&self, input: &NewProject) -> Result<String, OrchestratorError>;

    /// Create a poll on a project the caller owns. Returns its id.
    async fn create_poll(&self, input: &NewPoll) -> Result<String, OrchestratorError>;

    /// Create a survey on a project the caller owns. Returns its id.
    async fn create_survey(&self, input: &NewSurvey) -> Result<String, OrchestratorError>;

    /// Vote once on a poll. Returns the updated tallies.
    async fn vote(&self, poll_id: &str, option_index: u32) -> Result<Vec<u64>, OrchestratorError>;

    /// Claim one of the caller's rewards. Returns the claimed amount.
    async fn claim_reward(&self, reward_id: &str) -> Result<String, OrchestratorError>;

    /// All projects.
    async fn list_projects(&self) -> Result<Vec<Project>, OrchestratorError>;

    /// One project.
    async fn get_project(&self, id: &str) -> Result<Option<Project>, OrchestratorError>;

    /// Polls, optionally for one project.
    async fn list_polls(&self, project_id: Option<&str>) -> Result<Vec<Poll>, OrchestratorError>;

    /// One poll.
    async fn get_poll(&self, id: &str) -> Result<Option<Poll>, OrchestratorError>;

    /// Surveys, optionally for one project.
    async fn list_surveys(&self, project_id: Option<&str>)
        -> Result<Vec<Survey>, OrchestratorError>;

    /// Rewards credited to `owner`.
    async fn list_rewards(&self, owner: &Principal) -> Result<Vec<Reward>, OrchestratorError>;
}
