//! # Request Orchestrator Service
//!
//! ## Write pipeline
//!
//! ```text
//! validate ─▶ resolve endpoint ─▶ require identity ─▶ get_actor ─▶ encode ─▶ call ─▶ decode
//! ```
//!
//! Validation and configuration failures never reach the network. Writes
//! are submitted exactly once; a failed or abandoned write is not retried.
//!
//! ## Read pipeline
//!
//! Reads always use the anonymous handle, whether or not a session is live,
//! and retry `Network` failures under the configured [`RetryPolicy`].
//!
//! [`RetryPolicy`]: crate::domain::RetryPolicy

use crate::config::OrchestratorConfig;
use crate::domain::{
    decode_list, decode_result, decode_tallies, parse_id, ClaimArgs, NewPoll, NewProject,
    NewSurvey, OrchestratorError, Poll, Project, Reward, Survey, VoteArgs,
};
use crate::ports::CivitasApi;
use async_trait::async_trait;
use cv_01_wire_codec::{
    decode_amount, decode_identifier, decode_optional_with, encode_optional, CodecError,
    WireValue,
};
use cv_03_session_manager::IdentitySessionApi;
use cv_04_actor_gateway::{ActorGatewayApi, Endpoint, GatewayError};
use shared_types::{Clock, Principal};
use std::sync::Arc;
use tracing::{info, warn};

/// Orchestrates writes and reads against the backend.
pub struct RequestOrchestrator {
    session: Arc<dyn IdentitySessionApi>,
    gateway: Arc<dyn ActorGatewayApi>,
    clock: Arc<dyn Clock>,
    config: OrchestratorConfig,
}

impl RequestOrchestrator {
    /// Create the orchestrator.
    pub fn new(
        session: Arc<dyn IdentitySessionApi>,
        gateway: Arc<dyn ActorGatewayApi>,
        clock: Arc<dyn Clock>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            session,
            gateway,
            clock,
            config,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    fn decimals(&self) -> u8 {
        self.config.token_decimals
    }

    /// Submit an update. `encode` runs only once identity and actor are in hand.
    async fn submit<F>(&self, method: &'static str, encode: F) -> Result<WireValue, OrchestratorError>
    where
        F: FnOnce() -> WireValue + Send,
    {
        let endpoint = self.config.endpoint.resolve()?;
        let credential = self.session.require_identity()?;
        let actor = self.gateway.get_actor(&endpoint, Some(&credential)).await?;

        let reply = actor.call(method, encode()).await.map_err(|e| {
            warn!(method, principal = %credential.principal, error = %e, "[cv-05] Update failed");
            e
        })?;
        Ok(reply)
    }

    async fn query_once(
        &self,
        endpoint: &Endpoint,
        method: &'static str,
        arg: WireValue,
    ) -> Result<WireValue, GatewayError> {
        let actor = self.gateway.get_actor(endpoint, None).await?;
        actor.query(method, arg).await
    }

    /// Run a query with backoff and decode the reply.
    async fn read<T, F>(
        &self,
        method: &'static str,
        arg: WireValue,
        decode: F,
    ) -> Result<T, OrchestratorError>
    where
        T: Send,
        F: Fn(&WireValue) -> Result<T, CodecError> + Send,
    {
        let endpoint = self.config.endpoint.resolve()?;
        let policy = self.config.retry;
        let mut attempt = 1;
        loop {
            match self.query_once(&endpoint, method, arg.clone()).await {
                Ok(reply) => return Ok(decode(&reply)?),
                Err(e) if e.is_transient() && policy.should_retry(attempt) => {
                    let delay = policy.delay_for(attempt);
                    warn!(
                        method,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "[cv-05] Read failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn project_filter(project_id: Option<&str>) -> Result<WireValue, OrchestratorError> {
        Ok(encode_optional(
            project_id
                .map(|id| parse_id("project_id", id))
                .transpose()?
                .map(WireValue::Nat),
        ))
    }
}

#[async_trait]
impl CivitasApi for RequestOrchestrator {
    async fn create_project(&self, input: &NewProject) -> Result<String, OrchestratorError> {
        let args = input.validate(self.decimals(), self.clock.now())?;
        let reply = self.submit("create_project", || args.to_wire()).await?;
        let id = decode_identifier(decode_result("create_project", &reply)?)?;
        info!(project_id = %id, "[cv-05] Project created");
        Ok(id)
    }

    async fn create_poll(&self, input: &NewPoll) -> Result<String, OrchestratorError> {
        let args = input.validate(self.decimals(), self.clock.now())?;
        let reply = self.submit("create_poll", || args.to_wire()).await?;
        let id = decode_identifier(decode_result("create_poll", &reply)?)?;
        info!(poll_id = %id, "[cv-05] Poll created");
        Ok(id)
    }

    async fn create_survey(&self, input: &NewSurvey) -> Result<String, OrchestratorError> {
        let args = input.validate(self.decimals(), self.clock.now())?;
        let reply = self.submit("create_survey", || args.to_wire()).await?;
        let id = decode_identifier(decode_result("create_survey", &reply)?)?;
        info!(survey_id = %id, "[cv-05] Survey created");
        Ok(id)
    }

    async fn vote(&self, poll_id: &str, option_index: u32) -> Result<Vec<u64>, OrchestratorError> {
        let args = VoteArgs::parse(poll_id, option_index)?;
        let reply = self.submit("vote", || args.to_wire()).await?;
        Ok(decode_tallies(decode_result("vote", &reply)?)?)
    }

    async fn claim_reward(&self, reward_id: &str) -> Result<String, OrchestratorError> {
        let args = ClaimArgs::parse(reward_id)?;
        let reply = self.submit("claim_reward", || args.to_wire()).await?;
        let amount = decode_amount(decode_result("claim_reward", &reply)?, self.decimals())?;
        info!(reward_id, amount = %amount, "[cv-05] Reward claimed");
        Ok(amount)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, OrchestratorError> {
        let d = self.decimals();
        self.read("list_projects", WireValue::Null, |v| {
            decode_list(v, |p| Project::from_wire(p, d))
        })
        .await
    }

    async fn get_project(&self, id: &str) -> Result<Option<Project>, OrchestratorError> {
        let arg = WireValue::Nat(parse_id("id", id)?);
        let d = self.decimals();
        self.read("get_project", arg, |v| {
            decode_optional_with(v, |p| Project::from_wire(p, d))
        })
        .await
    }

    async fn list_polls(&self, project_id: Option<&str>) -> Result<Vec<Poll>, OrchestratorError> {
        let arg = Self::project_filter(project_id)?;
        let d = self.decimals();
        self.read("list_polls", arg, |v| decode_list(v, |p| Poll::from_wire(p, d)))
            .await
    }

    async fn get_poll(&self, id: &str) -> Result<Option<Poll>, OrchestratorError> {
        let arg = WireValue::Nat(parse_id("id", id)?);
        let d = self.decimals();
        self.read("get_poll", arg, |v| {
            decode_optional_with(v, |p| Poll::from_wire(p, d))
        })
        .await
    }

    async fn list_surveys(
        &self,
        project_id: Option<&str>,
    ) -> Result<Vec<Survey>, OrchestratorError> {
        let arg = Self::project_filter(project_id)?;
        let d = self.decimals();
        self.read("list_surveys", arg, |v| {
            decode_list(v, |s| Survey::from_wire(s, d))
        })
        .await
    }

    async fn list_rewards(&self, owner: &Principal) -> Result<Vec<Reward>, OrchestratorError> {
        let d = self.decimals();
        self.read("list_rewards", WireValue::text(owner.to_text()), |v| {
            decode_list(v, |r| Reward::from_wire(r, d))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LocalReplica;
    use crate::domain::{QuestionKind, SurveyQuestion};
    use cv_02_identity_providers::{InternetIdentityAdapter, MockIdentityService, ProviderConfig};
    use cv_03_session_manager::{IdentitySessionManager, MemorySessionStore};
    use cv_04_actor_gateway::{
        ActorGateway, EndpointConfig, GatewayConfig, MockTransport, TransportError,
    };
    use shared_crypto::SecretKey;
    use shared_types::{ErrorKind, ManualClock, ProviderKind, Timestamp};
    use std::time::Duration;

    const HOUR: Duration = Duration::from_secs(3600);

    struct Harness {
        clock: Arc<ManualClock>,
        session: Arc<IdentitySessionManager>,
        replica: Arc<LocalReplica>,
        gateway: Arc<ActorGateway>,
        orchestrator: RequestOrchestrator,
    }

    fn harness() -> Harness {
        harness_with(OrchestratorConfig::for_testing())
    }

    fn harness_with(config: OrchestratorConfig) -> Harness {
        let clock = Arc::new(ManualClock::new(Timestamp::from_millis(1_700_000_000_000)));
        let identity_service = Arc::new(MockIdentityService::new(clock.clone()));
        let adapter = InternetIdentityAdapter::new(
            &ProviderConfig::for_testing(),
            identity_service,
            clock.clone(),
            SecretKey::generate(),
        );
        let session = Arc::new(
            IdentitySessionManager::new(Arc::new(MemorySessionStore::new()), clock.clone())
                .with_provider(Arc::new(adapter)),
        );
        let replica = Arc::new(LocalReplica::new("civitas-backend", clock.clone()));
        let gateway = Arc::new(ActorGateway::new(
            replica.clone(),
            clock.clone(),
            GatewayConfig::for_testing(),
        ));
        session.register_listener(gateway.clone());
        let orchestrator =
            RequestOrchestrator::new(session.clone(), gateway.clone(), clock.clone(), config);
        Harness {
            clock,
            session,
            replica,
            gateway,
            orchestrator,
        }
    }

    fn project() -> NewProject {
        NewProject {
            name: "Community garden".into(),
            description: "Raised beds on Elm St".into(),
            funding_goal: Some("1500".into()),
            ..NewProject::default()
        }
    }

    fn poll(project_id: &str) -> NewPoll {
        NewPoll {
            project_id: project_id.into(),
            title: "Which vegetables?".into(),
            description: String::new(),
            options: vec!["Tomatoes".into(), "Beans".into()],
            closes_at: "2023-12-01T00:00:00.000Z".into(),
            reward_per_vote: Some("0.25".into()),
        }
    }

    #[tokio::test]
    async fn test_write_requires_identity() {
        let h = harness();
        let err = h.orchestrator.create_project(&project()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthRequired);
        assert_eq!(h.replica.call_count(), 0);
    }

    #[tokio::test]
    async fn test_expired_session_issues_no_remote_call() {
        let h = harness();
        h.session.login(ProviderKind::InternetIdentity).await.unwrap();
        h.clock.advance(HOUR * 9);

        let err = h.orchestrator.vote("1", 0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthExpired);
        assert_eq!(h.replica.call_count(), 0);
        assert_eq!(h.gateway.stats().constructions, 0);
    }

    #[tokio::test]
    async fn test_validation_precedes_everything() {
        let h = harness();
        let mut bad = project();
        bad.name = "  ".into();
        let err = h.orchestrator.create_project(&bad).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(h.gateway.stats().constructions, 0);
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_configuration_error() {
        let mut config = OrchestratorConfig::for_testing();
        config.endpoint = EndpointConfig {
            backend_id: None,
            host: Some("http://127.0.0.1:4943".into()),
        };
        let h = harness_with(config);
        h.session.login(ProviderKind::InternetIdentity).await.unwrap();

        let err = h.orchestrator.create_project(&project()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        let err = h.orchestrator.list_projects().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(h.replica.call_count() + h.replica.query_count(), 0);
    }

    #[tokio::test]
    async fn test_project_poll_vote_claim_flow() {
        let h = harness();
        let principal = h.session.login(ProviderKind::InternetIdentity).await.unwrap();

        let project_id = h.orchestrator.create_project(&project()).await.unwrap();
        let poll_id = h.orchestrator.create_poll(&poll(&project_id)).await.unwrap();
        assert_eq!(h.orchestrator.vote(&poll_id, 1).await.unwrap(), vec![0, 1]);

        let rewards = h.orchestrator.list_rewards(&principal).await.unwrap();
        assert_eq!(rewards.len(), 1);
        assert_eq!(rewards[0].amount, "0.25");
        assert!(!rewards[0].claimed);

        assert_eq!(
            h.orchestrator.claim_reward(&rewards[0].id).await.unwrap(),
            "0.25"
        );
        let again = h.orchestrator.claim_reward(&rewards[0].id).await.unwrap_err();
        assert_eq!(again.kind(), ErrorKind::RemoteCall);

        let fetched = h.orchestrator.get_project(&project_id).await.unwrap().unwrap();
        assert_eq!(fetched.owner, principal);
        assert_eq!(fetched.funding_goal.as_deref(), Some("1500"));
    }

    #[tokio::test]
    async fn test_backend_rule_violation_is_remote_error() {
        let h = harness();
        h.session.login(ProviderKind::InternetIdentity).await.unwrap();
        let project_id = h.orchestrator.create_project(&project()).await.unwrap();
        let poll_id = h.orchestrator.create_poll(&poll(&project_id)).await.unwrap();
        h.orchestrator.vote(&poll_id, 0).await.unwrap();

        let err = h.orchestrator.vote(&poll_id, 0).await.unwrap_err();
        assert_eq!(
            err,
            OrchestratorError::Remote {
                method: "vote",
                message: "already voted on this poll".into()
            }
        );
    }

    #[tokio::test]
    async fn test_survey_round_trip() {
        let h = harness();
        h.session.login(ProviderKind::InternetIdentity).await.unwrap();
        let project_id = h.orchestrator.create_project(&project()).await.unwrap();
        let survey = NewSurvey {
            project_id: project_id.clone(),
            title: "Season review".into(),
            questions: vec![SurveyQuestion {
                prompt: "Favourite bed?".into(),
                kind: QuestionKind::SingleChoice(vec!["North".into(), "South".into()]),
            }],
            closes_at: None,
            reward_pool: None,
        };
        h.orchestrator.create_survey(&survey).await.unwrap();

        let listed = h.orchestrator.list_surveys(Some(&project_id)).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].questions, survey.questions);
        assert!(h.orchestrator.list_surveys(Some("999")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reads_are_anonymous_and_retry_network_failures() {
        let h = harness();
        h.session.login(ProviderKind::InternetIdentity).await.unwrap();
        h.orchestrator.create_project(&project()).await.unwrap();

        h.replica.fail_next_queries(2);
        let projects = h.orchestrator.list_projects().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(h.replica.query_count(), 3);

        h.replica.fail_next_queries(3);
        let err = h.orchestrator.list_projects().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(h.replica.query_count(), 6);
    }

    #[tokio::test]
    async fn test_writes_are_never_retried() {
        let h = harness();
        h.session.login(ProviderKind::InternetIdentity).await.unwrap();

        let transport = Arc::new(MockTransport::new());
        transport.push_reply(
            "create_project",
            Err(TransportError::Network("reset".into())),
        );
        let gateway = Arc::new(ActorGateway::new(
            transport.clone(),
            h.clock.clone(),
            GatewayConfig::for_testing(),
        ));
        let orchestrator = RequestOrchestrator::new(
            h.session.clone(),
            gateway,
            h.clock.clone(),
            OrchestratorConfig::for_testing(),
        );

        let err = orchestrator.create_project(&project()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_logout_evicts_signed_handle() {
        let h = harness();
        h.session.login(ProviderKind::InternetIdentity).await.unwrap();
        h.orchestrator.create_project(&project()).await.unwrap();
        h.orchestrator.list_projects().await.unwrap();
        assert_eq!(h.gateway.cached(), 2);

        h.session.logout().await;
        assert_eq!(h.gateway.cached(), 1);
        assert_eq!(
            h.orchestrator.create_project(&project()).await.unwrap_err().kind(),
            ErrorKind::AuthRequired
        );
    }
}
