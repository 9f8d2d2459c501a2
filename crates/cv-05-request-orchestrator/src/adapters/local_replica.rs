//! # Local Replica
//!
//! In-process backend speaking the Civitas schema over [`AgentTransport`].
//! Every envelope is authenticated the way a real replica would: the caller
//! principal comes from the verified sender key, never from the request body.
//!
//! ## Permission rules
//!
//! - anonymous callers cannot write
//! - only a project's owner attaches polls and surveys to it
//! - one vote per principal per poll, before `closes_at`
//! - a vote on a rewarding poll credits a reward to the voter
//! - only a reward's owner claims it, once
//!
//! Rule violations are `Err` replies. Malformed envelopes and arguments are
//! transport-level rejections.

use crate::domain::reply::{err, ok};
use async_trait::async_trait;
use cv_01_wire_codec::{
    decode_optional_with, encode_optional, identifier_to_u64, CodecError, RecordBuilder,
    RecordView, WireValue, U256,
};
use cv_04_actor_gateway::{
    AgentTransport, Endpoint, Envelope, RequestType, TransportError, TransportStatus,
};
use parking_lot::Mutex;
use shared_types::{Clock, Principal};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Reject code: no such backend or method.
pub const REJECT_DESTINATION_INVALID: u32 = 3;
/// Reject code: envelope refused.
pub const REJECT_UNAUTHORIZED: u32 = 4;
/// Reject code: argument does not match the schema.
pub const REJECT_BAD_ARGUMENT: u32 = 5;

fn reject(code: u32, message: impl Into<String>) -> TransportError {
    TransportError::Rejected {
        code,
        message: message.into(),
    }
}

fn nat(id: u64) -> WireValue {
    WireValue::Nat(U256::from(id))
}

fn opt_text(value: &Option<String>) -> WireValue {
    encode_optional(value.as_deref().map(WireValue::text))
}

fn opt_nat(value: Option<U256>) -> WireValue {
    encode_optional(value.map(WireValue::Nat))
}

fn opt_nat64(value: Option<u64>) -> WireValue {
    encode_optional(value.map(WireValue::Nat64))
}

#[derive(Clone, Debug)]
struct StoredProject {
    id: u64,
    owner: Principal,
    name: String,
    description: String,
    category: Option<String>,
    website: Option<String>,
    funding_goal: Option<U256>,
    deadline: Option<u64>,
    created_at: u64,
}

impl StoredProject {
    fn to_wire(&self) -> WireValue {
        RecordBuilder::new()
            .field("id", nat(self.id))
            .field("owner", WireValue::text(self.owner.to_text()))
            .field("name", WireValue::text(&self.name))
            .field("description", WireValue::text(&self.description))
            .field("category", opt_text(&self.category))
            .field("website", opt_text(&self.website))
            .field("funding_goal", opt_nat(self.funding_goal))
            .field("deadline", opt_nat64(self.deadline))
            .field("created_at", WireValue::Nat64(self.created_at))
            .build()
    }
}

#[derive(Clone, Debug)]
struct StoredPoll {
    id: u64,
    project_id: u64,
    creator: Principal,
    title: String,
    description: String,
    options: Vec<String>,
    tallies: Vec<u64>,
    closes_at: u64,
    reward_per_vote: Option<U256>,
    created_at: u64,
}

impl StoredPoll {
    fn tallies_wire(&self) -> WireValue {
        WireValue::Vec(self.tallies.iter().copied().map(WireValue::Nat64).collect())
    }

    fn to_wire(&self) -> WireValue {
        RecordBuilder::new()
            .field("id", nat(self.id))
            .field("project_id", nat(self.project_id))
            .field("creator", WireValue::text(self.creator.to_text()))
            .field("title", WireValue::text(&self.title))
            .field("description", WireValue::text(&self.description))
            .field(
                "options",
                WireValue::Vec(self.options.iter().map(WireValue::text).collect()),
            )
            .field("tallies", self.tallies_wire())
            .field("closes_at", WireValue::Nat64(self.closes_at))
            .field("reward_per_vote", opt_nat(self.reward_per_vote))
            .field("created_at", WireValue::Nat64(self.created_at))
            .build()
    }
}

#[derive(Clone, Debug)]
struct StoredSurvey {
    id: u64,
    project_id: u64,
    creator: Principal,
    title: String,
    /// Question records, stored as received.
    questions: Vec<WireValue>,
    closes_at: Option<u64>,
    reward_pool: Option<U256>,
    created_at: u64,
}

impl StoredSurvey {
    fn to_wire(&self) -> WireValue {
        RecordBuilder::new()
            .field("id", nat(self.id))
            .field("project_id", nat(self.project_id))
            .field("creator", WireValue::text(self.creator.to_text()))
            .field("title", WireValue::text(&self.title))
            .field("questions", WireValue::Vec(self.questions.clone()))
            .field("closes_at", opt_nat64(self.closes_at))
            .field("reward_pool", opt_nat(self.reward_pool))
            .field("created_at", WireValue::Nat64(self.created_at))
            .build()
    }
}

#[derive(Clone, Debug)]
struct StoredReward {
    id: u64,
    owner: Principal,
    poll_id: u64,
    amount: U256,
    claimed: bool,
    created_at: u64,
}

impl StoredReward {
    fn to_wire(&self) -> WireValue {
        RecordBuilder::new()
            .field("id", nat(self.id))
            .field("owner", WireValue::text(self.owner.to_text()))
            .field("poll_id", nat(self.poll_id))
            .field("amount", WireValue::Nat(self.amount))
            .field("claimed", WireValue::Bool(self.claimed))
            .field("created_at", WireValue::Nat64(self.created_at))
            .build()
    }
}

#[derive(Debug, Default)]
struct ReplicaState {
    next_id: u64,
    projects: BTreeMap<u64, StoredProject>,
    polls: BTreeMap<u64, StoredPoll>,
    surveys: BTreeMap<u64, StoredSurvey>,
    rewards: BTreeMap<u64, StoredReward>,
    ballots: HashSet<(u64, Principal)>,
}

impl ReplicaState {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

fn opt_u64(view: &RecordView<'_>, field: &str) -> Result<Option<u64>, CodecError> {
    decode_optional_with(view.field(field)?, WireValue::as_nat64)
}

fn opt_nat_arg(view: &RecordView<'_>, field: &str) -> Result<Option<U256>, CodecError> {
    decode_optional_with(view.field(field)?, WireValue::as_nat)
}

fn opt_text_arg(view: &RecordView<'_>, field: &str) -> Result<Option<String>, CodecError> {
    decode_optional_with(view.field(field)?, |v| v.as_text().map(str::to_string))
}

/// In-process Civitas backend.
pub struct LocalReplica {
    backend_id: String,
    clock: Arc<dyn Clock>,
    state: Mutex<ReplicaState>,
    calls: AtomicUsize,
    queries: AtomicUsize,
    failing_queries: AtomicUsize,
    offline: Mutex<bool>,
}

impl LocalReplica {
    /// Replica serving `backend_id`.
    pub fn new(backend_id: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend_id: backend_id.into(),
            clock,
            state: Mutex::new(ReplicaState::default()),
            calls: AtomicUsize::new(0),
            queries: AtomicUsize::new(0),
            failing_queries: AtomicUsize::new(0),
            offline: Mutex::new(false),
        }
    }

    /// Update calls received (including rejected ones).
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Queries received (including failed ones).
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Fail the next `count` queries with a network error.
    pub fn fail_next_queries(&self, count: usize) {
        self.failing_queries.store(count, Ordering::SeqCst);
    }

    /// Fail every request with a network error.
    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock() = offline;
    }

    /// Close a poll immediately.
    pub fn close_poll(&self, poll_id: u64) {
        let now = self.clock.now().as_nanos();
        if let Some(poll) = self.state.lock().polls.get_mut(&poll_id) {
            poll.closes_at = now;
        }
    }

    fn admit(
        &self,
        endpoint: &Endpoint,
        envelope: &Envelope,
        expected: RequestType,
    ) -> Result<Principal, TransportError> {
        if *self.offline.lock() {
            return Err(TransportError::Network("replica offline".into()));
        }
        if endpoint.backend_id != self.backend_id || envelope.content.backend_id != self.backend_id
        {
            return Err(reject(
                REJECT_DESTINATION_INVALID,
                format!("backend {} not found", envelope.content.backend_id),
            ));
        }
        if envelope.content.request_type != expected {
            return Err(reject(REJECT_UNAUTHORIZED, "wrong request type for route"));
        }
        envelope
            .authenticate(self.clock.now())
            .map_err(|e| reject(REJECT_UNAUTHORIZED, e.to_string()))
    }

    fn update(
        &self,
        caller: &Principal,
        method: &str,
        arg: &WireValue,
    ) -> Result<WireValue, TransportError> {
        let now = self.clock.now().as_nanos();
        let mut state = self.state.lock();
        let reply = match method {
            "create_project" => create_project(&mut state, caller, arg, now),
            "create_poll" => create_poll(&mut state, caller, arg, now),
            "create_survey" => create_survey(&mut state, caller, arg, now),
            "vote" => vote(&mut state, caller, arg, now),
            "claim_reward" => claim_reward(&mut state, caller, arg),
            other => {
                return Err(reject(
                    REJECT_DESTINATION_INVALID,
                    format!("no update method {other}"),
                ))
            }
        };
        reply.map_err(|e| reject(REJECT_BAD_ARGUMENT, e.to_string()))
    }

    fn read(&self, method: &str, arg: &WireValue) -> Result<WireValue, TransportError> {
        let state = self.state.lock();
        let reply = match method {
            "list_projects" => Ok(WireValue::Vec(
                state.projects.values().map(StoredProject::to_wire).collect(),
            )),
            "get_project" => identifier_to_u64(arg).map(|id| {
                encode_optional(state.projects.get(&id).map(StoredProject::to_wire))
            }),
            "list_polls" => decode_optional_with(arg, identifier_to_u64).map(|project| {
                WireValue::Vec(
                    state
                        .polls
                        .values()
                        .filter(|p| project.map_or(true, |id| p.project_id == id))
                        .map(StoredPoll::to_wire)
                        .collect(),
                )
            }),
            "get_poll" => identifier_to_u64(arg)
                .map(|id| encode_optional(state.polls.get(&id).map(StoredPoll::to_wire))),
            "list_surveys" => decode_optional_with(arg, identifier_to_u64).map(|project| {
                WireValue::Vec(
                    state
                        .surveys
                        .values()
                        .filter(|s| project.map_or(true, |id| s.project_id == id))
                        .map(StoredSurvey::to_wire)
                        .collect(),
                )
            }),
            "list_rewards" => arg.as_text().and_then(|text| {
                let owner = Principal::from_text(text).map_err(|_| CodecError::TypeMismatch {
                    expected: "principal",
                    found: "text",
                })?;
                Ok(WireValue::Vec(
                    state
                        .rewards
                        .values()
                        .filter(|r| r.owner == owner)
                        .map(StoredReward::to_wire)
                        .collect(),
                ))
            }),
            other => {
                return Err(reject(
                    REJECT_DESTINATION_INVALID,
                    format!("no query method {other}"),
                ))
            }
        };
        reply.map_err(|e| reject(REJECT_BAD_ARGUMENT, e.to_string()))
    }
}

fn create_project(
    state: &mut ReplicaState,
    caller: &Principal,
    arg: &WireValue,
    now: u64,
) -> Result<WireValue, CodecError> {
    let view = RecordView::new("ProjectArgs", arg)?;
    if caller.is_anonymous() {
        return Ok(err("anonymous callers cannot create projects"));
    }
    let id = state.allocate();
    state.projects.insert(
        id,
        StoredProject {
            id,
            owner: caller.clone(),
            name: view.text("name")?,
            description: view.text("description")?,
            category: opt_text_arg(&view, "category")?,
            website: opt_text_arg(&view, "website")?,
            funding_goal: opt_nat_arg(&view, "funding_goal")?,
            deadline: opt_u64(&view, "deadline")?,
            created_at: now,
        },
    );
    Ok(ok(nat(id)))
}

fn owned_project(
    state: &ReplicaState,
    caller: &Principal,
    project_id: u64,
) -> Result<(), WireValue> {
    if caller.is_anonymous() {
        return Err(err("anonymous callers cannot write"));
    }
    match state.projects.get(&project_id) {
        None => Err(err(format!("project {project_id} not found"))),
        Some(project) if project.owner != *caller => {
            Err(err("only the project owner can do this"))
        }
        Some(_) => Ok(()),
    }
}

fn create_poll(
    state: &mut ReplicaState,
    caller: &Principal,
    arg: &WireValue,
    now: u64,
) -> Result<WireValue, CodecError> {
    let view = RecordView::new("PollArgs", arg)?;
    let project_id = identifier_to_u64(view.field("project_id")?)?;
    if let Err(reply) = owned_project(state, caller, project_id) {
        return Ok(reply);
    }
    let options = view.text_vec("options")?;
    let closes_at = view.field("closes_at")?.as_nat64()?;
    if closes_at <= now {
        return Ok(err("poll must close in the future"));
    }
    let id = state.allocate();
    state.polls.insert(
        id,
        StoredPoll {
            id,
            project_id,
            creator: caller.clone(),
            title: view.text("title")?,
            description: view.text("description")?,
            tallies: vec![0; options.len()],
            options,
            closes_at,
            reward_per_vote: opt_nat_arg(&view, "reward_per_vote")?,
            created_at: now,
        },
    );
    Ok(ok(nat(id)))
}

fn create_survey(
    state: &mut ReplicaState,
    caller: &Principal,
    arg: &WireValue,
    now: u64,
) -> Result<WireValue, CodecError> {
    let view = RecordView::new("SurveyArgs", arg)?;
    let project_id = identifier_to_u64(view.field("project_id")?)?;
    if let Err(reply) = owned_project(state, caller, project_id) {
        return Ok(reply);
    }
    let questions = view.field("questions")?.as_vec()?.to_vec();
    for question in &questions {
        let q = RecordView::new("SurveyQuestion", question)?;
        q.text("prompt")?;
        q.field("kind")?.as_variant()?;
    }
    let id = state.allocate();
    state.surveys.insert(
        id,
        StoredSurvey {
            id,
            project_id,
            creator: caller.clone(),
            title: view.text("title")?,
            questions,
            closes_at: opt_u64(&view, "closes_at")?,
            reward_pool: opt_nat_arg(&view, "reward_pool")?,
            created_at: now,
        },
    );
    Ok(ok(nat(id)))
}

fn vote(
    state: &mut ReplicaState,
    caller: &Principal,
    arg: &WireValue,
    now: u64,
) -> Result<WireValue, CodecError> {
    let view = RecordView::new("VoteArgs", arg)?;
    let poll_id = identifier_to_u64(view.field("poll_id")?)?;
    let option = view.field("option_index")?.as_nat32()? as usize;
    if caller.is_anonymous() {
        return Ok(err("anonymous callers cannot vote"));
    }
    if state.ballots.contains(&(poll_id, caller.clone())) {
        return Ok(err("already voted on this poll"));
    }
    let Some(poll) = state.polls.get_mut(&poll_id) else {
        return Ok(err(format!("poll {poll_id} not found")));
    };
    if now >= poll.closes_at {
        return Ok(err("poll is closed"));
    }
    let Some(tally) = poll.tallies.get_mut(option) else {
        return Ok(err(format!("option {option} does not exist")));
    };
    *tally += 1;
    let tallies = poll.tallies_wire();
    let reward = poll.reward_per_vote;

    state.ballots.insert((poll_id, caller.clone()));
    if let Some(amount) = reward {
        let id = state.allocate();
        state.rewards.insert(
            id,
            StoredReward {
                id,
                owner: caller.clone(),
                poll_id,
                amount,
                claimed: false,
                created_at: now,
            },
        );
    }
    Ok(ok(tallies))
}

fn claim_reward(
    state: &mut ReplicaState,
    caller: &Principal,
    arg: &WireValue,
) -> Result<WireValue, CodecError> {
    let view = RecordView::new("ClaimArgs", arg)?;
    let reward_id = identifier_to_u64(view.field("reward_id")?)?;
    let Some(reward) = state.rewards.get_mut(&reward_id) else {
        return Ok(err(format!("reward {reward_id} not found")));
    };
    if reward.owner != *caller {
        return Ok(err("only the reward owner can claim it"));
    }
    if reward.claimed {
        return Ok(err("reward already claimed"));
    }
    reward.claimed = true;
    Ok(ok(WireValue::Nat(reward.amount)))
}

#[async_trait]
impl AgentTransport for LocalReplica {
    async fn status(&self, endpoint: &Endpoint) -> Result<TransportStatus, TransportError> {
        if *self.offline.lock() {
            return Err(TransportError::Network("replica offline".into()));
        }
        if endpoint.backend_id != self.backend_id {
            return Err(reject(
                REJECT_DESTINATION_INVALID,
                format!("backend {} not found", endpoint.backend_id),
            ));
        }
        Ok(TransportStatus {
            replica_version: "local".into(),
            root_key: None,
        })
    }

    async fn call(&self, endpoint: &Endpoint, envelope: Envelope) -> Result<WireValue, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let caller = self.admit(endpoint, &envelope, RequestType::Call)?;
        debug!(
            method = %envelope.content.method_name,
            caller = %caller,
            "[cv-05] replica update"
        );
        self.update(&caller, &envelope.content.method_name, &envelope.content.arg)
    }

    async fn query(
        &self,
        endpoint: &Endpoint,
        envelope: Envelope,
    ) -> Result<WireValue, TransportError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let failing = self.failing_queries.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_queries.store(failing - 1, Ordering::SeqCst);
            return Err(TransportError::Network("connection reset".into()));
        }
        self.admit(endpoint, &envelope, RequestType::Query)?;
        self.read(&envelope.content.method_name, &envelope.content.arg)
    }
}
