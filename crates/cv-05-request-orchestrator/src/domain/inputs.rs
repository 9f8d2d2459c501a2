//! # Write Inputs
//!
//! Inputs arrive as the presentation layer holds them: decimal strings for
//! amounts and ids, ISO-8601 strings for instants, and blank strings for
//! unfilled optional fields. `validate` turns each into typed arguments;
//! `to_wire` encodes those arguments for the backend.
//!
//! A blank optional field (`Some("")`) is treated as absent.

use crate::domain::errors::OrchestratorError;
use cv_01_wire_codec::{
    encode_optional, parse_amount, parse_identifier, parse_timestamp, RecordBuilder, WireValue,
    U256,
};
use serde::{Deserialize, Serialize};
use shared_types::Timestamp;

/// Smallest and largest rating scale.
pub const RATING_SCALE: std::ops::RangeInclusive<u8> = 2..=10;

/// Minimum options for a poll or single-choice question.
pub const MIN_CHOICES: usize = 2;

fn required(field: &'static str, value: &str) -> Result<String, OrchestratorError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(OrchestratorError::invalid(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn optional(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn choices(field: &'static str, options: &[String]) -> Result<Vec<String>, OrchestratorError> {
    let options = options
        .iter()
        .map(|o| required(field, o))
        .collect::<Result<Vec<_>, _>>()?;
    if options.len() < MIN_CHOICES {
        return Err(OrchestratorError::invalid(
            field,
            format!("at least {MIN_CHOICES} options are required"),
        ));
    }
    Ok(options)
}

fn id(field: &'static str, value: &str) -> Result<U256, OrchestratorError> {
    parse_identifier(value.trim()).map_err(OrchestratorError::field(field))
}

fn amount(
    field: &'static str,
    value: &Option<String>,
    decimals: u8,
) -> Result<Option<U256>, OrchestratorError> {
    optional(value)
        .map(|v| parse_amount(v, decimals).map_err(OrchestratorError::field(field)))
        .transpose()
}

fn instant(field: &'static str, value: &str) -> Result<Timestamp, OrchestratorError> {
    parse_timestamp(value.trim()).map_err(OrchestratorError::field(field))
}

fn future(field: &'static str, value: &str, now: Timestamp) -> Result<Timestamp, OrchestratorError> {
    let at = instant(field, value)?;
    if at <= now {
        return Err(OrchestratorError::invalid(field, "must be in the future"));
    }
    Ok(at)
}

fn nat(value: U256) -> WireValue {
    WireValue::Nat(value)
}

fn nat64(value: Timestamp) -> WireValue {
    WireValue::Nat64(value.as_nanos())
}

fn text(value: &str) -> WireValue {
    WireValue::text(value)
}

// =============================================================================
// Projects
// =============================================================================

/// Project form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: String,
    /// Free-form category.
    pub category: Option<String>,
    /// Project website.
    pub website: Option<String>,
    /// Funding target in whole tokens.
    pub funding_goal: Option<String>,
    /// Funding deadline (ISO-8601).
    pub deadline: Option<String>,
}

/// Validated `create_project` argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectArgs {
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: String,
    /// Category.
    pub category: Option<String>,
    /// Website.
    pub website: Option<String>,
    /// Funding target in smallest units.
    pub funding_goal: Option<U256>,
    /// Funding deadline.
    pub deadline: Option<Timestamp>,
}

impl NewProject {
    /// Check and convert every field.
    pub fn validate(&self, decimals: u8, now: Timestamp) -> Result<ProjectArgs, OrchestratorError> {
        let website = optional(&self.website).map(str::to_string);
        if let Some(url) = &website {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(OrchestratorError::invalid(
                    "website",
                    "must be an http(s) URL",
                ));
            }
        }
        Ok(ProjectArgs {
            name: required("name", &self.name)?,
            description: self.description.trim().to_string(),
            category: optional(&self.category).map(str::to_string),
            website,
            funding_goal: amount("funding_goal", &self.funding_goal, decimals)?,
            deadline: optional(&self.deadline)
                .map(|d| future("deadline", d, now))
                .transpose()?,
        })
    }
}

impl ProjectArgs {
    /// Wire record.
    pub fn to_wire(&self) -> WireValue {
        RecordBuilder::new()
            .field("name", text(&self.name))
            .field("description", text(&self.description))
            .field("category", encode_optional(self.category.as_deref().map(text)))
            .field("website", encode_optional(self.website.as_deref().map(text)))
            .field("funding_goal", encode_optional(self.funding_goal.map(nat)))
            .field("deadline", encode_optional(self.deadline.map(nat64)))
            .build()
    }
}

// =============================================================================
// Polls
// =============================================================================

/// Poll form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPoll {
    /// Owning project id.
    pub project_id: String,
    /// Question.
    pub title: String,
    /// Context.
    pub description: String,
    /// Answer options, in display order.
    pub options: Vec<String>,
    /// Voting deadline (ISO-8601).
    pub closes_at: String,
    /// Reward credited per vote, in whole tokens.
    pub reward_per_vote: Option<String>,
}

/// Validated `create_poll` argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollArgs {
    /// Owning project.
    pub project_id: U256,
    /// Question.
    pub title: String,
    /// Context.
    pub description: String,
    /// Options.
    pub options: Vec<String>,
    /// Deadline.
    pub closes_at: Timestamp,
    /// Per-vote reward in smallest units.
    pub reward_per_vote: Option<U256>,
}

impl NewPoll {
    /// Check and convert every field.
    pub fn validate(&self, decimals: u8, now: Timestamp) -> Result<PollArgs, OrchestratorError> {
        Ok(PollArgs {
            project_id: id("project_id", &self.project_id)?,
            title: required("title", &self.title)?,
            description: self.description.trim().to_string(),
            options: choices("options", &self.options)?,
            closes_at: future("closes_at", &self.closes_at, now)?,
            reward_per_vote: amount("reward_per_vote", &self.reward_per_vote, decimals)?,
        })
    }
}

impl PollArgs {
    /// Wire record.
    pub fn to_wire(&self) -> WireValue {
        RecordBuilder::new()
            .field("project_id", nat(self.project_id))
            .field("title", text(&self.title))
            .field("description", text(&self.description))
            .field(
                "options",
                WireValue::Vec(self.options.iter().map(|o| text(o)).collect()),
            )
            .field("closes_at", nat64(self.closes_at))
            .field("reward_per_vote", encode_optional(self.reward_per_vote.map(nat)))
            .build()
    }
}

// =============================================================================
// Surveys
// =============================================================================

/// How a survey question is answered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum QuestionKind {
    /// Free text.
    Text,
    /// One of the listed choices.
    SingleChoice(Vec<String>),
    /// 1..=scale.
    Rating(u8),
}

impl QuestionKind {
    /// Wire variant.
    pub fn to_wire(&self) -> WireValue {
        match self {
            QuestionKind::Text => WireValue::variant("Text", WireValue::Null),
            QuestionKind::SingleChoice(options) => WireValue::variant(
                "SingleChoice",
                WireValue::Vec(options.iter().map(|o| text(o)).collect()),
            ),
            QuestionKind::Rating(scale) => WireValue::variant("Rating", WireValue::Nat8(*scale)),
        }
    }
}

/// One survey question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyQuestion {
    /// Question text.
    pub prompt: String,
    /// Answer shape.
    pub kind: QuestionKind,
}

impl SurveyQuestion {
    fn validate(&self) -> Result<SurveyQuestion, OrchestratorError> {
        let kind = match &self.kind {
            QuestionKind::Text => QuestionKind::Text,
            QuestionKind::SingleChoice(options) => {
                QuestionKind::SingleChoice(choices("questions", options)?)
            }
            QuestionKind::Rating(scale) if RATING_SCALE.contains(scale) => {
                QuestionKind::Rating(*scale)
            }
            QuestionKind::Rating(scale) => {
                return Err(OrchestratorError::invalid(
                    "questions",
                    format!(
                        "rating scale {scale} outside {}..={}",
                        RATING_SCALE.start(),
                        RATING_SCALE.end()
                    ),
                ))
            }
        };
        Ok(SurveyQuestion {
            prompt: required("questions", &self.prompt)?,
            kind,
        })
    }

    /// Wire record.
    pub fn to_wire(&self) -> WireValue {
        RecordBuilder::new()
            .field("prompt", text(&self.prompt))
            .field("kind", self.kind.to_wire())
            .build()
    }
}

/// Survey form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSurvey {
    /// Owning project id.
    pub project_id: String,
    /// Title.
    pub title: String,
    /// Questions, in order.
    pub questions: Vec<SurveyQuestion>,
    /// Optional deadline (ISO-8601).
    pub closes_at: Option<String>,
    /// Reward pool in whole tokens.
    pub reward_pool: Option<String>,
}

/// Validated `create_survey` argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurveyArgs {
    /// Owning project.
    pub project_id: U256,
    /// Title.
    pub title: String,
    /// Questions.
    pub questions: Vec<SurveyQuestion>,
    /// Deadline.
    pub closes_at: Option<Timestamp>,
    /// Pool in smallest units.
    pub reward_pool: Option<U256>,
}

impl NewSurvey {
    /// Check and convert every field.
    pub fn validate(&self, decimals: u8, now: Timestamp) -> Result<SurveyArgs, OrchestratorError> {
        if self.questions.is_empty() {
            return Err(OrchestratorError::invalid(
                "questions",
                "at least one question is required",
            ));
        }
        Ok(SurveyArgs {
            project_id: id("project_id", &self.project_id)?,
            title: required("title", &self.title)?,
            questions: self
                .questions
                .iter()
                .map(SurveyQuestion::validate)
                .collect::<Result<_, _>>()?,
            closes_at: optional(&self.closes_at)
                .map(|c| future("closes_at", c, now))
                .transpose()?,
            reward_pool: amount("reward_pool", &self.reward_pool, decimals)?,
        })
    }
}

impl SurveyArgs {
    /// Wire record.
    pub fn to_wire(&self) -> WireValue {
        RecordBuilder::new()
            .field("project_id", nat(self.project_id))
            .field("title", text(&self.title))
            .field(
                "questions",
                WireValue::Vec(self.questions.iter().map(SurveyQuestion::to_wire).collect()),
            )
            .field("closes_at", encode_optional(self.closes_at.map(nat64)))
            .field("reward_pool", encode_optional(self.reward_pool.map(nat)))
            .build()
    }
}

// =============================================================================
// Votes and claims
// =============================================================================

/// Validated `vote` argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteArgs {
    /// Poll.
    pub poll_id: U256,
    /// Chosen option (0-based).
    pub option_index: u32,
}

impl VoteArgs {
    /// Parse the poll id.
    pub fn parse(poll_id: &str, option_index: u32) -> Result<Self, OrchestratorError> {
        Ok(Self {
            poll_id: id("poll_id", poll_id)?,
            option_index,
        })
    }

    /// Wire record.
    pub fn to_wire(&self) -> WireValue {
        RecordBuilder::new()
            .field("poll_id", nat(self.poll_id))
            .field("option_index", WireValue::Nat32(self.option_index))
            .build()
    }
}

/// Validated `claim_reward` argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimArgs {
    /// Reward.
    pub reward_id: U256,
}

impl ClaimArgs {
    /// Parse the reward id.
    pub fn parse(reward_id: &str) -> Result<Self, OrchestratorError> {
        Ok(Self {
            reward_id: id("reward_id", reward_id)?,
        })
    }

    /// Wire record.
    pub fn to_wire(&self) -> WireValue {
        RecordBuilder::new()
            .field("reward_id", nat(self.reward_id))
            .build()
    }
}

/// Parse an id argument for a read.
pub fn parse_id(field: &'static str, value: &str) -> Result<U256, OrchestratorError> {
    id(field, value)
}
