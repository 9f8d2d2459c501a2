//! # Read Models
//!
//! Backend records decoded into application values: ids as decimal strings,
//! instants as ISO-8601, amounts as canonical decimal strings. Any mismatch
//! with the schema is a `CodecError`.

use crate::domain::inputs::{QuestionKind, SurveyQuestion};
use cv_01_wire_codec::{
    decode_amount, decode_identifier, decode_optional_with, decode_timestamp, CodecError,
    RecordView, WireValue,
};
use serde::{Deserialize, Serialize};
use shared_types::Principal;

fn principal(view: &RecordView<'_>, field: &str) -> Result<Principal, CodecError> {
    let text = view.text(field)?;
    Principal::from_text(&text).map_err(|_| CodecError::TypeMismatch {
        expected: "principal",
        found: "text",
    })
}

fn opt_text(view: &RecordView<'_>, field: &str) -> Result<Option<String>, CodecError> {
    decode_optional_with(view.field(field)?, |v| v.as_text().map(str::to_string))
}

fn opt_amount(view: &RecordView<'_>, field: &str, decimals: u8) -> Result<Option<String>, CodecError> {
    decode_optional_with(view.field(field)?, |v| decode_amount(v, decimals))
}

fn opt_instant(view: &RecordView<'_>, field: &str) -> Result<Option<String>, CodecError> {
    decode_optional_with(view.field(field)?, decode_timestamp)
}

/// Decode a `vec` of records.
pub fn decode_list<T>(
    value: &WireValue,
    decode: impl Fn(&WireValue) -> Result<T, CodecError>,
) -> Result<Vec<T>, CodecError> {
    value.as_vec()?.iter().map(decode).collect()
}

/// Project as displayed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Id.
    pub id: String,
    /// Creator, the only principal allowed to attach polls and surveys.
    pub owner: Principal,
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: String,
    /// Category.
    pub category: Option<String>,
    /// Website.
    pub website: Option<String>,
    /// Funding target.
    pub funding_goal: Option<String>,
    /// Funding deadline.
    pub deadline: Option<String>,
    /// Creation instant.
    pub created_at: String,
}

impl Project {
    /// Decode a `Project` record.
    pub fn from_wire(value: &WireValue, decimals: u8) -> Result<Self, CodecError> {
        let view = RecordView::new("Project", value)?;
        Ok(Self {
            id: decode_identifier(view.field("id")?)?,
            owner: principal(&view, "owner")?,
            name: view.text("name")?,
            description: view.text("description")?,
            category: opt_text(&view, "category")?,
            website: opt_text(&view, "website")?,
            funding_goal: opt_amount(&view, "funding_goal", decimals)?,
            deadline: opt_instant(&view, "deadline")?,
            created_at: decode_timestamp(view.field("created_at")?)?,
        })
    }
}

/// Poll with current tallies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    /// Id.
    pub id: String,
    /// Owning project.
    pub project_id: String,
    /// Creator.
    pub creator: Principal,
    /// Question.
    pub title: String,
    /// Context.
    pub description: String,
    /// Options.
    pub options: Vec<String>,
    /// Votes per option, aligned with `options`.
    pub tallies: Vec<u64>,
    /// Voting deadline.
    pub closes_at: String,
    /// Reward per vote.
    pub reward_per_vote: Option<String>,
    /// Creation instant.
    pub created_at: String,
}

impl Poll {
    /// Decode a `Poll` record.
    pub fn from_wire(value: &WireValue, decimals: u8) -> Result<Self, CodecError> {
        let view = RecordView::new("Poll", value)?;
        let options = view.text_vec("options")?;
        let tallies = decode_tallies(view.field("tallies")?)?;
        if tallies.len() != options.len() {
            return Err(CodecError::OutOfRange("poll tallies"));
        }
        Ok(Self {
            id: decode_identifier(view.field("id")?)?,
            project_id: decode_identifier(view.field("project_id")?)?,
            creator: principal(&view, "creator")?,
            title: view.text("title")?,
            description: view.text("description")?,
            options,
            tallies,
            closes_at: decode_timestamp(view.field("closes_at")?)?,
            reward_per_vote: opt_amount(&view, "reward_per_vote", decimals)?,
            created_at: decode_timestamp(view.field("created_at")?)?,
        })
    }
}

/// Decode a `vec nat64` of vote counts.
pub fn decode_tallies(value: &WireValue) -> Result<Vec<u64>, CodecError> {
    value.as_vec()?.iter().map(WireValue::as_nat64).collect()
}

fn question_from_wire(value: &WireValue) -> Result<SurveyQuestion, CodecError> {
    let view = RecordView::new("SurveyQuestion", value)?;
    let (tag, payload) = view.field("kind")?.as_variant()?;
    let kind = match tag {
        "Text" => QuestionKind::Text,
        "SingleChoice" => QuestionKind::SingleChoice(
            payload
                .as_vec()?
                .iter()
                .map(|v| v.as_text().map(str::to_string))
                .collect::<Result<_, _>>()?,
        ),
        "Rating" => QuestionKind::Rating(payload.as_nat8()?),
        other => {
            return Err(CodecError::UnknownVariant {
                expected: "QuestionKind",
                found: other.to_string(),
            })
        }
    };
    Ok(SurveyQuestion {
        prompt: view.text("prompt")?,
        kind,
    })
}

/// Survey definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survey {
    /// Id.
    pub id: String,
    /// Owning project.
    pub project_id: String,
    /// Creator.
    pub creator: Principal,
    /// Title.
    pub title: String,
    /// Questions.
    pub questions: Vec<SurveyQuestion>,
    /// Deadline.
    pub closes_at: Option<String>,
    /// Reward pool.
    pub reward_pool: Option<String>,
    /// Creation instant.
    pub created_at: String,
}

impl Survey {
    /// Decode a `Survey` record.
    pub fn from_wire(value: &WireValue, decimals: u8) -> Result<Self, CodecError> {
        let view = RecordView::new("Survey", value)?;
        Ok(Self {
            id: decode_identifier(view.field("id")?)?,
            project_id: decode_identifier(view.field("project_id")?)?,
            creator: principal(&view, "creator")?,
            title: view.text("title")?,
            questions: decode_list(view.field("questions")?, question_from_wire)?,
            closes_at: opt_instant(&view, "closes_at")?,
            reward_pool: opt_amount(&view, "reward_pool", decimals)?,
            created_at: decode_timestamp(view.field("created_at")?)?,
        })
    }
}

/// Reward credited to a voter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    /// Id.
    pub id: String,
    /// Beneficiary.
    pub owner: Principal,
    /// Poll that earned it.
    pub poll_id: String,
    /// Amount.
    pub amount: String,
    /// Already claimed.
    pub claimed: bool,
    /// Credit instant.
    pub created_at: String,
}

impl Reward {
    /// Decode a `Reward` record.
    pub fn from_wire(value: &WireValue, decimals: u8) -> Result<Self, CodecError> {
        let view = RecordView::new("Reward", value)?;
        Ok(Self {
            id: decode_identifier(view.field("id")?)?,
            owner: principal(&view, "owner")?,
            poll_id: decode_identifier(view.field("poll_id")?)?,
            amount: decode_amount(view.field("amount")?, decimals)?,
            claimed: view.field("claimed")?.as_bool()?,
            created_at: decode_timestamp(view.field("created_at")?)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_01_wire_codec::{encode_optional, RecordBuilder, U256};

    fn poll_record(tallies: Vec<u64>) -> WireValue {
        RecordBuilder::new()
            .field("id", WireValue::Nat(U256::from(3)))
            .field("project_id", WireValue::Nat(U256::from(1)))
            .field("creator", WireValue::text(Principal::anonymous().to_text()))
            .field("title", WireValue::text("Venue"))
            .field("description", WireValue::text(""))
            .field(
                "options",
                WireValue::Vec(vec![WireValue::text("A"), WireValue::text("B")]),
            )
            .field(
                "tallies",
                WireValue::Vec(tallies.into_iter().map(WireValue::Nat64).collect()),
            )
            .field("closes_at", WireValue::Nat64(1_704_067_200_000_000_000))
            .field(
                "reward_per_vote",
                encode_optional(Some(WireValue::Nat(U256::from(150_000_000u64)))),
            )
            .field("created_at", WireValue::Nat64(0))
            .build()
    }

    #[test]
    fn test_poll_decodes_to_application_values() {
        let poll = Poll::from_wire(&poll_record(vec![4, 1]), 8).unwrap();
        assert_eq!(poll.id, "3");
        assert_eq!(poll.closes_at, "2024-01-01T00:00:00.000Z");
        assert_eq!(poll.reward_per_vote.as_deref(), Some("1.5"));
        assert_eq!(poll.tallies, vec![4, 1]);
        assert_eq!(poll.created_at, "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_misaligned_tallies_rejected() {
        assert!(Poll::from_wire(&poll_record(vec![1]), 8).is_err());
    }

    #[test]
    fn test_missing_field_is_codec_error() {
        let record = RecordBuilder::new()
            .field("id", WireValue::Nat(U256::from(1)))
            .build();
        assert!(matches!(
            Reward::from_wire(&record, 8),
            Err(CodecError::MissingField { record: "Reward", .. })
        ));
    }

    #[test]
    fn test_optional_with_two_elements_is_rejected() {
        let record = RecordBuilder::new()
            .field("id", WireValue::Nat(U256::from(1)))
            .field("owner", WireValue::text(Principal::anonymous().to_text()))
            .field("name", WireValue::text("n"))
            .field("description", WireValue::text("d"))
            .field(
                "category",
                WireValue::Opt(vec![WireValue::text("a"), WireValue::text("b")]),
            )
            .field("website", encode_optional(None))
            .field("funding_goal", encode_optional(None))
            .field("deadline", encode_optional(None))
            .field("created_at", WireValue::Nat64(0))
            .build();
        assert_eq!(
            Project::from_wire(&record, 8),
            Err(CodecError::OptionalArity(2))
        );
    }

    #[test]
    fn test_unknown_question_kind() {
        let question = RecordBuilder::new()
            .field("prompt", WireValue::text("?"))
            .field("kind", WireValue::variant("Slider", WireValue::Null))
            .build();
        assert!(matches!(
            question_from_wire(&question),
            Err(CodecError::UnknownVariant { .. })
        ));
    }
}
