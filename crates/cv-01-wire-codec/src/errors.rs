//! # Codec Errors
//!
//! A `CodecError` is always a contract violation between the application and
//! the wire format. It is never recovered silently.

use shared_types::{ClientError, ErrorKind};
use thiserror::Error;

/// Wire encode/decode failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Input does not parse to a calendar instant.
    #[error("invalid timestamp '{input}': {reason}")]
    InvalidTimestamp {
        /// Offending input
        input: String,
        /// Parser detail
        reason: String,
    },

    /// Instant is before the epoch or past the nat64 nanosecond range.
    #[error("timestamp out of wire range: {0}")]
    TimestampOutOfRange(String),

    /// Amounts are non-negative.
    #[error("negative amount: {0}")]
    NegativeAmount(String),

    /// More fractional digits than the token has decimals.
    #[error("amount '{input}' has a fraction of the smallest unit ({decimals} decimals)")]
    FractionalUnits {
        /// Offending input
        input: String,
        /// Token decimals
        decimals: u8,
    },

    /// Not a decimal number.
    #[error("invalid amount '{input}': {reason}")]
    InvalidAmount {
        /// Offending input
        input: String,
        /// What is wrong
        reason: &'static str,
    },

    /// Does not fit the wire integer.
    #[error("amount overflows wire range: {0}")]
    AmountOverflow(String),

    /// Decimals beyond what the codec supports.
    #[error("unsupported token decimals: {0}")]
    UnsupportedDecimals(u8),

    /// Identifier is not a non-negative decimal integer.
    #[error("invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// Identifier does not fit the wire integer.
    #[error("identifier overflows wire range: {0}")]
    IdentifierOverflow(String),

    /// Optional carried more than one element.
    #[error("optional sequence has {0} elements, expected 0 or 1")]
    OptionalArity(usize),

    /// Value has a different wire type than expected.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Expected wire type
        expected: &'static str,
        /// Actual wire type
        found: &'static str,
    },

    /// Record lacks a required field.
    #[error("record {record} is missing field '{field}'")]
    MissingField {
        /// Record name
        record: &'static str,
        /// Field name
        field: String,
    },

    /// Variant tag not part of the schema.
    #[error("unknown variant '{found}' for {expected}")]
    UnknownVariant {
        /// Variant type name
        expected: &'static str,
        /// Tag received
        found: String,
    },

    /// Fixed-width integer cannot hold the value.
    #[error("{0} out of range")]
    OutOfRange(&'static str),

    /// Canonical byte encoding failed.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl CodecError {
    /// Taxonomy kind.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Codec
    }
}

impl From<CodecError> for ClientError {
    fn from(err: CodecError) -> Self {
        ClientError::new(err.kind(), err.to_string())
    }
}
