//! # Wire Values
//!
//! The strict form every value takes when it crosses the client/backend
//! boundary. There is deliberately no float and no date variant.
//!
//! Optionals are `Opt` sequences of zero or one element and never absent
//! record keys. `Vec` is an ordinary list.

use crate::errors::CodecError;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Encoded value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireValue {
    /// Unit payload (empty variant arm, empty argument).
    Null,
    /// Boolean.
    Bool(bool),
    /// Unsigned 8-bit.
    Nat8(u8),
    /// Unsigned 32-bit.
    Nat32(u32),
    /// Unsigned 64-bit (timestamps, tallies).
    Nat64(u64),
    /// Arbitrary-precision natural (amounts, identifiers).
    Nat(U256),
    /// UTF-8 text.
    Text(String),
    /// Optional: zero or one element.
    Opt(Vec<WireValue>),
    /// List.
    Vec(Vec<WireValue>),
    /// Record with fields in canonical (sorted) order.
    Record(BTreeMap<String, WireValue>),
    /// Tagged variant.
    Variant {
        /// Arm name
        tag: String,
        /// Arm payload (`Null` for unit arms)
        value: Box<WireValue>,
    },
}

impl WireValue {
    /// Wire type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            WireValue::Null => "null",
            WireValue::Bool(_) => "bool",
            WireValue::Nat8(_) => "nat8",
            WireValue::Nat32(_) => "nat32",
            WireValue::Nat64(_) => "nat64",
            WireValue::Nat(_) => "nat",
            WireValue::Text(_) => "text",
            WireValue::Opt(_) => "opt",
            WireValue::Vec(_) => "vec",
            WireValue::Record(_) => "record",
            WireValue::Variant { .. } => "variant",
        }
    }

    /// Build a variant.
    pub fn variant(tag: impl Into<String>, value: WireValue) -> Self {
        WireValue::Variant {
            tag: tag.into(),
            value: Box::new(value),
        }
    }

    /// Build a text value.
    pub fn text(value: impl Into<String>) -> Self {
        WireValue::Text(value.into())
    }

    /// Canonical bytes. Two equal values always produce identical bytes.
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(self).map_err(|e| CodecError::Serialization(e.to_string()))
    }

    fn mismatch(&self, expected: &'static str) -> CodecError {
        CodecError::TypeMismatch {
            expected,
            found: self.type_name(),
        }
    }

    /// Expect `bool`.
    pub fn as_bool(&self) -> Result<bool, CodecError> {
        match self {
            WireValue::Bool(b) => Ok(*b),
            other => Err(other.mismatch("bool")),
        }
    }

    /// Expect `nat8`.
    pub fn as_nat8(&self) -> Result<u8, CodecError> {
        match self {
            WireValue::Nat8(n) => Ok(*n),
            other => Err(other.mismatch("nat8")),
        }
    }

    /// Expect `nat32`.
    pub fn as_nat32(&self) -> Result<u32, CodecError> {
        match self {
            WireValue::Nat32(n) => Ok(*n),
            other => Err(other.mismatch("nat32")),
        }
    }

    /// Expect `nat64`.
    pub fn as_nat64(&self) -> Result<u64, CodecError> {
        match self {
            WireValue::Nat64(n) => Ok(*n),
            other => Err(other.mismatch("nat64")),
        }
    }

    /// Expect `nat`.
    pub fn as_nat(&self) -> Result<U256, CodecError> {
        match self {
            WireValue::Nat(n) => Ok(*n),
            other => Err(other.mismatch("nat")),
        }
    }

    /// Expect `text`.
    pub fn as_text(&self) -> Result<&str, CodecError> {
        match self {
            WireValue::Text(s) => Ok(s),
            other => Err(other.mismatch("text")),
        }
    }

    /// Expect `vec`.
    pub fn as_vec(&self) -> Result<&[WireValue], CodecError> {
        match self {
            WireValue::Vec(items) => Ok(items),
            other => Err(other.mismatch("vec")),
        }
    }

    /// Expect `variant`.
    pub fn as_variant(&self) -> Result<(&str, &WireValue), CodecError> {
        match self {
            WireValue::Variant { tag, value } => Ok((tag, value)),
            other => Err(other.mismatch("variant")),
        }
    }
}

/// Builds a `Record`.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    fields: BTreeMap<String, WireValue>,
}

impl RecordBuilder {
    /// Empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field.
    pub fn field(mut self, name: &str, value: WireValue) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    /// Finish.
    pub fn build(self) -> WireValue {
        WireValue::Record(self.fields)
    }
}

/// Read-only view over a `Record` with typed field access.
#[derive(Debug)]
pub struct RecordView<'a> {
    name: &'static str,
    fields: &'a BTreeMap<String, WireValue>,
}

impl<'a> RecordView<'a> {
    /// View `value` as the record `name`.
    pub fn new(name: &'static str, value: &'a WireValue) -> Result<Self, CodecError> {
        match value {
            WireValue::Record(fields) => Ok(Self { name, fields }),
            other => Err(CodecError::TypeMismatch {
                expected: "record",
                found: other.type_name(),
            }),
        }
    }

    /// Required field.
    pub fn field(&self, field: &str) -> Result<&'a WireValue, CodecError> {
        self.fields
            .get(field)
            .ok_or_else(|| CodecError::MissingField {
                record: self.name,
                field: field.to_string(),
            })
    }

    /// Required text field.
    pub fn text(&self, field: &str) -> Result<String, CodecError> {
        self.field(field)?.as_text().map(str::to_string)
    }

    /// Required list of text.
    pub fn text_vec(&self, field: &str) -> Result<Vec<String>, CodecError> {
        self.field(field)?
            .as_vec()?
            .iter()
            .map(|v| v.as_text().map(str::to_string))
            .collect()
    }
}
