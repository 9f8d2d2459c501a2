//! # Optional-as-Sequence
//!
//! The backend encodes an optional as a sequence of zero or one element. The
//! sequence form never escapes this module: callers hand in and get back a
//! native `Option`.

use crate::errors::CodecError;
use crate::value::WireValue;

/// `None` → `[]`, `Some(v)` → `[v]`.
pub fn encode_optional(value: Option<WireValue>) -> WireValue {
    WireValue::Opt(value.into_iter().collect())
}

/// Encode the inner value with `encode` before wrapping.
pub fn encode_optional_with<T, F>(value: Option<T>, encode: F) -> Result<WireValue, CodecError>
where
    F: FnOnce(T) -> Result<WireValue, CodecError>,
{
    Ok(encode_optional(value.map(encode).transpose()?))
}

/// `[]` → `None`, `[v]` → `Some(v)`. Longer sequences violate the contract.
pub fn decode_optional(value: &WireValue) -> Result<Option<&WireValue>, CodecError> {
    match value {
        WireValue::Opt(items) => match items.as_slice() {
            [] => Ok(None),
            [single] => Ok(Some(single)),
            more => Err(CodecError::OptionalArity(more.len())),
        },
        other => Err(CodecError::TypeMismatch {
            expected: "opt",
            found: other.type_name(),
        }),
    }
}

/// Decode the inner value with `decode`.
pub fn decode_optional_with<T, F>(value: &WireValue, decode: F) -> Result<Option<T>, CodecError>
where
    F: FnOnce(&WireValue) -> Result<T, CodecError>,
{
    decode_optional(value)?.map(decode).transpose()
}
