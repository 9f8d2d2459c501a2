//! Update replies are `variant {Ok: T; Err: text}`.

use crate::domain::errors::OrchestratorError;
use cv_01_wire_codec::{CodecError, WireValue};

/// Unwrap the `Ok` arm, or turn `Err` into a remote failure for `method`.
pub fn decode_result<'a>(
    method: &'static str,
    reply: &'a WireValue,
) -> Result<&'a WireValue, OrchestratorError> {
    match reply.as_variant()? {
        ("Ok", value) => Ok(value),
        ("Err", message) => Err(OrchestratorError::Remote {
            method,
            message: message.as_text()?.to_string(),
        }),
        (other, _) => Err(CodecError::UnknownVariant {
            expected: "Result",
            found: other.to_string(),
        }
        .into()),
    }
}

/// `Ok` reply.
pub fn ok(value: WireValue) -> WireValue {
    WireValue::variant("Ok", value)
}

/// `Err` reply.
pub fn err(message: impl Into<String>) -> WireValue {
    WireValue::variant("Err", WireValue::text(message))
}
