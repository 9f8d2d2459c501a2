//! # Identifiers
//!
//! Backend-issued ids (projects, polls, surveys, rewards) are `nat` on the
//! wire and decimal strings everywhere else.

use crate::errors::CodecError;
use crate::value::WireValue;
use primitive_types::U256;

/// Parse a decimal identifier. Leading zeros are normalized away.
pub fn parse_identifier(input: &str) -> Result<U256, CodecError> {
    let text = input.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::InvalidIdentifier(text.to_string()));
    }
    U256::from_dec_str(text).map_err(|_| CodecError::IdentifierOverflow(text.to_string()))
}

/// Encode a decimal identifier as `nat`.
pub fn encode_identifier(input: &str) -> Result<WireValue, CodecError> {
    parse_identifier(input).map(WireValue::Nat)
}

/// Encode a numeric identifier as `nat`.
pub fn encode_identifier_u64(id: u64) -> WireValue {
    WireValue::Nat(U256::from(id))
}

/// Decode an identifier for display. Accepts any unsigned integer width the
/// backend might use.
pub fn decode_identifier(value: &WireValue) -> Result<String, CodecError> {
    match value {
        WireValue::Nat(n) => Ok(n.to_string()),
        WireValue::Nat64(n) => Ok(n.to_string()),
        WireValue::Nat32(n) => Ok(n.to_string()),
        other => Err(CodecError::TypeMismatch {
            expected: "nat",
            found: other.type_name(),
        }),
    }
}

/// Narrow a wire identifier to `u64`.
pub fn identifier_to_u64(value: &WireValue) -> Result<u64, CodecError> {
    match value {
        WireValue::Nat(n) if *n <= U256::from(u64::MAX) => Ok(n.low_u64()),
        WireValue::Nat(_) => Err(CodecError::OutOfRange("identifier")),
        WireValue::Nat64(n) => Ok(*n),
        WireValue::Nat32(n) => Ok(u64::from(*n)),
        other => Err(CodecError::TypeMismatch {
            expected: "nat",
            found: other.type_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_leading_zeros_normalized() {
        let encoded = encode_identifier("0042").unwrap();
        assert_eq!(encoded, WireValue::Nat(U256::from(42u8)));
        assert_eq!(decode_identifier(&encoded).unwrap(), "42");
    }

    #[test]
    fn test_non_numeric_rejected() {
        for input in ["", "abc", "-1", "1.0", "0x10"] {
            assert!(matches!(
                encode_identifier(input),
                Err(CodecError::InvalidIdentifier(_))
            ));
        }
    }

    #[test]
    fn test_beyond_u64_is_lossless() {
        let big = "340282366920938463463374607431768211456"; // 2^128
        let encoded = encode_identifier(big).unwrap();
        assert_eq!(decode_identifier(&encoded).unwrap(), big);
        assert_eq!(
            identifier_to_u64(&encoded),
            Err(CodecError::OutOfRange("identifier"))
        );
    }

    #[test]
    fn test_narrow_widths_decode() {
        assert_eq!(decode_identifier(&WireValue::Nat64(7)).unwrap(), "7");
        assert_eq!(decode_identifier(&WireValue::Nat32(7)).unwrap(), "7");
        assert!(decode_identifier(&WireValue::text("7")).is_err());
    }

    proptest! {
        #[test]
        fn prop_identifier_roundtrip(id in any::<u128>()) {
            let text = id.to_string();
            let encoded = encode_identifier(&text).unwrap();
            prop_assert_eq!(decode_identifier(&encoded).unwrap(), text);
        }
    }
}
