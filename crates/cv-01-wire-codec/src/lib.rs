//! # Wire Codec (CV-01)
//!
//! Lossless translation between application values and the backend's strict
//! wire format.
//!
//! ## Mapping
//!
//! | Application | Wire | Module |
//! |-------------|------|--------|
//! | ISO-8601 instant | `nat64` nanoseconds since epoch | `timestamp` |
//! | Decimal token amount | `nat` smallest units | `amount` |
//! | Decimal id string | `nat` | `identifier` |
//! | `Option<T>` | `opt` of 0 or 1 element | `optional` |
//!
//! ## Guarantees
//!
//! - No floating point anywhere on the amount or identifier path
//! - Every encoder is total over valid input and rejects everything else
//!   with [`CodecError`]
//! - Decoders reproduce the canonical application form, so
//!   `decode(encode(x)) == x` for canonical `x`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod amount;
pub mod errors;
pub mod identifier;
pub mod optional;
pub mod timestamp;
pub mod value;

// Re-export public API
pub use amount::{
    decode_amount, encode_amount, encode_amount_units, format_amount, parse_amount, MAX_DECIMALS,
};
pub use errors::CodecError;
pub use identifier::{
    decode_identifier, encode_identifier, encode_identifier_u64, identifier_to_u64,
    parse_identifier,
};
pub use optional::{decode_optional, decode_optional_with, encode_optional, encode_optional_with};
pub use primitive_types::U256;
pub use timestamp::{decode_timestamp, encode_timestamp, format_timestamp, parse_timestamp};
pub use value::{RecordBuilder, RecordView, WireValue};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_poll_deadline_record() {
        let record = RecordBuilder::new()
            .field("poll_id", encode_identifier("12").unwrap())
            .field(
                "closes_at",
                encode_timestamp("2024-01-01T00:00:00.000Z").unwrap(),
            )
            .field("reward_per_vote", encode_optional(None))
            .build();

        let view = RecordView::new("Poll", &record).unwrap();
        assert_eq!(
            decode_timestamp(view.field("closes_at").unwrap()).unwrap(),
            "2024-01-01T00:00:00.000Z"
        );
        assert_eq!(
            decode_identifier(view.field("poll_id").unwrap()).unwrap(),
            "12"
        );
        assert_eq!(
            decode_optional(view.field("reward_per_vote").unwrap()).unwrap(),
            None
        );
    }
}
