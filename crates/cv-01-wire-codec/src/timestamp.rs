//! # Timestamps
//!
//! ISO-8601 instant ⇄ `nat64` nanoseconds since epoch.
//!
//! ```text
//! "2024-01-01T00:00:00.000Z"  ⇄  1_704_067_200_000_000_000
//! ```
//!
//! Millisecond-aligned values render with exactly three fractional digits;
//! anything finer renders with nine, so `encode(decode(wire)) == wire` for
//! every `nat64`.

use crate::errors::CodecError;
use crate::value::WireValue;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use shared_types::{Timestamp, NANOS_PER_MILLI};

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Parse an ISO-8601 instant into wire nanoseconds.
pub fn encode_timestamp(iso: &str) -> Result<WireValue, CodecError> {
    parse_timestamp(iso).map(|ts| WireValue::Nat64(ts.as_nanos()))
}

/// Parse an ISO-8601 instant into a [`Timestamp`].
///
/// Accepts RFC 3339 instants with any offset, and bare `YYYY-MM-DD` dates
/// (midnight UTC).
pub fn parse_timestamp(iso: &str) -> Result<Timestamp, CodecError> {
    let input = iso.trim();
    let instant = match DateTime::parse_from_rfc3339(input) {
        Ok(parsed) => parsed.with_timezone(&Utc),
        Err(rfc_err) => match NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            Ok(date) => date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc())
                .ok_or_else(|| CodecError::TimestampOutOfRange(input.to_string()))?,
            Err(_) => {
                return Err(CodecError::InvalidTimestamp {
                    input: input.to_string(),
                    reason: rfc_err.to_string(),
                })
            }
        },
    };

    let out_of_range = || CodecError::TimestampOutOfRange(input.to_string());
    let secs = u64::try_from(instant.timestamp()).map_err(|_| out_of_range())?;
    let nanos = secs
        .checked_mul(NANOS_PER_SEC)
        .and_then(|n| n.checked_add(u64::from(instant.timestamp_subsec_nanos())))
        .ok_or_else(out_of_range)?;
    Ok(Timestamp::from_nanos(nanos))
}

/// Render wire nanoseconds as an ISO-8601 instant.
pub fn decode_timestamp(value: &WireValue) -> Result<String, CodecError> {
    format_timestamp(Timestamp::from_nanos(value.as_nat64()?))
}

/// Render a [`Timestamp`] as `YYYY-MM-DDTHH:MM:SS.mmmZ`, or with nine
/// fractional digits when it is not millisecond-aligned.
pub fn format_timestamp(ts: Timestamp) -> Result<String, CodecError> {
    let nanos = ts.as_nanos();
    let secs = i64::try_from(nanos / NANOS_PER_SEC)
        .map_err(|_| CodecError::TimestampOutOfRange(ts.to_string()))?;
    // Remainder is below 10^9
    let subsec = (nanos % NANOS_PER_SEC) as u32;
    let instant: DateTime<Utc> = DateTime::from_timestamp(secs, subsec)
        .ok_or_else(|| CodecError::TimestampOutOfRange(ts.to_string()))?;
    let precision = if nanos % NANOS_PER_MILLI == 0 {
        SecondsFormat::Millis
    } else {
        SecondsFormat::Nanos
    };
    Ok(instant.to_rfc3339_opts(precision, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_year_2024() {
        let encoded = encode_timestamp("2024-01-01T00:00:00.000Z").unwrap();
        assert_eq!(encoded, WireValue::Nat64(1_704_067_200_000_000_000));
        assert_eq!(
            decode_timestamp(&encoded).unwrap(),
            "2024-01-01T00:00:00.000Z"
        );
    }

    #[test]
    fn test_offset_normalized_to_utc() {
        let encoded = encode_timestamp("2024-01-01T02:00:00.000+02:00").unwrap();
        assert_eq!(encoded, WireValue::Nat64(1_704_067_200_000_000_000));
    }

    #[test]
    fn test_date_only_is_midnight_utc() {
        assert_eq!(
            encode_timestamp("2024-01-01").unwrap(),
            WireValue::Nat64(1_704_067_200_000_000_000)
        );
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            encode_timestamp("next tuesday"),
            Err(CodecError::InvalidTimestamp { .. })
        ));
        assert!(matches!(
            encode_timestamp("2024-02-30T00:00:00Z"),
            Err(CodecError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn test_pre_epoch_rejected() {
        assert!(matches!(
            encode_timestamp("1969-12-31T23:59:59.999Z"),
            Err(CodecError::TimestampOutOfRange(_))
        ));
    }

    #[test]
    fn test_beyond_nat64_rejected() {
        assert!(matches!(
            encode_timestamp("2600-01-01T00:00:00Z"),
            Err(CodecError::TimestampOutOfRange(_))
        ));
    }

    #[test]
    fn test_sub_millisecond_wire_value_survives_decode() {
        let wire = WireValue::Nat64(1_704_067_200_000_999_999);
        let iso = decode_timestamp(&wire).unwrap();
        assert_eq!(iso, "2024-01-01T00:00:00.000999999Z");
        assert_eq!(encode_timestamp(&iso).unwrap(), wire);
    }

    #[test]
    fn test_nanosecond_input_digits_kept() {
        assert_eq!(
            encode_timestamp("2024-01-01T00:00:00.123456789Z").unwrap(),
            WireValue::Nat64(1_704_067_200_123_456_789)
        );
        assert_eq!(
            encode_timestamp("2024-01-01T00:00:00.5Z").unwrap(),
            WireValue::Nat64(1_704_067_200_500_000_000)
        );
    }

    #[test]
    fn test_decode_requires_nat64() {
        assert!(decode_timestamp(&WireValue::Nat32(1)).is_err());
    }

    proptest! {
        // Up to year 2500, inside nat64 nanosecond range
        #[test]
        fn prop_roundtrip_to_millisecond(millis in 0u64..16_725_225_600_000) {
            let iso = format_timestamp(Timestamp::from_millis(millis)).unwrap();
            let encoded = encode_timestamp(&iso).unwrap();
            prop_assert_eq!(&encoded, &WireValue::Nat64(millis * NANOS_PER_MILLI));
            prop_assert_eq!(decode_timestamp(&encoded).unwrap(), iso);
        }

        #[test]
        fn prop_wire_roundtrip_is_exact(nanos in 0u64..16_725_225_600_000_000_000) {
            let wire = WireValue::Nat64(nanos);
            let iso = decode_timestamp(&wire).unwrap();
            prop_assert_eq!(encode_timestamp(&iso).unwrap(), wire);
        }
    }
}
