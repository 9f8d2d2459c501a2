//! # Token Amounts
//!
//! Decimal strings ⇄ `nat` counts of the token's smallest unit.
//!
//! All arithmetic is integer arithmetic on the digit string; no float ever
//! touches an amount. With 8 decimals, `"1.5"` becomes `150_000_000` and
//! `150_000_000` renders back as `"1.5"`.

use crate::errors::CodecError;
use crate::value::WireValue;
use primitive_types::U256;

/// Largest `decimals` the codec accepts. `10^36` leaves over 40 digits of
/// headroom in a `U256` for the whole-token part.
pub const MAX_DECIMALS: u8 = 36;

fn pow10(decimals: u8) -> Result<U256, CodecError> {
    if decimals > MAX_DECIMALS {
        return Err(CodecError::UnsupportedDecimals(decimals));
    }
    let mut scale = U256::one();
    for _ in 0..decimals {
        scale = scale
            .checked_mul(U256::from(10u8))
            .ok_or(CodecError::UnsupportedDecimals(decimals))?;
    }
    Ok(scale)
}

/// Parse a non-negative decimal amount into smallest units.
pub fn parse_amount(input: &str, decimals: u8) -> Result<U256, CodecError> {
    let scale = pow10(decimals)?;
    let text = input.trim();
    let invalid = |reason: &'static str| CodecError::InvalidAmount {
        input: text.to_string(),
        reason,
    };

    if text.starts_with('-') {
        return Err(CodecError::NegativeAmount(text.to_string()));
    }
    if text.is_empty() {
        return Err(invalid("empty"));
    }

    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text, None),
    };

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("integer part must be decimal digits"));
    }
    let fraction = match fraction {
        Some(f) if f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit()) => {
            return Err(invalid("fraction must be decimal digits"))
        }
        Some(f) => f.trim_end_matches('0'),
        None => "",
    };
    if fraction.len() > usize::from(decimals) {
        return Err(CodecError::FractionalUnits {
            input: text.to_string(),
            decimals,
        });
    }

    let overflow = || CodecError::AmountOverflow(text.to_string());
    let whole_units = U256::from_dec_str(whole).map_err(|_| overflow())?;
    let fraction_units = if fraction.is_empty() {
        U256::zero()
    } else {
        // Right-pad to the full unit width: "5" with 8 decimals is 50_000_000
        let padded = format!("{:0<width$}", fraction, width = usize::from(decimals));
        U256::from_dec_str(&padded).map_err(|_| overflow())?
    };

    whole_units
        .checked_mul(scale)
        .and_then(|units| units.checked_add(fraction_units))
        .ok_or_else(overflow)
}

/// Encode a decimal amount as a wire `nat`.
pub fn encode_amount(input: &str, decimals: u8) -> Result<WireValue, CodecError> {
    parse_amount(input, decimals).map(WireValue::Nat)
}

/// Encode an amount already expressed in smallest units.
pub fn encode_amount_units(units: u128) -> WireValue {
    WireValue::Nat(U256::from(units))
}

/// Render smallest units as the canonical decimal string: no leading zeros,
/// no trailing fractional zeros, no `.` for whole amounts.
pub fn format_amount(units: U256, decimals: u8) -> Result<String, CodecError> {
    let scale = pow10(decimals)?;
    let whole = units / scale;
    let remainder = units % scale;
    if remainder.is_zero() {
        return Ok(whole.to_string());
    }
    let fraction = format!(
        "{:0>width$}",
        remainder.to_string(),
        width = usize::from(decimals)
    );
    Ok(format!("{}.{}", whole, fraction.trim_end_matches('0')))
}

/// Decode a wire `nat` into a decimal amount string.
pub fn decode_amount(value: &WireValue, decimals: u8) -> Result<String, CodecError> {
    format_amount(value.as_nat()?, decimals)
}
