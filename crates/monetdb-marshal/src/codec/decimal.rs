//! Canonical decimal formatting and parsing.
//!
//! Decimals are stored as scaled integers. [`format`] and [`parse`] define
//! the canonical text form. Host values are read back through [`format`];
//! [`from_host`] rescales the host value directly, since its text form may
//! use exponent notation that [`parse`] rejects.

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};

use crate::types::DecimalSpec;
use crate::{MarshalError, Result};

/// Render a scaled integer as a decimal string with `scale` fraction digits.
///
/// `format(-5, 2)` is `"-0.05"`, `format(1234, 0)` is `"1234"`.
#[must_use]
pub fn format(value: i64, scale: u8) -> String {
    if scale == 0 {
        return value.to_string();
    }
    let scale = usize::from(scale);
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + scale + 3);
    if value < 0 {
        out.push('-');
    }
    if digits.len() <= scale {
        out.push_str("0.");
        out.extend(std::iter::repeat_n('0', scale - digits.len()));
        out.push_str(&digits);
    } else {
        let (int_part, frac_part) = digits.split_at(digits.len() - scale);
        out.push_str(int_part);
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Parse a decimal string into a scaled integer with `scale` fraction digits.
///
/// Missing fraction digits are padded with zeros. Extra fraction digits are
/// rejected rather than rounded.
///
/// # Errors
///
/// Returns a malformed-decimal error on anything but `[+-]digits[.digits]`
/// or when the value does not fit 64 bits.
pub fn parse(input: &str, scale: u8) -> Result<i64> {
    let (negative, body) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(MarshalError::malformed_decimal(input, "no digits"));
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(MarshalError::malformed_decimal(input, "unexpected character"));
    }
    let scale = usize::from(scale);
    if frac_part.len() > scale {
        return Err(MarshalError::malformed_decimal(
            input,
            format!("more than {scale} fraction digits"),
        ));
    }

    let overflow = || MarshalError::malformed_decimal(input, "out of range");
    let mut acc: i128 = 0;
    for b in int_part.bytes().chain(frac_part.bytes()) {
        acc = acc
            .checked_mul(10)
            .and_then(|v| v.checked_add(i128::from(b - b'0')))
            .ok_or_else(overflow)?;
    }
    for _ in frac_part.len()..scale {
        acc = acc.checked_mul(10).ok_or_else(overflow)?;
    }
    if negative {
        acc = -acc;
    }
    i64::try_from(acc).map_err(|_| overflow())
}

/// Convert a stored decimal to the host's arbitrary-precision type.
///
/// # Errors
///
/// Returns a value conversion error if the canonical string is rejected.
pub fn to_host(value: i64, scale: u8) -> Result<BigDecimal> {
    let text = format(value, scale);
    BigDecimal::from_str(&text).map_err(|e| MarshalError::value_conversion("decimal", e.to_string()))
}

/// Convert a host decimal to the scaled integer of `spec`.
///
/// The value is first rescaled to the column scale with `mode`. For any value
/// whose canonical text [`parse`] accepts, the result equals parsing it.
///
/// # Errors
///
/// Returns a decimal overflow error if the rescaled value has more digits
/// than the column precision.
pub fn from_host(value: &BigDecimal, spec: DecimalSpec, mode: RoundingMode) -> Result<i64> {
    let scaled = value.with_scale_round(i64::from(spec.scale()), mode);
    let (unscaled, _) = scaled.as_bigint_and_exponent();
    let limit = BigInt::from(10_u8).pow(u32::from(spec.precision()));
    if unscaled.abs() >= limit {
        return Err(MarshalError::decimal_overflow(spec.precision(), spec.scale()));
    }
    unscaled
        .to_i64()
        .ok_or_else(|| MarshalError::decimal_overflow(spec.precision(), spec.scale()))
}
