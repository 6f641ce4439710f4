//! Temporal conversions between stored values and host epoch milliseconds.
//!
//! Stored representations:
//!
//! | Type | Stored as |
//! |------|-----------|
//! | date | `i32` days since 1970-01-01 |
//! | time | `i64` microseconds since midnight |
//! | timestamp | `i64` microseconds since 1970-01-01T00:00 |
//!
//! The host side counts milliseconds with a fixed-length year of
//! 365.25 days, and its constructors apply a clock bias that every time and
//! timestamp conversion subtracts on fetch and adds back on store.

use crate::{MarshalError, Result};

/// Milliseconds in one day.
pub const MS_PER_DAY: i64 = 86_400_000;

/// Milliseconds in one host year (365.25 days).
pub const MS_PER_YEAR: i64 = 31_557_600_000;

/// Microseconds in one day.
pub const US_PER_DAY: i64 = 86_400_000_000;

/// Default host clock bias in milliseconds.
pub const DEFAULT_HOST_BIAS_MS: i64 = 3_600_000;

const EPOCH_YEAR: i64 = 1970;

/// Days since 1970-01-01 of a proleptic Gregorian date.
#[must_use]
pub const fn days_from_ymd(year: i64, month: u32, day: u32) -> i64 {
    // https://howardhinnant.github.io/date_algorithms.html
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = if month > 2 { month - 3 } else { month + 9 } as i64;
    let doy = (153 * mp + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Proleptic Gregorian `(year, month, day)` of a day count since 1970-01-01.
#[must_use]
pub const fn ymd_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}

/// Year and 1-based day of year of a day count since 1970-01-01.
#[must_use]
pub const fn day_of_year(days: i64) -> (i64, i64) {
    let (year, _, _) = ymd_from_days(days);
    (year, days - days_from_ymd(year, 1, 1) + 1)
}

/// Host milliseconds of a stored date.
#[must_use]
pub const fn date_to_host_ms(days: i32) -> i64 {
    let (year, doy) = day_of_year(days as i64);
    (doy - 1) * MS_PER_DAY + (year - EPOCH_YEAR) * MS_PER_YEAR
}

/// Stored date of host milliseconds.
///
/// # Errors
///
/// Returns a value conversion error if the date leaves the 32-bit day range.
pub fn host_ms_to_date(ms: i64) -> Result<i32> {
    let days = days_of_host_ms(ms);
    i32::try_from(days).map_err(|_| MarshalError::value_conversion("date", "out of range"))
}

/// Host milliseconds of a stored time of day.
#[must_use]
pub const fn time_to_host_ms(micros: i64, bias_ms: i64) -> i64 {
    micros / 1000 - bias_ms
}

/// Stored time of day of host milliseconds.
///
/// # Errors
///
/// Returns a value conversion error if the unbiased value is not within one
/// day.
pub fn host_ms_to_time(ms: i64, bias_ms: i64) -> Result<i64> {
    let micros = ms
        .checked_add(bias_ms)
        .and_then(|v| v.checked_mul(1000))
        .filter(|v| (0..US_PER_DAY).contains(v))
        .ok_or_else(|| MarshalError::value_conversion("time", format!("{ms} ms is not a time of day")))?;
    Ok(micros)
}

/// Host milliseconds of a stored timestamp.
#[must_use]
pub const fn timestamp_to_host_ms(micros: i64, bias_ms: i64) -> i64 {
    let days = micros.div_euclid(US_PER_DAY);
    let daytime = micros.rem_euclid(US_PER_DAY);
    let (year, doy) = day_of_year(days);
    (doy - 1) * MS_PER_DAY + (year - EPOCH_YEAR) * MS_PER_YEAR + daytime / 1000 - bias_ms
}

/// Stored timestamp of host milliseconds.
///
/// # Errors
///
/// Returns a value conversion error if the result leaves the 64-bit
/// microsecond range.
pub fn host_ms_to_timestamp(ms: i64, bias_ms: i64) -> Result<i64> {
    let overflow = || MarshalError::value_conversion("timestamp", "out of range");
    let shifted = ms.checked_add(bias_ms).ok_or_else(overflow)?;
    let days = days_of_host_ms(shifted);
    let daytime = shifted.rem_euclid(MS_PER_YEAR) % MS_PER_DAY;
    days.checked_mul(US_PER_DAY)
        .and_then(|v| v.checked_add(daytime * 1000))
        .ok_or_else(overflow)
}

fn days_of_host_ms(ms: i64) -> i64 {
    let year = EPOCH_YEAR + ms.div_euclid(MS_PER_YEAR);
    let doy0 = ms.rem_euclid(MS_PER_YEAR) / MS_PER_DAY;
    days_from_ymd(year, 1, 1) + doy0
}
