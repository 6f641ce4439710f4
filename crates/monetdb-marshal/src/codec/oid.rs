//! Row-id formatting and parsing.
//!
//! Row ids travel to the host as strings of the form `"<n>@0"`.

use crate::traits::sealed::Atom;
use crate::{MarshalError, Result};

/// Size of the formatting buffer; fits `u64::MAX` plus the `@0` suffix.
pub const ROW_ID_BUFFER: usize = 32;

/// Textual form of the nil row id accepted by [`parse`].
pub const NIL_TEXT: &str = "nil";

/// Format a row id as `"<n>@0"`.
#[must_use]
pub fn format(id: u64) -> String {
    let mut out = String::with_capacity(ROW_ID_BUFFER);
    out.push_str(&id.to_string());
    out.push_str("@0");
    out
}

/// Parse a row id string.
///
/// Accepts `"<n>@0"`, a bare `"<n>"`, and `"nil"` (returned as `None`).
///
/// # Errors
///
/// Returns a malformed row-id error when the input has no valid numeric
/// prefix, carries any other suffix, or names the reserved nil value.
pub fn parse(input: &str) -> Result<Option<u64>> {
    if input == NIL_TEXT {
        return Ok(None);
    }
    let digits = input.strip_suffix("@0").unwrap_or(input);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MarshalError::malformed_row_id(input));
    }
    let id: u64 = digits
        .parse()
        .map_err(|_| MarshalError::malformed_row_id(input))?;
    if id.is_nil() || id > u64::NIL {
        return Err(MarshalError::malformed_row_id(input));
    }
    Ok(Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        assert_eq!(format(0), "0@0");
        assert_eq!(format(42), "42@0");
        assert!(format(u64::MAX).len() < ROW_ID_BUFFER);
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse("42@0").unwrap(), Some(42));
        assert_eq!(parse("7").unwrap(), Some(7));
        assert_eq!(parse("nil").unwrap(), None);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "@0", "abc", "12x@0", "-1@0", "1@1", " 1@0", "1@0 "] {
            assert!(parse(bad).unwrap_err().is_malformed_row_id(), "{bad}");
        }
    }

    #[test]
    fn test_parse_rejects_nil_value() {
        let nil = format(u64::NIL);
        assert!(parse(&nil).is_err());
        assert!(parse("99999999999999999999@0").is_err());
    }

    #[test]
    fn test_round_trip() {
        for s in ["0@0", "1@0", "123456789@0", "9223372036854775807@0"] {
            let id = parse(s).unwrap().unwrap();
            assert_eq!(format(id), s);
        }
    }
}
