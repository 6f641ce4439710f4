//! Error hierarchy for monetdb-marshal.
//!
//! Follows the "canonical error struct" pattern: callers classify failures
//! through `is_xxx()` methods instead of matching on the internal `ErrorKind`.

use std::collections::TryReserveError;

use thiserror::Error;

/// Message used by the engine for every allocation failure.
pub const MALLOC_FAIL: &str = "Could not allocate space";

/// Root error type for column marshalling.
///
/// Every failure of a fetch, probe or store operation is reported through
/// this type. A null value is never an error: fetch operations return
/// `Ok(None)` for nil rows.
///
/// # Example
///
/// ```rust,ignore
/// use monetdb_marshal::MarshalError;
///
/// fn handle_error(err: MarshalError) {
///     if err.is_out_of_memory() {
///         eprintln!("allocation failed");
///     } else if err.is_malformed_row_id() {
///         eprintln!("bad row id");
///     }
/// }
/// ```
#[derive(Error, Debug)]
#[error("{kind}")]
pub struct MarshalError {
    kind: ErrorKind,
}

/// Internal error classification.
///
/// This enum is `pub(crate)` to allow adding variants without breaking changes.
/// External code should use the `is_xxx()` predicate methods instead.
#[derive(Error, Debug)]
#[non_exhaustive]
pub(crate) enum ErrorKind {
    /// Allocation of a column, heap payload or staging buffer failed.
    #[error("Could not allocate space ({context})")]
    OutOfMemory { context: &'static str },

    /// A row-id string did not parse.
    #[error("Wrong OID format: {input}")]
    MalformedRowId { input: String },

    /// A decimal string did not parse for the declared scale.
    #[error("invalid decimal '{input}': {message}")]
    MalformedDecimal { input: String, message: String },

    /// Decimal value does not fit the column storage width.
    #[error("decimal overflow: precision {precision}, scale {scale}")]
    DecimalOverflow { precision: u8, scale: u8 },

    /// A type the layer has no mapping for.
    #[error("Unknown MonetDB type: {name}")]
    UnknownType { name: String },

    /// Requested representation does not match the column's storage.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Value conversion failure for a specific logical type.
    #[error("value conversion failed for {target}: {message}")]
    ValueConversion { target: String, message: String },

    /// The host runtime refused to construct or expose an object.
    #[error("host object failure: {message}")]
    Host { message: String },

    /// Row position outside the column.
    #[error("row range {first}..{end} out of bounds for {count} rows")]
    RowOutOfRange {
        first: usize,
        end: usize,
        count: usize,
    },

    /// Error from Arrow library operations.
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),
}

impl MarshalError {
    // ═══════════════════════════════════════════════════════════════════════
    // Constructors
    // ═══════════════════════════════════════════════════════════════════════

    /// Create error for an allocation failure.
    #[must_use]
    pub const fn out_of_memory(context: &'static str) -> Self {
        Self {
            kind: ErrorKind::OutOfMemory { context },
        }
    }

    /// Create error for a row-id string that does not parse.
    #[must_use]
    pub fn malformed_row_id(input: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::MalformedRowId {
                input: input.into(),
            },
        }
    }

    /// Create error for a decimal string that does not parse.
    #[must_use]
    pub fn malformed_decimal(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::MalformedDecimal {
                input: input.into(),
                message: message.into(),
            },
        }
    }

    /// Create error for decimal overflow.
    #[must_use]
    pub const fn decimal_overflow(precision: u8, scale: u8) -> Self {
        Self {
            kind: ErrorKind::DecimalOverflow { precision, scale },
        }
    }

    /// Create error for an unmapped type.
    #[must_use]
    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::UnknownType { name: name.into() },
        }
    }

    /// Create error for a representation mismatch.
    #[must_use]
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::TypeMismatch {
                expected: expected.into(),
                actual: actual.into(),
            },
        }
    }

    /// Create error for value conversion failure.
    #[must_use]
    pub fn value_conversion(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::ValueConversion {
                target: target.into(),
                message: message.into(),
            },
        }
    }

    /// Create error for a host runtime failure.
    #[must_use]
    pub fn host(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Host {
                message: message.into(),
            },
        }
    }

    /// Create error for an out-of-bounds row range.
    #[must_use]
    pub const fn row_out_of_range(first: usize, end: usize, count: usize) -> Self {
        Self {
            kind: ErrorKind::RowOutOfRange { first, end, count },
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Predicate Methods (is_xxx)
    // ═══════════════════════════════════════════════════════════════════════

    /// Returns true if this is an allocation failure.
    #[must_use]
    pub const fn is_out_of_memory(&self) -> bool {
        matches!(self.kind, ErrorKind::OutOfMemory { .. })
    }

    /// Returns true if a row-id failed to parse.
    #[must_use]
    pub const fn is_malformed_row_id(&self) -> bool {
        matches!(self.kind, ErrorKind::MalformedRowId { .. })
    }

    /// Returns true if a decimal string failed to parse.
    #[must_use]
    pub const fn is_malformed_decimal(&self) -> bool {
        matches!(self.kind, ErrorKind::MalformedDecimal { .. })
    }

    /// Returns true if this is a decimal overflow error.
    #[must_use]
    pub const fn is_decimal_overflow(&self) -> bool {
        matches!(self.kind, ErrorKind::DecimalOverflow { .. })
    }

    /// Returns true if this is an unknown type error.
    #[must_use]
    pub const fn is_unknown_type(&self) -> bool {
        matches!(self.kind, ErrorKind::UnknownType { .. })
    }

    /// Returns true if this is a type mismatch error.
    #[must_use]
    pub const fn is_type_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::TypeMismatch { .. })
    }

    /// Returns true if this is a value conversion error.
    #[must_use]
    pub const fn is_value_conversion(&self) -> bool {
        matches!(self.kind, ErrorKind::ValueConversion { .. })
    }

    /// Returns true if the host runtime failed.
    #[must_use]
    pub const fn is_host_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Host { .. })
    }

    /// Returns true if a row range was out of bounds.
    #[must_use]
    pub const fn is_row_out_of_range(&self) -> bool {
        matches!(self.kind, ErrorKind::RowOutOfRange { .. })
    }

    /// Returns true if this is an Arrow library error.
    #[must_use]
    pub const fn is_arrow_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Arrow(_))
    }

    /// Malformed-input errors are those caused by the caller's data.
    #[must_use]
    pub const fn is_malformed_input(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::MalformedRowId { .. }
                | ErrorKind::MalformedDecimal { .. }
                | ErrorKind::TypeMismatch { .. }
        )
    }
}

impl From<arrow_schema::ArrowError> for MarshalError {
    fn from(err: arrow_schema::ArrowError) -> Self {
        Self {
            kind: ErrorKind::Arrow(err),
        }
    }
}

/// Map a failed `try_reserve` to an out-of-memory error.
pub(crate) fn reserve_failed(context: &'static str) -> impl Fn(TryReserveError) -> MarshalError {
    move |_| MarshalError::out_of_memory(context)
}

/// Result type alias for marshalling operations.
pub type Result<T> = std::result::Result<T, MarshalError>;
