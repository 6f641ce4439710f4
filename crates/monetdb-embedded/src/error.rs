//! Error types surfaced to the host.
//!
//! Every variant corresponds to one host-visible exception class:
//! - `Interface`: closed connections, database lifecycle misuse
//! - `Programming`: queries or appends of the wrong shape
//! - `Engine`: messages raised by the storage engine, marker-trimmed
//! - `Data`: value conversion failures while marshalling
//! - `OutOfMemory`: allocation failures
//! - `Config`: configuration loading and logging setup

use monetdb_marshal::MarshalError;
use thiserror::Error;

use crate::engine::EngineError;

/// Use of a connection after `close`.
pub const CONNECTION_CLOSED: &str = "Connection already closed?";
/// A query expected to return rows did not.
pub const NO_RESULT_SET: &str = "The query did not produce a result set";
/// A prepare produced something other than a statement.
pub const NO_PREPARED_STATEMENT: &str = "The query did not produce a prepared statement";
/// A tabular result with zero columns.
pub const NO_COLUMNS: &str = "There query returned no results?";
/// Second start of the engine in one process.
pub const ALREADY_RUNNING: &str = "Only one MonetDB Embedded database is allowed per process";
/// Stop of an engine that is not running.
pub const NOT_RUNNING: &str = "The MonetDB Embedded database is not running";
/// Append arrays of different lengths.
pub const INCONSISTENT_ROWS: &str = "The row sizes between columns are not consistent";

/// Embedded database error.
#[derive(Debug, Error)]
pub enum EmbeddedError {
    /// Connection or database state error.
    #[error("InterfaceError: {0}")]
    Interface(String),

    /// Statement or append input of the wrong shape.
    #[error("ProgrammingError: {0}")]
    Programming(String),

    /// Message raised by the storage engine.
    #[error("EngineError: {0}")]
    Engine(String),

    /// Value conversion failure.
    #[error("DataError: {0}")]
    Data(String),

    /// Allocation failure.
    #[error("OutOfMemoryError: {0}")]
    OutOfMemory(String),

    /// Configuration error.
    #[error("ConfigError: {0}")]
    Config(String),
}

impl EmbeddedError {
    /// Create an interface error.
    #[must_use]
    pub fn interface(msg: impl Into<String>) -> Self {
        Self::Interface(msg.into())
    }

    /// Create a programming error.
    #[must_use]
    pub fn programming(msg: impl Into<String>) -> Self {
        Self::Programming(msg.into())
    }

    /// Create an engine error from a raw engine message.
    #[must_use]
    pub fn engine(raw: &str) -> Self {
        Self::Engine(normalize_engine_message(raw).to_string())
    }

    /// Create a data error.
    #[must_use]
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Error for any operation on a closed connection.
    #[must_use]
    pub fn connection_closed() -> Self {
        Self::interface(CONNECTION_CLOSED)
    }

    /// Error for an append array whose class does not match its column.
    #[must_use]
    pub fn wrong_array_class(column: usize, class: &str) -> Self {
        Self::programming(format!("The array at column {column} must be a {class} array!"))
    }

    /// Message shown to the host, without the class prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Interface(msg)
            | Self::Programming(msg)
            | Self::Engine(msg)
            | Self::Data(msg)
            | Self::OutOfMemory(msg)
            | Self::Config(msg) => msg,
        }
    }
}

/// Strip the engine's exception prefix.
///
/// Engine messages look like `module:function:!text`. Only the text after
/// the first `!` is shown; a message without `!` is shown as is.
#[must_use]
pub fn normalize_engine_message(raw: &str) -> &str {
    raw.find('!').map_or(raw, |pos| &raw[pos + 1..])
}

impl From<EngineError> for EmbeddedError {
    fn from(err: EngineError) -> Self {
        Self::engine(err.message())
    }
}

impl From<MarshalError> for EmbeddedError {
    fn from(err: MarshalError) -> Self {
        if err.is_out_of_memory() {
            Self::OutOfMemory(err.to_string())
        } else {
            Self::Data(err.to_string())
        }
    }
}

/// Result type for embedded database operations.
pub type Result<T> = std::result::Result<T, EmbeddedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_with_marker() {
        assert_eq!(
            normalize_engine_message("SQLException:sql.execute:42000!syntax error"),
            "syntax error"
        );
    }

    #[test]
    fn test_normalize_first_marker_only() {
        assert_eq!(normalize_engine_message("MAL:a:!b!c"), "b!c");
    }

    #[test]
    fn test_normalize_without_marker() {
        assert_eq!(normalize_engine_message("plain message"), "plain message");
        assert_eq!(normalize_engine_message(""), "");
        assert_eq!(normalize_engine_message("trailing!"), "");
    }

    #[test]
    fn test_engine_error_is_normalized() {
        let err = EmbeddedError::from(EngineError::new("MAL:append:!table is locked"));
        assert!(matches!(err, EmbeddedError::Engine(_)));
        assert_eq!(err.message(), "table is locked");
    }

    #[test]
    fn test_fixed_messages() {
        assert_eq!(EmbeddedError::connection_closed().message(), CONNECTION_CLOSED);
        assert_eq!(
            EmbeddedError::wrong_array_class(2, "java.lang.String").message(),
            "The array at column 2 must be a java.lang.String array!"
        );
    }

    #[test]
    fn test_marshal_error_mapping() {
        let oom = EmbeddedError::from(MarshalError::out_of_memory("heap"));
        assert!(matches!(oom, EmbeddedError::OutOfMemory(_)));
        let bad = EmbeddedError::from(MarshalError::malformed_row_id("x@0"));
        assert!(matches!(bad, EmbeddedError::Data(_)));
        assert!(bad.message().contains("Wrong OID format"));
    }

    #[test]
    fn test_display_has_class_prefix() {
        let err = EmbeddedError::programming(NO_RESULT_SET);
        assert_eq!(
            err.to_string(),
            "ProgrammingError: The query did not produce a result set"
        );
    }
}
