//! Embedded MonetDB database access built on column marshalling.
//!
//! This crate drives an embedded engine through the [`StorageEngine`] seam
//! and turns its outputs into [`ResultSet`]s whose columns are read with
//! `monetdb-marshal`.
//!
//! # Features
//!
//! - Single database instance per process with explicit start and stop
//! - Connections that forward statements and session commands
//! - Result sets that pin their columns and release them deterministically
//! - Table metadata and multi-column append from host arrays
//! - Configuration from TOML files and environment variables
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "test-utils")]
//! # fn main() -> monetdb_embedded::Result<()> {
//! use std::sync::Arc;
//!
//! use monetdb_embedded::memory::{MemoryEngine, ScriptedResult};
//! use monetdb_embedded::{Database, EmbeddedConfig};
//! use parking_lot::Mutex;
//!
//! let engine = Arc::new(Mutex::new(MemoryEngine::new()));
//! engine.lock().script("create table t (i int)", ScriptedResult::schema());
//!
//! let db = Database::start(engine, &EmbeddedConfig::builder().in_memory().build()?)?;
//! let conn = db.connect()?;
//! assert_eq!(conn.update("create table t (i int)")?, -2);
//! conn.close()?;
//! db.stop()?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "test-utils"))]
//! # fn main() {}
//! ```
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod connection;
pub mod database;
pub mod engine;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod observability;
pub mod resultset;
pub mod table;

// Re-export main types for convenience
pub use config::{EmbeddedConfig, EmbeddedConfigBuilder, TelemetryConfig, load_config, load_config_from_path};
pub use connection::{Connection, ExecOutcome, NO_UPDATE_COUNT, PreparedStatement, SCHEMA_CHANGE_COUNT};
pub use database::Database;
pub use engine::{
    ColumnDescription, ColumnGuard, EngineError, QueryKind, QueryOutput, SharedEngine, StartupOptions,
    StorageEngine, TableColumn,
};
pub use error::{EmbeddedError, Result, normalize_engine_message};
pub use observability::init_logging;
pub use resultset::ResultSet;
pub use table::{AppendArray, Table};
