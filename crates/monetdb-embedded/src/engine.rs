//! Storage engine seam.
//!
//! [`StorageEngine`] is everything this crate needs from the embedded
//! engine: lifecycle, sessions, statement execution, table lookup and append,
//! and reference-counted access to result columns. Column references are
//! taken through [`ColumnGuard`], which releases its reference when dropped.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use monetdb_marshal::Column;
use parking_lot::Mutex;
use thiserror::Error;

/// Engine session handle.
pub type ConnectionId = u64;

/// Engine column handle.
pub type ColumnId = u64;

/// Engine query-result handle.
pub type ResultId = u64;

/// Engine shared by a database and all of its connections.
pub type SharedEngine<E> = Arc<Mutex<E>>;

/// Raw engine message, in the engine's `module:function:!text` convention.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineError {
    message: String,
}

impl EngineError {
    /// Wrap an engine message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The untrimmed message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result of an engine call.
pub type EngineResult<T> = Result<T, EngineError>;

/// Shape of a statement's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Rows from a query.
    Table,
    /// Row count of an insert, update or delete.
    Update,
    /// Schema change.
    Schema,
    /// Transaction control.
    Transaction,
    /// Prepared statement.
    Prepare,
    /// Continuation block of an earlier table.
    Block,
}

impl QueryKind {
    /// Returns true if the output carries rows.
    #[must_use]
    pub const fn is_tabular(self) -> bool {
        matches!(self, Self::Table | Self::Block)
    }
}

/// One column of a statement's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescription {
    /// Column label.
    pub name: String,
    /// Engine SQL type name.
    pub sql_type: String,
    /// Declared digits.
    pub digits: u32,
    /// Declared scale.
    pub scale: u32,
    /// Handle used to fix the column.
    pub id: ColumnId,
}

/// Output of one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutput {
    /// Handle released by [`StorageEngine::cleanup_result`].
    pub id: ResultId,
    /// Output shape.
    pub kind: QueryKind,
    /// Rows in a tabular output.
    pub row_count: usize,
    /// Rows touched by an update.
    pub affected_rows: i64,
    /// Statement id of a prepare.
    pub prepare_id: Option<i64>,
    /// Columns of a tabular output.
    pub columns: Vec<ColumnDescription>,
}

/// Options passed to [`StorageEngine::startup`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupOptions {
    /// Database farm directory, `None` for an in-memory database.
    pub directory: Option<PathBuf>,
    /// Suppress engine console output.
    pub silent: bool,
    /// Run the engine's execution pipeline sequentially.
    pub sequential: bool,
}

/// Catalog entry for one table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumn {
    /// Column name.
    pub name: String,
    /// Engine SQL type name.
    pub sql_type: String,
    /// Declared digits.
    pub digits: u32,
    /// Declared scale.
    pub scale: u32,
    /// Whether the column accepts nil.
    pub nullable: bool,
    /// Default value expression.
    pub default: Option<String>,
}

/// Embedded storage engine.
pub trait StorageEngine: Send + fmt::Debug {
    /// Start the engine.
    fn startup(&mut self, options: &StartupOptions) -> EngineResult<()>;

    /// Stop the engine.
    fn shutdown(&mut self) -> EngineResult<()>;

    /// Returns true between a successful startup and shutdown.
    fn is_initialized(&self) -> bool;

    /// Open a session.
    fn connect(&mut self) -> EngineResult<ConnectionId>;

    /// Close a session.
    fn disconnect(&mut self, connection: ConnectionId) -> EngineResult<()>;

    /// Autocommit flag of a session.
    fn autocommit(&self, connection: ConnectionId) -> EngineResult<bool>;

    /// Set the autocommit flag of a session.
    fn set_autocommit(&mut self, connection: ConnectionId, enabled: bool) -> EngineResult<()>;

    /// Set the number of rows the engine materializes per block.
    fn set_reply_size(&mut self, connection: ConnectionId, size: usize) -> EngineResult<()>;

    /// Execute one statement.
    fn query(&mut self, connection: ConnectionId, sql: &str) -> EngineResult<QueryOutput>;

    /// Release a statement output.
    fn cleanup_result(&mut self, result: ResultId) -> EngineResult<()>;

    /// Close a result kept open on the session side.
    fn close_result(&mut self, connection: ConnectionId, id: i64) -> EngineResult<()>;

    /// Release a prepared statement.
    fn release_prepared(&mut self, connection: ConnectionId, id: i64) -> EngineResult<()>;

    /// Catalog columns of `schema.name`, in column order.
    fn table(&mut self, connection: ConnectionId, schema: &str, name: &str) -> EngineResult<Vec<TableColumn>>;

    /// Append one new column per table column.
    fn append(
        &mut self,
        connection: ConnectionId,
        schema: &str,
        name: &str,
        columns: Vec<Column>,
    ) -> EngineResult<()>;

    /// Take a reference to a column.
    fn fix_column(&mut self, id: ColumnId) -> EngineResult<Arc<Column>>;

    /// Drop a reference taken by [`StorageEngine::fix_column`].
    fn unfix_column(&mut self, id: ColumnId);
}

/// A fixed column, unfixed on drop.
pub struct ColumnGuard<E: StorageEngine> {
    engine: SharedEngine<E>,
    id: ColumnId,
    column: Arc<Column>,
}

impl<E: StorageEngine> ColumnGuard<E> {
    /// Fix column `id`.
    ///
    /// The engine lock is held only for the fix itself.
    pub fn acquire(engine: &SharedEngine<E>, id: ColumnId) -> EngineResult<Self> {
        let fixed = engine.lock().fix_column(id);
        let column = fixed?;
        Ok(Self {
            engine: Arc::clone(engine),
            id,
            column,
        })
    }

    /// Engine handle of the column.
    #[must_use]
    pub const fn id(&self) -> ColumnId {
        self.id
    }

    /// The column.
    #[must_use]
    pub fn column(&self) -> &Column {
        &self.column
    }
}

impl<E: StorageEngine> Drop for ColumnGuard<E> {
    fn drop(&mut self) {
        self.engine.lock().unfix_column(self.id);
    }
}

impl<E: StorageEngine> fmt::Debug for ColumnGuard<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnGuard")
            .field("id", &self.id)
            .field("rows", &self.column.count())
            .finish_non_exhaustive()
    }
}
