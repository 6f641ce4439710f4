//! Connection command forwarder.
//!
//! A [`Connection`] forwards statements and session commands to the engine.
//! Its state is shared between clones via `Arc<Mutex>`, so closing one clone
//! closes them all, and every later command fails with
//! `Connection already closed?`.

use std::sync::Arc;

use monetdb_marshal::MarshalConfig;
use parking_lot::Mutex;

use crate::engine::{ConnectionId, EngineResult, QueryKind, QueryOutput, SharedEngine, StorageEngine};
use crate::error::{EmbeddedError, NO_COLUMNS, NO_PREPARED_STATEMENT, NO_RESULT_SET, Result};
use crate::resultset::{ResultSet, discard_output};
use crate::table::Table;

/// Update count reported for a schema change.
pub const SCHEMA_CHANGE_COUNT: i64 = -2;

/// Update count reported for any other statement without a row count.
pub const NO_UPDATE_COUNT: i64 = -1;

/// Shared connection state.
pub type SharedConnection = Arc<Mutex<ConnectionInner>>;

/// Internal connection state.
#[derive(Debug)]
pub enum ConnectionInner {
    /// Open session.
    Connected(ConnectionId),
    /// Closed.
    Disconnected,
}

/// Outcome of [`Connection::execute_prepared`].
#[derive(Debug)]
pub enum ExecOutcome<E: StorageEngine> {
    /// The statement produced rows.
    ResultSet(ResultSet<E>),
    /// The statement produced an update count.
    UpdateCount(i64),
}

/// A prepared statement and the result set describing its parameters.
#[derive(Debug)]
pub struct PreparedStatement<E: StorageEngine> {
    id: i64,
    parameters: ResultSet<E>,
}

impl<E: StorageEngine> PreparedStatement<E> {
    /// Engine statement id.
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    /// Parameter description.
    #[must_use]
    pub const fn parameters(&self) -> &ResultSet<E> {
        &self.parameters
    }

    /// Take the parameter description.
    #[must_use]
    pub fn into_parameters(self) -> ResultSet<E> {
        self.parameters
    }
}

/// Connection to an embedded database.
#[derive(Debug)]
pub struct Connection<E: StorageEngine> {
    inner: SharedConnection,
    engine: SharedEngine<E>,
    config: MarshalConfig,
}

impl<E: StorageEngine> Clone for Connection<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            engine: Arc::clone(&self.engine),
            config: self.config,
        }
    }
}

impl<E: StorageEngine> Connection<E> {
    pub(crate) fn new(id: ConnectionId, engine: SharedEngine<E>, config: MarshalConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ConnectionInner::Connected(id))),
            engine,
            config,
        }
    }

    pub(crate) fn shared(&self) -> SharedConnection {
        Arc::clone(&self.inner)
    }

    /// Run `f` against the engine with this connection's session id.
    ///
    /// The connection lock is held for the whole call, then the engine lock.
    pub(crate) fn with_session<T>(&self, f: impl FnOnce(&mut E, ConnectionId) -> EngineResult<T>) -> Result<T> {
        let guard = self.inner.lock();
        match *guard {
            ConnectionInner::Connected(id) => Ok(f(&mut *self.engine.lock(), id)?),
            ConnectionInner::Disconnected => Err(EmbeddedError::connection_closed()),
        }
    }

    /// Marshalling configuration used by result sets and appends.
    #[must_use]
    pub const fn config(&self) -> &MarshalConfig {
        &self.config
    }

    /// Check if the connection has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(*self.inner.lock(), ConnectionInner::Disconnected)
    }

    /// Autocommit flag of the session.
    pub fn autocommit(&self) -> Result<bool> {
        self.with_session(|engine, id| engine.autocommit(id))
    }

    /// Set the autocommit flag of the session.
    pub fn set_autocommit(&self, enabled: bool) -> Result<()> {
        self.with_session(|engine, id| engine.set_autocommit(id, enabled))
    }

    /// Set the number of rows the engine materializes per block.
    pub fn set_reply_size(&self, size: usize) -> Result<()> {
        self.with_session(|engine, id| engine.set_reply_size(id, size))
    }

    /// Release prepared statement `statement`.
    pub fn release_prepared(&self, statement: i64) -> Result<()> {
        self.with_session(|engine, id| engine.release_prepared(id, statement))
    }

    /// Close result `result` on the session side.
    pub fn close_result(&self, result: i64) -> Result<()> {
        self.with_session(|engine, id| engine.close_result(id, result))
    }

    fn execute(&self, sql: &str) -> Result<QueryOutput> {
        self.with_session(|engine, id| engine.query(id, sql))
    }

    fn cleanup(&self, output: &QueryOutput) -> Result<()> {
        self.engine.lock().cleanup_result(output.id)?;
        Ok(())
    }

    /// Run a query and bind its rows.
    ///
    /// # Errors
    ///
    /// Returns a programming error when the statement does not produce rows
    /// or produces a table without columns.
    pub fn query(&self, sql: &str) -> Result<ResultSet<E>> {
        let output = self.execute(sql)?;
        if !output.kind.is_tabular() {
            discard_output(&self.engine, output.id);
            return Err(EmbeddedError::programming(NO_RESULT_SET));
        }
        self.bind_columns(output)
    }

    fn bind_columns(&self, output: QueryOutput) -> Result<ResultSet<E>> {
        if output.columns.is_empty() {
            discard_output(&self.engine, output.id);
            return Err(EmbeddedError::programming(NO_COLUMNS));
        }
        ResultSet::create(&self.engine, output, self.config)
    }

    /// Run a statement and return its update count.
    ///
    /// Returns the affected rows for an update, [`SCHEMA_CHANGE_COUNT`] for a
    /// schema change and [`NO_UPDATE_COUNT`] otherwise.
    pub fn update(&self, sql: &str) -> Result<i64> {
        let output = self.execute(sql)?;
        let count = update_count(&output);
        self.cleanup(&output)?;
        Ok(count)
    }

    /// Prepare a statement.
    ///
    /// # Errors
    ///
    /// Returns a programming error when the statement is not a prepare.
    pub fn prepare(&self, sql: &str) -> Result<PreparedStatement<E>> {
        let output = self.execute(sql)?;
        let id = match (output.kind, output.prepare_id) {
            (QueryKind::Prepare, Some(id)) => id,
            _ => {
                discard_output(&self.engine, output.id);
                return Err(EmbeddedError::programming(NO_PREPARED_STATEMENT));
            }
        };
        let parameters = self.bind_columns(output)?;
        Ok(PreparedStatement { id, parameters })
    }

    /// Execute a prepared statement call, returning rows or an update count.
    pub fn execute_prepared(&self, sql: &str) -> Result<ExecOutcome<E>> {
        let output = self.execute(sql)?;
        if output.kind == QueryKind::Table {
            return ResultSet::create(&self.engine, output, self.config).map(ExecOutcome::ResultSet);
        }
        let count = update_count(&output);
        self.cleanup(&output)?;
        Ok(ExecOutcome::UpdateCount(count))
    }

    /// Run a statement and discard its output.
    pub fn execute_and_ignore(&self, sql: &str) -> Result<()> {
        let output = self.execute(sql)?;
        self.cleanup(&output)
    }

    /// Bind table `schema.name`.
    ///
    /// # Errors
    ///
    /// Returns the engine's error when the table does not exist.
    pub fn table(&self, schema: &str, name: &str) -> Result<Table<E>> {
        self.with_session(|engine, id| engine.table(id, schema, name))?;
        Ok(Table::new(self.clone(), schema, name))
    }

    /// Close the session. Closing a closed connection does nothing.
    pub fn close(&self) -> Result<()> {
        let mut guard = self.inner.lock();
        if let ConnectionInner::Connected(id) = *guard {
            *guard = ConnectionInner::Disconnected;
            self.engine.lock().disconnect(id)?;
            tracing::debug!(connection = id, "connection closed");
        }
        Ok(())
    }
}

const fn update_count(output: &QueryOutput) -> i64 {
    match output.kind {
        QueryKind::Update => output.affected_rows,
        QueryKind::Schema => SCHEMA_CHANGE_COUNT,
        _ => NO_UPDATE_COUNT,
    }
}
