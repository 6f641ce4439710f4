//! In-memory engine double.
//!
//! Statements are answered from a script registered per SQL text. Result
//! columns carry reference counts so tests can assert that every fix is
//! matched by an unfix, and column lookups and appends can be made to fail on
//! demand.

use std::collections::HashMap;
use std::sync::Arc;

use monetdb_marshal::Column;

use crate::engine::{
    ColumnDescription, ColumnId, ConnectionId, EngineError, EngineResult, QueryKind, QueryOutput,
    ResultId, StartupOptions, StorageEngine, TableColumn,
};

const DEFAULT_REPLY_SIZE: usize = 100;

/// Scripted answer to one statement.
#[derive(Debug, Clone)]
pub struct ScriptedResult {
    kind: QueryKind,
    affected_rows: i64,
    prepare_id: Option<i64>,
    columns: Vec<ScriptedColumn>,
}

#[derive(Debug, Clone)]
struct ScriptedColumn {
    name: String,
    sql_type: String,
    digits: u32,
    scale: u32,
    column: Arc<Column>,
}

impl ScriptedResult {
    const fn new(kind: QueryKind) -> Self {
        Self {
            kind,
            affected_rows: 0,
            prepare_id: None,
            columns: Vec::new(),
        }
    }

    /// Tabular output; add columns with [`ScriptedResult::column`].
    #[must_use]
    pub const fn table() -> Self {
        Self::new(QueryKind::Table)
    }

    /// Update touching `affected_rows` rows.
    #[must_use]
    pub const fn update(affected_rows: i64) -> Self {
        let mut result = Self::new(QueryKind::Update);
        result.affected_rows = affected_rows;
        result
    }

    /// Schema change.
    #[must_use]
    pub const fn schema() -> Self {
        Self::new(QueryKind::Schema)
    }

    /// Transaction control.
    #[must_use]
    pub const fn transaction() -> Self {
        Self::new(QueryKind::Transaction)
    }

    /// Prepared statement with id `id`; add parameter columns with
    /// [`ScriptedResult::column`].
    #[must_use]
    pub const fn prepare(id: i64) -> Self {
        let mut result = Self::new(QueryKind::Prepare);
        result.prepare_id = Some(id);
        result
    }

    /// Append an output column.
    #[must_use]
    pub fn column(mut self, name: &str, sql_type: &str, digits: u32, scale: u32, column: Column) -> Self {
        self.columns.push(ScriptedColumn {
            name: name.to_string(),
            sql_type: sql_type.to_string(),
            digits,
            scale,
            column: Arc::new(column),
        });
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct Session {
    autocommit: bool,
    reply_size: usize,
}

#[derive(Debug)]
struct ColumnSlot {
    column: Arc<Column>,
    fixes: usize,
}

#[derive(Debug, Default)]
struct MemoryTable {
    columns: Vec<TableColumn>,
    batches: Vec<Vec<Column>>,
}

/// Engine double holding everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    initialized: bool,
    startup_error: Option<String>,
    startup_options: Option<StartupOptions>,
    next_id: u64,
    sessions: HashMap<ConnectionId, Session>,
    scripts: HashMap<String, ScriptedResult>,
    results: HashMap<ResultId, Vec<ColumnId>>,
    columns: HashMap<ColumnId, ColumnSlot>,
    tables: HashMap<(String, String), MemoryTable>,
    lookups_before_failure: Option<usize>,
    append_error: Option<String>,
    cleanups: usize,
    closed_results: Vec<i64>,
    released_prepared: Vec<i64>,
}

impl MemoryEngine {
    /// Create a stopped engine with no scripts or tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next startup fail with `message`.
    #[must_use]
    pub fn failing_startup(mut self, message: impl Into<String>) -> Self {
        self.startup_error = Some(message.into());
        self
    }

    /// Answer `sql` with `result`.
    pub fn script(&mut self, sql: &str, result: ScriptedResult) {
        self.scripts.insert(sql.to_string(), result);
    }

    /// Fail the column lookup that follows `successes` more successful ones.
    pub fn fail_column_lookup(&mut self, successes: usize) {
        self.lookups_before_failure = Some(successes);
    }

    /// Register a table.
    pub fn create_table(&mut self, schema: &str, name: &str, columns: Vec<TableColumn>) {
        self.tables.insert(
            (schema.to_string(), name.to_string()),
            MemoryTable {
                columns,
                batches: Vec::new(),
            },
        );
    }

    /// Make the next append fail with `message`.
    pub fn fail_next_append(&mut self, message: impl Into<String>) {
        self.append_error = Some(message.into());
    }

    /// Options of the last successful startup.
    #[must_use]
    pub const fn startup_options(&self) -> Option<&StartupOptions> {
        self.startup_options.as_ref()
    }

    /// Open sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Reply size of a session.
    #[must_use]
    pub fn reply_size(&self, connection: ConnectionId) -> Option<usize> {
        self.sessions.get(&connection).map(|s| s.reply_size)
    }

    /// References currently held on column `id`.
    #[must_use]
    pub fn fix_count(&self, id: ColumnId) -> usize {
        self.columns.get(&id).map_or(0, |slot| slot.fixes)
    }

    /// References currently held across all columns.
    #[must_use]
    pub fn outstanding_fixes(&self) -> usize {
        self.columns.values().map(|slot| slot.fixes).sum()
    }

    /// Number of `cleanup_result` calls.
    #[must_use]
    pub const fn cleanups(&self) -> usize {
        self.cleanups
    }

    /// Statement outputs not yet cleaned up.
    #[must_use]
    pub fn live_results(&self) -> usize {
        self.results.len()
    }

    /// Ids passed to `close_result`.
    #[must_use]
    pub fn closed_results(&self) -> &[i64] {
        &self.closed_results
    }

    /// Ids passed to `release_prepared`.
    #[must_use]
    pub fn released_prepared(&self) -> &[i64] {
        &self.released_prepared
    }

    /// Column batches appended to a table.
    #[must_use]
    pub fn appended(&self, schema: &str, name: &str) -> &[Vec<Column>] {
        self.tables
            .get(&(schema.to_string(), name.to_string()))
            .map(|table| table.batches.as_slice())
            .unwrap_or_default()
    }

    /// Rows appended to a table.
    #[must_use]
    pub fn appended_rows(&self, schema: &str, name: &str) -> usize {
        self.appended(schema, name)
            .iter()
            .filter_map(|batch| batch.first().map(Column::count))
            .sum()
    }

    const fn next_handle(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn session(&self, connection: ConnectionId) -> EngineResult<&Session> {
        self.sessions
            .get(&connection)
            .ok_or_else(|| EngineError::new(format!("MAL:session:!Connection {connection} not found")))
    }

    fn session_mut(&mut self, connection: ConnectionId) -> EngineResult<&mut Session> {
        self.sessions
            .get_mut(&connection)
            .ok_or_else(|| EngineError::new(format!("MAL:session:!Connection {connection} not found")))
    }
}

impl StorageEngine for MemoryEngine {
    fn startup(&mut self, options: &StartupOptions) -> EngineResult<()> {
        if let Some(message) = self.startup_error.take() {
            return Err(EngineError::new(message));
        }
        self.initialized = true;
        self.startup_options = Some(options.clone());
        Ok(())
    }

    fn shutdown(&mut self) -> EngineResult<()> {
        if !self.initialized {
            return Err(EngineError::new("MAL:shutdown:!engine not started"));
        }
        self.initialized = false;
        self.sessions.clear();
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn connect(&mut self) -> EngineResult<ConnectionId> {
        if !self.initialized {
            return Err(EngineError::new("MAL:connect:!engine not started"));
        }
        let id = self.next_handle();
        self.sessions.insert(
            id,
            Session {
                autocommit: true,
                reply_size: DEFAULT_REPLY_SIZE,
            },
        );
        Ok(id)
    }

    fn disconnect(&mut self, connection: ConnectionId) -> EngineResult<()> {
        self.sessions
            .remove(&connection)
            .map(|_| ())
            .ok_or_else(|| EngineError::new(format!("MAL:disconnect:!Connection {connection} not found")))
    }

    fn autocommit(&self, connection: ConnectionId) -> EngineResult<bool> {
        self.session(connection).map(|s| s.autocommit)
    }

    fn set_autocommit(&mut self, connection: ConnectionId, enabled: bool) -> EngineResult<()> {
        self.session_mut(connection)?.autocommit = enabled;
        Ok(())
    }

    fn set_reply_size(&mut self, connection: ConnectionId, size: usize) -> EngineResult<()> {
        self.session_mut(connection)?.reply_size = size;
        Ok(())
    }

    fn query(&mut self, connection: ConnectionId, sql: &str) -> EngineResult<QueryOutput> {
        self.session(connection)?;
        let script = self.scripts.get(sql.trim()).cloned().ok_or_else(|| {
            EngineError::new(format!(
                "SQLException:sql.execute:42000!syntax error in: \"{sql}\""
            ))
        })?;

        let result = self.next_handle();
        let mut ids = Vec::with_capacity(script.columns.len());
        let mut columns = Vec::with_capacity(script.columns.len());
        for scripted in script.columns {
            let id = self.next_handle();
            columns.push(ColumnDescription {
                name: scripted.name,
                sql_type: scripted.sql_type,
                digits: scripted.digits,
                scale: scripted.scale,
                id,
            });
            self.columns.insert(
                id,
                ColumnSlot {
                    column: scripted.column,
                    fixes: 0,
                },
            );
            ids.push(id);
        }
        let row_count = columns
            .first()
            .and_then(|c| self.columns.get(&c.id))
            .map_or(0, |slot| slot.column.count());
        self.results.insert(result, ids);

        Ok(QueryOutput {
            id: result,
            kind: script.kind,
            row_count,
            affected_rows: script.affected_rows,
            prepare_id: script.prepare_id,
            columns,
        })
    }

    fn cleanup_result(&mut self, result: ResultId) -> EngineResult<()> {
        self.cleanups += 1;
        let ids = self
            .results
            .remove(&result)
            .ok_or_else(|| EngineError::new(format!("MAL:cleanup:!Result {result} not found")))?;
        for id in ids {
            if self.fix_count(id) == 0 {
                self.columns.remove(&id);
            }
        }
        Ok(())
    }

    fn close_result(&mut self, connection: ConnectionId, id: i64) -> EngineResult<()> {
        self.session(connection)?;
        self.closed_results.push(id);
        Ok(())
    }

    fn release_prepared(&mut self, connection: ConnectionId, id: i64) -> EngineResult<()> {
        self.session(connection)?;
        self.released_prepared.push(id);
        Ok(())
    }

    fn table(&mut self, connection: ConnectionId, schema: &str, name: &str) -> EngineResult<Vec<TableColumn>> {
        self.session(connection)?;
        self.tables
            .get(&(schema.to_string(), name.to_string()))
            .map(|table| table.columns.clone())
            .ok_or_else(|| {
                EngineError::new(format!(
                    "SQLException:sql.get_table:42S02!Table missing {schema}.{name}"
                ))
            })
    }

    fn append(
        &mut self,
        connection: ConnectionId,
        schema: &str,
        name: &str,
        columns: Vec<Column>,
    ) -> EngineResult<()> {
        self.session(connection)?;
        if let Some(message) = self.append_error.take() {
            return Err(EngineError::new(message));
        }
        let table = self
            .tables
            .get_mut(&(schema.to_string(), name.to_string()))
            .ok_or_else(|| EngineError::new(format!("MAL:append:!Table missing {schema}.{name}")))?;
        if columns.len() != table.columns.len() {
            return Err(EngineError::new("MAL:append:!Column count mismatch"));
        }
        table.batches.push(columns);
        Ok(())
    }

    fn fix_column(&mut self, id: ColumnId) -> EngineResult<Arc<Column>> {
        if let Some(remaining) = self.lookups_before_failure {
            if remaining == 0 {
                self.lookups_before_failure = None;
                return Err(EngineError::new(format!("MAL:fix:!Could not find column {id}")));
            }
            self.lookups_before_failure = Some(remaining - 1);
        }
        let slot = self
            .columns
            .get_mut(&id)
            .ok_or_else(|| EngineError::new(format!("MAL:fix:!Could not find column {id}")))?;
        slot.fixes += 1;
        Ok(Arc::clone(&slot.column))
    }

    fn unfix_column(&mut self, id: ColumnId) {
        if let Some(slot) = self.columns.get_mut(&id) {
            slot.fixes = slot.fixes.saturating_sub(1);
        }
    }
}
