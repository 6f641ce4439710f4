//! Result-set lifecycle.
//!
//! A [`ResultSet`] binds a statement output to its columns. Every column is
//! fixed eagerly when the set is created; if any fix fails, the columns fixed
//! so far are released and the output is cleaned up before the error is
//! returned. Freeing consumes the set, so a freed set cannot be read.

use std::sync::Arc;

use arrow_array::RecordBatch;
use monetdb_marshal::{
    Column, HostContext, HostRuntime, LogicalType, MALLOC_FAIL, MarshalConfig, Primitive, PrimitiveArray,
    columns_to_record_batch, fetch, probe,
};
use monetdb_marshal::types::HostValue;

use crate::engine::{ColumnDescription, ColumnGuard, QueryOutput, ResultId, SharedEngine, StorageEngine};
use crate::error::{EmbeddedError, Result};

#[derive(Debug)]
struct BoundColumn<E: StorageEngine> {
    name: String,
    sql_type: String,
    logical: LogicalType,
    digits: u32,
    scale: u32,
    guard: ColumnGuard<E>,
}

impl<E: StorageEngine> BoundColumn<E> {
    fn bind(engine: &SharedEngine<E>, description: &ColumnDescription) -> Result<Self> {
        let logical = LogicalType::from_sql(&description.sql_type, description.digits, description.scale)?;
        let guard = ColumnGuard::acquire(engine, description.id)?;
        Ok(Self {
            name: description.name.clone(),
            sql_type: description.sql_type.clone(),
            logical,
            digits: description.digits,
            scale: description.scale,
            guard,
        })
    }
}

/// Rows of one statement output.
#[derive(Debug)]
pub struct ResultSet<E: StorageEngine> {
    engine: SharedEngine<E>,
    result: ResultId,
    row_count: usize,
    columns: Vec<BoundColumn<E>>,
    config: MarshalConfig,
    released: bool,
}

impl<E: StorageEngine> ResultSet<E> {
    /// Bind `output`, fixing every column.
    ///
    /// An output without columns binds to an empty set. On failure nothing
    /// stays fixed and `output` is cleaned up.
    ///
    /// # Errors
    ///
    /// Returns an unknown-type error for an unmapped column type, or the
    /// engine's error when a column cannot be fixed.
    pub fn create(engine: &SharedEngine<E>, output: QueryOutput, config: MarshalConfig) -> Result<Self> {
        let mut columns = Vec::new();
        if columns.try_reserve_exact(output.columns.len()).is_err() {
            discard_output(engine, output.id);
            return Err(EmbeddedError::OutOfMemory(MALLOC_FAIL.to_string()));
        }
        for description in &output.columns {
            match BoundColumn::bind(engine, description) {
                Ok(column) => columns.push(column),
                Err(err) => {
                    drop(columns);
                    discard_output(engine, output.id);
                    return Err(err);
                }
            }
        }

        tracing::debug!(
            result = output.id,
            columns = columns.len(),
            rows = output.row_count,
            "result set created"
        );
        Ok(Self {
            engine: Arc::clone(engine),
            result: output.id,
            row_count: output.row_count,
            columns,
            config,
            released: false,
        })
    }

    /// Release every column and the statement output.
    ///
    /// # Errors
    ///
    /// Returns the engine's error if the output cannot be cleaned up. The
    /// columns are released regardless.
    pub fn free(mut self) -> Result<()> {
        self.released = true;
        self.columns.clear();
        let cleaned = self.engine.lock().cleanup_result(self.result);
        tracing::debug!(result = self.result, "result set freed");
        cleaned.map_err(EmbeddedError::from)
    }

    /// Engine handle of the statement output.
    #[must_use]
    pub const fn id(&self) -> ResultId {
        self.result
    }

    /// Number of rows.
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column labels.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Engine SQL type names.
    #[must_use]
    pub fn sql_types(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.sql_type.as_str()).collect()
    }

    /// Logical types, as mapped from the SQL type names.
    #[must_use]
    pub fn logical_types(&self) -> Vec<LogicalType> {
        self.columns.iter().map(|c| c.logical).collect()
    }

    /// Host-visible type ids.
    #[must_use]
    pub fn type_ids(&self) -> Vec<i32> {
        self.columns.iter().map(|c| c.logical.type_id()).collect()
    }

    /// Declared digits.
    #[must_use]
    pub fn digits(&self) -> Vec<u32> {
        self.columns.iter().map(|c| c.digits).collect()
    }

    /// Declared scales.
    #[must_use]
    pub fn scales(&self) -> Vec<u32> {
        self.columns.iter().map(|c| c.scale).collect()
    }

    /// Column at 0-based `index`.
    ///
    /// # Errors
    ///
    /// Returns a programming error when `index` is out of range.
    pub fn column(&self, index: usize) -> Result<&Column> {
        self.columns
            .get(index)
            .map(|c| c.guard.column())
            .ok_or_else(|| {
                EmbeddedError::programming(format!(
                    "column index {index} out of range for {} columns",
                    self.columns.len()
                ))
            })
    }

    /// Nil bitmap of `size` rows of column `index` starting at `first`.
    pub fn probe_nulls(&self, index: usize, first: usize, size: usize) -> Result<Vec<bool>> {
        Ok(probe::probe_nulls(self.column(index)?, first, size)?)
    }

    /// Value at `row` of column `index`, `None` for nil.
    pub fn read_value(&self, index: usize, row: usize) -> Result<Option<HostValue>> {
        Ok(fetch::read_value(self.column(index)?, row, &self.config)?)
    }

    /// Host object at `row` of column `index`, `None` for nil.
    pub fn fetch_scalar<H: HostRuntime>(
        &self,
        host: &mut H,
        context: &HostContext<H>,
        index: usize,
        row: usize,
    ) -> Result<Option<H::Object>> {
        Ok(fetch::fetch_scalar(host, context, self.column(index)?, row, &self.config)?)
    }

    /// Copy `size` rows of column `index` starting at `first` into a
    /// primitive array.
    pub fn fetch_flat<P, D>(&self, index: usize, first: usize, size: usize, dst: &mut D) -> Result<()>
    where
        P: Primitive,
        D: PrimitiveArray<P> + ?Sized,
    {
        Ok(fetch::fetch_flat(self.column(index)?, first, size, dst)?)
    }

    /// Fill `out` with host objects from column `index` starting at `first`.
    pub fn fetch_objects<H: HostRuntime>(
        &self,
        host: &mut H,
        context: &HostContext<H>,
        index: usize,
        first: usize,
        out: &mut [Option<H::Object>],
    ) -> Result<()> {
        Ok(fetch::fetch_objects(host, context, self.column(index)?, first, out, &self.config)?)
    }

    /// All columns as one Arrow record batch.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let fields: Vec<(&str, &Column)> = self
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.guard.column()))
            .collect();
        Ok(columns_to_record_batch(&fields)?)
    }
}

impl<E: StorageEngine> Drop for ResultSet<E> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.columns.clear();
        discard_output(&self.engine, self.result);
    }
}

/// Clean up an output whose error, if any, cannot be returned.
pub(crate) fn discard_output<E: StorageEngine>(engine: &SharedEngine<E>, result: ResultId) {
    if let Err(err) = engine.lock().cleanup_result(result) {
        tracing::warn!(result, error = %err, "failed to clean up query output");
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use arrow_array::Array;
    use bigdecimal::BigDecimal;
    use monetdb_marshal::{NativeHost, store_primitive, store_values};
    use parking_lot::Mutex;

    use super::*;
    use crate::engine::{ConnectionId, StartupOptions};
    use crate::memory::{MemoryEngine, ScriptedResult};

    fn ints(values: &[i32]) -> Column {
        store_primitive(LogicalType::Int, values, &MarshalConfig::default()).unwrap()
    }

    fn started() -> (SharedEngine<MemoryEngine>, ConnectionId) {
        let mut engine = MemoryEngine::new();
        engine.startup(&StartupOptions::default()).unwrap();
        let conn = engine.connect().unwrap();
        (Arc::new(Mutex::new(engine)), conn)
    }

    fn run(engine: &SharedEngine<MemoryEngine>, conn: ConnectionId, sql: &str, script: ScriptedResult) -> QueryOutput {
        let mut guard = engine.lock();
        guard.script(sql, script);
        guard.query(conn, sql).unwrap()
    }

    fn three_columns() -> ScriptedResult {
        ScriptedResult::table()
            .column("a", "int", 32, 0, ints(&[5, i32::MIN, 3]))
            .column("b", "int", 32, 0, ints(&[1, 2, 3]))
            .column("c", "int", 32, 0, ints(&[7, 8, 9]))
    }

    #[test]
    fn test_create_fixes_every_column() {
        let (engine, conn) = started();
        let output = run(&engine, conn, "q", three_columns());
        let set = ResultSet::create(&engine, output, MarshalConfig::default()).unwrap();
        assert_eq!(set.column_count(), 3);
        assert_eq!(set.row_count(), 3);
        assert_eq!(engine.lock().outstanding_fixes(), 3);

        set.free().unwrap();
        let guard = engine.lock();
        assert_eq!(guard.outstanding_fixes(), 0);
        assert_eq!(guard.live_results(), 0);
        assert_eq!(guard.cleanups(), 1);
    }

    #[test]
    fn test_create_rolls_back_on_second_column() {
        let (engine, conn) = started();
        let output = run(&engine, conn, "q", three_columns());
        engine.lock().fail_column_lookup(1);

        let err = ResultSet::create(&engine, output, MarshalConfig::default()).unwrap_err();
        assert!(matches!(err, EmbeddedError::Engine(_)));
        assert!(err.message().starts_with("Could not find column"));
        let guard = engine.lock();
        assert_eq!(guard.outstanding_fixes(), 0);
        assert_eq!(guard.live_results(), 0);
        assert_eq!(guard.cleanups(), 1);
    }

    #[test]
    fn test_create_rolls_back_on_unknown_type() {
        let (engine, conn) = started();
        let script = ScriptedResult::table()
            .column("a", "int", 32, 0, ints(&[1]))
            .column("g", "geometry", 0, 0, ints(&[1]));
        let output = run(&engine, conn, "q", script);

        let err = ResultSet::create(&engine, output, MarshalConfig::default()).unwrap_err();
        assert!(err.message().contains("Unknown MonetDB type"));
        assert_eq!(engine.lock().outstanding_fixes(), 0);
        assert_eq!(engine.lock().live_results(), 0);
    }

    #[test]
    fn test_free_without_columns_releases_output() {
        let (engine, conn) = started();
        let output = run(&engine, conn, "q", ScriptedResult::table());
        let set = ResultSet::create(&engine, output, MarshalConfig::default()).unwrap();
        assert_eq!(set.column_count(), 0);
        assert_eq!(set.row_count(), 0);
        assert_eq!(engine.lock().live_results(), 1);

        set.free().unwrap();
        assert_eq!(engine.lock().cleanups(), 1);
        assert_eq!(engine.lock().live_results(), 0);
    }

    #[test]
    fn test_drop_without_columns_releases_output() {
        let (engine, conn) = started();
        let output = run(&engine, conn, "q", ScriptedResult::table());
        drop(ResultSet::create(&engine, output, MarshalConfig::default()).unwrap());
        assert_eq!(engine.lock().cleanups(), 1);
        assert_eq!(engine.lock().live_results(), 0);
    }

    #[test]
    fn test_drop_releases_like_free() {
        let (engine, conn) = started();
        let output = run(&engine, conn, "q", three_columns());
        let set = ResultSet::create(&engine, output, MarshalConfig::default()).unwrap();
        drop(set);
        assert_eq!(engine.lock().outstanding_fixes(), 0);
        assert_eq!(engine.lock().cleanups(), 1);
    }

    #[test]
    fn test_metadata() {
        let (engine, conn) = started();
        let decimals = store_values(
            LogicalType::from_sql("decimal", 9, 2).unwrap(),
            &[Some(HostValue::Decimal(BigDecimal::from_str("1.25").unwrap()))],
            &MarshalConfig::default(),
        )
        .unwrap();
        let script = ScriptedResult::table()
            .column("id", "int", 32, 0, ints(&[1]))
            .column("price", "decimal", 9, 2, decimals);
        let output = run(&engine, conn, "q", script);
        let set = ResultSet::create(&engine, output, MarshalConfig::default()).unwrap();

        assert_eq!(set.column_names(), vec!["id", "price"]);
        assert_eq!(set.sql_types(), vec!["int", "decimal"]);
        assert_eq!(set.type_ids(), vec![4, 13]);
        assert_eq!(set.digits(), vec![32, 9]);
        assert_eq!(set.scales(), vec![0, 2]);
        assert_eq!(
            set.read_value(1, 0).unwrap(),
            Some(HostValue::Decimal(BigDecimal::from_str("1.25").unwrap()))
        );
        assert!(set.column(2).is_err());
    }

    #[test]
    fn test_fetch_delegations_agree() {
        let (engine, conn) = started();
        let output = run(&engine, conn, "q", three_columns());
        let set = ResultSet::create(&engine, output, MarshalConfig::default()).unwrap();

        let mut host = NativeHost::new();
        let context = HostContext::initialize(&mut host).unwrap();
        let nulls = set.probe_nulls(0, 0, 3).unwrap();
        assert_eq!(nulls, vec![false, true, false]);

        let mut objects = vec![None; 3];
        set.fetch_objects(&mut host, &context, 0, 0, &mut objects).unwrap();
        for (row, object) in objects.iter().enumerate() {
            assert_eq!(object, &set.fetch_scalar(&mut host, &context, 0, row).unwrap());
        }

        let mut flat = vec![0_i32; 3];
        set.fetch_flat(1, 0, 3, &mut flat).unwrap();
        assert_eq!(flat, vec![1, 2, 3]);
    }

    #[test]
    fn test_record_batch() {
        let (engine, conn) = started();
        let output = run(&engine, conn, "q", three_columns());
        let set = ResultSet::create(&engine, output, MarshalConfig::default()).unwrap();
        let batch = set.to_record_batch().unwrap();
        assert_eq!(batch.num_rows(), 3);
        assert_eq!(batch.num_columns(), 3);
        assert!(batch.column(0).is_null(1));
        assert_eq!(batch.schema().field(2).name(), "c");
    }
}
