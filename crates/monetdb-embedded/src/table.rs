//! Table metadata and multi-column append.

use monetdb_marshal::types::HostKind;
use monetdb_marshal::{Column, HostRuntime, LogicalType, MALLOC_FAIL, MarshalConfig, store_objects, store_primitive};

use crate::connection::Connection;
use crate::engine::{StorageEngine, TableColumn};
use crate::error::{EmbeddedError, INCONSISTENT_ROWS, Result};

/// One host array passed to [`Table::append`].
///
/// Primitive arrays cannot hold nil; object arrays use `None` for nil.
#[derive(Debug)]
pub enum AppendArray<'a, O> {
    /// `boolean[]`
    Boolean(&'a [bool]),
    /// `byte[]`
    Byte(&'a [i8]),
    /// `short[]`
    Short(&'a [i16]),
    /// `int[]`
    Int(&'a [i32]),
    /// `long[]`
    Long(&'a [i64]),
    /// `float[]`
    Float(&'a [f32]),
    /// `double[]`
    Double(&'a [f64]),
    /// Array of boxed host objects of one class.
    Objects(HostKind, &'a [Option<O>]),
}

impl<O> AppendArray<'_, O> {
    /// Number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::Boolean(v) => v.len(),
            Self::Byte(v) => v.len(),
            Self::Short(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Long(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::Objects(_, v) => v.len(),
        }
    }

    /// Check if the array has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if this array can fill a column whose host kind is
    /// `kind`. Primitive kinds need a primitive array; object kinds need an
    /// object array of the same class.
    #[must_use]
    pub fn fits(&self, kind: HostKind) -> bool {
        match self {
            Self::Boolean(_) => kind == HostKind::Boolean,
            Self::Byte(_) => kind == HostKind::Byte,
            Self::Short(_) => kind == HostKind::Short,
            Self::Int(_) => kind == HostKind::Integer,
            Self::Long(_) => kind == HostKind::Long,
            Self::Float(_) => kind == HostKind::Float,
            Self::Double(_) => kind == HostKind::Double,
            Self::Objects(class, _) => *class == kind && !is_primitive(kind),
        }
    }
}

const fn is_primitive(kind: HostKind) -> bool {
    matches!(
        kind,
        HostKind::Boolean
            | HostKind::Byte
            | HostKind::Short
            | HostKind::Integer
            | HostKind::Long
            | HostKind::Float
            | HostKind::Double
    )
}

fn build<H: HostRuntime>(
    host: &mut H,
    ty: LogicalType,
    array: &AppendArray<'_, H::Object>,
    config: &MarshalConfig,
) -> Result<Column> {
    let column = match array {
        AppendArray::Boolean(v) => store_primitive(ty, *v, config),
        AppendArray::Byte(v) => store_primitive(ty, *v, config),
        AppendArray::Short(v) => store_primitive(ty, *v, config),
        AppendArray::Int(v) => store_primitive(ty, *v, config),
        AppendArray::Long(v) => store_primitive(ty, *v, config),
        AppendArray::Float(v) => store_primitive(ty, *v, config),
        AppendArray::Double(v) => store_primitive(ty, *v, config),
        AppendArray::Objects(_, v) => store_objects(host, ty, *v, config),
    }?;
    Ok(column)
}

/// Table `schema.name`, bound to a connection.
///
/// Metadata is read from the catalog on every call.
#[derive(Debug)]
pub struct Table<E: StorageEngine> {
    connection: Connection<E>,
    schema: String,
    name: String,
}

impl<E: StorageEngine> Table<E> {
    pub(crate) fn new(connection: Connection<E>, schema: &str, name: &str) -> Self {
        Self {
            connection,
            schema: schema.to_string(),
            name: name.to_string(),
        }
    }

    /// Schema name.
    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All column metadata, in column order.
    pub fn columns(&self) -> Result<Vec<TableColumn>> {
        self.connection
            .with_session(|engine, id| engine.table(id, &self.schema, &self.name))
    }

    /// Number of columns.
    pub fn column_count(&self) -> Result<usize> {
        Ok(self.columns()?.len())
    }

    /// Column names.
    pub fn column_names(&self) -> Result<Vec<String>> {
        Ok(self.columns()?.into_iter().map(|c| c.name).collect())
    }

    /// Engine SQL type names.
    pub fn sql_types(&self) -> Result<Vec<String>> {
        Ok(self.columns()?.into_iter().map(|c| c.sql_type).collect())
    }

    /// Logical types of the columns.
    ///
    /// # Errors
    ///
    /// Returns an unknown-type error if any column type has no mapping.
    pub fn logical_types(&self) -> Result<Vec<LogicalType>> {
        self.columns()?
            .iter()
            .map(|c| LogicalType::from_sql(&c.sql_type, c.digits, c.scale).map_err(EmbeddedError::from))
            .collect()
    }

    /// Declared digits.
    pub fn digits(&self) -> Result<Vec<u32>> {
        Ok(self.columns()?.iter().map(|c| c.digits).collect())
    }

    /// Declared scales.
    pub fn scales(&self) -> Result<Vec<u32>> {
        Ok(self.columns()?.iter().map(|c| c.scale).collect())
    }

    /// Nullability of each column.
    pub fn nullability(&self) -> Result<Vec<bool>> {
        Ok(self.columns()?.iter().map(|c| c.nullable).collect())
    }

    /// Default value expressions.
    pub fn default_values(&self) -> Result<Vec<Option<String>>> {
        Ok(self.columns()?.into_iter().map(|c| c.default).collect())
    }

    /// Column at 1-based `index`, `None` when out of range.
    pub fn column_by_index(&self, index: usize) -> Result<Option<TableColumn>> {
        let Some(position) = index.checked_sub(1) else {
            return Ok(None);
        };
        Ok(self.columns()?.into_iter().nth(position))
    }

    /// Column named `name`, `None` when absent.
    pub fn column_by_name(&self, name: &str) -> Result<Option<TableColumn>> {
        Ok(self.columns()?.into_iter().find(|c| c.name == name))
    }

    /// Append one array per column and return the number of rows appended.
    ///
    /// Every array must have the length of the first and fit its column's
    /// host representation. A new column is built from each array and the
    /// set is handed to the engine in one call; built columns are released on
    /// every path.
    ///
    /// # Errors
    ///
    /// Returns a programming error for a wrong array count, inconsistent
    /// lengths or a wrong array class, a data error when a value does not
    /// convert, and the engine's error when the append itself fails.
    pub fn append<H: HostRuntime>(&self, host: &mut H, arrays: &[AppendArray<'_, H::Object>]) -> Result<usize> {
        let columns = self.columns()?;
        if arrays.len() != columns.len() {
            return Err(EmbeddedError::programming(format!(
                "The table {}.{} has {} columns but {} arrays were given",
                self.schema,
                self.name,
                columns.len(),
                arrays.len()
            )));
        }
        let rows = arrays.first().map_or(0, AppendArray::len);
        let config = *self.connection.config();

        let mut built = Vec::new();
        built
            .try_reserve_exact(columns.len())
            .map_err(|_| EmbeddedError::OutOfMemory(MALLOC_FAIL.to_string()))?;
        for (index, (meta, array)) in columns.iter().zip(arrays).enumerate() {
            if array.len() != rows {
                return Err(EmbeddedError::programming(INCONSISTENT_ROWS));
            }
            let ty = LogicalType::from_sql(&meta.sql_type, meta.digits, meta.scale)?;
            let kind = ty.host_kind();
            if !array.fits(kind) {
                return Err(EmbeddedError::wrong_array_class(index + 1, kind.array_label()));
            }
            built.push(build(host, ty, array, &config)?);
        }

        self.connection
            .with_session(|engine, id| engine.append(id, &self.schema, &self.name, built))?;
        tracing::debug!(schema = %self.schema, table = %self.name, rows, "rows appended");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use bigdecimal::BigDecimal;
    use monetdb_marshal::types::HostValue;
    use monetdb_marshal::{NativeHost, read_value};
    use parking_lot::Mutex;

    use super::*;
    use crate::engine::{SharedEngine, StartupOptions};
    use crate::memory::MemoryEngine;

    fn column(name: &str, sql_type: &str, digits: u32, scale: u32) -> TableColumn {
        TableColumn {
            name: name.to_string(),
            sql_type: sql_type.to_string(),
            digits,
            scale,
            nullable: true,
            default: None,
        }
    }

    fn table() -> (SharedEngine<MemoryEngine>, Table<MemoryEngine>) {
        let mut engine = MemoryEngine::new();
        engine.startup(&StartupOptions::default()).unwrap();
        let mut id_column = column("id", "int", 32, 0);
        id_column.nullable = false;
        id_column.default = Some("next value for \"sys\".\"seq_1\"".to_string());
        engine.create_table(
            "sys",
            "items",
            vec![
                id_column,
                column("label", "varchar", 20, 0),
                column("price", "decimal", 9, 2),
            ],
        );
        let id = engine.connect().unwrap();
        let engine = Arc::new(Mutex::new(engine));
        let conn = Connection::new(id, Arc::clone(&engine), MarshalConfig::default());
        let table = conn.table("sys", "items").unwrap();
        (engine, table)
    }

    fn decimal(text: &str) -> Option<HostValue> {
        Some(HostValue::Decimal(BigDecimal::from_str(text).unwrap()))
    }

    #[test]
    fn test_metadata() {
        let (_engine, table) = table();
        assert_eq!(table.schema(), "sys");
        assert_eq!(table.name(), "items");
        assert_eq!(table.column_count().unwrap(), 3);
        assert_eq!(table.column_names().unwrap(), vec!["id", "label", "price"]);
        assert_eq!(table.sql_types().unwrap(), vec!["int", "varchar", "decimal"]);
        assert_eq!(table.digits().unwrap(), vec![32, 20, 9]);
        assert_eq!(table.scales().unwrap(), vec![0, 0, 2]);
        assert_eq!(table.nullability().unwrap(), vec![false, true, true]);
        assert!(table.default_values().unwrap()[0].is_some());
        assert_eq!(table.logical_types().unwrap()[1], LogicalType::String);
    }

    #[test]
    fn test_column_lookup() {
        let (_engine, table) = table();
        assert_eq!(table.column_by_index(1).unwrap().unwrap().name, "id");
        assert_eq!(table.column_by_index(3).unwrap().unwrap().name, "price");
        assert!(table.column_by_index(0).unwrap().is_none());
        assert!(table.column_by_index(4).unwrap().is_none());
        assert_eq!(table.column_by_name("label").unwrap().unwrap().digits, 20);
        assert!(table.column_by_name("missing").unwrap().is_none());
    }

    #[test]
    fn test_append() {
        let (engine, table) = table();
        let mut host = NativeHost::new();
        let labels = [Some(HostValue::String("a".into())), None];
        let prices = [decimal("1.5"), decimal("2.25")];
        let rows = table
            .append(
                &mut host,
                &[
                    AppendArray::Int(&[1, 2]),
                    AppendArray::Objects(HostKind::String, &labels),
                    AppendArray::Objects(HostKind::Decimal, &prices),
                ],
            )
            .unwrap();
        assert_eq!(rows, 2);

        let guard = engine.lock();
        assert_eq!(guard.appended_rows("sys", "items"), 2);
        let batch = &guard.appended("sys", "items")[0];
        assert!(batch[1].flags().nullable);
        assert_eq!(
            read_value(&batch[2], 0, &MarshalConfig::default()).unwrap(),
            decimal("1.50")
        );
    }

    #[test]
    fn test_append_inconsistent_rows() {
        let (engine, table) = table();
        let mut host = NativeHost::new();
        let labels = [Some(HostValue::String("a".into()))];
        let prices = [decimal("1"), decimal("2")];
        let err = table
            .append(
                &mut host,
                &[
                    AppendArray::Int(&[1, 2]),
                    AppendArray::Objects(HostKind::String, &labels),
                    AppendArray::Objects(HostKind::Decimal, &prices),
                ],
            )
            .unwrap_err();
        assert_eq!(err.message(), INCONSISTENT_ROWS);
        assert_eq!(engine.lock().appended_rows("sys", "items"), 0);
    }

    #[test]
    fn test_append_wrong_class() {
        let (_engine, table) = table();
        let mut host = NativeHost::new();
        let labels = [Some(HostValue::Integer(1))];
        let prices = [decimal("1")];
        let err = table
            .append(
                &mut host,
                &[
                    AppendArray::Int(&[1]),
                    AppendArray::Objects(HostKind::Integer, &labels),
                    AppendArray::Objects(HostKind::Decimal, &prices),
                ],
            )
            .unwrap_err();
        assert_eq!(err.message(), "The array at column 2 must be a java.lang.String array!");

        let err = table
            .append(
                &mut host,
                &[
                    AppendArray::Long(&[1]),
                    AppendArray::Objects(HostKind::String, &[None]),
                    AppendArray::Objects(HostKind::Decimal, &prices),
                ],
            )
            .unwrap_err();
        assert_eq!(err.message(), "The array at column 1 must be a int array!");
    }

    #[test]
    fn test_append_wrong_array_count() {
        let (_engine, table) = table();
        let mut host = NativeHost::new();
        let err = table.append(&mut host, &[AppendArray::Int(&[1])]).unwrap_err();
        assert!(matches!(err, EmbeddedError::Programming(_)));
    }

    #[test]
    fn test_append_engine_failure_is_trimmed() {
        let (engine, table) = table();
        engine.lock().fail_next_append("MAL:append:!Table is read only");
        let mut host = NativeHost::new();
        let err = table
            .append(
                &mut host,
                &[
                    AppendArray::Int(&[1]),
                    AppendArray::Objects(HostKind::String, &[None]),
                    AppendArray::Objects(HostKind::Decimal, &[decimal("1")]),
                ],
            )
            .unwrap_err();
        assert_eq!(err.message(), "Table is read only");
        assert_eq!(engine.lock().appended_rows("sys", "items"), 0);
    }

    #[test]
    fn test_append_value_failure() {
        let (_engine, table) = table();
        let mut host = NativeHost::new();
        let err = table
            .append(
                &mut host,
                &[
                    AppendArray::Int(&[1]),
                    AppendArray::Objects(HostKind::String, &[None]),
                    AppendArray::Objects(HostKind::Decimal, &[decimal("123456789")]),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, EmbeddedError::Data(_)));
    }

    #[test]
    fn test_fits() {
        let objects: [Option<HostValue>; 0] = [];
        assert!(AppendArray::<HostValue>::Boolean(&[]).fits(HostKind::Boolean));
        assert!(!AppendArray::<HostValue>::Int(&[]).fits(HostKind::Long));
        assert!(!AppendArray::Objects(HostKind::Integer, &objects).fits(HostKind::Integer));
        assert!(AppendArray::Objects(HostKind::Timestamp, &objects).fits(HostKind::Timestamp));
    }
}
