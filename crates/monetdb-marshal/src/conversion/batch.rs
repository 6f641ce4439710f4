//! Column to Arrow conversion.
//!
//! Converts whole columns into Arrow arrays with validity taken from the nil
//! sentinels, and named column sets into a `RecordBatch`.

use std::sync::Arc;

use arrow_array::types::{
    Date32Type, Decimal128Type, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type,
    Time64MicrosecondType, TimestampMicrosecondType, UInt64Type,
};
use arrow_array::{
    ArrayRef, ArrowPrimitiveType, BinaryArray, BooleanArray, PrimitiveArray, RecordBatch, StringArray,
};
use arrow_schema::{Schema, SchemaRef};

use crate::column::{Column, ColumnData, Heap, HeapEntry, STR_NIL};
use crate::traits::sealed::Atom;
use crate::types::LogicalType;
use crate::types::arrow::logical_field;
use crate::{MarshalError, Result};

/// Convert a column to an Arrow array.
///
/// # Errors
///
/// Returns an error if a string payload is not valid UTF-8, a heap entry is
/// unreadable, or Arrow rejects the decimal precision.
pub fn column_to_arrow(column: &Column) -> Result<ArrayRef> {
    let array: ArrayRef = match (column.logical_type(), column.data()) {
        (LogicalType::Boolean, ColumnData::I8(s)) => {
            Arc::new(s.iter().map(|v| (!v.is_nil()).then_some(*v != 0)).collect::<BooleanArray>())
        }
        (LogicalType::TinyInt, ColumnData::I8(s)) => Arc::new(primitive::<Int8Type, _>(s, |v| v)),
        (LogicalType::SmallInt, ColumnData::I16(s)) => Arc::new(primitive::<Int16Type, _>(s, |v| v)),
        (LogicalType::Int, ColumnData::I32(s)) => Arc::new(primitive::<Int32Type, _>(s, |v| v)),
        (LogicalType::BigInt, ColumnData::I64(s)) => Arc::new(primitive::<Int64Type, _>(s, |v| v)),
        (LogicalType::Real, ColumnData::F32(s)) => Arc::new(primitive::<Float32Type, _>(s, |v| v)),
        (LogicalType::Double, ColumnData::F64(s)) => Arc::new(primitive::<Float64Type, _>(s, |v| v)),
        (LogicalType::Oid, ColumnData::Oid(s)) => Arc::new(primitive::<UInt64Type, _>(s, |v| v)),
        (LogicalType::Date, ColumnData::I32(s)) => Arc::new(primitive::<Date32Type, _>(s, |v| v)),
        (LogicalType::Time, ColumnData::I64(s)) => {
            Arc::new(primitive::<Time64MicrosecondType, _>(s, |v| v))
        }
        (LogicalType::Timestamp, ColumnData::I64(s)) => {
            Arc::new(primitive::<TimestampMicrosecondType, _>(s, |v| v))
        }
        (LogicalType::Decimal(spec), data) => {
            let array = match data {
                ColumnData::I8(s) => primitive::<Decimal128Type, _>(s, i128::from),
                ColumnData::I16(s) => primitive::<Decimal128Type, _>(s, i128::from),
                ColumnData::I32(s) => primitive::<Decimal128Type, _>(s, i128::from),
                ColumnData::I64(s) => primitive::<Decimal128Type, _>(s, i128::from),
                other => return Err(mismatch(column, other)),
            };
            Arc::new(array.with_precision_and_scale(spec.precision(), spec.scale() as i8)?)
        }
        (LogicalType::String, ColumnData::Heap { offsets, heap }) => {
            let mut values = Vec::new();
            values
                .try_reserve_exact(offsets.len())
                .map_err(crate::error::reserve_failed("arrow strings"))?;
            for offset in offsets {
                values.push(string_entry(heap, *offset)?);
            }
            Arc::new(StringArray::from(values))
        }
        (LogicalType::Blob, ColumnData::Heap { offsets, heap }) => {
            let mut values = Vec::new();
            values
                .try_reserve_exact(offsets.len())
                .map_err(crate::error::reserve_failed("arrow blobs"))?;
            for offset in offsets {
                values.push(match heap.entry(*offset)? {
                    HeapEntry::Bytes(bytes) => Some(bytes),
                    HeapEntry::NilBlob => None,
                });
            }
            Arc::new(BinaryArray::from(values))
        }
        (_, other) => return Err(mismatch(column, other)),
    };
    Ok(array)
}

/// Convert named columns into a `RecordBatch`.
///
/// Fields are nullable when their column holds a nil.
///
/// # Errors
///
/// Returns an error if any column fails to convert or the columns differ in
/// row count.
pub fn columns_to_record_batch(columns: &[(&str, &Column)]) -> Result<RecordBatch> {
    let fields: Vec<_> = columns
        .iter()
        .map(|(name, column)| logical_field(name, column.logical_type(), column.flags().nullable))
        .collect();
    let schema: SchemaRef = Arc::new(Schema::new(fields));
    if columns.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }
    let arrays = columns
        .iter()
        .map(|(_, column)| column_to_arrow(column))
        .collect::<Result<Vec<_>>>()?;
    Ok(RecordBatch::try_new(schema, arrays)?)
}

fn primitive<T, A>(slots: &[A], widen: impl Fn(A) -> T::Native) -> PrimitiveArray<T>
where
    T: ArrowPrimitiveType,
    A: Atom,
{
    slots
        .iter()
        .map(|v| (!v.is_nil()).then(|| widen(*v)))
        .collect()
}

fn string_entry(heap: &Heap, offset: u64) -> Result<Option<&str>> {
    match heap.entry(offset)? {
        HeapEntry::Bytes(bytes) if bytes == STR_NIL => Ok(None),
        HeapEntry::Bytes(bytes) => std::str::from_utf8(bytes)
            .map(Some)
            .map_err(|e| MarshalError::value_conversion("string", e.to_string())),
        HeapEntry::NilBlob => Err(MarshalError::value_conversion("string", "blob nil in string heap")),
    }
}

fn mismatch(column: &Column, data: &ColumnData) -> MarshalError {
    MarshalError::type_mismatch(column.logical_type().storage().name(), data.storage().name())
}
