//! Arrow type mappings from logical column types.
//!
//! | Logical type | Arrow type | Notes |
//! |--------------|------------|-------|
//! | boolean | Boolean | |
//! | tinyint | Int8 | |
//! | smallint | Int16 | |
//! | int | Int32 | |
//! | bigint | Int64 | |
//! | real | Float32 | |
//! | double | Float64 | |
//! | oid | UInt64 | Raw row id, not the `"<n>@0"` form |
//! | date | Date32 | Days since epoch |
//! | time | Time64(Microsecond) | |
//! | timestamp | Timestamp(Microsecond, None) | |
//! | decimal(p,s) | Decimal128(p,s) | |
//! | varchar | Utf8 | |
//! | blob | Binary | |
//!
//! The Arrow export carries the stored values. The host clock bias applied
//! by scalar and batch fetch does not apply here.

use arrow_schema::{DataType, Field, TimeUnit};

use super::logical::LogicalType;

/// Convert a logical type to an Arrow `DataType`.
#[must_use]
pub fn logical_type_to_arrow(ty: LogicalType) -> DataType {
    match ty {
        LogicalType::Boolean => DataType::Boolean,
        LogicalType::TinyInt => DataType::Int8,
        LogicalType::SmallInt => DataType::Int16,
        LogicalType::Int => DataType::Int32,
        LogicalType::BigInt => DataType::Int64,
        LogicalType::Real => DataType::Float32,
        LogicalType::Double => DataType::Float64,
        LogicalType::Oid => DataType::UInt64,
        LogicalType::Date => DataType::Date32,
        LogicalType::Time => DataType::Time64(TimeUnit::Microsecond),
        LogicalType::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, None),
        LogicalType::Decimal(spec) => DataType::Decimal128(spec.precision(), spec.scale() as i8),
        LogicalType::String => DataType::Utf8,
        LogicalType::Blob => DataType::Binary,
    }
}

/// Build an Arrow field for a named column.
#[must_use]
pub fn logical_field(name: &str, ty: LogicalType, nullable: bool) -> Field {
    Field::new(name, logical_type_to_arrow(ty), nullable)
}
