//! Typed columns.
//!
//! A [`Column`] is a densely packed run of fixed-width slots of one logical
//! type, plus a [`Heap`] for string and blob payloads. Row count and
//! summary flags are fixed at construction.

pub mod heap;
pub mod reader;

use std::ops::Range;

pub use heap::{BLOB_NIL_LEN, Heap, HeapEntry, STR_NIL};
pub use reader::RowReader;

use crate::traits::sealed::Atom;
use crate::types::{LogicalType, StorageKind};
use crate::{MarshalError, Result};

/// Slot storage of a column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// 8-bit slots.
    I8(Vec<i8>),
    /// 16-bit slots.
    I16(Vec<i16>),
    /// 32-bit slots.
    I32(Vec<i32>),
    /// 64-bit slots.
    I64(Vec<i64>),
    /// 32-bit float slots.
    F32(Vec<f32>),
    /// 64-bit float slots.
    F64(Vec<f64>),
    /// Row-id slots.
    Oid(Vec<u64>),
    /// Heap offsets, one per row.
    Heap {
        /// Offset of each row's heap entry.
        offsets: Vec<u64>,
        /// Payload storage.
        heap: Heap,
    },
}

impl ColumnData {
    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::I8(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::Oid(v) => v.len(),
            Self::Heap { offsets, .. } => offsets.len(),
        }
    }

    /// Returns true if there are no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Storage kind of the slots.
    #[must_use]
    pub const fn storage(&self) -> StorageKind {
        match self {
            Self::I8(_) => StorageKind::I8,
            Self::I16(_) => StorageKind::I16,
            Self::I32(_) => StorageKind::I32,
            Self::I64(_) => StorageKind::I64,
            Self::F32(_) => StorageKind::F32,
            Self::F64(_) => StorageKind::F64,
            Self::Oid(_) => StorageKind::Oid,
            Self::Heap { .. } => StorageKind::Heap,
        }
    }
}

/// Nullability and monotonicity summary of a column.
///
/// Exactly one of `nullable` and `non_nil` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnFlags {
    /// At least one row holds the nil sentinel.
    pub nullable: bool,
    /// No row holds the nil sentinel.
    pub non_nil: bool,
    /// Values never decrease.
    pub sorted: bool,
    /// Values never increase.
    pub reverse_sorted: bool,
}

impl ColumnFlags {
    /// Flags of an empty column.
    pub const EMPTY: Self = Self {
        nullable: false,
        non_nil: true,
        sorted: true,
        reverse_sorted: true,
    };
}

/// A typed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    logical: LogicalType,
    data: ColumnData,
    flags: ColumnFlags,
}

impl Column {
    /// Assemble a column from its parts.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch error if the slot storage does not match the
    /// logical type, or if the flags claim both or neither of nullable and
    /// non-nil.
    pub fn new(logical: LogicalType, data: ColumnData, flags: ColumnFlags) -> Result<Self> {
        if data.storage() != logical.storage() {
            return Err(MarshalError::type_mismatch(
                logical.storage().name(),
                data.storage().name(),
            ));
        }
        if flags.nullable == flags.non_nil {
            return Err(MarshalError::type_mismatch(
                "exactly one of nullable and non-nil",
                format!("nullable={} non_nil={}", flags.nullable, flags.non_nil),
            ));
        }
        Ok(Self {
            logical,
            data,
            flags,
        })
    }

    /// Number of rows.
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the column has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Logical type of the column.
    #[must_use]
    pub const fn logical_type(&self) -> LogicalType {
        self.logical
    }

    /// Summary flags.
    #[must_use]
    pub const fn flags(&self) -> ColumnFlags {
        self.flags
    }

    /// Slot storage.
    #[must_use]
    pub const fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Typed view of the fixed-width slots.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch error if `A` is not the column's storage.
    pub fn values<A: Atom>(&self) -> Result<&[A]> {
        A::slots(&self.data)
            .ok_or_else(|| MarshalError::type_mismatch(self.data.storage().name(), A::STORAGE.name()))
    }

    /// Validate the row run `first..first + size`.
    ///
    /// # Errors
    ///
    /// Returns a row out of range error if the run leaves the column.
    pub fn rows(&self, first: usize, size: usize) -> Result<Range<usize>> {
        let count = self.count();
        match first.checked_add(size) {
            Some(end) if end <= count => Ok(first..end),
            _ => Err(MarshalError::row_out_of_range(
                first,
                first.saturating_add(size),
                count,
            )),
        }
    }

    /// Returns true if `row` holds the nil sentinel.
    ///
    /// # Errors
    ///
    /// Returns an error if the row is out of range.
    pub fn is_nil(&self, row: usize) -> Result<bool> {
        RowReader::new(self)?.is_nil(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_column(values: Vec<i32>) -> Column {
        let flags = ColumnFlags {
            nullable: values.contains(&i32::MIN),
            non_nil: !values.contains(&i32::MIN),
            sorted: false,
            reverse_sorted: false,
        };
        Column::new(LogicalType::Int, ColumnData::I32(values), flags).unwrap()
    }

    #[test]
    fn test_column_accessors() {
        let column = int_column(vec![1, 2, 3]);
        assert_eq!(column.count(), 3);
        assert_eq!(column.logical_type(), LogicalType::Int);
        assert_eq!(column.values::<i32>().unwrap(), &[1, 2, 3]);
        assert!(column.values::<i64>().unwrap_err().is_type_mismatch());
    }

    #[test]
    fn test_storage_must_match() {
        let err = Column::new(LogicalType::BigInt, ColumnData::I32(vec![1]), ColumnFlags::EMPTY)
            .unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn test_flags_must_be_exclusive() {
        let flags = ColumnFlags {
            nullable: true,
            ..ColumnFlags::EMPTY
        };
        assert!(Column::new(LogicalType::Int, ColumnData::I32(vec![]), flags).is_err());
    }

    #[test]
    fn test_rows_range() {
        let column = int_column(vec![1, 2, 3, 4]);
        assert_eq!(column.rows(1, 3).unwrap(), 1..4);
        assert_eq!(column.rows(4, 0).unwrap(), 4..4);
        assert!(column.rows(2, 3).unwrap_err().is_row_out_of_range());
        assert!(column.rows(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_is_nil() {
        let column = int_column(vec![7, i32::MIN]);
        assert!(!column.is_nil(0).unwrap());
        assert!(column.is_nil(1).unwrap());
        assert!(column.is_nil(2).is_err());
    }
}
