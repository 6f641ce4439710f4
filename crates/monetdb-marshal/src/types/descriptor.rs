//! Per-type description table.
//!
//! Every logical type is described by one static [`TypeDescriptor`]. The
//! fetch, probe and store paths are written once and read width, nil family
//! and host representation from this table instead of carrying one routine
//! per type.
//!
//! | Logical type | SQL name | Result id | Storage | Nil family | Host kind |
//! |--------------|----------|-----------|---------|------------|-----------|
//! | Boolean | boolean | 1 | I8 | Fixed | Boolean |
//! | TinyInt | tinyint | 2 | I8 | Fixed | Byte |
//! | SmallInt | smallint | 3 | I16 | Fixed | Short |
//! | Int | int | 4 | I32 | Fixed | Integer |
//! | BigInt | bigint | 5 | I64 | Fixed | Long |
//! | Real | real | 6 | F32 | Fixed | Float |
//! | Double | double | 7 | F64 | Fixed | Double |
//! | String | varchar | 8 | Heap | String | String |
//! | Date | date | 9 | I32 | Fixed | Date |
//! | Timestamp | timestamp | 10 | I64 | Fixed | Timestamp |
//! | Time | time | 11 | I64 | Fixed | Time |
//! | Blob | blob | 12 | Heap | Blob | Bytes |
//! | Decimal | decimal | 13 | by precision | Fixed | Decimal |
//! | Oid | oid | 14 | Oid | RowId | String |

use super::host::HostKind;

/// Physical storage of a column's fixed-width slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// 8-bit signed integers.
    I8,
    /// 16-bit signed integers.
    I16,
    /// 32-bit signed integers.
    I32,
    /// 64-bit signed integers.
    I64,
    /// 32-bit floats.
    F32,
    /// 64-bit floats.
    F64,
    /// Unsigned 64-bit row identifiers.
    Oid,
    /// Offsets into the column's out-of-line heap.
    Heap,
}

impl StorageKind {
    /// Width in bytes of one fixed-width slot.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::I8 => 1,
            Self::I16 => 2,
            Self::I32 | Self::F32 => 4,
            Self::I64 | Self::F64 | Self::Oid | Self::Heap => 8,
        }
    }

    /// Short name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::F32 => "float32",
            Self::F64 => "float64",
            Self::Oid => "oid",
            Self::Heap => "heap",
        }
    }
}

/// How a type represents null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NilFamily {
    /// Reserved bit pattern per width.
    Fixed,
    /// Reserved row-id value.
    RowId,
    /// Heap entry equal to the canonical nil string.
    String,
    /// Heap entry whose item count is the `~0` sentinel.
    Blob,
}

/// Static description of one logical type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Canonical SQL type name.
    pub sql_name: &'static str,
    /// Type id reported to the host for result-set columns.
    pub type_id: i32,
    /// Fixed-width storage (decimals override this by precision).
    pub storage: StorageKind,
    /// Null representation.
    pub nil: NilFamily,
    /// Host object kind produced by fetch and accepted by store.
    pub host_kind: HostKind,
}

const fn describe(
    sql_name: &'static str,
    type_id: i32,
    storage: StorageKind,
    nil: NilFamily,
    host_kind: HostKind,
) -> TypeDescriptor {
    TypeDescriptor {
        sql_name,
        type_id,
        storage,
        nil,
        host_kind,
    }
}

pub(crate) const BOOLEAN: TypeDescriptor = describe(
    "boolean",
    1,
    StorageKind::I8,
    NilFamily::Fixed,
    HostKind::Boolean,
);
pub(crate) const TINYINT: TypeDescriptor =
    describe("tinyint", 2, StorageKind::I8, NilFamily::Fixed, HostKind::Byte);
pub(crate) const SMALLINT: TypeDescriptor = describe(
    "smallint",
    3,
    StorageKind::I16,
    NilFamily::Fixed,
    HostKind::Short,
);
pub(crate) const INT: TypeDescriptor =
    describe("int", 4, StorageKind::I32, NilFamily::Fixed, HostKind::Integer);
pub(crate) const BIGINT: TypeDescriptor =
    describe("bigint", 5, StorageKind::I64, NilFamily::Fixed, HostKind::Long);
pub(crate) const REAL: TypeDescriptor =
    describe("real", 6, StorageKind::F32, NilFamily::Fixed, HostKind::Float);
pub(crate) const DOUBLE: TypeDescriptor =
    describe("double", 7, StorageKind::F64, NilFamily::Fixed, HostKind::Double);
pub(crate) const STRING: TypeDescriptor = describe(
    "varchar",
    8,
    StorageKind::Heap,
    NilFamily::String,
    HostKind::String,
);
pub(crate) const DATE: TypeDescriptor =
    describe("date", 9, StorageKind::I32, NilFamily::Fixed, HostKind::Date);
pub(crate) const TIMESTAMP: TypeDescriptor = describe(
    "timestamp",
    10,
    StorageKind::I64,
    NilFamily::Fixed,
    HostKind::Timestamp,
);
pub(crate) const TIME: TypeDescriptor =
    describe("time", 11, StorageKind::I64, NilFamily::Fixed, HostKind::Time);
pub(crate) const BLOB: TypeDescriptor =
    describe("blob", 12, StorageKind::Heap, NilFamily::Blob, HostKind::Bytes);
pub(crate) const DECIMAL: TypeDescriptor = describe(
    "decimal",
    13,
    StorageKind::I64,
    NilFamily::Fixed,
    HostKind::Decimal,
);
pub(crate) const OID: TypeDescriptor =
    describe("oid", 14, StorageKind::Oid, NilFamily::RowId, HostKind::String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ids_are_unique() {
        let all = [
            &BOOLEAN, &TINYINT, &SMALLINT, &INT, &BIGINT, &REAL, &DOUBLE, &STRING, &DATE,
            &TIMESTAMP, &TIME, &BLOB, &DECIMAL, &OID,
        ];
        let mut ids: Vec<i32> = all.iter().map(|d| d.type_id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=14).collect::<Vec<_>>());
    }

    #[test]
    fn test_storage_width() {
        assert_eq!(StorageKind::I8.width(), 1);
        assert_eq!(StorageKind::F32.width(), 4);
        assert_eq!(StorageKind::Oid.width(), 8);
    }

    #[test]
    fn test_nil_families() {
        assert_eq!(STRING.nil, NilFamily::String);
        assert_eq!(BLOB.nil, NilFamily::Blob);
        assert_eq!(OID.nil, NilFamily::RowId);
        assert_eq!(DATE.nil, NilFamily::Fixed);
    }
}
