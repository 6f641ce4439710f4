//! Row-wise decoding of a column into host values.
//!
//! [`RowReader`] resolves the column's storage once and is then used by the
//! null prober, scalar fetch and object batch fetch alike.

use super::heap::{Heap, HeapEntry, STR_NIL};
use super::{Column, ColumnData};
use crate::codec::{decimal, oid, temporal};
use crate::config::MarshalConfig;
use crate::error::reserve_failed;
use crate::traits::sealed::Atom;
use crate::types::{HostValue, LogicalType};
use crate::{MarshalError, Result};

#[derive(Debug, Clone, Copy)]
enum Scaled<'c> {
    I8(&'c [i8]),
    I16(&'c [i16]),
    I32(&'c [i32]),
    I64(&'c [i64]),
}

impl Scaled<'_> {
    fn is_nil(self, row: usize) -> Result<bool> {
        Ok(match self {
            Self::I8(s) => slot(s, row)?.is_nil(),
            Self::I16(s) => slot(s, row)?.is_nil(),
            Self::I32(s) => slot(s, row)?.is_nil(),
            Self::I64(s) => slot(s, row)?.is_nil(),
        })
    }

    fn get(self, row: usize) -> Result<i64> {
        Ok(match self {
            Self::I8(s) => i64::from(slot(s, row)?),
            Self::I16(s) => i64::from(slot(s, row)?),
            Self::I32(s) => i64::from(slot(s, row)?),
            Self::I64(s) => slot(s, row)?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Cells<'c> {
    Boolean(&'c [i8]),
    Byte(&'c [i8]),
    Short(&'c [i16]),
    Integer(&'c [i32]),
    Long(&'c [i64]),
    Float(&'c [f32]),
    Double(&'c [f64]),
    Oid(&'c [u64]),
    Date(&'c [i32]),
    Time(&'c [i64]),
    Timestamp(&'c [i64]),
    Decimal { slots: Scaled<'c>, scale: u8 },
    String { offsets: &'c [u64], heap: &'c Heap },
    Blob { offsets: &'c [u64], heap: &'c Heap },
}

/// Decoder bound to one column.
#[derive(Debug, Clone, Copy)]
pub struct RowReader<'c> {
    cells: Cells<'c>,
    count: usize,
    time_bias_ms: i64,
}

impl<'c> RowReader<'c> {
    /// Bind a reader to `column`.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch error if the column storage does not fit its
    /// logical type.
    pub fn new(column: &'c Column) -> Result<Self> {
        Self::with_config(column, &MarshalConfig::default())
    }

    /// Bind a reader to `column` using the clock bias of `config`.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch error if the column storage does not fit its
    /// logical type.
    pub fn with_config(column: &'c Column, config: &MarshalConfig) -> Result<Self> {
        let ty = column.logical_type();
        let cells = match (ty, column.data()) {
            (LogicalType::Boolean, ColumnData::I8(s)) => Cells::Boolean(s),
            (LogicalType::TinyInt, ColumnData::I8(s)) => Cells::Byte(s),
            (LogicalType::SmallInt, ColumnData::I16(s)) => Cells::Short(s),
            (LogicalType::Int, ColumnData::I32(s)) => Cells::Integer(s),
            (LogicalType::BigInt, ColumnData::I64(s)) => Cells::Long(s),
            (LogicalType::Real, ColumnData::F32(s)) => Cells::Float(s),
            (LogicalType::Double, ColumnData::F64(s)) => Cells::Double(s),
            (LogicalType::Oid, ColumnData::Oid(s)) => Cells::Oid(s),
            (LogicalType::Date, ColumnData::I32(s)) => Cells::Date(s),
            (LogicalType::Time, ColumnData::I64(s)) => Cells::Time(s),
            (LogicalType::Timestamp, ColumnData::I64(s)) => Cells::Timestamp(s),
            (LogicalType::Decimal(spec), data) => {
                let slots = match data {
                    ColumnData::I8(s) => Scaled::I8(s),
                    ColumnData::I16(s) => Scaled::I16(s),
                    ColumnData::I32(s) => Scaled::I32(s),
                    ColumnData::I64(s) => Scaled::I64(s),
                    other => return Err(mismatch(ty, other)),
                };
                Cells::Decimal {
                    slots,
                    scale: spec.scale(),
                }
            }
            (LogicalType::String, ColumnData::Heap { offsets, heap }) => Cells::String { offsets, heap },
            (LogicalType::Blob, ColumnData::Heap { offsets, heap }) => Cells::Blob { offsets, heap },
            (_, other) => return Err(mismatch(ty, other)),
        };
        Ok(Self {
            cells,
            count: column.count(),
            time_bias_ms: config.time_bias_ms,
        })
    }

    /// Number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the column has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns true if `row` holds the nil sentinel of its type family.
    ///
    /// # Errors
    ///
    /// Returns an error if the row is out of range or its heap entry is
    /// unreadable.
    pub fn is_nil(&self, row: usize) -> Result<bool> {
        Ok(match self.cells {
            Cells::Boolean(s) | Cells::Byte(s) => slot(s, row)?.is_nil(),
            Cells::Short(s) => slot(s, row)?.is_nil(),
            Cells::Integer(s) | Cells::Date(s) => slot(s, row)?.is_nil(),
            Cells::Long(s) | Cells::Time(s) | Cells::Timestamp(s) => slot(s, row)?.is_nil(),
            Cells::Float(s) => slot(s, row)?.is_nil(),
            Cells::Double(s) => slot(s, row)?.is_nil(),
            Cells::Oid(s) => slot(s, row)?.is_nil(),
            Cells::Decimal { slots, .. } => slots.is_nil(row)?,
            Cells::String { offsets, heap } => {
                heap.entry(slot(offsets, row)?)? == HeapEntry::Bytes(STR_NIL)
            }
            Cells::Blob { offsets, heap } => heap.entry(slot(offsets, row)?)? == HeapEntry::NilBlob,
        })
    }

    /// Value at `row`, or `None` for nil.
    ///
    /// # Errors
    ///
    /// Returns an error if the row is out of range or its value cannot be
    /// converted.
    pub fn read(&self, row: usize) -> Result<Option<HostValue>> {
        if self.is_nil(row)? {
            return Ok(None);
        }
        self.decode(row).map(Some)
    }

    /// Value at `row` without consulting the nil sentinel.
    ///
    /// Only meaningful for columns known to hold no nil.
    ///
    /// # Errors
    ///
    /// Returns an error if the row is out of range or its value cannot be
    /// converted.
    pub fn decode(&self, row: usize) -> Result<HostValue> {
        let bias = self.time_bias_ms;
        Ok(match self.cells {
            Cells::Boolean(s) => HostValue::Boolean(slot(s, row)? != 0),
            Cells::Byte(s) => HostValue::Byte(slot(s, row)?),
            Cells::Short(s) => HostValue::Short(slot(s, row)?),
            Cells::Integer(s) => HostValue::Integer(slot(s, row)?),
            Cells::Long(s) => HostValue::Long(slot(s, row)?),
            Cells::Float(s) => HostValue::Float(slot(s, row)?),
            Cells::Double(s) => HostValue::Double(slot(s, row)?),
            Cells::Oid(s) => HostValue::String(oid::format(slot(s, row)?)),
            Cells::Date(s) => HostValue::Date(temporal::date_to_host_ms(slot(s, row)?)),
            Cells::Time(s) => HostValue::Time(temporal::time_to_host_ms(slot(s, row)?, bias)),
            Cells::Timestamp(s) => {
                HostValue::Timestamp(temporal::timestamp_to_host_ms(slot(s, row)?, bias))
            }
            Cells::Decimal { slots, scale } => {
                HostValue::Decimal(decimal::to_host(slots.get(row)?, scale)?)
            }
            Cells::String { offsets, heap } => {
                let bytes = payload(heap, slot(offsets, row)?, "string payload")?;
                let text = String::from_utf8(bytes)
                    .map_err(|e| MarshalError::value_conversion("string", e.to_string()))?;
                HostValue::String(text)
            }
            Cells::Blob { offsets, heap } => {
                HostValue::Bytes(payload(heap, slot(offsets, row)?, "blob payload")?)
            }
        })
    }
}

fn slot<A: Copy>(slots: &[A], row: usize) -> Result<A> {
    slots
        .get(row)
        .copied()
        .ok_or_else(|| MarshalError::row_out_of_range(row, row.saturating_add(1), slots.len()))
}

fn payload(heap: &Heap, offset: u64, context: &'static str) -> Result<Vec<u8>> {
    match heap.entry(offset)? {
        HeapEntry::Bytes(bytes) => {
            let mut out = Vec::new();
            out.try_reserve_exact(bytes.len())
                .map_err(reserve_failed(context))?;
            out.extend_from_slice(bytes);
            Ok(out)
        }
        HeapEntry::NilBlob => Err(MarshalError::value_conversion("blob", "nil entry")),
    }
}

fn mismatch(ty: LogicalType, data: &ColumnData) -> MarshalError {
    MarshalError::type_mismatch(ty.storage().name(), data.storage().name())
}
