//! Column build.
//!
//! Every entry point funnels into one generic builder per storage family,
//! which converts each host value, appends it and updates the summary flags
//! in the same forward pass. A failure on any row drops the partially built
//! slots and heap before the error is returned.

pub mod sort;

pub use sort::SortTracker;

use crate::codec::{decimal, oid, temporal};
use crate::column::{Column, ColumnData, ColumnFlags, Heap, STR_NIL};
use crate::config::{MarshalConfig, NullOrdering};
use crate::error::reserve_failed;
use crate::traits::host::HostRuntime;
use crate::traits::sealed::{Atom, Primitive};
use crate::types::{HostValue, LogicalType, NilFamily, StorageKind};
use crate::{MarshalError, Result};

/// Build a column of type `ty` from a sequence of optional host values.
///
/// `None` rows store the type's nil sentinel. A value that converts to the
/// nil sentinel counts as nil as well.
///
/// # Errors
///
/// Returns the first row error (from the iterator itself or from the
/// conversion), or an out-of-memory error if slots or heap cannot grow.
pub fn build_column<I>(ty: LogicalType, rows: I, config: &MarshalConfig) -> Result<Column>
where
    I: IntoIterator<Item = Result<Option<HostValue>>>,
{
    let rows = rows.into_iter();
    let ordering = config.null_ordering;
    let bias = config.time_bias_ms;
    let wrong = |value: &HostValue| {
        MarshalError::type_mismatch(ty.host_kind().class_name(), value.kind().class_name())
    };

    let (data, flags) = match ty {
        LogicalType::Boolean => fixed(rows, ordering, |v| match v {
            HostValue::Boolean(b) => Ok(i8::from(b)),
            other => Err(wrong(&other)),
        }),
        LogicalType::TinyInt => fixed(rows, ordering, |v| match v {
            HostValue::Byte(x) => Ok(x),
            other => Err(wrong(&other)),
        }),
        LogicalType::SmallInt => fixed(rows, ordering, |v| match v {
            HostValue::Short(x) => Ok(x),
            other => Err(wrong(&other)),
        }),
        LogicalType::Int => fixed(rows, ordering, |v| match v {
            HostValue::Integer(x) => Ok(x),
            other => Err(wrong(&other)),
        }),
        LogicalType::BigInt => fixed(rows, ordering, |v| match v {
            HostValue::Long(x) => Ok(x),
            other => Err(wrong(&other)),
        }),
        LogicalType::Real => fixed(rows, ordering, |v| match v {
            HostValue::Float(x) => Ok(x),
            other => Err(wrong(&other)),
        }),
        LogicalType::Double => fixed(rows, ordering, |v| match v {
            HostValue::Double(x) => Ok(x),
            other => Err(wrong(&other)),
        }),
        LogicalType::Oid => fixed(rows, ordering, |v| match v {
            HostValue::String(s) => Ok(oid::parse(&s)?.unwrap_or(u64::NIL)),
            other => Err(wrong(&other)),
        }),
        LogicalType::Date => fixed(rows, ordering, |v| match v {
            HostValue::Date(ms) => temporal::host_ms_to_date(ms),
            other => Err(wrong(&other)),
        }),
        LogicalType::Time => fixed(rows, ordering, |v| match v {
            HostValue::Time(ms) => temporal::host_ms_to_time(ms, bias),
            other => Err(wrong(&other)),
        }),
        LogicalType::Timestamp => fixed(rows, ordering, |v| match v {
            HostValue::Timestamp(ms) => temporal::host_ms_to_timestamp(ms, bias),
            other => Err(wrong(&other)),
        }),
        LogicalType::Decimal(spec) => {
            let scaled = |v: HostValue| match v {
                HostValue::Decimal(d) => decimal::from_host(&d, spec, config.rounding),
                other => Err(wrong(&other)),
            };
            let overflow = |_| MarshalError::decimal_overflow(spec.precision(), spec.scale());
            match spec.storage() {
                StorageKind::I8 => fixed(rows, ordering, |v| {
                    i8::try_from(scaled(v)?).map_err(overflow)
                }),
                StorageKind::I16 => fixed(rows, ordering, |v| {
                    i16::try_from(scaled(v)?).map_err(overflow)
                }),
                StorageKind::I32 => fixed(rows, ordering, |v| {
                    i32::try_from(scaled(v)?).map_err(overflow)
                }),
                _ => fixed(rows, ordering, scaled),
            }
        }
        LogicalType::String => heap(rows, NilFamily::String, ordering, |v| match v {
            HostValue::String(s) => Ok(s.into_bytes()),
            other => Err(wrong(&other)),
        }),
        LogicalType::Blob => heap(rows, NilFamily::Blob, ordering, |v| match v {
            HostValue::Bytes(b) => Ok(b),
            other => Err(wrong(&other)),
        }),
    }?;

    let column = Column::new(ty, data, flags)?;
    tracing::debug!(
        column_type = %ty,
        rows = column.count(),
        nullable = flags.nullable,
        sorted = flags.sorted,
        reverse_sorted = flags.reverse_sorted,
        "column built"
    );
    Ok(column)
}

/// Build a column from a slice of optional host values.
///
/// # Errors
///
/// See [`build_column`].
pub fn store_values(
    ty: LogicalType,
    values: &[Option<HostValue>],
    config: &MarshalConfig,
) -> Result<Column> {
    build_column(ty, values.iter().cloned().map(Ok), config)
}

/// Build a column from host objects, `None` standing for the host's null.
///
/// # Errors
///
/// Returns the first extraction or conversion error; see [`build_column`].
pub fn store_objects<H: HostRuntime>(
    host: &mut H,
    ty: LogicalType,
    objects: &[Option<H::Object>],
    config: &MarshalConfig,
) -> Result<Column> {
    let rows = objects
        .iter()
        .map(|object| object.as_ref().map(|o| host.extract(o)).transpose());
    build_column(ty, rows, config)
}

/// Build a column from a primitive array.
///
/// Elements equal to the storage nil sentinel are nil rows.
///
/// # Errors
///
/// Returns a type mismatch error if `P` cannot represent `ty`, or an
/// out-of-memory error.
pub fn store_primitive<P: Primitive>(
    ty: LogicalType,
    values: &[P],
    config: &MarshalConfig,
) -> Result<Column> {
    if !P::accepts(ty) {
        return Err(MarshalError::type_mismatch(
            ty.to_string(),
            format!("{} array", P::HOST_KIND.array_label()),
        ));
    }
    let mut slots: Vec<P::Stored> = Vec::new();
    slots
        .try_reserve_exact(values.len())
        .map_err(reserve_failed("column slots"))?;
    let mut tracker = SortTracker::new(config.null_ordering);
    for (row, value) in values.iter().enumerate() {
        let slot = value.save();
        tracker.observe(row, slot.is_nil(), |previous| slot.natural_cmp(slots[previous]));
        slots.push(slot);
    }
    Column::new(ty, <P::Stored as Atom>::into_data(slots), tracker.finish())
}

fn fixed<A, I, F>(rows: I, ordering: NullOrdering, mut encode: F) -> Result<(ColumnData, ColumnFlags)>
where
    A: Atom,
    I: Iterator<Item = Result<Option<HostValue>>>,
    F: FnMut(HostValue) -> Result<A>,
{
    let mut slots: Vec<A> = Vec::new();
    slots
        .try_reserve_exact(rows.size_hint().0)
        .map_err(reserve_failed("column slots"))?;
    let mut tracker = SortTracker::new(ordering);
    for row in rows {
        let slot = match row? {
            Some(value) => encode(value)?,
            None => A::NIL,
        };
        tracker.observe(slots.len(), slot.is_nil(), |previous| {
            slot.natural_cmp(slots[previous])
        });
        slots.try_reserve(1).map_err(reserve_failed("column slots"))?;
        slots.push(slot);
    }
    Ok((A::into_data(slots), tracker.finish()))
}

fn heap<I, F>(
    rows: I,
    family: NilFamily,
    ordering: NullOrdering,
    mut encode: F,
) -> Result<(ColumnData, ColumnFlags)>
where
    I: Iterator<Item = Result<Option<HostValue>>>,
    F: FnMut(HostValue) -> Result<Vec<u8>>,
{
    let mut offsets: Vec<u64> = Vec::new();
    offsets
        .try_reserve_exact(rows.size_hint().0)
        .map_err(reserve_failed("column slots"))?;
    let mut heap = Heap::new();
    let mut tracker = SortTracker::new(ordering);
    for row in rows {
        let (offset, is_nil) = match row? {
            Some(value) => (heap.append(&encode(value)?)?, false),
            None if family == NilFamily::Blob => (heap.append_nil_blob()?, true),
            None => (heap.append(STR_NIL)?, true),
        };
        tracker.observe(offsets.len(), is_nil, |previous| {
            heap.payload(offset).cmp(heap.payload(offsets[previous]))
        });
        offsets.try_reserve(1).map_err(reserve_failed("column slots"))?;
        offsets.push(offset);
    }
    Ok((ColumnData::Heap { offsets, heap }, tracker.finish()))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::column::RowReader;
    use crate::fetch::read_value;
    use crate::host::{HostContext, NativeHost};
    use crate::probe::probe_all;
    use crate::types::DecimalSpec;

    fn config() -> MarshalConfig {
        MarshalConfig::default()
    }

    #[test]
    fn test_int_with_null_scenario() {
        let values = [Some(HostValue::Integer(5)), None, Some(HostValue::Integer(3))];
        let column = store_values(LogicalType::Int, &values, &config()).unwrap();
        let flags = column.flags();
        assert_eq!(column.count(), 3);
        assert!(flags.nullable && !flags.non_nil);
        assert!(!flags.sorted);
        assert!(!flags.reverse_sorted);
        assert_eq!(probe_all(&column).unwrap(), vec![false, true, false]);
    }

    #[test]
    fn test_string_scenario() {
        let values: Vec<_> = ["b", "a", "c"]
            .iter()
            .map(|s| Some(HostValue::String((*s).to_string())))
            .collect();
        let column = store_values(LogicalType::String, &values, &config()).unwrap();
        assert_eq!(
            read_value(&column, 1, &config()).unwrap(),
            Some(HostValue::String("a".to_string()))
        );
        assert_eq!(probe_all(&column).unwrap(), vec![false, false, false]);
        assert!(!column.flags().sorted && !column.flags().reverse_sorted);
    }

    #[test]
    fn test_round_trip_fixed_types() {
        let cases = [
            (LogicalType::Boolean, vec![HostValue::Boolean(true), HostValue::Boolean(false)]),
            (LogicalType::TinyInt, vec![HostValue::Byte(-3), HostValue::Byte(127)]),
            (LogicalType::SmallInt, vec![HostValue::Short(300), HostValue::Short(-2)]),
            (LogicalType::Int, vec![HostValue::Integer(i32::MAX), HostValue::Integer(0)]),
            (LogicalType::BigInt, vec![HostValue::Long(-9), HostValue::Long(1 << 40)]),
            (LogicalType::Real, vec![HostValue::Float(0.5), HostValue::Float(-1.25)]),
            (LogicalType::Double, vec![HostValue::Double(3.5), HostValue::Double(1e300)]),
            (LogicalType::Date, vec![HostValue::Date(0), HostValue::Date(temporal::MS_PER_DAY * 40)]),
            (LogicalType::Time, vec![HostValue::Time(-3_600_000), HostValue::Time(45_000_000)]),
            (LogicalType::Timestamp, vec![HostValue::Timestamp(1_000), HostValue::Timestamp(-86_000_000)]),
            (LogicalType::Oid, vec![HostValue::String("0@0".into()), HostValue::String("77@0".into())]),
        ];
        for (ty, values) in cases {
            let rows: Vec<_> = values.iter().cloned().map(Some).collect();
            let column = store_values(ty, &rows, &config()).unwrap();
            assert!(column.flags().non_nil, "{ty}");
            for (row, value) in values.iter().enumerate() {
                assert_eq!(read_value(&column, row, &config()).unwrap().as_ref(), Some(value), "{ty}");
            }
        }
    }

    #[test]
    fn test_null_rows_probe_matches_fetch() {
        let types = [
            LogicalType::Boolean,
            LogicalType::BigInt,
            LogicalType::Double,
            LogicalType::Oid,
            LogicalType::Date,
            LogicalType::Timestamp,
            LogicalType::String,
            LogicalType::Blob,
        ];
        for ty in types {
            let column = store_values(ty, &[None, None], &config()).unwrap();
            assert!(column.flags().nullable);
            let probed = probe_all(&column).unwrap();
            for (row, is_nil) in probed.iter().enumerate() {
                assert_eq!(*is_nil, read_value(&column, row, &config()).unwrap().is_none(), "{ty}");
            }
        }
    }

    #[test]
    fn test_decimal_store_by_width() {
        let spec = DecimalSpec::new(4, 2).unwrap();
        let ty = LogicalType::Decimal(spec);
        let values = [Some(HostValue::Decimal(BigDecimal::from_str("12.345").unwrap())), None];
        let column = store_values(ty, &values, &config()).unwrap();
        assert_eq!(column.values::<i16>().unwrap(), &[1235, i16::MIN]);
        let err = store_values(
            ty,
            &[Some(HostValue::Decimal(BigDecimal::from_str("100").unwrap()))],
            &config(),
        )
        .unwrap_err();
        assert!(err.is_decimal_overflow());
    }

    #[test]
    fn test_blob_payload_can_look_like_string_nil() {
        let values = [Some(HostValue::Bytes(vec![0x80])), None];
        let column = store_values(LogicalType::Blob, &values, &config()).unwrap();
        assert_eq!(probe_all(&column).unwrap(), vec![false, true]);
    }

    #[test]
    fn test_wrong_host_kind_fails() {
        let values = [Some(HostValue::Integer(1)), Some(HostValue::Long(2))];
        let err = store_values(LogicalType::Int, &values, &config()).unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn test_bad_row_id_fails() {
        let values = [Some(HostValue::String("1@0".into())), Some(HostValue::String("x".into()))];
        let err = store_values(LogicalType::Oid, &values, &config()).unwrap_err();
        assert!(err.is_malformed_row_id());
    }

    #[test]
    fn test_row_id_nil_text() {
        let values = [Some(HostValue::String("nil".into()))];
        let column = store_values(LogicalType::Oid, &values, &config()).unwrap();
        assert!(column.flags().nullable);
    }

    #[test]
    fn test_iterator_error_aborts() {
        let rows = vec![Ok(Some(HostValue::Long(1))), Err(MarshalError::host("extract failed"))];
        let err = build_column(LogicalType::BigInt, rows, &config()).unwrap_err();
        assert!(err.is_host_error());
    }

    #[test]
    fn test_store_primitive_sentinel_is_nil() {
        let column = store_primitive(LogicalType::Int, &[1, i32::MIN, 4], &config()).unwrap();
        assert!(column.flags().nullable);
        assert_eq!(probe_all(&column).unwrap(), vec![false, true, false]);

        let sorted = store_primitive(LogicalType::Double, &[1.0_f64, 2.0, 2.0], &config()).unwrap();
        assert!(sorted.flags().sorted && !sorted.flags().reverse_sorted && sorted.flags().non_nil);
    }

    #[test]
    fn test_store_primitive_rejects_type() {
        let err = store_primitive(LogicalType::Date, &[1_i32], &config()).unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn test_store_objects_through_host() {
        let mut host = NativeHost::new();
        let context = HostContext::initialize(&mut host).unwrap();
        let objects = vec![Some(HostValue::Short(2)), None, Some(HostValue::Short(9))];
        let column = store_objects(&mut host, LogicalType::SmallInt, &objects, &config()).unwrap();
        let reader = RowReader::new(&column).unwrap();
        assert_eq!(reader.read(2).unwrap(), Some(HostValue::Short(9)));
        context.teardown(&mut host);
    }

    #[test]
    fn test_nil_first_for_oid_and_string() {
        // Both nil sentinels sit above every value in raw order
        let oids = [None, Some(HostValue::String("3@0".into())), Some(HostValue::String("9@0".into()))];
        let column = store_values(LogicalType::Oid, &oids, &config()).unwrap();
        assert!(column.flags().sorted && !column.flags().reverse_sorted);

        let strings = [None, Some(HostValue::String("a".into())), Some(HostValue::String("b".into()))];
        let column = store_values(LogicalType::String, &strings, &config()).unwrap();
        assert!(column.flags().sorted && !column.flags().reverse_sorted);

        let trailing = [Some(HostValue::String("a".into())), None];
        let column = store_values(LogicalType::String, &trailing, &config()).unwrap();
        assert!(!column.flags().sorted && column.flags().reverse_sorted);
    }

    #[test]
    fn test_skip_policy_ignores_nil_rows() {
        let values = [Some(HostValue::Integer(1)), None, Some(HostValue::Integer(2))];
        let skip = config().null_ordering(NullOrdering::Skip);
        let column = store_values(LogicalType::Int, &values, &skip).unwrap();
        assert!(column.flags().sorted && !column.flags().reverse_sorted);
    }
}
