//! Scalar and batch fetch.
//!
//! - [`read_value`] decodes one row into a [`HostValue`].
//! - [`fetch_scalar`] wraps that value in a host object.
//! - [`fetch_flat`] copies a run of fixed-width slots into a primitive array.
//! - [`fetch_objects`] fills an object array, one host object or `None` per row.

use crate::column::{Column, RowReader};
use crate::config::MarshalConfig;
use crate::error::reserve_failed;
use crate::host::HostContext;
use crate::traits::host::{HostRuntime, PrimitiveArray};
use crate::traits::sealed::Primitive;
use crate::types::HostValue;
use crate::{MarshalError, Result};

/// Value at `row`, or `None` for nil.
///
/// # Errors
///
/// Returns an error if the row is out of range or the value cannot be
/// converted.
pub fn read_value(column: &Column, row: usize, config: &MarshalConfig) -> Result<Option<HostValue>> {
    RowReader::with_config(column, config)?.read(row)
}

/// Host object for `row`, or `None` for nil.
///
/// # Errors
///
/// Returns an error if the value cannot be converted or the host fails to
/// construct the object. A failure is never reported as `None`.
pub fn fetch_scalar<H: HostRuntime>(
    host: &mut H,
    context: &HostContext<H>,
    column: &Column,
    row: usize,
    config: &MarshalConfig,
) -> Result<Option<H::Object>> {
    let kind = column.logical_type().host_kind();
    match read_value(column, row, config)? {
        Some(value) => host.construct(context.class(kind)?, value).map(Some),
        None => Ok(None),
    }
}

/// Copy `size` values starting at row `first` into `dst`.
///
/// Pinned destinations receive a single block copy. Other destinations are
/// filled from a staging buffer with one region write. Nil sentinels are
/// copied as they are.
///
/// # Errors
///
/// Returns a type mismatch error if `P` cannot represent the column type, a
/// row out of range error if the run leaves the column or does not fit
/// `dst`, and an out-of-memory error if the staging buffer cannot be
/// allocated.
pub fn fetch_flat<P, D>(column: &Column, first: usize, size: usize, dst: &mut D) -> Result<()>
where
    P: Primitive,
    D: PrimitiveArray<P> + ?Sized,
{
    let ty = column.logical_type();
    if !P::accepts(ty) {
        return Err(MarshalError::type_mismatch(
            ty.to_string(),
            format!("{} array", P::HOST_KIND.array_label()),
        ));
    }
    let rows = column.rows(first, size)?;
    let src = &column.values::<P::Stored>()?[rows];
    if dst.len() < size {
        return Err(MarshalError::row_out_of_range(0, size, dst.len()));
    }

    if let Some(view) = dst.pinned() {
        P::copy_run(src, &mut view[..size]);
        return Ok(());
    }

    let mut staging: Vec<P> = Vec::new();
    staging
        .try_reserve_exact(size)
        .map_err(reserve_failed("fetch staging buffer"))?;
    staging.resize(size, P::default());
    P::copy_run(src, &mut staging);
    dst.set_region(0, &staging)
}

/// Fill `out` with one host object per row starting at `first`, `None` for
/// nil rows.
///
/// Columns flagged non-nil skip the sentinel check. On failure, entries
/// written before the failing row stay written and later entries are left
/// untouched; the whole batch must be treated as failed.
///
/// # Errors
///
/// Returns the first conversion or construction error.
pub fn fetch_objects<H: HostRuntime>(
    host: &mut H,
    context: &HostContext<H>,
    column: &Column,
    first: usize,
    out: &mut [Option<H::Object>],
    config: &MarshalConfig,
) -> Result<()> {
    let rows = column.rows(first, out.len())?;
    let reader = RowReader::with_config(column, config)?;
    let class = context.class(column.logical_type().host_kind())?;

    if column.flags().non_nil {
        for (slot, row) in out.iter_mut().zip(rows) {
            *slot = Some(host.construct(class, reader.decode(row)?)?);
        }
    } else {
        for (slot, row) in out.iter_mut().zip(rows) {
            *slot = match reader.read(row)? {
                Some(value) => Some(host.construct(class, value)?),
                None => None,
            };
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnData, ColumnFlags};
    use crate::host::NativeHost;
    use crate::types::{HostKind, LogicalType};

    fn column(ty: LogicalType, data: ColumnData, nullable: bool) -> Column {
        let flags = ColumnFlags {
            nullable,
            non_nil: !nullable,
            sorted: false,
            reverse_sorted: false,
        };
        Column::new(ty, data, flags).unwrap()
    }

    /// Destination that never exposes its storage.
    struct Unpinned(Vec<i32>);

    impl PrimitiveArray<i32> for Unpinned {
        fn len(&self) -> usize {
            self.0.len()
        }

        fn pinned(&mut self) -> Option<&mut [i32]> {
            None
        }

        fn set_region(&mut self, start: usize, values: &[i32]) -> Result<()> {
            self.0.set_region(start, values)
        }
    }

    #[test]
    fn test_flat_paths_agree() {
        let col = column(LogicalType::Int, ColumnData::I32(vec![1, 2, 3, 4, 5]), false);
        let mut pinned = vec![0_i32; 3];
        fetch_flat(&col, 1, 3, &mut pinned).unwrap();
        let mut staged = Unpinned(vec![0; 3]);
        fetch_flat(&col, 1, 3, &mut staged).unwrap();
        assert_eq!(pinned, vec![2, 3, 4]);
        assert_eq!(staged.0, pinned);
    }

    #[test]
    fn test_flat_bool() {
        let col = column(LogicalType::Boolean, ColumnData::I8(vec![1, 0, 1]), false);
        let mut out = [false; 3];
        fetch_flat(&col, 0, 3, &mut out[..]).unwrap();
        assert_eq!(out, [true, false, true]);
    }

    #[test]
    fn test_flat_rejects_wrong_primitive() {
        let col = column(LogicalType::Date, ColumnData::I32(vec![1]), false);
        let mut out = vec![0_i32; 1];
        assert!(fetch_flat(&col, 0, 1, &mut out).unwrap_err().is_type_mismatch());
    }

    #[test]
    fn test_flat_destination_too_small() {
        let col = column(LogicalType::BigInt, ColumnData::I64(vec![1, 2]), false);
        let mut out = vec![0_i64; 1];
        assert!(fetch_flat(&col, 0, 2, &mut out).unwrap_err().is_row_out_of_range());
    }

    #[test]
    fn test_objects_match_scalar() {
        let col = column(LogicalType::Int, ColumnData::I32(vec![4, i32::MIN, 6]), true);
        let config = MarshalConfig::default();
        let mut host = NativeHost::new();
        let context = HostContext::initialize(&mut host).unwrap();
        let mut out = vec![None; 3];
        fetch_objects(&mut host, &context, &col, 0, &mut out, &config).unwrap();
        for (row, object) in out.iter().enumerate() {
            let scalar = fetch_scalar(&mut host, &context, &col, row, &config).unwrap();
            assert_eq!(object, &scalar);
        }
        assert_eq!(out[1], None);
    }

    #[test]
    fn test_objects_non_nil_fast_path() {
        let col = column(LogicalType::Real, ColumnData::F32(vec![1.5, 2.5]), false);
        let mut host = NativeHost::new();
        let context = HostContext::initialize(&mut host).unwrap();
        let mut out = vec![None; 2];
        fetch_objects(&mut host, &context, &col, 0, &mut out, &MarshalConfig::default()).unwrap();
        assert_eq!(out, vec![Some(HostValue::Float(1.5)), Some(HostValue::Float(2.5))]);
        assert_eq!(*context.class(HostKind::Float).unwrap(), HostKind::Float);
    }

    #[test]
    fn test_objects_abort_leaves_prefix() {
        let col = column(LogicalType::SmallInt, ColumnData::I16(vec![1, 2, 3]), false);
        let mut host = NativeHost::new().failing_after(1);
        let context = HostContext::initialize(&mut host).unwrap();
        let mut out = vec![None; 3];
        let err = fetch_objects(&mut host, &context, &col, 0, &mut out, &MarshalConfig::default())
            .unwrap_err();
        assert!(err.is_host_error());
        assert_eq!(out, vec![Some(HostValue::Short(1)), None, None]);
    }

    #[test]
    fn test_scalar_null_is_none() {
        let col = column(LogicalType::Oid, ColumnData::Oid(vec![1 << 63]), true);
        let mut host = NativeHost::new();
        let context = HostContext::initialize(&mut host).unwrap();
        let value = fetch_scalar(&mut host, &context, &col, 0, &MarshalConfig::default()).unwrap();
        assert!(value.is_none());
    }
}
