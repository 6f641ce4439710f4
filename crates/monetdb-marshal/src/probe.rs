//! Null prober.

use crate::column::{Column, RowReader};
use crate::error::reserve_failed;
use crate::Result;

/// Validity of `size` rows starting at `first`: entry `i` is true iff row
/// `first + i` holds its type's nil sentinel.
///
/// Strings are compared by content against the canonical nil string, blobs
/// by their length sentinel.
///
/// # Errors
///
/// Returns an out-of-memory error if the output cannot be allocated, or a
/// row out of range error if the run leaves the column.
pub fn probe_nulls(column: &Column, first: usize, size: usize) -> Result<Vec<bool>> {
    let rows = column.rows(first, size)?;
    let reader = RowReader::new(column)?;
    let mut out = Vec::new();
    out.try_reserve_exact(size)
        .map_err(reserve_failed("null bitmap"))?;
    for row in rows {
        out.push(reader.is_nil(row)?);
    }
    Ok(out)
}

/// Validity of every row of `column`.
///
/// # Errors
///
/// See [`probe_nulls`].
pub fn probe_all(column: &Column) -> Result<Vec<bool>> {
    probe_nulls(column, 0, column.count())
}
