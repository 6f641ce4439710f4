//! Arrow export of columns.

mod batch;

pub use batch::{column_to_arrow, columns_to_record_batch};
