//! Column marshalling between embedded MonetDB columns and a managed host
//! runtime.
//!
//! This crate converts typed, nil-sentinel columns into host values, boxed
//! host objects and flat primitive arrays, and builds new columns from host
//! input while tracking nullability and sortedness in a single pass.
//!
//! # Features
//!
//! - One generic fetch and store path driven by a per-type descriptor table
//! - Canonical decimal, row-id and temporal codecs
//! - Host runtime seam with an explicit, once-built class context
//! - Allocation failures reported as errors, never as nil
//! - Arrow export of columns and column sets
//!
//! # Example
//!
//! ```rust
//! use monetdb_marshal::types::HostValue;
//! use monetdb_marshal::{LogicalType, MarshalConfig, probe_nulls, read_value, store_values};
//!
//! let config = MarshalConfig::default();
//! let values = [Some(HostValue::Integer(5)), None, Some(HostValue::Integer(3))];
//! let column = store_values(LogicalType::Int, &values, &config).unwrap();
//!
//! assert!(column.flags().nullable);
//! assert_eq!(probe_nulls(&column, 0, 3).unwrap(), vec![false, true, false]);
//! assert_eq!(read_value(&column, 2, &config).unwrap(), Some(HostValue::Integer(3)));
//! ```
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod codec;
pub mod column;
pub mod config;
pub mod conversion;
pub mod error;
pub mod fetch;
pub mod host;
pub mod marshaller;
pub mod probe;
pub mod store;
pub mod traits;
pub mod types;

// Re-export main types for convenience
pub use column::{Column, ColumnData, ColumnFlags, Heap, RowReader};
pub use config::{MarshalConfig, NullOrdering};
pub use conversion::{column_to_arrow, columns_to_record_batch};
pub use error::{MALLOC_FAIL, MarshalError, Result};
pub use fetch::{fetch_flat, fetch_objects, fetch_scalar, read_value};
pub use host::{HostContext, NativeHost};
pub use marshaller::Marshaller;
pub use probe::{probe_all, probe_nulls};
pub use store::{build_column, store_objects, store_primitive, store_values};
pub use traits::host::{HostRuntime, PrimitiveArray};
pub use traits::sealed::{Atom, Primitive};
pub use types::{DecimalSpec, HostKind, HostValue, LogicalType, StorageKind};
