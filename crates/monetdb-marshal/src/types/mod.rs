//! Type system for column marshalling.
//!
//! - [`logical`]: engine-side logical column types and SQL name mapping
//! - [`descriptor`]: per-type description table driving the generic paths
//! - [`host`]: host-side value model
//! - [`arrow`]: Arrow data types for exported columns

pub mod arrow;
pub mod descriptor;
pub mod host;
pub mod logical;

pub use descriptor::{NilFamily, StorageKind, TypeDescriptor};
pub use host::{HostKind, HostValue};
pub use logical::{DecimalSpec, LogicalType};
