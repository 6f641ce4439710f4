//! Canonical value codecs shared by fetch and store.
//!
//! - [`decimal`]: scaled integer to and from the canonical decimal string
//! - [`oid`]: row ids to and from `"<n>@0"`
//! - [`temporal`]: engine dates and times to and from host epoch milliseconds

pub mod decimal;
pub mod oid;
pub mod temporal;
