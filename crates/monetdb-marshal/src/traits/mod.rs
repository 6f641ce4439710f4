//! Trait definitions for the marshalling paths.
//!
//! - [`sealed`]: storage atoms and host primitives (sealed)
//! - [`host`]: the host runtime seam and flat destination arrays

pub mod host;
pub mod sealed;
