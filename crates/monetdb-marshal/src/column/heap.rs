//! Out-of-line storage for variable-length payloads.
//!
//! Each entry is an 8-byte little-endian length followed by the payload.
//! A string nil is the one-byte payload [`STR_NIL`]. A blob nil is an entry
//! whose length field holds [`BLOB_NIL_LEN`] and has no payload. Entries are
//! never shared: appending the same bytes twice yields two entries.

use crate::error::reserve_failed;
use crate::{MarshalError, Result};

/// Canonical nil string payload.
pub const STR_NIL: &[u8] = &[0x80];

/// Length sentinel of a nil blob entry.
pub const BLOB_NIL_LEN: u64 = u64::MAX;

const LEN_BYTES: usize = 8;

/// One decoded heap entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapEntry<'a> {
    /// Entry carrying the blob length sentinel.
    NilBlob,
    /// Entry payload.
    Bytes(&'a [u8]),
}

/// Byte heap owned by one column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Heap {
    bytes: Vec<u8>,
}

impl Heap {
    /// Create an empty heap.
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Size of the heap in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if nothing was appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Append a payload and return its offset.
    ///
    /// # Errors
    ///
    /// Returns an out-of-memory error if the heap cannot grow.
    pub fn append(&mut self, payload: &[u8]) -> Result<u64> {
        self.bytes
            .try_reserve(LEN_BYTES + payload.len())
            .map_err(reserve_failed("heap payload"))?;
        let offset = self.bytes.len() as u64;
        self.bytes.extend_from_slice(&(payload.len() as u64).to_le_bytes());
        self.bytes.extend_from_slice(payload);
        Ok(offset)
    }

    /// Append a nil blob entry and return its offset.
    ///
    /// # Errors
    ///
    /// Returns an out-of-memory error if the heap cannot grow.
    pub fn append_nil_blob(&mut self) -> Result<u64> {
        self.bytes
            .try_reserve(LEN_BYTES)
            .map_err(reserve_failed("heap payload"))?;
        let offset = self.bytes.len() as u64;
        self.bytes.extend_from_slice(&BLOB_NIL_LEN.to_le_bytes());
        Ok(offset)
    }

    /// Decode the entry at `offset`.
    ///
    /// # Errors
    ///
    /// Returns a value conversion error if the offset or the stored length
    /// points outside the heap.
    pub fn entry(&self, offset: u64) -> Result<HeapEntry<'_>> {
        let corrupt = || MarshalError::value_conversion("heap", format!("bad entry at offset {offset}"));
        let start = usize::try_from(offset).map_err(|_| corrupt())?;
        let header = start
            .checked_add(LEN_BYTES)
            .and_then(|end| self.bytes.get(start..end))
            .ok_or_else(corrupt)?;
        let mut len_bytes = [0_u8; LEN_BYTES];
        len_bytes.copy_from_slice(header);
        let len = u64::from_le_bytes(len_bytes);
        if len == BLOB_NIL_LEN {
            return Ok(HeapEntry::NilBlob);
        }
        let body = start + LEN_BYTES;
        usize::try_from(len)
            .ok()
            .and_then(|len| body.checked_add(len))
            .and_then(|end| self.bytes.get(body..end))
            .map(HeapEntry::Bytes)
            .ok_or_else(corrupt)
    }

    /// Payload at `offset` for ordering purposes; nil blobs and bad offsets
    /// read as empty.
    pub(crate) fn payload(&self, offset: u64) -> &[u8] {
        match self.entry(offset) {
            Ok(HeapEntry::Bytes(bytes)) => bytes,
            _ => &[],
        }
    }
}
