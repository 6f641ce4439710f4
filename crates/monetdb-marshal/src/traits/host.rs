//! The host runtime seam.
//!
//! The marshalling paths never talk to a host runtime directly. They go
//! through [`HostRuntime`] for boxed objects and [`PrimitiveArray`] for flat
//! destination arrays.

use crate::{MarshalError, Result};
use crate::traits::sealed::Primitive;
use crate::types::{HostKind, HostValue};

/// A managed host runtime that owns boxed objects.
///
/// Classes are resolved once, at startup, into a
/// [`HostContext`](crate::host::HostContext) and handed back on every
/// construction.
pub trait HostRuntime {
    /// Resolved class handle.
    type Class;

    /// Host object reference.
    type Object;

    /// Resolve the class backing a host kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot find the class.
    fn resolve_class(&mut self, kind: HostKind) -> Result<Self::Class>;

    /// Release a class handle obtained from [`HostRuntime::resolve_class`].
    fn release_class(&mut self, class: Self::Class) {
        let _ = class;
    }

    /// Construct a host object of `class` holding `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if construction fails, including allocation failure
    /// inside the host.
    fn construct(&mut self, class: &Self::Class, value: HostValue) -> Result<Self::Object>;

    /// Read the value held by a host object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object cannot be read, e.g. string extraction
    /// failed.
    fn extract(&mut self, object: &Self::Object) -> Result<HostValue>;
}

/// A host array of primitives used as a flat fetch destination.
pub trait PrimitiveArray<T: Primitive> {
    /// Number of elements in the array.
    fn len(&self) -> usize;

    /// Returns true if the array has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Direct view over the array's storage, when the host can pin it.
    fn pinned(&mut self) -> Option<&mut [T]>;

    /// Write `values` into the array starting at `start`.
    ///
    /// # Errors
    ///
    /// Returns an error if the region is out of bounds.
    fn set_region(&mut self, start: usize, values: &[T]) -> Result<()>;
}

impl<T: Primitive> PrimitiveArray<T> for [T] {
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn pinned(&mut self) -> Option<&mut [T]> {
        Some(self)
    }

    fn set_region(&mut self, start: usize, values: &[T]) -> Result<()> {
        let len = <[T]>::len(self);
        let end = start
            .checked_add(values.len())
            .ok_or_else(|| MarshalError::row_out_of_range(start, usize::MAX, len))?;
        let target = self
            .get_mut(start..end)
            .ok_or_else(|| MarshalError::row_out_of_range(start, end, len))?;
        target.copy_from_slice(values);
        Ok(())
    }
}

impl<T: Primitive> PrimitiveArray<T> for Vec<T> {
    fn len(&self) -> usize {
        Self::len(self)
    }

    fn pinned(&mut self) -> Option<&mut [T]> {
        Some(self.as_mut_slice())
    }

    fn set_region(&mut self, start: usize, values: &[T]) -> Result<()> {
        self.as_mut_slice().set_region(start, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_region_write() {
        let mut dst = [0_i32; 4];
        dst.set_region(1, &[7, 8]).unwrap();
        assert_eq!(dst, [0, 7, 8, 0]);
    }

    #[test]
    fn test_region_out_of_bounds() {
        let mut dst = vec![0_i16; 2];
        let err = dst.set_region(1, &[1, 2]).unwrap_err();
        assert!(err.is_row_out_of_range());
    }

    #[test]
    fn test_region_start_overflow() {
        let mut dst = [0_i32; 4];
        let err = dst.set_region(usize::MAX, &[1, 2]).unwrap_err();
        assert!(err.is_row_out_of_range());
        assert_eq!(dst, [0; 4]);
    }

    #[test]
    fn test_slice_region_past_end() {
        let mut dst = [0_i64; 3];
        let err = PrimitiveArray::<i64>::set_region(&mut dst[..], 2, &[5, 6]).unwrap_err();
        assert!(err.is_row_out_of_range());
        assert_eq!(dst, [0; 3]);
    }

    #[test]
    fn test_vec_is_pinned() {
        let mut dst = vec![0.0_f64; 3];
        assert!(PrimitiveArray::<f64>::pinned(&mut dst).is_some());
        assert!(!PrimitiveArray::<f64>::is_empty(&dst));
    }
}
