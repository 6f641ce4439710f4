//! Sealed traits over the closed set of storage and host primitive types.
//!
//! External code can USE these traits but CANNOT implement them. The set of
//! fixed-width storage types is fixed by the engine, and the generic fetch
//! and store paths rely on every implementation being one of them.

use std::cmp::Ordering;
use std::fmt;

use crate::column::ColumnData;
use crate::types::{HostKind, LogicalType, StorageKind};

/// Private module that external crates cannot access.
pub(crate) mod private {
    /// Marker trait that seals the public traits.
    pub trait Sealed {}
}

/// A fixed-width value as stored in a column slot.
///
/// Each atom reserves one bit pattern as its nil sentinel.
pub trait Atom: private::Sealed + Copy + PartialOrd + fmt::Debug + Send + Sync + 'static {
    /// The nil sentinel.
    const NIL: Self;

    /// Storage this atom occupies.
    const STORAGE: StorageKind;

    /// Returns true if this value is the nil sentinel.
    fn is_nil(self) -> bool;

    /// Natural order of two non-nil values.
    fn natural_cmp(self, other: Self) -> Ordering {
        self.partial_cmp(&other).unwrap_or(Ordering::Equal)
    }

    /// Borrow the typed slots of a column, if the storage matches.
    fn slots(data: &ColumnData) -> Option<&[Self]>;

    /// Wrap owned slots into column storage.
    fn into_data(values: Vec<Self>) -> ColumnData;
}

macro_rules! impl_int_atom {
    ($ty:ty, $variant:ident, $nil:expr) => {
        impl private::Sealed for $ty {}
        impl Atom for $ty {
            const NIL: Self = $nil;
            const STORAGE: StorageKind = StorageKind::$variant;

            fn is_nil(self) -> bool {
                self == Self::NIL
            }

            fn slots(data: &ColumnData) -> Option<&[Self]> {
                match data {
                    ColumnData::$variant(values) => Some(values),
                    _ => None,
                }
            }

            fn into_data(values: Vec<Self>) -> ColumnData {
                ColumnData::$variant(values)
            }
        }
    };
}

impl_int_atom!(i8, I8, i8::MIN);
impl_int_atom!(i16, I16, i16::MIN);
impl_int_atom!(i32, I32, i32::MIN);
impl_int_atom!(i64, I64, i64::MIN);
impl_int_atom!(u64, Oid, 1 << 63);

macro_rules! impl_float_atom {
    ($ty:ty, $variant:ident) => {
        impl private::Sealed for $ty {}
        impl Atom for $ty {
            const NIL: Self = <$ty>::NAN;
            const STORAGE: StorageKind = StorageKind::$variant;

            fn is_nil(self) -> bool {
                self.is_nan()
            }

            fn slots(data: &ColumnData) -> Option<&[Self]> {
                match data {
                    ColumnData::$variant(values) => Some(values),
                    _ => None,
                }
            }

            fn into_data(values: Vec<Self>) -> ColumnData {
                ColumnData::$variant(values)
            }
        }
    };
}

impl_float_atom!(f32, F32);
impl_float_atom!(f64, F64);

/// Element type of a host primitive array.
///
/// Flat batch fetch writes these, primitive store reads them.
pub trait Primitive: private::Sealed + Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// The storage atom backing this primitive.
    type Stored: Atom;

    /// Host kind of the boxed form.
    const HOST_KIND: HostKind;

    /// Returns true if a column of this logical type can be read into or
    /// built from an array of this primitive.
    fn accepts(ty: LogicalType) -> bool;

    /// Convert a stored slot to the host primitive.
    fn load(stored: Self::Stored) -> Self;

    /// Convert a host primitive to its stored slot.
    fn save(self) -> Self::Stored;

    /// Copy a run of slots into a destination of the same length.
    fn copy_run(src: &[Self::Stored], dst: &mut [Self]) {
        for (slot, value) in dst.iter_mut().zip(src) {
            *slot = Self::load(*value);
        }
    }
}

impl Primitive for bool {
    type Stored = i8;
    const HOST_KIND: HostKind = HostKind::Boolean;

    fn accepts(ty: LogicalType) -> bool {
        ty == LogicalType::Boolean
    }

    fn load(stored: i8) -> Self {
        stored != 0
    }

    fn save(self) -> i8 {
        i8::from(self)
    }
}

impl private::Sealed for bool {}

macro_rules! impl_identity_primitive {
    ($ty:ty, $kind:ident, $logical:ident) => {
        impl Primitive for $ty {
            type Stored = $ty;
            const HOST_KIND: HostKind = HostKind::$kind;

            fn accepts(ty: LogicalType) -> bool {
                ty == LogicalType::$logical
            }

            fn load(stored: $ty) -> Self {
                stored
            }

            fn save(self) -> $ty {
                self
            }

            fn copy_run(src: &[$ty], dst: &mut [Self]) {
                dst.copy_from_slice(src);
            }
        }
    };
}

impl_identity_primitive!(i8, Byte, TinyInt);
impl_identity_primitive!(i16, Short, SmallInt);
impl_identity_primitive!(i32, Integer, Int);
impl_identity_primitive!(i64, Long, BigInt);
impl_identity_primitive!(f32, Float, Real);
impl_identity_primitive!(f64, Double, Double);
