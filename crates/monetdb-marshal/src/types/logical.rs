//! Logical column types.
//!
//! A [`LogicalType`] is what the engine declares for a column. It selects
//! the static descriptor, the fixed-width storage and the host
//! representation.

use std::fmt;

use super::descriptor::{self, StorageKind, TypeDescriptor};
use super::host::HostKind;
use crate::{MarshalError, Result};

/// Largest decimal precision that fits 64-bit storage.
pub const MAX_DECIMAL_PRECISION: u8 = 18;

/// Validated decimal precision and scale.
///
/// Ensures `1 <= precision <= 18` and `scale <= precision` at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecimalSpec {
    precision: u8,
    scale: u8,
}

impl DecimalSpec {
    /// Create a decimal specification.
    ///
    /// # Errors
    ///
    /// Returns an unknown-type error when the precision needs more than 64
    /// bits or the scale exceeds the precision.
    pub fn new(precision: u8, scale: u8) -> Result<Self> {
        if precision == 0 || precision > MAX_DECIMAL_PRECISION || scale > precision {
            return Err(MarshalError::unknown_type(format!(
                "decimal({precision},{scale})"
            )));
        }
        Ok(Self { precision, scale })
    }

    /// Returns the precision value.
    #[must_use]
    pub const fn precision(&self) -> u8 {
        self.precision
    }

    /// Returns the scale value.
    #[must_use]
    pub const fn scale(&self) -> u8 {
        self.scale
    }

    /// Storage width chosen by precision.
    #[must_use]
    pub const fn storage(&self) -> StorageKind {
        match self.precision {
            0..=2 => StorageKind::I8,
            3..=4 => StorageKind::I16,
            5..=9 => StorageKind::I32,
            _ => StorageKind::I64,
        }
    }
}

/// Logical type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    /// `boolean`
    Boolean,
    /// `tinyint`
    TinyInt,
    /// `smallint`
    SmallInt,
    /// `int`, `month_interval`
    Int,
    /// `bigint`, `sec_interval`
    BigInt,
    /// `real`
    Real,
    /// `double`
    Double,
    /// `oid` row identifier
    Oid,
    /// `date`, stored as days since 1970-01-01
    Date,
    /// `time`, stored as microseconds since midnight
    Time,
    /// `timestamp`, stored as microseconds since 1970-01-01T00:00
    Timestamp,
    /// `decimal(p,s)`, stored as a scaled integer
    Decimal(DecimalSpec),
    /// `char`, `varchar`, `clob`
    String,
    /// `blob`
    Blob,
}

impl LogicalType {
    /// Map an engine SQL type name to a logical type.
    ///
    /// Names are matched by prefix in the engine's order, which checks
    /// `timestamp` before `time`. `digits` and `scale` are only read for
    /// decimals.
    ///
    /// # Errors
    ///
    /// Returns an unknown-type error for any other name.
    pub fn from_sql(name: &str, digits: u32, scale: u32) -> Result<Self> {
        let ty = if name.starts_with("boolean") {
            Self::Boolean
        } else if name.starts_with("tinyint") {
            Self::TinyInt
        } else if name.starts_with("smallint") {
            Self::SmallInt
        } else if name.starts_with("int") || name.starts_with("month_interval") {
            Self::Int
        } else if name.starts_with("bigint") || name.starts_with("sec_interval") {
            Self::BigInt
        } else if name.starts_with("real") {
            Self::Real
        } else if name.starts_with("double") {
            Self::Double
        } else if name.starts_with("char")
            || name.starts_with("varchar")
            || name.starts_with("clob")
        {
            Self::String
        } else if name.starts_with("date") {
            Self::Date
        } else if name.starts_with("timestamp") {
            Self::Timestamp
        } else if name.starts_with("time") {
            Self::Time
        } else if name.starts_with("blob") {
            Self::Blob
        } else if name.starts_with("decimal") {
            let precision = u8::try_from(digits)
                .map_err(|_| MarshalError::unknown_type(format!("{name}({digits},{scale})")))?;
            let scale = u8::try_from(scale)
                .map_err(|_| MarshalError::unknown_type(format!("{name}({digits},{scale})")))?;
            Self::Decimal(DecimalSpec::new(precision, scale)?)
        } else if name.starts_with("oid") {
            Self::Oid
        } else {
            return Err(MarshalError::unknown_type(name));
        };
        Ok(ty)
    }

    /// Static descriptor for this type.
    #[must_use]
    pub const fn descriptor(&self) -> &'static TypeDescriptor {
        match self {
            Self::Boolean => &descriptor::BOOLEAN,
            Self::TinyInt => &descriptor::TINYINT,
            Self::SmallInt => &descriptor::SMALLINT,
            Self::Int => &descriptor::INT,
            Self::BigInt => &descriptor::BIGINT,
            Self::Real => &descriptor::REAL,
            Self::Double => &descriptor::DOUBLE,
            Self::Oid => &descriptor::OID,
            Self::Date => &descriptor::DATE,
            Self::Time => &descriptor::TIME,
            Self::Timestamp => &descriptor::TIMESTAMP,
            Self::Decimal(_) => &descriptor::DECIMAL,
            Self::String => &descriptor::STRING,
            Self::Blob => &descriptor::BLOB,
        }
    }

    /// Fixed-width storage of this type.
    #[must_use]
    pub const fn storage(&self) -> StorageKind {
        match self {
            Self::Decimal(spec) => spec.storage(),
            other => other.descriptor().storage,
        }
    }

    /// Host object kind for this type.
    #[must_use]
    pub const fn host_kind(&self) -> HostKind {
        self.descriptor().host_kind
    }

    /// Result-set type id reported to the host.
    #[must_use]
    pub const fn type_id(&self) -> i32 {
        self.descriptor().type_id
    }

    /// Check if the type is an integer or float type.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::TinyInt | Self::SmallInt | Self::Int | Self::BigInt | Self::Real | Self::Double
        )
    }

    /// Check if the type is a temporal type.
    #[must_use]
    pub const fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::Timestamp)
    }

    /// Check if the type keeps its payload in the out-of-line heap.
    #[must_use]
    pub const fn is_variable_length(&self) -> bool {
        matches!(self, Self::String | Self::Blob)
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decimal(spec) => write!(f, "decimal({},{})", spec.precision, spec.scale),
            other => f.write_str(other.descriptor().sql_name),
        }
    }
}
