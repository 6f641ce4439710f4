//! Host-side value model.
//!
//! [`HostValue`] is what a fetch produces before the host runtime wraps it in
//! an object, and what a store receives after the host runtime unwraps one.
//! Temporal values carry host epoch milliseconds.

use std::fmt;

use bigdecimal::BigDecimal;

/// Kind of host object, one per boxed host class the layer constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HostKind {
    /// `java.lang.Boolean`
    Boolean,
    /// `java.lang.Byte`
    Byte,
    /// `java.lang.Short`
    Short,
    /// `java.lang.Integer`
    Integer,
    /// `java.lang.Long`
    Long,
    /// `java.lang.Float`
    Float,
    /// `java.lang.Double`
    Double,
    /// `java.sql.Date`
    Date,
    /// `java.sql.Time`
    Time,
    /// `java.sql.Timestamp`
    Timestamp,
    /// `java.math.BigDecimal`
    Decimal,
    /// `java.lang.String`
    String,
    /// `byte[]`
    Bytes,
}

impl HostKind {
    /// Every kind, in registry order.
    pub const ALL: [Self; 13] = [
        Self::Boolean,
        Self::Byte,
        Self::Short,
        Self::Integer,
        Self::Long,
        Self::Float,
        Self::Double,
        Self::Date,
        Self::Time,
        Self::Timestamp,
        Self::Decimal,
        Self::String,
        Self::Bytes,
    ];

    /// Position of this kind in [`HostKind::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Binary class name the host registry resolves.
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Boolean => "java/lang/Boolean",
            Self::Byte => "java/lang/Byte",
            Self::Short => "java/lang/Short",
            Self::Integer => "java/lang/Integer",
            Self::Long => "java/lang/Long",
            Self::Float => "java/lang/Float",
            Self::Double => "java/lang/Double",
            Self::Date => "java/sql/Date",
            Self::Time => "java/sql/Time",
            Self::Timestamp => "java/sql/Timestamp",
            Self::Decimal => "java/math/BigDecimal",
            Self::String => "java/lang/String",
            Self::Bytes => "[B",
        }
    }

    /// Element label used in array-shape error messages.
    #[must_use]
    pub const fn array_label(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Integer => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Date => "java.sql.Date",
            Self::Time => "java.sql.Time",
            Self::Timestamp => "java.sql.Timestamp",
            Self::Decimal => "java.math.BigDecimal",
            Self::String => "java.lang.String",
            Self::Bytes => "byte[]",
        }
    }
}

impl fmt::Display for HostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.array_label())
    }
}

/// A non-null host value.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    /// Boolean scalar.
    Boolean(bool),
    /// 8-bit integer.
    Byte(i8),
    /// 16-bit integer.
    Short(i16),
    /// 32-bit integer.
    Integer(i32),
    /// 64-bit integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Date as host epoch milliseconds.
    Date(i64),
    /// Time of day as host epoch milliseconds.
    Time(i64),
    /// Timestamp as host epoch milliseconds.
    Timestamp(i64),
    /// Arbitrary-precision decimal.
    Decimal(BigDecimal),
    /// Character data; also carries formatted row ids.
    String(String),
    /// Opaque bytes.
    Bytes(Vec<u8>),
}

impl HostValue {
    /// The host kind that wraps this value.
    #[must_use]
    pub const fn kind(&self) -> HostKind {
        match self {
            Self::Boolean(_) => HostKind::Boolean,
            Self::Byte(_) => HostKind::Byte,
            Self::Short(_) => HostKind::Short,
            Self::Integer(_) => HostKind::Integer,
            Self::Long(_) => HostKind::Long,
            Self::Float(_) => HostKind::Float,
            Self::Double(_) => HostKind::Double,
            Self::Date(_) => HostKind::Date,
            Self::Time(_) => HostKind::Time,
            Self::Timestamp(_) => HostKind::Timestamp,
            Self::Decimal(_) => HostKind::Decimal,
            Self::String(_) => HostKind::String,
            Self::Bytes(_) => HostKind::Bytes,
        }
    }
}
