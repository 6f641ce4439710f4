//! Marshalling configuration.

use std::fmt;
use std::str::FromStr;

use bigdecimal::RoundingMode;

use crate::MarshalError;
use crate::codec::temporal::DEFAULT_HOST_BIAS_MS;

/// Where nil values sit when column build tracks sortedness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NullOrdering {
    /// Nil compares below every value, like the engine's raw sentinel order
    /// for signed integers.
    #[default]
    First,
    /// Nil rows are left out of the comparison; sortedness describes the
    /// non-nil subsequence.
    Skip,
}

impl NullOrdering {
    /// Lowercase name as used in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for NullOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NullOrdering {
    type Err = MarshalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "skip" => Ok(Self::Skip),
            other => Err(MarshalError::value_conversion(
                "null ordering",
                format!("unknown policy '{other}', expected 'first' or 'skip'"),
            )),
        }
    }
}

/// Parse a rounding mode name such as `half_up` or `HalfEven`.
///
/// # Errors
///
/// Returns a value conversion error for unknown names.
pub fn parse_rounding_mode(name: &str) -> crate::Result<RoundingMode> {
    let normalized: String = name
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .collect::<String>()
        .to_ascii_lowercase();
    match normalized.as_str() {
        "up" => Ok(RoundingMode::Up),
        "down" => Ok(RoundingMode::Down),
        "ceiling" => Ok(RoundingMode::Ceiling),
        "floor" => Ok(RoundingMode::Floor),
        "halfup" => Ok(RoundingMode::HalfUp),
        "halfdown" => Ok(RoundingMode::HalfDown),
        "halfeven" => Ok(RoundingMode::HalfEven),
        _ => Err(MarshalError::value_conversion(
            "rounding mode",
            format!("unknown rounding mode '{name}'"),
        )),
    }
}

/// Configuration shared by every fetch and store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarshalConfig {
    /// Bias in milliseconds subtracted from time and timestamp values on
    /// fetch and added back on store.
    ///
    /// Default: 3,600,000 (one hour).
    pub time_bias_ms: i64,

    /// Nil placement used by sortedness tracking. Default: `First`.
    pub null_ordering: NullOrdering,

    /// Rounding applied when a host decimal has more fraction digits than
    /// the column scale. Default: `HalfUp`.
    pub rounding: RoundingMode,
}

impl Default for MarshalConfig {
    fn default() -> Self {
        Self {
            time_bias_ms: DEFAULT_HOST_BIAS_MS,
            null_ordering: NullOrdering::First,
            rounding: RoundingMode::HalfUp,
        }
    }
}

impl MarshalConfig {
    /// Set the host clock bias.
    #[must_use]
    pub const fn time_bias_ms(mut self, bias: i64) -> Self {
        self.time_bias_ms = bias;
        self
    }

    /// Set the nil placement for sortedness tracking.
    #[must_use]
    pub const fn null_ordering(mut self, ordering: NullOrdering) -> Self {
        self.null_ordering = ordering;
        self
    }

    /// Set the decimal rounding mode.
    #[must_use]
    pub const fn rounding(mut self, mode: RoundingMode) -> Self {
        self.rounding = mode;
        self
    }

    /// Configuration for hosts whose constructors take plain UTC epoch
    /// milliseconds.
    #[must_use]
    pub const fn utc() -> Self {
        Self {
            time_bias_ms: 0,
            null_ordering: NullOrdering::First,
            rounding: RoundingMode::HalfUp,
        }
    }
}
