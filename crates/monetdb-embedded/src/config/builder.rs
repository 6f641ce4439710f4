//! Configuration builder

use std::num::NonZeroUsize;
use std::path::PathBuf;

use bigdecimal::RoundingMode;
use monetdb_marshal::codec::temporal::DEFAULT_HOST_BIAS_MS;
use monetdb_marshal::{MarshalConfig, NullOrdering};

use crate::EmbeddedError;

/// Directory value selecting an in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Database configuration
#[derive(Debug, Clone)]
pub struct EmbeddedConfig {
    /// Database farm directory, `None` for an in-memory database.
    pub directory: Option<PathBuf>,
    /// Suppress engine console output.
    pub silent: bool,
    /// Run the engine single-threaded.
    pub sequential: bool,
    /// Reply size set on every new connection.
    pub reply_size: NonZeroUsize,
    /// Settings for every fetch and store.
    pub marshal: MarshalConfig,
    /// Logging settings.
    pub telemetry: TelemetryConfig,
}

impl EmbeddedConfig {
    /// Create a configuration builder.
    #[must_use]
    pub const fn builder() -> EmbeddedConfigBuilder {
        EmbeddedConfigBuilder::new()
    }

    /// Returns true when no directory is set.
    #[must_use]
    pub const fn is_in_memory(&self) -> bool {
        self.directory.is_none()
    }

    /// Marshal settings.
    #[must_use]
    pub const fn marshal(&self) -> &MarshalConfig {
        &self.marshal
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit JSON lines instead of plain text.
    pub json_logs: bool,
}

/// Configuration builder with fluent API
#[derive(Debug)]
pub struct EmbeddedConfigBuilder {
    directory: Option<String>,
    silent: bool,
    sequential: bool,
    reply_size: NonZeroUsize,
    marshal: MarshalConfig,
    telemetry: TelemetryConfig,
}

impl EmbeddedConfigBuilder {
    const DEFAULT_REPLY_SIZE: NonZeroUsize = NonZeroUsize::MIN.saturating_add(99);

    /// Create a builder with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            directory: None,
            silent: true,
            sequential: false,
            reply_size: Self::DEFAULT_REPLY_SIZE,
            marshal: MarshalConfig::utc().time_bias_ms(DEFAULT_HOST_BIAS_MS),
            telemetry: TelemetryConfig {
                log_level: String::new(),
                json_logs: false,
            },
        }
    }

    /// Database directory; [`IN_MEMORY`] selects an in-memory database.
    #[must_use]
    pub fn directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Use an in-memory database.
    #[must_use]
    pub fn in_memory(mut self) -> Self {
        self.directory = Some(IN_MEMORY.to_string());
        self
    }

    /// Suppress engine console output.
    #[must_use]
    pub const fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Run the engine single-threaded.
    #[must_use]
    pub const fn sequential(mut self, sequential: bool) -> Self {
        self.sequential = sequential;
        self
    }

    /// Reply size for new connections.
    #[must_use]
    pub const fn reply_size(mut self, size: NonZeroUsize) -> Self {
        self.reply_size = size;
        self
    }

    /// Host clock bias in milliseconds.
    #[must_use]
    pub const fn time_bias_ms(mut self, bias: i64) -> Self {
        self.marshal = self.marshal.time_bias_ms(bias);
        self
    }

    /// Nil placement for sortedness tracking.
    #[must_use]
    pub const fn null_ordering(mut self, ordering: NullOrdering) -> Self {
        self.marshal = self.marshal.null_ordering(ordering);
        self
    }

    /// Rounding for host decimals wider than the column scale.
    #[must_use]
    pub const fn rounding(mut self, mode: RoundingMode) -> Self {
        self.marshal = self.marshal.rounding(mode);
        self
    }

    /// Log filter used when `RUST_LOG` is unset.
    #[must_use]
    pub fn log_level(mut self, level: String) -> Self {
        self.telemetry.log_level = level;
        self
    }

    /// Emit JSON log lines.
    #[must_use]
    pub const fn json_logs(mut self, enabled: bool) -> Self {
        self.telemetry.json_logs = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> crate::Result<EmbeddedConfig> {
        let directory = match self.directory.as_deref() {
            None | Some(IN_MEMORY) => None,
            Some("") => return Err(EmbeddedError::config("database directory must not be empty")),
            Some(path) => Some(PathBuf::from(path)),
        };

        let log_level = if self.telemetry.log_level.is_empty() {
            "info".to_string()
        } else {
            self.telemetry.log_level
        };

        Ok(EmbeddedConfig {
            directory,
            silent: self.silent,
            sequential: self.sequential,
            reply_size: self.reply_size,
            marshal: self.marshal,
            telemetry: TelemetryConfig {
                log_level,
                json_logs: self.telemetry.json_logs,
            },
        })
    }
}

impl Default for EmbeddedConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = EmbeddedConfigBuilder::new().build().unwrap();
        assert!(config.is_in_memory());
        assert!(config.silent);
        assert!(!config.sequential);
        assert_eq!(config.reply_size.get(), 100);
        assert_eq!(config.marshal, MarshalConfig::default());
        assert_eq!(config.telemetry.log_level, "info");
        assert!(!config.telemetry.json_logs);
    }

    #[test]
    fn test_memory_directory() {
        let config = EmbeddedConfig::builder().directory(IN_MEMORY).build().unwrap();
        assert!(config.is_in_memory());
        let config = EmbeddedConfig::builder().in_memory().build().unwrap();
        assert!(config.directory.is_none());
    }

    #[test]
    fn test_directory() {
        let config = EmbeddedConfig::builder().directory("/var/lib/farm").build().unwrap();
        assert_eq!(config.directory, Some(PathBuf::from("/var/lib/farm")));
        assert!(!config.is_in_memory());
    }

    #[test]
    fn test_empty_directory_rejected() {
        let err = EmbeddedConfig::builder().directory("").build().unwrap_err();
        assert!(matches!(err, EmbeddedError::Config(_)));
    }

    #[test]
    fn test_marshal_settings() {
        let config = EmbeddedConfig::builder()
            .time_bias_ms(0)
            .null_ordering(NullOrdering::Skip)
            .rounding(RoundingMode::HalfEven)
            .build()
            .unwrap();
        assert_eq!(config.marshal().time_bias_ms, 0);
        assert_eq!(config.marshal().null_ordering, NullOrdering::Skip);
        assert_eq!(config.marshal().rounding, RoundingMode::HalfEven);
    }

    #[test]
    fn test_flags_and_telemetry() {
        let config = EmbeddedConfig::builder()
            .silent(false)
            .sequential(true)
            .reply_size(NonZeroUsize::new(500).unwrap())
            .log_level("debug".to_string())
            .json_logs(true)
            .build()
            .unwrap();
        assert!(!config.silent);
        assert!(config.sequential);
        assert_eq!(config.reply_size.get(), 500);
        assert_eq!(config.telemetry.log_level, "debug");
        assert!(config.telemetry.json_logs);
    }

    #[test]
    fn test_builder_debug() {
        let builder = EmbeddedConfigBuilder::default();
        assert!(format!("{builder:?}").contains("EmbeddedConfigBuilder"));
    }
}
