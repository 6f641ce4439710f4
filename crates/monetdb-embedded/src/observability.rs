//! Logging setup

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::TelemetryConfig;
use crate::{EmbeddedError, Result};

/// Install a global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured level. Fails when a global subscriber
/// is already installed.
pub fn init_logging(config: &TelemetryConfig) -> Result<()> {
    let filter = build_filter(config);

    let fmt_layer = if config.json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(true).boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| EmbeddedError::config(format!("Failed to initialize logging: {e}")))
}

fn build_filter(config: &TelemetryConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let config = TelemetryConfig {
            log_level: "warn".to_string(),
            json_logs: false,
        };
        // Another test in this binary may have installed a subscriber first
        let _ = init_logging(&config);
        let err = init_logging(&config).unwrap_err();
        assert!(matches!(err, EmbeddedError::Config(_)));
    }

    #[test]
    fn test_json_config_builds_filter() {
        let config = TelemetryConfig {
            log_level: "monetdb_embedded=debug".to_string(),
            json_logs: true,
        };
        let filter = build_filter(&config);
        assert!(!format!("{filter}").is_empty());
    }
}
