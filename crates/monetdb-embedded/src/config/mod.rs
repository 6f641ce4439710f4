//! Configuration management
//!
//! Supports configuration loading with precedence: env > file > defaults

mod builder;
mod env;
mod file;

pub use builder::{EmbeddedConfig, EmbeddedConfigBuilder, IN_MEMORY, TelemetryConfig};

use crate::Result;

/// Serializes tests that touch process environment variables.
#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Load configuration with precedence: env > file > defaults
pub fn load_config() -> Result<EmbeddedConfigBuilder> {
    let mut builder = EmbeddedConfigBuilder::new();

    if let Some(path) = file::find_config_file() {
        tracing::info!("Loading configuration from {}", path.display());
        builder = file::load_from_file(&path, builder)?;
    }

    env::load_from_env(builder)
}

/// Load configuration from a specific file path
pub fn load_config_from_path(path: &std::path::Path) -> Result<EmbeddedConfigBuilder> {
    let builder = file::load_from_file(path, EmbeddedConfigBuilder::new())?;
    env::load_from_env(builder)
}
