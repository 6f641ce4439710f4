//! Environment variable loading for configuration

use std::env;
use std::num::NonZeroUsize;

use monetdb_marshal::NullOrdering;
use monetdb_marshal::config::parse_rounding_mode;

use super::builder::EmbeddedConfigBuilder;
use crate::{EmbeddedError, Result};

/// Environment variable names
mod vars {
    pub const MONETDB_DBDIR: &str = "MONETDB_DBDIR";
    pub const MONETDB_SILENT: &str = "MONETDB_SILENT";
    pub const MONETDB_SEQUENTIAL: &str = "MONETDB_SEQUENTIAL";
    pub const MONETDB_REPLY_SIZE: &str = "MONETDB_REPLY_SIZE";
    pub const MONETDB_TIME_BIAS_MS: &str = "MONETDB_TIME_BIAS_MS";
    pub const MONETDB_NULL_ORDERING: &str = "MONETDB_NULL_ORDERING";
    pub const MONETDB_ROUNDING_MODE: &str = "MONETDB_ROUNDING_MODE";
    pub const RUST_LOG: &str = "RUST_LOG";
    pub const MONETDB_JSON_LOGS: &str = "MONETDB_JSON_LOGS";
}

/// Load configuration from environment variables
pub fn load_from_env(mut builder: EmbeddedConfigBuilder) -> Result<EmbeddedConfigBuilder> {
    if let Ok(directory) = env::var(vars::MONETDB_DBDIR) {
        builder = builder.directory(directory);
    }

    if let Ok(val) = env::var(vars::MONETDB_SILENT) {
        builder = builder.silent(parse_bool(&val));
    }

    if let Ok(val) = env::var(vars::MONETDB_SEQUENTIAL) {
        builder = builder.sequential(parse_bool(&val));
    }

    if let Ok(size_str) = env::var(vars::MONETDB_REPLY_SIZE)
        && let Ok(size) = size_str.parse::<usize>()
        && let Some(nz) = NonZeroUsize::new(size)
    {
        builder = builder.reply_size(nz);
    }

    if let Ok(bias_str) = env::var(vars::MONETDB_TIME_BIAS_MS)
        && let Ok(bias) = bias_str.parse::<i64>()
    {
        builder = builder.time_bias_ms(bias);
    }

    // Marshal policies reject unknown names instead of falling back
    if let Ok(ordering) = env::var(vars::MONETDB_NULL_ORDERING) {
        let ordering: NullOrdering = ordering.parse().map_err(|e| {
            EmbeddedError::config(format!("Invalid {}: {e}", vars::MONETDB_NULL_ORDERING))
        })?;
        builder = builder.null_ordering(ordering);
    }

    if let Ok(mode) = env::var(vars::MONETDB_ROUNDING_MODE) {
        let mode = parse_rounding_mode(&mode).map_err(|e| {
            EmbeddedError::config(format!("Invalid {}: {e}", vars::MONETDB_ROUNDING_MODE))
        })?;
        builder = builder.rounding(mode);
    }

    if let Ok(level) = env::var(vars::RUST_LOG) {
        builder = builder.log_level(level);
    }

    if let Ok(val) = env::var(vars::MONETDB_JSON_LOGS) {
        builder = builder.json_logs(parse_bool(&val));
    }

    Ok(builder)
}

fn parse_bool(s: &str) -> bool {
    matches!(s.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
