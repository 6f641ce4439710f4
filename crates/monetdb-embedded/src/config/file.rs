//! TOML configuration file loading

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use monetdb_marshal::NullOrdering;
use monetdb_marshal::config::parse_rounding_mode;
use serde::Deserialize;

use super::builder::EmbeddedConfigBuilder;
use crate::{EmbeddedError, Result};

/// Configuration file locations checked in order
const CONFIG_PATHS: &[&str] = &[
    "./monetdb-embedded.toml",
    "~/.config/monetdb-embedded/config.toml",
    "/etc/monetdb-embedded/config.toml",
];

/// Find the first existing configuration file
pub fn find_config_file() -> Option<PathBuf> {
    for path_str in CONFIG_PATHS {
        let path = if path_str.starts_with('~') {
            if let Ok(home) = std::env::var("HOME") {
                PathBuf::from(path_str.replacen('~', &home, 1))
            } else {
                continue;
            }
        } else {
            PathBuf::from(path_str)
        };

        if path.exists() {
            return Some(path);
        }
    }
    None
}

/// Load configuration from a TOML file
pub fn load_from_file(path: &Path, builder: EmbeddedConfigBuilder) -> Result<EmbeddedConfigBuilder> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        EmbeddedError::config(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;

    let file_config: FileConfig = toml::from_str(&content).map_err(|e| {
        EmbeddedError::config(format!(
            "Failed to parse config file {}: {}",
            path.display(),
            e
        ))
    })?;

    apply_file_config(builder, file_config)
}

fn apply_file_config(
    mut builder: EmbeddedConfigBuilder,
    config: FileConfig,
) -> Result<EmbeddedConfigBuilder> {
    if let Some(db) = config.database {
        if let Some(directory) = db.directory {
            builder = builder.directory(directory);
        }

        if let Some(silent) = db.silent {
            builder = builder.silent(silent);
        }

        if let Some(sequential) = db.sequential {
            builder = builder.sequential(sequential);
        }

        if let Some(size) = db.reply_size
            && let Some(nz) = NonZeroUsize::new(size)
        {
            builder = builder.reply_size(nz);
        }
    }

    if let Some(marshal) = config.marshal {
        if let Some(bias) = marshal.time_bias_ms {
            builder = builder.time_bias_ms(bias);
        }

        if let Some(ordering) = marshal.null_ordering {
            let ordering: NullOrdering = ordering
                .parse()
                .map_err(|e| EmbeddedError::config(format!("Invalid null_ordering: {e}")))?;
            builder = builder.null_ordering(ordering);
        }

        if let Some(mode) = marshal.rounding {
            let mode = parse_rounding_mode(&mode)
                .map_err(|e| EmbeddedError::config(format!("Invalid rounding: {e}")))?;
            builder = builder.rounding(mode);
        }
    }

    if let Some(obs) = config.observability {
        if let Some(level) = obs.log_level {
            builder = builder.log_level(level);
        }

        if let Some(json) = obs.json_logs {
            builder = builder.json_logs(json);
        }
    }

    Ok(builder)
}

/// Root configuration file structure
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    database: Option<DatabaseFileConfig>,
    marshal: Option<MarshalFileConfig>,
    observability: Option<ObservabilityConfig>,
}

#[derive(Debug, Deserialize)]
struct DatabaseFileConfig {
    directory: Option<String>,
    silent: Option<bool>,
    sequential: Option<bool>,
    reply_size: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct MarshalFileConfig {
    time_bias_ms: Option<i64>,
    null_ordering: Option<String>,
    rounding: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObservabilityConfig {
    log_level: Option<String>,
    json_logs: Option<bool>,
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use bigdecimal::RoundingMode;
    use tempfile::NamedTempFile;

    use super::*;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[database]
directory = "/srv/monetdb"
silent = false
sequential = true
reply_size = 1000

[marshal]
time_bias_ms = 0
null_ordering = "skip"
rounding = "half_even"

[observability]
log_level = "debug"
json_logs = true
"#;

        let config: FileConfig = toml::from_str(toml_content).unwrap();

        let db = config.database.unwrap();
        assert_eq!(db.directory.as_deref(), Some("/srv/monetdb"));
        assert_eq!(db.silent, Some(false));
        assert_eq!(db.reply_size, Some(1000));

        let marshal = config.marshal.unwrap();
        assert_eq!(marshal.time_bias_ms, Some(0));
        assert_eq!(marshal.null_ordering.as_deref(), Some("skip"));

        let obs = config.observability.unwrap();
        assert_eq!(obs.json_logs, Some(true));
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml_content = r#"
[database]
directory = ":memory:"
"#;

        let config: FileConfig = toml::from_str(toml_content).unwrap();
        assert!(config.database.is_some());
        assert!(config.marshal.is_none());
        assert!(config.observability.is_none());
    }

    #[test]
    fn test_load_from_file_success() {
        let temp_file = create_temp_config(
            r#"
[database]
directory = "/srv/monetdb"
reply_size = 42

[marshal]
null_ordering = "skip"
rounding = "down"

[observability]
log_level = "warn"
"#,
        );

        let config = load_from_file(temp_file.path(), EmbeddedConfigBuilder::new())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.directory, Some(PathBuf::from("/srv/monetdb")));
        assert_eq!(config.reply_size.get(), 42);
        assert_eq!(config.marshal.null_ordering, NullOrdering::Skip);
        assert_eq!(config.marshal.rounding, RoundingMode::Down);
        assert_eq!(config.telemetry.log_level, "warn");
    }

    #[test]
    fn test_load_from_file_not_found() {
        let err = load_from_file(
            Path::new("/nonexistent/monetdb-embedded.toml"),
            EmbeddedConfigBuilder::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_from_file_invalid_toml() {
        let temp_file = create_temp_config("[database\ndirectory = ");
        let err = load_from_file(temp_file.path(), EmbeddedConfigBuilder::new()).unwrap_err();
        assert!(matches!(err, EmbeddedError::Config(_)));
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_load_from_file_bad_policy() {
        let temp_file = create_temp_config(
            r#"
[marshal]
null_ordering = "last"
"#,
        );
        let err = load_from_file(temp_file.path(), EmbeddedConfigBuilder::new()).unwrap_err();
        assert!(err.to_string().contains("null_ordering"));
    }

    #[test]
    fn test_empty_file_keeps_defaults() {
        let temp_file = create_temp_config("");
        let config = load_from_file(temp_file.path(), EmbeddedConfigBuilder::new())
            .unwrap()
            .build()
            .unwrap();
        assert!(config.is_in_memory());
        assert!(config.silent);
    }
}
