//! `tax-calculator.toml` handling.
//!
//! ```toml
//! [database]
//! backend = "sqlite"
//! connection_string = "tax.db"
//!
//! [logging]
//! level = "warn"
//! file = "tax-calculator.log"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tax_core::DbConfig;
use thiserror::Error;

pub const CONFIG_ENV_VAR: &str = "TAX_CALCULATOR_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "tax-calculator.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// The `[database]` table. Converted to a [`DbConfig`] by
/// [`AppConfig::db_config`]; unlike `DbConfig`, an omitted connection string
/// means the `tax.db` file rather than an in-memory store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: String,
    /// For SQLite: a file path, `:memory:` or a `sqlite:` URL.
    pub connection_string: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: "tax.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Bare level or full `EnvFilter` directive. `RUST_LOG` wins when set.
    pub level: String,
    /// Append log records to this file as well as stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}

/// Values given on the command line; each one replaces its file setting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub backend: Option<String>,
    pub connection_string: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Load from the resolved config file, or defaults when there is none.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let env_path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        match resolve_path(explicit, env_path, Path::new(DEFAULT_CONFIG_FILE)) {
            Some(path) => {
                let config = Self::from_file(&path)?;
                Ok((config, Some(path)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(backend) = overrides.backend {
            self.database.backend = backend;
        }
        if let Some(connection_string) = overrides.connection_string {
            self.database.connection_string = connection_string;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(file) = overrides.log_file {
            self.logging.file = Some(file);
        }
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            backend: self.database.backend.clone(),
            connection_string: self.database.connection_string.clone(),
        }
    }
}

/// An explicit path or the environment variable is used even when the file
/// is missing (so the read fails loudly); the working-directory default only
/// when it exists.
pub fn resolve_path(
    explicit: Option<&Path>,
    env_path: Option<PathBuf>,
    cwd_default: &Path,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env_path.filter(|p| !p.as_os_str().is_empty()) {
        return Some(path);
    }
    cwd_default.is_file().then(|| cwd_default.to_path_buf())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    // =========================================================================
    // Parsing
    // =========================================================================

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml_str("", Path::new("empty.toml")).unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.database.connection_string, "tax.db");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn full_file_is_read() {
        let text = r#"
            [database]
            backend = "sqlite"
            connection_string = ":memory:"

            [logging]
            level = "debug"
            file = "calc.log"
        "#;

        let config = AppConfig::from_toml_str(text, Path::new("full.toml")).unwrap();

        assert_eq!(config.database.connection_string, ":memory:");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, Some(PathBuf::from("calc.log")));
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let text = "[database]\nconnection_string = \"/var/lib/tax/tax.db\"\n";

        let config = AppConfig::from_toml_str(text, Path::new("partial.toml")).unwrap();

        assert_eq!(config.database.backend, "sqlite");
        assert_eq!(config.database.connection_string, "/var/lib/tax/tax.db");
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn backend_only_section_opens_the_database_file() {
        let text = "[database]\nbackend = \"sqlite\"\n";

        let config = AppConfig::from_toml_str(text, Path::new("backend.toml")).unwrap();

        assert_eq!(
            config.db_config(),
            DbConfig {
                backend: "sqlite".to_string(),
                connection_string: "tax.db".to_string(),
            }
        );
        assert_ne!(config.db_config(), DbConfig::default());
    }

    #[test]
    fn malformed_file_names_the_path() {
        let err = AppConfig::from_toml_str("[database\n", Path::new("broken.toml")).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"), "got: {err}");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = AppConfig::from_file(Path::new("/no/such/tax-calculator.toml")).unwrap_err();

        assert!(matches!(err, ConfigError::Read { .. }));
    }

    // =========================================================================
    // Resolution and overrides
    // =========================================================================

    #[test]
    fn explicit_path_wins() {
        let resolved = resolve_path(
            Some(Path::new("cli.toml")),
            Some(PathBuf::from("env.toml")),
            Path::new("Cargo.toml"),
        );

        assert_eq!(resolved, Some(PathBuf::from("cli.toml")));
    }

    #[test]
    fn env_path_beats_working_directory() {
        let resolved = resolve_path(None, Some(PathBuf::from("env.toml")), Path::new("Cargo.toml"));

        assert_eq!(resolved, Some(PathBuf::from("env.toml")));
    }

    #[test]
    fn working_directory_file_used_only_when_present() {
        // Tests run from the crate directory, which has a Cargo.toml.
        assert_eq!(
            resolve_path(None, None, Path::new("Cargo.toml")),
            Some(PathBuf::from("Cargo.toml"))
        );
        assert_eq!(resolve_path(None, None, Path::new("missing.toml")), None);
        assert_eq!(
            resolve_path(None, Some(PathBuf::new()), Path::new("missing.toml")),
            None
        );
    }

    #[test]
    fn overrides_replace_only_what_is_given() {
        let mut config = AppConfig::default();

        config.apply(Overrides {
            connection_string: Some(":memory:".to_string()),
            log_level: Some("info".to_string()),
            ..Overrides::default()
        });

        assert_eq!(config.database.backend, "sqlite");
        assert_eq!(config.database.connection_string, ":memory:");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, None);
        assert_eq!(
            config.db_config(),
            DbConfig {
                backend: "sqlite".to_string(),
                connection_string: ":memory:".to_string(),
            }
        );
    }
}
