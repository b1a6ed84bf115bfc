//! TOML-based configuration for schema-import.
//!
//! Supports a config file (schema-import.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [connections.production]
//! dsn = "postgres://${PROD_DB_USER}:${PROD_DB_PASSWORD}@db/app"
//!
//! [connections.dev]
//! dsn = "snapshot:///var/tmp/dev-metadata.json"
//!
//! [import]
//! exclude_tables = ["schema_migrations"]
//! exclude_singularize = ["news"]
//! concurrency = 4
//!
//! [worker]
//! path = "${HOME}/bin/schema-import-worker"
//! timeout_seconds = 60
//!
//! [output]
//! schema_path = "./schema/schema.json"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::options::ImportOptions;
use crate::worker::DEFAULT_TIMEOUT_SECS;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SCHEMA_IMPORT_CONFIG";

/// Config file name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "schema-import.toml";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Named database connections.
    pub connections: BTreeMap<String, ConnectionSettings>,

    /// Import options, overridden by command-line flags.
    pub import: ImportOptions,

    /// Worker configuration.
    pub worker: WorkerSettings,

    /// Output configuration.
    pub output: OutputSettings,
}

/// Connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// Data source name (supports ${ENV_VAR} expansion).
    pub dsn: String,
}

impl ConnectionSettings {
    /// Get the DSN with environment variables expanded.
    pub fn resolved_dsn(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.dsn)
    }
}

/// Worker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Path to worker binary. Searched for when unset.
    pub path: Option<PathBuf>,

    /// Per-request timeout.
    pub timeout_seconds: u64,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            path: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Schema declaration file written by the import.
    pub schema_path: Option<PathBuf>,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML text, expanding variables in paths.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let mut settings: Settings = toml::from_str(content)?;
        settings.worker.path = settings.worker.path.map(expand_path).transpose()?;
        settings.output.schema_path = settings.output.schema_path.map(expand_path).transpose()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `SCHEMA_IMPORT_CONFIG`
    /// 2. `./schema-import.toml`
    /// 3. `~/.config/schema-import/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        // Check environment variable first
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        // Check local directory
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("schema-import").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        tracing::debug!("no config file found, using defaults");
        Ok(Settings::default())
    }

    /// Get a connection by name.
    pub fn get_connection(&self, name: &str) -> Result<&ConnectionSettings, SettingsError> {
        self.connections
            .get(name)
            .ok_or_else(|| SettingsError::ConnectionNotFound(name.to_string()))
    }

    /// Get the default connection ("default" if it exists, else the first by name).
    pub fn default_connection(&self) -> Option<(&str, &ConnectionSettings)> {
        if let Some(conn) = self.connections.get("default") {
            return Some(("default", conn));
        }
        self.connections.iter().next().map(|(k, v)| (k.as_str(), v))
    }
}

fn expand_path(path: PathBuf) -> Result<PathBuf, SettingsError> {
    expand_env_vars(&path.to_string_lossy()).map(PathBuf::from)
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        // ${VAR}
        if chars.peek() == Some(&'{') {
            chars.next();
            let var_name: String = chars.by_ref().take_while(|&ch| ch != '}').collect();
            let value =
                env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
            result.push_str(&value);
            continue;
        }

        // $VAR (ends at non-alphanumeric/underscore)
        let mut var_name = String::new();
        while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
            var_name.push(ch);
        }
        if var_name.is_empty() {
            // Just a lone $, keep it
            result.push('$');
        } else {
            let value =
                env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
            result.push_str(&value);
        }
    }

    Ok(result)
}
