//! Configuration module for schema-import.
//!
//! Handles import options, data source names, and the settings file.

mod connection;
mod options;
mod settings;

pub use connection::Dsn;
pub use options::{ImportConfig, ImportOptions, DEFAULT_CONCURRENCY};
pub use settings::{
    expand_env_vars, ConnectionSettings, OutputSettings, Settings, SettingsError, WorkerSettings,
    CONFIG_ENV_VAR, LOCAL_CONFIG_FILE,
};
