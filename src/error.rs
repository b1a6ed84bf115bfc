//! Error taxonomy for the import pipeline.
//!
//! Every fatal condition surfaces as an [`ImportError`] and aborts the run.
//! The only recoverable condition, a foreign key pointing outside the import
//! scope, is reported as a [`DanglingReference`] warning on the resulting plan.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::config::SettingsError;
use crate::dialect::Dialect;
use crate::emit::ApplyError;
use crate::metadata::DriverError;

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Errors that abort an import run.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Invalid configuration, detected before any I/O.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The driver could not enumerate or describe catalog metadata.
    #[error("introspection failed: {0}")]
    Introspection(#[from] DriverError),

    /// A raw column type is not part of the dialect's type vocabulary.
    #[error("{dialect}: column {table}.{column} has unknown type '{data_type}'")]
    UnsupportedDialect {
        dialect: Dialect,
        table: String,
        column: String,
        data_type: String,
    },

    /// A column type has no lossless logical field type.
    #[error("column {table}.{column}: type '{data_type}' cannot be mapped without losing precision")]
    UnsupportedType {
        table: String,
        column: String,
        data_type: String,
    },

    /// Two declarations on the same entity (or two entities) normalize to one name.
    #[error("schema conflict on '{entity}': name '{name}' is claimed by both {first} and {second}; use the exclusion lists to resolve it")]
    SchemaConflict {
        entity: String,
        name: String,
        first: String,
        second: String,
    },

    /// The run was cancelled or its deadline expired.
    #[error("import cancelled")]
    Cancelled,

    /// Applying a mutation to a target schema failed.
    #[error(transparent)]
    Apply(#[from] ApplyError),

    /// Reading or writing the schema declaration file failed.
    #[error("failed to write schema to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The schema declaration file could not be (de)serialized.
    #[error("invalid schema declaration file: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ImportError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Whether this error was caused by cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<SettingsError> for ImportError {
    fn from(err: SettingsError) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// A foreign key whose referenced table is outside the import scope.
///
/// The relationship is dropped and the run continues.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{table}: foreign key '{constraint}' references '{referenced_table}', which is not part of the import; relationship dropped")]
pub struct DanglingReference {
    /// Table holding the foreign key.
    pub table: String,
    /// Constraint name.
    pub constraint: String,
    /// Table the foreign key points to.
    pub referenced_table: String,
}
