//! Driver trait definition.
//!
//! A [`Driver`] is the only component that touches a database. It lists
//! table names and describes single tables as raw [`TableDescription`]s; all
//! interpretation happens in the [`MetadataReader`](super::MetadataReader).

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use super::types::TableDescription;
use crate::context::Context;
use crate::dialect::Dialect;
use crate::worker::WorkerError;

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors raised while reading catalog metadata.
#[derive(Error, Debug)]
pub enum DriverError {
    /// The introspection worker failed.
    #[error(transparent)]
    Worker(#[from] WorkerError),

    /// A snapshot file could not be read.
    #[error("failed to read snapshot {path}: {source}")]
    SnapshotIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A snapshot file is not valid JSON metadata.
    #[error("invalid snapshot {path}: {source}")]
    SnapshotFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The driver does not know the table.
    #[error("table '{0}' not found")]
    TableNotFound(String),

    /// The driver returned metadata that contradicts itself.
    #[error("malformed metadata for table '{table}': {message}")]
    Malformed { table: String, message: String },
}

impl DriverError {
    pub fn malformed(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            table: table.into(),
            message: message.into(),
        }
    }
}

/// Source of catalog metadata for one database.
///
/// Implementations must be read-only. They may ignore `cx`; the reader races
/// every call against cancellation and drops the future when it fires.
///
/// # Example
///
/// ```ignore
/// use schema_import::metadata::Driver;
///
/// async fn example(driver: &dyn Driver, cx: &Context) -> DriverResult<()> {
///     for name in driver.list_tables(cx).await? {
///         let table = driver.describe_table(cx, &name).await?;
///         println!("{}: {} columns", table.name, table.columns.len());
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait Driver: Send + Sync + fmt::Debug {
    /// The dialect used to interpret raw type strings and defaults.
    fn dialect(&self) -> Dialect;

    /// List the names of all tables visible to the driver.
    async fn list_tables(&self, cx: &Context) -> DriverResult<Vec<String>>;

    /// Describe a single table.
    async fn describe_table(&self, cx: &Context, table: &str) -> DriverResult<TableDescription>;
}
