//! Driver backed by a JSON metadata dump.
//!
//! A snapshot is what a driver would report, frozen in a file:
//!
//! ```json
//! { "dialect": "postgres", "tables": [ { "name": "users", "columns": [...] } ] }
//! ```
//!
//! Useful for offline imports and for tests.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::driver::{Driver, DriverError, DriverResult};
use super::types::TableDescription;
use crate::context::Context;
use crate::dialect::Dialect;

/// On-disk snapshot format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub dialect: Dialect,
    #[serde(default)]
    pub tables: Vec<TableDescription>,
}

/// In-memory driver over a fixed set of table descriptions.
#[derive(Debug, Clone)]
pub struct SnapshotDriver {
    dialect: Dialect,
    tables: BTreeMap<String, TableDescription>,
}

impl SnapshotDriver {
    pub fn new(dialect: Dialect, tables: impl IntoIterator<Item = TableDescription>) -> Self {
        Self {
            dialect,
            tables: tables.into_iter().map(|t| (t.name.clone(), t)).collect(),
        }
    }

    /// Load a snapshot file.
    pub fn from_file(path: &Path) -> DriverResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| DriverError::SnapshotIo {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot: Snapshot =
            serde_json::from_str(&content).map_err(|source| DriverError::SnapshotFormat {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(
            path = %path.display(),
            tables = snapshot.tables.len(),
            "loaded metadata snapshot"
        );
        Ok(Self::new(snapshot.dialect, snapshot.tables))
    }

    /// The snapshot this driver serves.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            dialect: self.dialect,
            tables: self.tables.values().cloned().collect(),
        }
    }
}

#[async_trait]
impl Driver for SnapshotDriver {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn list_tables(&self, _cx: &Context) -> DriverResult<Vec<String>> {
        Ok(self.tables.keys().cloned().collect())
    }

    async fn describe_table(&self, _cx: &Context, table: &str) -> DriverResult<TableDescription> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| DriverError::TableNotFound(table.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ColumnDescription;
    use std::io::Write;

    fn users() -> TableDescription {
        TableDescription::new("users")
            .column(ColumnDescription::new("id", "serial"))
            .primary_key(["id"])
    }

    #[tokio::test]
    async fn test_list_and_describe() {
        let driver = SnapshotDriver::new(Dialect::Postgres, vec![users()]);
        let cx = Context::background();

        assert_eq!(driver.list_tables(&cx).await.unwrap(), vec!["users"]);
        assert_eq!(driver.describe_table(&cx, "users").await.unwrap(), users());
        assert!(matches!(
            driver.describe_table(&cx, "posts").await,
            Err(DriverError::TableNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let snapshot = Snapshot {
            dialect: Dialect::MySql,
            tables: vec![users()],
        };
        write!(file, "{}", serde_json::to_string(&snapshot).unwrap()).unwrap();

        let driver = SnapshotDriver::from_file(file.path()).unwrap();
        assert_eq!(driver.dialect(), Dialect::MySql);
        assert_eq!(driver.snapshot().tables, vec![users()]);
    }

    #[test]
    fn test_from_file_errors() {
        let missing = SnapshotDriver::from_file(Path::new("/nonexistent/snapshot.json"));
        assert!(matches!(missing, Err(DriverError::SnapshotIo { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"tables\": []}}").unwrap();
        let invalid = SnapshotDriver::from_file(file.path());
        assert!(matches!(invalid, Err(DriverError::SnapshotFormat { .. })));
    }
}
