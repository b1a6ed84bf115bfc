//! Metadata reader: a driver facade returning normalized tables.

use std::collections::{BTreeSet, HashSet};

use futures::stream::{self, StreamExt, TryStreamExt};

use super::driver::{Driver, DriverError};
use super::types::{
    Column, ForeignKey, Index, ReferentialAction, Table, TableDescription,
};
use crate::config::ImportOptions;
use crate::context::Context;
use crate::dialect::{Dialect, DialectTypes};
use crate::error::{ImportError, ImportResult};
use crate::worker::WorkerError;

/// Reads and normalizes catalog metadata for the tables in scope.
///
/// The reader is read-only: it issues no writes and takes no locks.
#[derive(Debug, Clone, Copy)]
pub struct MetadataReader<'a> {
    driver: &'a dyn Driver,
}

impl<'a> MetadataReader<'a> {
    pub fn new(driver: &'a dyn Driver) -> Self {
        Self { driver }
    }

    /// Read every selected table, sorted by name.
    ///
    /// Cancellation of `cx` drops all in-flight requests and yields a single
    /// [`ImportError::Cancelled`]; partial results are discarded.
    pub async fn read(&self, cx: &Context, options: &ImportOptions) -> ImportResult<Vec<Table>> {
        if cx.is_cancelled() {
            return Err(ImportError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = cx.cancelled() => Err(ImportError::Cancelled),
            result = self.read_all(cx, options) => result,
        }
    }

    async fn read_all(&self, cx: &Context, options: &ImportOptions) -> ImportResult<Vec<Table>> {
        let available: BTreeSet<String> = self
            .driver
            .list_tables(cx)
            .await
            .map_err(driver_error)?
            .into_iter()
            .collect();

        for missing in options.tables.iter().filter(|t| !available.contains(*t)) {
            tracing::warn!(table = %missing, "requested table does not exist; skipping");
        }

        let selected: Vec<String> = available
            .into_iter()
            .filter(|t| options.is_selected(t))
            .collect();
        tracing::debug!(
            tables = selected.len(),
            concurrency = options.concurrency,
            "describing tables"
        );

        let dialect = self.driver.dialect();
        let mut tables: Vec<Table> = stream::iter(selected)
            .map(|name| self.describe(cx, name))
            .buffer_unordered(options.concurrency.max(1))
            .and_then(|description| async move { normalize_table(description, dialect) })
            .try_collect()
            .await?;

        tables.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tables)
    }

    async fn describe(&self, cx: &Context, name: String) -> ImportResult<TableDescription> {
        let description = self
            .driver
            .describe_table(cx, &name)
            .await
            .map_err(driver_error)?;
        if description.name != name {
            return Err(DriverError::malformed(
                &name,
                format!("driver described '{}' instead", description.name),
            )
            .into());
        }
        Ok(description)
    }
}

fn driver_error(err: DriverError) -> ImportError {
    match err {
        DriverError::Worker(WorkerError::Cancelled) => ImportError::Cancelled,
        other => ImportError::Introspection(other),
    }
}

/// Parse types and derive key flags for one described table.
pub fn normalize_table(desc: TableDescription, dialect: Dialect) -> ImportResult<Table> {
    let table_name = desc.name.clone();
    let malformed = |message: String| -> ImportError {
        DriverError::malformed(&table_name, message).into()
    };

    let mut seen = HashSet::new();
    for column in &desc.columns {
        if !seen.insert(column.name.clone()) {
            return Err(malformed(format!("duplicate column '{}'", column.name)));
        }
    }
    let check_columns = |what: &str, columns: &[String]| -> ImportResult<()> {
        if columns.is_empty() {
            return Err(malformed(format!("{} has no columns", what)));
        }
        match columns.iter().find(|c| !seen.contains(c.as_str())) {
            Some(unknown) => Err(malformed(format!(
                "{} references unknown column '{}'",
                what, unknown
            ))),
            None => Ok(()),
        }
    };

    if !desc.primary_key.is_empty() {
        check_columns("primary key", &desc.primary_key)?;
    }

    let mut columns = Vec::with_capacity(desc.columns.len());
    for column in desc.columns {
        let column_type = dialect.parse_type(&column.data_type).ok_or_else(|| {
            ImportError::UnsupportedDialect {
                dialect,
                table: table_name.clone(),
                column: column.name.clone(),
                data_type: column.data_type.clone(),
            }
        })?;
        let auto_increment = column.auto_increment
            || dialect.is_auto_increment(&column.data_type, column.default.as_deref());
        columns.push(Column {
            primary_key: desc.primary_key.contains(&column.name),
            name: column.name,
            raw_type: column.data_type,
            column_type,
            nullable: column.nullable,
            default: column.default,
            auto_increment,
        });
    }

    let mut indexes = Vec::with_capacity(desc.indexes.len());
    for index in desc.indexes {
        check_columns(&format!("index '{}'", index.name), &index.columns)?;
        let name = if index.name.is_empty() {
            format!("{}_{}_idx", table_name, index.columns.join("_"))
        } else {
            index.name
        };
        indexes.push(Index {
            name,
            columns: index.columns,
            unique: index.unique,
        });
    }
    indexes.sort_by(|a, b| a.name.cmp(&b.name));

    let mut table = Table {
        name: table_name.clone(),
        columns,
        primary_key: desc.primary_key,
        foreign_keys: Vec::new(),
        indexes,
    };

    for fk in desc.foreign_keys {
        let name = if fk.name.is_empty() {
            format!("{}_{}_fkey", table_name, fk.columns.join("_"))
        } else {
            fk.name
        };
        check_columns(&format!("foreign key '{}'", name), &fk.columns)?;
        if fk.columns.len() != fk.referenced_columns.len() {
            return Err(malformed(format!(
                "foreign key '{}' has {} columns but references {}",
                name,
                fk.columns.len(),
                fk.referenced_columns.len()
            )));
        }
        let action = |raw: Option<&str>| -> ImportResult<ReferentialAction> {
            let raw = raw.unwrap_or("");
            ReferentialAction::parse(raw).ok_or_else(|| {
                malformed(format!(
                    "foreign key '{}' has unknown referential action '{}'",
                    name, raw
                ))
            })
        };
        let on_delete = action(fk.on_delete.as_deref())?;
        let on_update = action(fk.on_update.as_deref())?;

        let unique = table
            .unique_keys()
            .any(|key| key.iter().all(|c| fk.columns.contains(c)));
        let nullable = fk
            .columns
            .iter()
            .any(|c| table.column(c).is_some_and(|col| col.nullable));

        table.foreign_keys.push(ForeignKey {
            name,
            columns: fk.columns,
            referenced_table: fk.referenced_table,
            referenced_columns: fk.referenced_columns,
            on_delete,
            on_update,
            unique,
            nullable,
        });
    }
    table.foreign_keys.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::ColumnType;
    use crate::metadata::{
        ColumnDescription, ForeignKeyDescription, IndexDescription, SnapshotDriver,
    };

    fn posts() -> TableDescription {
        TableDescription::new("posts")
            .column(ColumnDescription::new("id", "serial"))
            .column(ColumnDescription::new("user_id", "integer").nullable())
            .column(ColumnDescription::new("title", "varchar(200)"))
            .primary_key(["id"])
            .foreign_key(
                ForeignKeyDescription::new("posts_user_id_fkey", "user_id", "users", "id")
                    .on_delete("SET NULL"),
            )
    }

    #[test]
    fn test_normalize_table() {
        let table = normalize_table(posts(), Dialect::Postgres).unwrap();

        let id = table.column("id").unwrap();
        assert!(id.primary_key);
        assert!(id.auto_increment);
        assert_eq!(id.column_type, ColumnType::int(32));

        let fk = &table.foreign_keys[0];
        assert_eq!(fk.on_delete, ReferentialAction::SetNull);
        assert_eq!(fk.on_update, ReferentialAction::NoAction);
        assert!(!fk.unique);
        assert!(fk.nullable);
    }

    #[test]
    fn test_unique_foreign_key() {
        let desc = TableDescription::new("profiles")
            .column(ColumnDescription::new("id", "bigint"))
            .column(ColumnDescription::new("user_id", "bigint"))
            .primary_key(["id"])
            .foreign_key(ForeignKeyDescription::new("fk_user", "user_id", "users", "id"))
            .index(IndexDescription::new("profiles_user_id_key", ["user_id"], true));

        let table = normalize_table(desc, Dialect::MySql).unwrap();
        assert!(table.foreign_keys[0].unique);
        assert!(!table.foreign_keys[0].nullable);
    }

    #[test]
    fn test_unknown_type() {
        let desc = TableDescription::new("docs")
            .column(ColumnDescription::new("body", "tsvector"));
        let err = normalize_table(desc, Dialect::Postgres).unwrap_err();
        assert!(matches!(
            err,
            ImportError::UnsupportedDialect { ref column, ref data_type, .. }
                if column == "body" && data_type == "tsvector"
        ));
    }

    #[test]
    fn test_foreign_key_column_mismatch() {
        let mut fk = ForeignKeyDescription::new("fk", "a", "other", "x");
        fk.referenced_columns.push("y".to_string());
        let desc = TableDescription::new("t")
            .column(ColumnDescription::new("a", "int"))
            .foreign_key(fk);
        assert!(matches!(
            normalize_table(desc, Dialect::MySql),
            Err(ImportError::Introspection(DriverError::Malformed { .. }))
        ));
    }

    #[test]
    fn test_unknown_column_reference() {
        let desc = TableDescription::new("t")
            .column(ColumnDescription::new("a", "int"))
            .primary_key(["b"]);
        assert!(matches!(
            normalize_table(desc, Dialect::MySql),
            Err(ImportError::Introspection(DriverError::Malformed { .. }))
        ));
    }

    #[tokio::test]
    async fn test_read_filters_and_sorts() {
        let tables = vec![
            posts(),
            TableDescription::new("users")
                .column(ColumnDescription::new("id", "serial"))
                .primary_key(["id"]),
            TableDescription::new("audit_log").column(ColumnDescription::new("id", "bigint")),
        ];
        let driver = SnapshotDriver::new(Dialect::Postgres, tables);
        let options = ImportOptions {
            exclude_tables: ["audit_log".to_string()].into(),
            concurrency: 1,
            ..Default::default()
        };

        let read = MetadataReader::new(&driver)
            .read(&Context::background(), &options)
            .await
            .unwrap();
        let names: Vec<_> = read.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["posts", "users"]);
    }

    #[tokio::test]
    async fn test_read_skips_missing_requested_tables() {
        let driver = SnapshotDriver::new(Dialect::Postgres, vec![posts()]);
        let options = ImportOptions {
            tables: ["posts".to_string(), "ghosts".to_string()].into(),
            ..Default::default()
        };
        let read = MetadataReader::new(&driver)
            .read(&Context::background(), &options)
            .await
            .unwrap();
        assert_eq!(read.len(), 1);
    }

    #[tokio::test]
    async fn test_read_cancelled_before_start() {
        let driver = SnapshotDriver::new(Dialect::Postgres, vec![posts()]);
        let (cx, handle) = Context::background().with_cancel();
        handle.cancel();
        let result = MetadataReader::new(&driver)
            .read(&cx, &ImportOptions::default())
            .await;
        assert!(matches!(result, Err(ImportError::Cancelled)));
    }
}
