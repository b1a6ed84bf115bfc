//! Integration tests for the JSON schema writer.

use std::fs;
use std::sync::Arc;
use std::time::SystemTime;

use schema_import::dialect::Dialect;
use schema_import::emit::{JsonSchemaWriter, SchemaWriter, TargetSchema};
use schema_import::metadata::{
    ColumnDescription, ForeignKeyDescription, SnapshotDriver, TableDescription,
};
use schema_import::{Context, ImportConfig, ImportOptions, ImportPlan, Importer};

fn tables() -> Vec<TableDescription> {
    vec![
        TableDescription::new("users")
            .column(ColumnDescription::new("id", "bigint"))
            .column(ColumnDescription::new("name", "varchar(100)"))
            .primary_key(["id"]),
        TableDescription::new("posts")
            .column(ColumnDescription::new("id", "bigint"))
            .column(ColumnDescription::new("body", "text").nullable())
            .column(ColumnDescription::new("user_id", "bigint"))
            .primary_key(["id"])
            .foreign_key(ForeignKeyDescription::new("fk_posts_user", "user_id", "users", "id")),
    ]
}

async fn plan(tables: Vec<TableDescription>) -> ImportPlan {
    let driver = Arc::new(SnapshotDriver::new(Dialect::MySql, tables));
    let config = ImportConfig::new(ImportOptions::default(), driver).unwrap();
    Importer::new(config)
        .schema_mutations(&Context::background())
        .await
        .unwrap()
}

fn modified(path: &std::path::Path) -> SystemTime {
    fs::metadata(path).unwrap().modified().unwrap()
}

#[tokio::test]
async fn test_first_write_creates_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schema.json");
    let plan = plan(tables()).await;

    let summary = JsonSchemaWriter::new().write(&plan, &path).unwrap();
    assert_eq!(summary.created, plan.mutations.len());
    assert_eq!(summary.updated, 0);

    let written: TargetSchema = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written.model(), &plan.model);
}

#[tokio::test]
async fn test_second_write_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schema.json");
    let plan = plan(tables()).await;
    let writer = JsonSchemaWriter::new();

    writer.write(&plan, &path).unwrap();
    let contents = fs::read_to_string(&path).unwrap();
    let stamp = modified(&path);

    let summary = writer.write(&plan, &path).unwrap();
    assert!(!summary.is_changed());
    assert_eq!(summary.unchanged, plan.mutations.len());
    assert_eq!(fs::read_to_string(&path).unwrap(), contents);
    assert_eq!(modified(&path), stamp);
}

#[tokio::test]
async fn test_schema_change_updates_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schema.json");
    let writer = JsonSchemaWriter::new();
    writer.write(&plan(tables()).await, &path).unwrap();

    let mut changed = tables();
    changed[0] = TableDescription::new("users")
        .column(ColumnDescription::new("id", "bigint"))
        .column(ColumnDescription::new("name", "varchar(200)"))
        .column(ColumnDescription::new("email", "varchar(255)").nullable())
        .primary_key(["id"]);

    let summary = writer.write(&plan(changed).await, &path).unwrap();
    assert_eq!(summary.created, 1);
    assert_eq!(summary.updated, 1);

    let written = writer.load(&path).unwrap().unwrap();
    let user = written.model().entity("User").unwrap();
    let names: Vec<_> = user.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["name", "email"]);
}

#[tokio::test]
async fn test_existing_declarations_survive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schema.json");
    let writer = JsonSchemaWriter::new();
    writer.write(&plan(tables()).await, &path).unwrap();

    let only_tags = vec![TableDescription::new("tags")
        .column(ColumnDescription::new("id", "int"))
        .column(ColumnDescription::new("label", "varchar(32)"))
        .primary_key(["id"])];
    writer.write(&plan(only_tags).await, &path).unwrap();

    let written = writer.load(&path).unwrap().unwrap();
    let names: Vec<_> = written
        .model()
        .entities
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(names, vec!["Post", "User", "Tag"]);
}
