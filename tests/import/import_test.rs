//! End-to-end import tests over in-memory metadata snapshots.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use schema_import::config::{Dsn, WorkerSettings};
use schema_import::dialect::Dialect;
use schema_import::emit::Mutation;
use schema_import::metadata::{
    ColumnDescription, Driver, DriverRegistry, DriverResult, ForeignKeyDescription,
    IndexDescription, Snapshot, SnapshotDriver, TableDescription,
};
use schema_import::model::{Cardinality, FieldType};
use schema_import::{Context, ImportConfig, ImportError, ImportOptions, ImportPlan, Importer};

// ----------------------------------------------------------------------------
// Fixtures
// ----------------------------------------------------------------------------

fn users() -> TableDescription {
    TableDescription::new("users")
        .column(ColumnDescription::new("id", "serial"))
        .column(ColumnDescription::new("name", "text"))
        .column(ColumnDescription::new("email", "varchar(255)"))
        .primary_key(["id"])
        .index(IndexDescription::new("users_email_key", ["email"], true))
}

fn posts() -> TableDescription {
    TableDescription::new("posts")
        .column(ColumnDescription::new("id", "serial"))
        .column(ColumnDescription::new("title", "text"))
        .column(ColumnDescription::new("user_id", "integer"))
        .column(ColumnDescription::new("published", "boolean").default_value("false"))
        .primary_key(["id"])
        .foreign_key(
            ForeignKeyDescription::new("posts_user_id_fkey", "user_id", "users", "id")
                .on_delete("CASCADE"),
        )
}

fn students() -> TableDescription {
    TableDescription::new("students")
        .column(ColumnDescription::new("id", "bigint"))
        .column(ColumnDescription::new("name", "text"))
        .primary_key(["id"])
}

fn courses() -> TableDescription {
    TableDescription::new("courses")
        .column(ColumnDescription::new("id", "bigint"))
        .column(ColumnDescription::new("title", "text"))
        .primary_key(["id"])
}

fn enrollments() -> TableDescription {
    TableDescription::new("enrollments")
        .column(ColumnDescription::new("student_id", "bigint"))
        .column(ColumnDescription::new("course_id", "bigint"))
        .primary_key(["student_id", "course_id"])
        .foreign_key(ForeignKeyDescription::new(
            "enrollments_student_id_fkey",
            "student_id",
            "students",
            "id",
        ))
        .foreign_key(ForeignKeyDescription::new(
            "enrollments_course_id_fkey",
            "course_id",
            "courses",
            "id",
        ))
}

async fn import_with(
    tables: Vec<TableDescription>,
    options: ImportOptions,
) -> Result<ImportPlan, ImportError> {
    let driver = Arc::new(SnapshotDriver::new(Dialect::Postgres, tables));
    let config = ImportConfig::new(options, driver)?;
    Importer::new(config)
        .schema_mutations(&Context::background())
        .await
}

async fn import(tables: Vec<TableDescription>) -> ImportPlan {
    import_with(tables, ImportOptions::default()).await.unwrap()
}

fn created_entities(plan: &ImportPlan) -> Vec<&str> {
    plan.mutations
        .iter()
        .filter_map(|m| match m {
            Mutation::CreateEntity { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect()
}

// ----------------------------------------------------------------------------
// Scenarios
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_users_and_posts() {
    let plan = import(vec![users(), posts()]).await;
    assert_eq!(created_entities(&plan), vec!["Post", "User"]);

    let user = plan.model.entity("User").unwrap();
    let post = plan.model.entity("Post").unwrap();
    assert_eq!(user.fields[0].name, "name");
    assert_eq!(post.fields[0].name, "title");
    assert!(post.field("user_id").is_none());

    let posts = user.edge("posts").unwrap();
    assert_eq!(posts.cardinality, Cardinality::OneToMany);
    assert_eq!(posts.target, "Post");

    let owner = post.edge("user").unwrap();
    assert_eq!(owner.cardinality, Cardinality::ManyToOne);
    assert_eq!(owner.target, "User");
    assert_eq!(owner.inverse, "posts");
    assert!(plan.warnings.is_empty());
}

#[tokio::test]
async fn test_junction_becomes_many_to_many() {
    let plan = import(vec![students(), courses(), enrollments()]).await;

    assert_eq!(created_entities(&plan), vec!["Course", "Student"]);
    assert!(plan.model.entity("Enrollment").is_none());

    let student = plan.model.entity("Student").unwrap();
    let course = plan.model.entity("Course").unwrap();
    let courses = student.edge("courses").unwrap();
    let students = course.edge("students").unwrap();
    assert_eq!(courses.cardinality, Cardinality::ManyToMany);
    assert_eq!(students.cardinality, Cardinality::ManyToMany);
    assert_eq!(courses.inverse, "students");
    assert_eq!(students.inverse, "courses");
}

#[tokio::test]
async fn test_unique_foreign_key_is_one_to_one() {
    let profiles = || {
        TableDescription::new("profiles")
            .column(ColumnDescription::new("id", "serial"))
            .column(ColumnDescription::new("user_id", "integer"))
            .column(ColumnDescription::new("bio", "text").nullable())
            .primary_key(["id"])
            .foreign_key(ForeignKeyDescription::new(
                "profiles_user_id_fkey",
                "user_id",
                "users",
                "id",
            ))
    };

    let unique = profiles().index(IndexDescription::new(
        "profiles_user_id_key",
        ["user_id"],
        true,
    ));
    let plan = import(vec![users(), unique]).await;
    let user = plan.model.entity("User").unwrap();
    let profile = user.edge("profile").unwrap();
    assert_eq!(profile.cardinality, Cardinality::OneToOne);
    assert_eq!(
        plan.model.entity("Profile").unwrap().edge("user").unwrap().cardinality,
        Cardinality::OneToOne
    );

    let plan = import(vec![users(), profiles()]).await;
    let user = plan.model.entity("User").unwrap();
    assert_eq!(
        user.edge("profiles").unwrap().cardinality,
        Cardinality::OneToMany
    );
}

#[tokio::test]
async fn test_self_reference() {
    let employees = TableDescription::new("employees")
        .column(ColumnDescription::new("id", "serial"))
        .column(ColumnDescription::new("manager_id", "integer").nullable())
        .primary_key(["id"])
        .foreign_key(ForeignKeyDescription::new(
            "employees_manager_id_fkey",
            "manager_id",
            "employees",
            "id",
        ));
    let plan = import(vec![employees]).await;

    assert_eq!(created_entities(&plan), vec!["Employee"]);
    let employee = plan.model.entity("Employee").unwrap();
    let names: Vec<_> = employee.edges.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["manager", "manager_employees"]);
    assert!(employee.edges.iter().all(|e| e.target == "Employee"));
}

#[tokio::test]
async fn test_audit_columns_reference_own_table() {
    let users = users()
        .column(ColumnDescription::new("created_by", "integer").nullable())
        .column(ColumnDescription::new("updated_by", "integer").nullable())
        .foreign_key(ForeignKeyDescription::new(
            "users_created_by_fkey",
            "created_by",
            "users",
            "id",
        ))
        .foreign_key(ForeignKeyDescription::new(
            "users_updated_by_fkey",
            "updated_by",
            "users",
            "id",
        ));
    let plan = import(vec![users]).await;

    let user = plan.model.entity("User").unwrap();
    let names: Vec<_> = user.edges.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["created_by", "created_by_users", "updated_by", "updated_by_users"]
    );
    let created_by = user.edge("created_by").unwrap();
    assert!(created_by.owner);
    assert_eq!(created_by.cardinality, Cardinality::ManyToOne);
    assert_eq!(created_by.inverse, "created_by_users");
}

#[tokio::test]
async fn test_two_roles_to_same_target() {
    let posts = TableDescription::new("posts")
        .column(ColumnDescription::new("id", "serial"))
        .column(ColumnDescription::new("author", "integer"))
        .column(ColumnDescription::new("reviewer", "integer").nullable())
        .primary_key(["id"])
        .foreign_key(ForeignKeyDescription::new(
            "posts_author_fkey",
            "author",
            "users",
            "id",
        ))
        .foreign_key(ForeignKeyDescription::new(
            "posts_reviewer_fkey",
            "reviewer",
            "users",
            "id",
        ));
    let plan = import(vec![users(), posts]).await;

    let post = plan.model.entity("Post").unwrap();
    let names: Vec<_> = post.edges.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["author", "reviewer"]);
    assert!(post.edge("author").unwrap().required);
    assert!(!post.edge("reviewer").unwrap().required);

    let user = plan.model.entity("User").unwrap();
    let names: Vec<_> = user.edges.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["author_posts", "reviewer_posts"]);
}

#[tokio::test]
async fn test_excluded_table_yields_dangling_warning() {
    let options = ImportOptions {
        exclude_tables: ["users".to_string()].into(),
        ..Default::default()
    };
    let plan = import_with(vec![users(), posts()], options).await.unwrap();

    assert_eq!(created_entities(&plan), vec!["Post"]);
    let post = plan.model.entity("Post").unwrap();
    assert!(post.edges.is_empty());
    assert_eq!(post.field("user_id").unwrap().field_type, FieldType::Int32);

    assert_eq!(plan.warnings.len(), 1);
    assert_eq!(plan.warnings[0].table, "posts");
    assert_eq!(plan.warnings[0].referenced_table, "users");
}

#[tokio::test]
async fn test_deterministic_output() {
    let tables = vec![users(), posts(), students(), courses(), enrollments()];
    let mut reversed = tables.clone();
    reversed.reverse();

    let serial = ImportOptions {
        concurrency: 1,
        ..Default::default()
    };
    let first = import_with(tables, serial).await.unwrap();
    let second = import(reversed).await;

    assert_eq!(
        serde_json::to_string(&first.mutations).unwrap(),
        serde_json::to_string(&second.mutations).unwrap()
    );
    assert_eq!(first.to_string(), second.to_string());
}

#[tokio::test]
async fn test_plan_rendering() {
    let plan = import(vec![users(), posts(), students(), courses(), enrollments()]).await;
    insta::assert_snapshot!(plan.to_string(), @r"
    create entity Course from courses key (id int64)
    create entity Post from posts key (id int32 auto)
    create entity Student from students key (id int64)
    create entity User from users key (id int32 auto)
    add field Course.title text
    add field Post.title text
    add field Post.published bool default false
    add field Student.name text
    add field User.name text
    add field User.email string(255) unique
    add edge Course.students -> Student N:N inverse courses via enrollments(student_id, course_id)
    add edge Post.user -> User N:1 inverse posts owner required on delete CASCADE via posts(user_id)
    add edge Student.courses -> Course N:N inverse students owner via enrollments(student_id, course_id)
    add edge User.posts -> Post 1:N inverse user on delete CASCADE via posts(user_id)
    ");
}

// ----------------------------------------------------------------------------
// Failures
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_include_exclude_conflict() {
    let options = ImportOptions {
        tables: ["users".to_string()].into(),
        exclude_tables: ["users".to_string()].into(),
        ..Default::default()
    };
    let err = import_with(vec![users()], options).await.unwrap_err();
    assert!(matches!(err, ImportError::Configuration(_)));
}

#[tokio::test]
async fn test_unknown_column_type() {
    let documents = TableDescription::new("documents")
        .column(ColumnDescription::new("id", "serial"))
        .column(ColumnDescription::new("search", "tsvector"))
        .primary_key(["id"]);
    let err = import_with(vec![documents], ImportOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ImportError::UnsupportedDialect { dialect: Dialect::Postgres, ref data_type, .. }
            if data_type == "tsvector"
    ));
}

#[tokio::test]
async fn test_lossy_type_rejected() {
    let places = TableDescription::new("places")
        .column(ColumnDescription::new("id", "serial"))
        .column(ColumnDescription::new("span", "interval"))
        .primary_key(["id"]);
    let err = import_with(vec![places], ImportOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::UnsupportedType { ref column, .. } if column == "span"));
}

#[tokio::test]
async fn test_decimal_stays_decimal() {
    let invoices = TableDescription::new("invoices")
        .column(ColumnDescription::new("id", "serial"))
        .column(ColumnDescription::new("total", "numeric(12,2)"))
        .primary_key(["id"]);
    let plan = import(vec![invoices]).await;
    let total = plan.model.entity("Invoice").unwrap().field("total").unwrap();
    assert_eq!(
        total.field_type,
        FieldType::Decimal {
            precision: Some(12),
            scale: Some(2)
        }
    );
}

// ----------------------------------------------------------------------------
// Cancellation
// ----------------------------------------------------------------------------

#[derive(Debug)]
struct SlowDriver {
    inner: SnapshotDriver,
    delay: Duration,
}

#[async_trait]
impl Driver for SlowDriver {
    fn dialect(&self) -> Dialect {
        self.inner.dialect()
    }

    async fn list_tables(&self, cx: &Context) -> DriverResult<Vec<String>> {
        self.inner.list_tables(cx).await
    }

    async fn describe_table(&self, cx: &Context, table: &str) -> DriverResult<TableDescription> {
        tokio::time::sleep(self.delay).await;
        self.inner.describe_table(cx, table).await
    }
}

fn slow_importer() -> Importer {
    let driver = Arc::new(SlowDriver {
        inner: SnapshotDriver::new(Dialect::Postgres, vec![users(), posts()]),
        delay: Duration::from_secs(60),
    });
    Importer::new(ImportConfig::new(ImportOptions::default(), driver).unwrap())
}

#[tokio::test]
async fn test_cancel_aborts_import() {
    let importer = slow_importer();
    let (cx, handle) = Context::background().with_cancel();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
    });

    let result = tokio::time::timeout(Duration::from_secs(5), importer.schema_mutations(&cx))
        .await
        .expect("import should stop promptly after cancellation");
    assert!(matches!(result, Err(ImportError::Cancelled)));
}

#[tokio::test]
async fn test_deadline_aborts_import() {
    let importer = slow_importer();
    let cx = Context::background().with_timeout(Duration::from_millis(20));

    let result = tokio::time::timeout(Duration::from_secs(5), importer.schema_mutations(&cx))
        .await
        .expect("import should stop promptly at the deadline");
    assert!(result.unwrap_err().is_cancelled());
}

// ----------------------------------------------------------------------------
// Registry
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_import_from_snapshot_file() {
    let snapshot = Snapshot {
        dialect: Dialect::MySql,
        tables: vec![
            TableDescription::new("orders")
                .column(ColumnDescription::new("id", "bigint unsigned").auto_increment())
                .column(ColumnDescription::new("status", "enum('new','paid')"))
                .column(ColumnDescription::new("paid", "tinyint(1)").default_value("0"))
                .primary_key(["id"]),
        ],
    };
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", serde_json::to_string_pretty(&snapshot).unwrap()).unwrap();

    let registry = DriverRegistry::with_defaults(WorkerSettings::default());
    let driver = registry
        .open(&format!("snapshot://{}", file.path().display()))
        .await
        .unwrap();
    let config = ImportConfig::new(ImportOptions::default(), driver).unwrap();
    let plan = Importer::new(config)
        .schema_mutations(&Context::background())
        .await
        .unwrap();

    assert_eq!(plan.dialect, Dialect::MySql);
    let order = plan.model.entity("Order").unwrap();
    assert_eq!(order.primary_key[0].field_type, FieldType::Uint64);
    assert!(order.primary_key[0].auto_increment);
    assert_eq!(
        order.field("status").unwrap().field_type,
        FieldType::Enum {
            values: vec!["new".to_string(), "paid".to_string()]
        }
    );
    assert_eq!(order.field("paid").unwrap().field_type, FieldType::Bool);
}

#[tokio::test]
async fn test_option_conflict_rejected_before_driver_opens() {
    let opened = Arc::new(AtomicUsize::new(0));
    let mut registry = DriverRegistry::new();
    let counter = opened.clone();
    registry.register(
        "memory",
        Arc::new(move |_dsn: Dsn| {
            counter.fetch_add(1, Ordering::SeqCst);
            async {
                let driver = SnapshotDriver::new(Dialect::Postgres, vec![users()]);
                Ok::<_, ImportError>(Arc::new(driver) as Arc<dyn Driver>)
            }
            .boxed()
        }),
    );

    let conflicting = ImportOptions {
        tables: ["users".to_string()].into(),
        exclude_tables: ["users".to_string()].into(),
        ..Default::default()
    };
    let err = ImportConfig::connect(conflicting, &registry, "memory://test")
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::Configuration(_)));
    assert_eq!(opened.load(Ordering::SeqCst), 0);

    let config = ImportConfig::connect(ImportOptions::default(), &registry, "memory://test")
        .await
        .unwrap();
    assert_eq!(opened.load(Ordering::SeqCst), 1);
    assert_eq!(config.driver().dialect(), Dialect::Postgres);
}

#[tokio::test]
async fn test_unknown_scheme_rejected_before_io() {
    let registry = DriverRegistry::with_defaults(WorkerSettings::default());
    let err = registry.open("oracle://scott:tiger@db/orcl").await.unwrap_err();
    assert!(matches!(err, ImportError::Configuration(_)));
}
