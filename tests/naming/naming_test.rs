//! Integration tests for name normalization.
//!
//! Every normalization function must be total and idempotent over arbitrary
//! identifiers, including the awkward ones catalogs actually contain.

use schema_import::naming::{camelize, pluralize, singularize, snake, Normalizer};

const IDENTIFIERS: &[&str] = &[
    "",
    "_",
    "__",
    "users",
    "user",
    "Users",
    "user_roles",
    "UserRoles",
    "people",
    "person",
    "children",
    "analyses",
    "statuses",
    "status",
    "news",
    "data",
    "buses",
    "quizzes",
    "matrices",
    "leaves",
    "shelves",
    "order-items",
    "order.items",
    "order items",
    "table1",
    "table_2",
    "v2_events",
    "123",
    "x9s",
    "s",
    "ss",
    "ies",
    "_users_",
    "users__roles",
    "ÜberTabellen",
    "日本語",
    "CamelCASE_table",
    "HTTPRequests",
];

fn assert_idempotent(name: &str, f: fn(&str) -> String) {
    for input in IDENTIFIERS {
        let once = f(input);
        let twice = f(&once);
        assert_eq!(once, twice, "{name} is not idempotent on {input:?}");
    }
}

#[test]
fn test_singularize_idempotent() {
    assert_idempotent("singularize", singularize);
}

#[test]
fn test_pluralize_idempotent() {
    assert_idempotent("pluralize", pluralize);
}

#[test]
fn test_camelize_idempotent() {
    assert_idempotent("camelize", camelize);
}

#[test]
fn test_snake_idempotent() {
    assert_idempotent("snake", snake);
}

#[test]
fn test_entity_names() {
    let normalizer = Normalizer::default();
    assert_eq!(normalizer.entity_name("users"), "User");
    assert_eq!(normalizer.entity_name("user_roles"), "UserRole");
    assert_eq!(normalizer.entity_name("people"), "Person");
    assert_eq!(normalizer.entity_name("table_2"), "Table2");
    assert_eq!(normalizer.entity_name(""), "");
}

#[test]
fn test_exclusions() {
    let normalizer = Normalizer::new(
        vec!["status".to_string(), "data".to_string()],
        vec!["legacy_users".to_string()],
    );
    assert_eq!(normalizer.entity_name("status"), "Status");
    assert_eq!(normalizer.entity_name("data"), "Data");
    assert_eq!(normalizer.entity_name("legacy_users"), "legacy_user");
}

#[test]
fn test_edge_forms_round_trip() {
    let normalizer = Normalizer::default();
    for table in ["users", "categories", "people", "order_items", "addresses"] {
        let singular = normalizer.singular_name(table);
        let plural = normalizer.plural_name(table);
        assert_eq!(singularize(&plural), singular, "{table}");
        assert_eq!(plural, table);
    }
}
