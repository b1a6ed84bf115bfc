//! Database dialect type vocabularies.
//!
//! Each supported database family implements [`DialectTypes`] to turn its
//! catalog's raw type strings and default expressions into the crate's
//! [`ColumnType`] and [`DefaultValue`] vocabularies:
//!
//! - Type names: `tinyint(1)` is a boolean in MySQL, `int4` an integer in Postgres
//! - Auto-increment: MySQL reports it on the column, Postgres via `serial`/`nextval`
//! - Defaults: Postgres decorates literals with casts (`'x'::text`)
//!
//! # Usage
//!
//! ```ignore
//! use schema_import::dialect::{Dialect, DialectTypes};
//!
//! let dialect = Dialect::Postgres;
//! let ty = dialect.parse_type("character varying(255)");
//! ```

mod defaults;
mod mysql;
mod postgres;
pub mod types;

pub use mysql::MySql;
pub use postgres::Postgres;
pub use types::{ColumnType, TypeSpec};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{DefaultValue, FieldType};

/// Dialect trait: how a database family spells its types and defaults.
///
/// The default implementations cover what MySQL and Postgres share.
pub trait DialectTypes: fmt::Debug + Send + Sync {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    /// Parse a raw catalog type string. `None` means the type is unknown to
    /// this dialect.
    fn parse_type(&self, raw: &str) -> Option<ColumnType>;

    /// Map a parsed column type to its logical field type.
    ///
    /// Returns `None` when no lossless logical counterpart exists.
    fn field_type(&self, column_type: &ColumnType) -> Option<FieldType> {
        logical_type(column_type)
    }

    /// Whether a column is auto-incrementing by virtue of its type or default.
    ///
    /// Catalogs that report the flag directly (MySQL) keep the default.
    fn is_auto_increment(&self, _raw_type: &str, _default: Option<&str>) -> bool {
        false
    }

    /// Parse a raw default expression for a column of the given logical type.
    ///
    /// Returns `None` when the expression carries no declarative default
    /// (`NULL`, sequence defaults).
    fn parse_default(&self, raw: &str, field_type: &FieldType) -> Option<DefaultValue> {
        defaults::parse_literal(raw, field_type)
    }
}

/// Supported database families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    MySql,
    Postgres,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn types(&self) -> &'static dyn DialectTypes {
        match self {
            Dialect::MySql => &MySql,
            Dialect::Postgres => &Postgres,
        }
    }

    /// Resolve a DSN scheme to a dialect.
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme.to_lowercase().as_str() {
            "mysql" => Some(Dialect::MySql),
            "postgres" | "postgresql" => Some(Dialect::Postgres),
            _ => None,
        }
    }

    /// Driver name understood by the introspection worker.
    pub fn worker_driver(&self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgres",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Implement DialectTypes for Dialect enum by delegating to concrete types
impl DialectTypes for Dialect {
    fn name(&self) -> &'static str {
        self.types().name()
    }

    fn parse_type(&self, raw: &str) -> Option<ColumnType> {
        self.types().parse_type(raw)
    }

    fn field_type(&self, column_type: &ColumnType) -> Option<FieldType> {
        self.types().field_type(column_type)
    }

    fn is_auto_increment(&self, raw_type: &str, default: Option<&str>) -> bool {
        self.types().is_auto_increment(raw_type, default)
    }

    fn parse_default(&self, raw: &str, field_type: &FieldType) -> Option<DefaultValue> {
        self.types().parse_default(raw, field_type)
    }
}

/// Shared column-type to field-type table.
fn logical_type(column_type: &ColumnType) -> Option<FieldType> {
    let field_type = match column_type {
        ColumnType::Bool => FieldType::Bool,
        ColumnType::Int { bits, unsigned } => match (bits, unsigned) {
            (8, false) => FieldType::Int8,
            (16, false) => FieldType::Int16,
            (32, false) => FieldType::Int32,
            (64, false) => FieldType::Int64,
            (8, true) => FieldType::Uint8,
            (16, true) => FieldType::Uint16,
            (32, true) => FieldType::Uint32,
            (64, true) => FieldType::Uint64,
            _ => return None,
        },
        ColumnType::Float { bits: 32 } => FieldType::Float32,
        ColumnType::Float { bits: 64 } => FieldType::Float64,
        ColumnType::Float { .. } => return None,
        ColumnType::Decimal { precision, scale } => FieldType::Decimal {
            precision: *precision,
            scale: *scale,
        },
        ColumnType::Char { length } | ColumnType::Varchar { length } => {
            FieldType::String { size: *length }
        }
        ColumnType::Text => FieldType::Text,
        ColumnType::Binary { length } => FieldType::Bytes { size: *length },
        ColumnType::Date => FieldType::Date,
        ColumnType::Time => FieldType::Time,
        ColumnType::Timestamp => FieldType::Timestamp,
        ColumnType::TimestampTz => FieldType::TimestampTz,
        ColumnType::Year => FieldType::Int16,
        ColumnType::Json => FieldType::Json,
        ColumnType::Uuid => FieldType::Uuid,
        ColumnType::Enum { values } => FieldType::Enum {
            values: values.clone(),
        },
        ColumnType::Bit { width: 1 } => FieldType::Bool,
        ColumnType::Bit { .. }
        | ColumnType::Set { .. }
        | ColumnType::Interval
        | ColumnType::Money
        | ColumnType::Spatial { .. }
        | ColumnType::Network { .. }
        | ColumnType::Array { .. } => return None,
    };
    Some(field_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_scheme() {
        assert_eq!(Dialect::from_scheme("mysql"), Some(Dialect::MySql));
        assert_eq!(Dialect::from_scheme("postgres"), Some(Dialect::Postgres));
        assert_eq!(Dialect::from_scheme("PostgreSQL"), Some(Dialect::Postgres));
        assert_eq!(Dialect::from_scheme("sqlite"), None);
    }

    #[test]
    fn test_delegation() {
        assert_eq!(Dialect::MySql.name(), "mysql");
        assert_eq!(Dialect::Postgres.name(), "postgres");
        assert_eq!(Dialect::Postgres.to_string(), "postgres");
        assert_eq!(
            Dialect::MySql.parse_type("bigint"),
            Some(ColumnType::int(64))
        );
    }

    #[test]
    fn test_decimal_never_maps_to_float() {
        let decimal = ColumnType::Decimal {
            precision: Some(10),
            scale: Some(2),
        };
        assert_eq!(
            logical_type(&decimal),
            Some(FieldType::Decimal {
                precision: Some(10),
                scale: Some(2)
            })
        );
    }

    #[test]
    fn test_unsupported_types() {
        assert_eq!(logical_type(&ColumnType::Interval), None);
        assert_eq!(logical_type(&ColumnType::Money), None);
        assert_eq!(logical_type(&ColumnType::Bit { width: 8 }), None);
        assert_eq!(
            logical_type(&ColumnType::Set {
                values: vec!["a".into()]
            }),
            None
        );
        assert_eq!(
            logical_type(&ColumnType::Array {
                element: Box::new(ColumnType::int(32))
            }),
            None
        );
        assert_eq!(logical_type(&ColumnType::Bit { width: 1 }), Some(FieldType::Bool));
        assert_eq!(logical_type(&ColumnType::Year), Some(FieldType::Int16));
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Dialect::MySql).unwrap(), "\"mysql\"");
        let parsed: Dialect = serde_json::from_str("\"postgres\"").unwrap();
        assert_eq!(parsed, Dialect::Postgres);
    }
}
