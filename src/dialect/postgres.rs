//! PostgreSQL type vocabulary.
//!
//! PostgreSQL differences from MySQL:
//! - Short aliases from `pg_type` (`int4`, `float8`, `bpchar`, `timestamptz`)
//! - `serial` pseudo-types and `nextval(...)` defaults mean auto-increment
//! - Native arrays (`integer[]`, or `_int4` in `udt_name` form)
//! - Defaults carry casts: `'draft'::character varying`

use super::defaults;
use super::types::{ColumnType, TypeSpec};
use super::DialectTypes;
use crate::model::{DefaultValue, FieldType};

/// PostgreSQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

const SERIAL_TYPES: &[&str] = &[
    "smallserial",
    "serial2",
    "serial",
    "serial4",
    "bigserial",
    "serial8",
];

const SPATIAL_TYPES: &[&str] = &[
    "point",
    "line",
    "lseg",
    "box",
    "path",
    "polygon",
    "circle",
    "geometry",
    "geography",
];

const NETWORK_TYPES: &[&str] = &["inet", "cidr", "macaddr", "macaddr8"];

impl Postgres {
    fn parse_spec(&self, spec: &TypeSpec) -> Option<ColumnType> {
        if spec.array {
            let element = self.parse_spec(&spec.element())?;
            return Some(ColumnType::Array {
                element: Box::new(element),
            });
        }

        match spec.head.as_str() {
            "boolean" | "bool" => Some(ColumnType::Bool),
            "smallint" | "int2" | "smallserial" | "serial2" => Some(ColumnType::int(16)),
            "integer" | "int" | "int4" | "serial" | "serial4" => Some(ColumnType::int(32)),
            "bigint" | "int8" | "bigserial" | "serial8" => Some(ColumnType::int(64)),

            "real" | "float4" => Some(ColumnType::Float { bits: 32 }),
            "double precision" | "float8" => Some(ColumnType::Float { bits: 64 }),
            "float" => match spec.param_u32(0) {
                Some(p) if p <= 24 => Some(ColumnType::Float { bits: 32 }),
                _ => Some(ColumnType::Float { bits: 64 }),
            },
            "numeric" | "decimal" => Some(ColumnType::Decimal {
                precision: spec.param_u32(0),
                scale: spec.param_u32(0).map(|_| spec.param_u32(1).unwrap_or(0)),
            }),
            "money" => Some(ColumnType::Money),

            "character varying" | "varchar" => Some(ColumnType::Varchar {
                length: spec.param_u32(0),
            }),
            "character" | "char" | "bpchar" => Some(ColumnType::Char {
                length: spec.param_u32(0),
            }),
            "text" | "citext" | "name" => Some(ColumnType::Text),
            "bytea" => Some(ColumnType::Binary { length: None }),

            "date" => Some(ColumnType::Date),
            "time" | "time without time zone" | "timetz" | "time with time zone" => {
                Some(ColumnType::Time)
            }
            "timestamp" | "timestamp without time zone" => Some(ColumnType::Timestamp),
            "timestamptz" | "timestamp with time zone" => Some(ColumnType::TimestampTz),
            "interval" => Some(ColumnType::Interval),

            "json" | "jsonb" => Some(ColumnType::Json),
            "uuid" => Some(ColumnType::Uuid),
            // User-defined enum types are reported by the worker with their labels.
            "enum" if !spec.params.is_empty() => Some(ColumnType::Enum {
                values: spec.quoted_values(),
            }),
            "bit" => Some(ColumnType::Bit {
                width: spec.param_u32(0).unwrap_or(1),
            }),
            "bit varying" | "varbit" => Some(ColumnType::Bit {
                width: spec.param_u32(0).unwrap_or(u32::MAX),
            }),

            head if SPATIAL_TYPES.contains(&head) => Some(ColumnType::Spatial {
                name: head.to_string(),
            }),
            head if NETWORK_TYPES.contains(&head) => Some(ColumnType::Network {
                name: head.to_string(),
            }),

            _ => None,
        }
    }
}

impl DialectTypes for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn parse_type(&self, raw: &str) -> Option<ColumnType> {
        let spec = TypeSpec::parse(raw)?;
        if !spec.modifiers.is_empty() {
            return None;
        }
        self.parse_spec(&spec)
    }

    fn is_auto_increment(&self, raw_type: &str, default: Option<&str>) -> bool {
        let serial = TypeSpec::parse(raw_type)
            .map(|spec| !spec.array && SERIAL_TYPES.contains(&spec.head.as_str()))
            .unwrap_or(false);
        serial || default.is_some_and(defaults::is_sequence_default)
    }

    fn parse_default(&self, raw: &str, field_type: &FieldType) -> Option<DefaultValue> {
        if defaults::is_sequence_default(raw) {
            return None;
        }
        defaults::parse_literal(defaults::strip_casts(raw), field_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(Postgres.parse_type("int4"), Some(ColumnType::int(32)));
        assert_eq!(Postgres.parse_type("bigserial"), Some(ColumnType::int(64)));
        assert_eq!(
            Postgres.parse_type("double precision"),
            Some(ColumnType::Float { bits: 64 })
        );
        assert_eq!(
            Postgres.parse_type("character varying(120)"),
            Some(ColumnType::Varchar { length: Some(120) })
        );
        assert_eq!(Postgres.parse_type("citext"), Some(ColumnType::Text));
    }

    #[test]
    fn test_parse_timestamps() {
        assert_eq!(
            Postgres.parse_type("timestamp without time zone"),
            Some(ColumnType::Timestamp)
        );
        assert_eq!(
            Postgres.parse_type("timestamp(6) with time zone"),
            Some(ColumnType::TimestampTz)
        );
        assert_eq!(Postgres.parse_type("timestamptz"), Some(ColumnType::TimestampTz));
    }

    #[test]
    fn test_parse_numeric() {
        assert_eq!(
            Postgres.parse_type("numeric(12,4)"),
            Some(ColumnType::Decimal {
                precision: Some(12),
                scale: Some(4)
            })
        );
        assert_eq!(
            Postgres.parse_type("numeric"),
            Some(ColumnType::Decimal {
                precision: None,
                scale: None
            })
        );
        assert_eq!(Postgres.parse_type("money"), Some(ColumnType::Money));
    }

    #[test]
    fn test_parse_arrays() {
        assert_eq!(
            Postgres.parse_type("integer[]"),
            Some(ColumnType::Array {
                element: Box::new(ColumnType::int(32))
            })
        );
        assert_eq!(
            Postgres.parse_type("_text"),
            Some(ColumnType::Array {
                element: Box::new(ColumnType::Text)
            })
        );
        assert_eq!(Postgres.parse_type("tsvector[]"), None);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(Postgres.parse_type("tsvector"), None);
        assert_eq!(Postgres.parse_type("int unsigned"), None);
        assert_eq!(Postgres.parse_type("mediumint"), None);
    }

    #[test]
    fn test_is_auto_increment() {
        assert!(Postgres.is_auto_increment("serial", None));
        assert!(Postgres.is_auto_increment(
            "integer",
            Some("nextval('users_id_seq'::regclass)")
        ));
        assert!(!Postgres.is_auto_increment("integer", Some("0")));
        assert!(!Postgres.is_auto_increment("integer", None));
    }

    #[test]
    fn test_parse_default() {
        assert_eq!(
            Postgres.parse_default(
                "'draft'::character varying",
                &FieldType::String { size: Some(20) }
            ),
            Some(DefaultValue::Str("draft".to_string()))
        );
        assert_eq!(
            Postgres.parse_default("nextval('users_id_seq'::regclass)", &FieldType::Int64),
            None
        );
        assert_eq!(
            Postgres.parse_default("true", &FieldType::Bool),
            Some(DefaultValue::Bool(true))
        );
        assert_eq!(
            Postgres.parse_default("now()", &FieldType::TimestampTz),
            Some(DefaultValue::Expr("now()".to_string()))
        );
        assert_eq!(
            Postgres.parse_default("'0.00'::numeric", &FieldType::Decimal {
                precision: Some(10),
                scale: Some(2)
            }),
            Some(DefaultValue::Number("0.00".to_string()))
        );
    }
}
