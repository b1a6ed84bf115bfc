//! MySQL type vocabulary.
//!
//! MySQL differences from Postgres:
//! - `tinyint(1)` is the conventional boolean
//! - Integers carry an `unsigned` modifier
//! - `mediumint` is 24 bits wide and widened to 32
//! - String defaults are reported unquoted by `information_schema`
//! - Auto-increment is reported on the column (`extra = auto_increment`)

use super::defaults;
use super::types::{ColumnType, TypeSpec};
use super::DialectTypes;
use crate::model::{DefaultValue, FieldType};

/// MySQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

const SPATIAL_TYPES: &[&str] = &[
    "geometry",
    "point",
    "linestring",
    "polygon",
    "multipoint",
    "multilinestring",
    "multipolygon",
    "geometrycollection",
    "geomcollection",
];

impl DialectTypes for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn parse_type(&self, raw: &str) -> Option<ColumnType> {
        let spec = TypeSpec::parse(raw)?;
        if spec.array {
            return None;
        }
        let unsigned = spec.is_unsigned();
        let int = |bits| Some(ColumnType::Int { bits, unsigned });

        match spec.head.as_str() {
            "tinyint" if spec.param_u32(0) == Some(1) && !unsigned => Some(ColumnType::Bool),
            "bool" | "boolean" => Some(ColumnType::Bool),
            "tinyint" => int(8),
            "smallint" => int(16),
            "mediumint" | "int" | "integer" => int(32),
            "bigint" => int(64),
            "serial" => Some(ColumnType::Int {
                bits: 64,
                unsigned: true,
            }),

            // float(p) with p > 24 is stored as double
            "float" => match spec.param_u32(0) {
                Some(p) if spec.params.len() == 1 && p > 24 => Some(ColumnType::Float { bits: 64 }),
                _ => Some(ColumnType::Float { bits: 32 }),
            },
            "double" | "double precision" | "real" => Some(ColumnType::Float { bits: 64 }),
            "decimal" | "numeric" | "dec" | "fixed" => Some(ColumnType::Decimal {
                precision: Some(spec.param_u32(0).unwrap_or(10)),
                scale: Some(spec.param_u32(1).unwrap_or(0)),
            }),

            "char" | "character" | "nchar" | "national char" => Some(ColumnType::Char {
                length: Some(spec.param_u32(0).unwrap_or(1)),
            }),
            "varchar" | "character varying" | "nvarchar" | "national varchar" => {
                Some(ColumnType::Varchar {
                    length: spec.param_u32(0),
                })
            }
            "tinytext" | "text" | "mediumtext" | "longtext" => Some(ColumnType::Text),
            "binary" => Some(ColumnType::Binary {
                length: Some(spec.param_u32(0).unwrap_or(1)),
            }),
            "varbinary" => Some(ColumnType::Binary {
                length: spec.param_u32(0),
            }),
            "tinyblob" | "blob" | "mediumblob" | "longblob" => {
                Some(ColumnType::Binary { length: None })
            }

            "date" => Some(ColumnType::Date),
            "time" => Some(ColumnType::Time),
            "datetime" | "timestamp" => Some(ColumnType::Timestamp),
            "year" => Some(ColumnType::Year),

            "json" => Some(ColumnType::Json),
            "enum" if !spec.params.is_empty() => Some(ColumnType::Enum {
                values: spec.quoted_values(),
            }),
            "set" if !spec.params.is_empty() => Some(ColumnType::Set {
                values: spec.quoted_values(),
            }),
            "bit" => Some(ColumnType::Bit {
                width: spec.param_u32(0).unwrap_or(1),
            }),

            head if SPATIAL_TYPES.contains(&head) => Some(ColumnType::Spatial {
                name: head.to_string(),
            }),

            _ => None,
        }
    }

    fn parse_default(&self, raw: &str, field_type: &FieldType) -> Option<DefaultValue> {
        let value = raw.trim();
        let quoted = value.starts_with('\'');
        // information_schema reports string defaults without quotes.
        if field_type.is_string() && !quoted && !looks_like_expression(value) {
            if value.eq_ignore_ascii_case("null") {
                return None;
            }
            return Some(DefaultValue::Str(value.to_string()));
        }
        defaults::parse_literal(value, field_type)
    }
}

fn looks_like_expression(value: &str) -> bool {
    let upper = value.to_uppercase();
    value.starts_with('(')
        || upper.starts_with("CURRENT_")
        || upper.starts_with("NOW(")
        || upper.starts_with("UUID(")
}
