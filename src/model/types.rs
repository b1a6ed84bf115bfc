//! Logical field types and default values.
//!
//! This is the target vocabulary of type mapping: what a generated schema
//! declares, independent of the database the column came from. It is
//! distinct from [`ColumnType`](crate::dialect::ColumnType), which records
//! what the catalog reported.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical type of a field or key part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,

    /// Fixed-point decimal. Never widened to a float.
    Decimal {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        precision: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scale: Option<u32>,
    },

    /// Character string with an optional maximum length.
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<u32>,
    },

    Text,

    Bytes {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<u32>,
    },

    Date,
    Time,
    Timestamp,
    TimestampTz,
    Json,
    Uuid,

    Enum { values: Vec<String> },
}

impl FieldType {
    /// Returns true if this is an integer type.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            FieldType::Int8
                | FieldType::Int16
                | FieldType::Int32
                | FieldType::Int64
                | FieldType::Uint8
                | FieldType::Uint16
                | FieldType::Uint32
                | FieldType::Uint64
        )
    }

    /// Returns true if this is a numeric type.
    pub fn is_numeric(&self) -> bool {
        self.is_integer()
            || matches!(
                self,
                FieldType::Float32 | FieldType::Float64 | FieldType::Decimal { .. }
            )
    }

    /// Returns true if values of this type are strings.
    pub fn is_string(&self) -> bool {
        matches!(
            self,
            FieldType::String { .. } | FieldType::Text | FieldType::Enum { .. }
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Bool => write!(f, "bool"),
            FieldType::Int8 => write!(f, "int8"),
            FieldType::Int16 => write!(f, "int16"),
            FieldType::Int32 => write!(f, "int32"),
            FieldType::Int64 => write!(f, "int64"),
            FieldType::Uint8 => write!(f, "uint8"),
            FieldType::Uint16 => write!(f, "uint16"),
            FieldType::Uint32 => write!(f, "uint32"),
            FieldType::Uint64 => write!(f, "uint64"),
            FieldType::Float32 => write!(f, "float32"),
            FieldType::Float64 => write!(f, "float64"),
            FieldType::Decimal {
                precision: Some(p),
                scale,
            } => write!(f, "decimal({}, {})", p, scale.unwrap_or(0)),
            FieldType::Decimal { precision: None, .. } => write!(f, "decimal"),
            FieldType::String { size: Some(n) } => write!(f, "string({})", n),
            FieldType::String { size: None } => write!(f, "string"),
            FieldType::Text => write!(f, "text"),
            FieldType::Bytes { size: Some(n) } => write!(f, "bytes({})", n),
            FieldType::Bytes { size: None } => write!(f, "bytes"),
            FieldType::Date => write!(f, "date"),
            FieldType::Time => write!(f, "time"),
            FieldType::Timestamp => write!(f, "timestamp"),
            FieldType::TimestampTz => write!(f, "timestamptz"),
            FieldType::Json => write!(f, "json"),
            FieldType::Uuid => write!(f, "uuid"),
            FieldType::Enum { values } => write!(f, "enum({})", values.join("|")),
        }
    }
}

/// Parsed column default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    /// Non-integer or out-of-range numeric literal, kept as written.
    Number(String),
    Str(String),
    /// Database expression (`CURRENT_TIMESTAMP`, `now()`, ...).
    Expr(String),
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Bool(b) => write!(f, "{}", b),
            DefaultValue::Int(i) => write!(f, "{}", i),
            DefaultValue::Number(n) => write!(f, "{}", n),
            DefaultValue::Str(s) => write!(f, "{:?}", s),
            DefaultValue::Expr(e) => write!(f, "expr({})", e),
        }
    }
}
