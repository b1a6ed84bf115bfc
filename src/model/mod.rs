//! Generated schema model: entities, fields, indexes and edges.
//!
//! The model is built fresh per import run from the normalized table
//! snapshot and is the sole input of the mutation emitter.

mod builder;
pub mod types;

pub use builder::build;
pub use types::{DefaultValue, FieldType};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metadata::ReferentialAction;

/// All entities of one import, ordered by source table name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaModel {
    pub entities: Vec<Entity>,
}

impl SchemaModel {
    /// Look up an entity by name.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }
}

/// A generated entity. One per non-junction table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Singularized, camel-cased table name.
    pub name: String,
    /// Source table.
    pub table: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<KeyPart>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<EntityIndex>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Entity {
    /// An entity with no fields or edges.
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            primary_key: Vec::new(),
            fields: Vec::new(),
            indexes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn edge(&self, name: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.name == name)
    }
}

/// One primary-key column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPart {
    pub column: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub auto_increment: bool,
}

/// A scalar field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Snake-cased column name.
    pub name: String,
    /// Storage column.
    pub column: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
}

/// A multi-column index over fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityIndex {
    pub name: String,
    /// Field names, in index column order.
    pub fields: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

/// Relationship cardinality seen from the edge's own entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl Cardinality {
    /// The cardinality of the inverse edge.
    pub fn reverse(self) -> Self {
        match self {
            Cardinality::OneToMany => Cardinality::ManyToOne,
            Cardinality::ManyToOne => Cardinality::OneToMany,
            Cardinality::OneToOne => Cardinality::OneToOne,
            Cardinality::ManyToMany => Cardinality::ManyToMany,
        }
    }

    /// Whether the edge resolves to more than one target row.
    pub fn is_to_many(self) -> bool {
        matches!(self, Cardinality::OneToMany | Cardinality::ManyToMany)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::OneToOne => write!(f, "1:1"),
            Cardinality::OneToMany => write!(f, "1:N"),
            Cardinality::ManyToOne => write!(f, "N:1"),
            Cardinality::ManyToMany => write!(f, "N:N"),
        }
    }
}

/// Physical source of a relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeOrigin {
    /// A foreign key held by `table`.
    ForeignKey {
        table: String,
        constraint: String,
        columns: Vec<String>,
        referenced_columns: Vec<String>,
    },
    /// A junction table; `columns` reference the owner side, `target_columns`
    /// the other side.
    Junction {
        table: String,
        columns: Vec<String>,
        target_columns: Vec<String>,
    },
}

impl fmt::Display for EdgeOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeOrigin::ForeignKey { table, columns, .. } => {
                write!(f, "{}({})", table, columns.join(", "))
            }
            EdgeOrigin::Junction {
                table,
                columns,
                target_columns,
            } => {
                let all: Vec<&str> = columns
                    .iter()
                    .chain(target_columns)
                    .map(String::as_str)
                    .collect();
                write!(f, "{}({})", table, all.join(", "))
            }
        }
    }
}

/// One direction of a relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub name: String,
    /// Target entity name.
    pub target: String,
    pub cardinality: Cardinality,
    /// Name of the matching edge on the target.
    pub inverse: String,
    /// Set on the side that physically holds the foreign key (or the
    /// junction's first side).
    #[serde(default)]
    pub owner: bool,
    /// Owning foreign key is not nullable.
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub on_delete: ReferentialAction,
    pub origin: EdgeOrigin,
}
