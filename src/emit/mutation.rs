//! Schema mutations and their deterministic ordering.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metadata::ReferentialAction;
use crate::model::{Edge, EntityIndex, Field, KeyPart, SchemaModel};

/// One change to a schema declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    CreateEntity {
        name: String,
        table: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        primary_key: Vec<KeyPart>,
    },
    AddField {
        entity: String,
        field: Field,
    },
    AddIndex {
        entity: String,
        index: EntityIndex,
    },
    AddEdge {
        entity: String,
        edge: Edge,
    },
}

impl Mutation {
    /// Name of the entity this mutation applies to.
    pub fn entity(&self) -> &str {
        match self {
            Mutation::CreateEntity { name, .. } => name,
            Mutation::AddField { entity, .. }
            | Mutation::AddIndex { entity, .. }
            | Mutation::AddEdge { entity, .. } => entity,
        }
    }
}

/// Mutations for `model`: every entity creation (table order), then fields
/// per entity (column order), indexes per entity (name order), edges per
/// entity (name order).
pub fn emit(model: &SchemaModel) -> Vec<Mutation> {
    let entities = &model.entities;
    let creates = entities.iter().map(|e| Mutation::CreateEntity {
        name: e.name.clone(),
        table: e.table.clone(),
        primary_key: e.primary_key.clone(),
    });
    let fields = entities.iter().flat_map(|e| {
        e.fields.iter().map(|f| Mutation::AddField {
            entity: e.name.clone(),
            field: f.clone(),
        })
    });
    let indexes = entities.iter().flat_map(|e| {
        let mut indexes: Vec<&EntityIndex> = e.indexes.iter().collect();
        indexes.sort_by(|a, b| a.name.cmp(&b.name));
        indexes.into_iter().map(|i| Mutation::AddIndex {
            entity: e.name.clone(),
            index: i.clone(),
        })
    });
    let edges = entities.iter().flat_map(|e| {
        let mut edges: Vec<&Edge> = e.edges.iter().collect();
        edges.sort_by(|a, b| a.name.cmp(&b.name));
        edges.into_iter().map(|edge| Mutation::AddEdge {
            entity: e.name.clone(),
            edge: edge.clone(),
        })
    });

    creates.chain(fields).chain(indexes).chain(edges).collect()
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::CreateEntity {
                name,
                table,
                primary_key,
            } => {
                write!(f, "create entity {} from {}", name, table)?;
                if !primary_key.is_empty() {
                    let parts: Vec<String> = primary_key
                        .iter()
                        .map(|k| {
                            let auto = if k.auto_increment { " auto" } else { "" };
                            format!("{} {}{}", k.column, k.field_type, auto)
                        })
                        .collect();
                    write!(f, " key ({})", parts.join(", "))?;
                }
                Ok(())
            }
            Mutation::AddField { entity, field } => {
                write!(f, "add field {}.{} {}", entity, field.name, field.field_type)?;
                if field.column != field.name {
                    write!(f, " column {}", field.column)?;
                }
                if field.nullable {
                    f.write_str(" nullable")?;
                }
                if field.unique {
                    f.write_str(" unique")?;
                }
                if let Some(default) = &field.default {
                    write!(f, " default {}", default)?;
                }
                Ok(())
            }
            Mutation::AddIndex { entity, index } => {
                write!(
                    f,
                    "add index {}.{} ({})",
                    entity,
                    index.name,
                    index.fields.join(", ")
                )?;
                if index.unique {
                    f.write_str(" unique")?;
                }
                Ok(())
            }
            Mutation::AddEdge { entity, edge } => {
                write!(
                    f,
                    "add edge {}.{} -> {} {} inverse {}",
                    entity, edge.name, edge.target, edge.cardinality, edge.inverse
                )?;
                if edge.owner {
                    f.write_str(" owner")?;
                }
                if edge.required {
                    f.write_str(" required")?;
                }
                if edge.on_delete != ReferentialAction::NoAction {
                    write!(f, " on delete {}", edge.on_delete)?;
                }
                write!(f, " via {}", edge.origin)
            }
        }
    }
}
