//! Schema model builder.
//!
//! Turns normalized tables plus inferred relations into entities. Names are
//! claimed per entity as they are generated; two declarations that normalize
//! to the same name abort the build with [`ImportError::SchemaConflict`].

use std::collections::BTreeMap;

use super::{Cardinality, Edge, EdgeOrigin, Entity, EntityIndex, Field, KeyPart, SchemaModel};
use crate::dialect::DialectTypes;
use crate::error::{ImportError, ImportResult};
use crate::inference::{Inference, Relation};
use crate::metadata::{Column, Table};
use crate::model::FieldType;
use crate::naming::Normalizer;

/// Build the schema model for `tables` (sorted by name).
pub fn build(
    tables: &[Table],
    inference: &Inference,
    names: &Normalizer,
    dialect: &dyn DialectTypes,
) -> ImportResult<SchemaModel> {
    let mut entity_names: BTreeMap<&str, String> = BTreeMap::new();
    let mut claimed: BTreeMap<String, &str> = BTreeMap::new();
    for table in tables.iter().filter(|t| !inference.is_junction(&t.name)) {
        let name = names.entity_name(&table.name);
        if let Some(first) = claimed.insert(name.clone(), &table.name) {
            return Err(ImportError::SchemaConflict {
                entity: name.clone(),
                name,
                first: format!("table '{}'", first),
                second: format!("table '{}'", table.name),
            });
        }
        entity_names.insert(&table.name, name);
    }

    let mut builders: BTreeMap<&str, EntityBuilder> = BTreeMap::new();
    for table in tables {
        let Some(name) = entity_names.get(table.name.as_str()) else {
            continue;
        };
        let builder = EntityBuilder::new(name.clone(), table, inference, names, dialect)?;
        builders.insert(&table.name, builder);
    }

    let mut shared_targets: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for relation in inference
        .relations
        .iter()
        .filter(|r| r.cardinality != Cardinality::ManyToMany)
    {
        *shared_targets
            .entry((relation.table.as_str(), relation.target.as_str()))
            .or_default() += 1;
    }

    for relation in &inference.relations {
        let (Some(owner), Some(target)) = (
            entity_names.get(relation.table.as_str()),
            entity_names.get(relation.target.as_str()),
        ) else {
            continue;
        };
        let shared = shared_targets
            .get(&(relation.table.as_str(), relation.target.as_str()))
            .is_some_and(|count| *count > 1);
        let (owner_edge, inverse_name) = edge_names(relation, shared, names);
        let edge = Edge {
            name: owner_edge.clone(),
            target: target.clone(),
            cardinality: relation.cardinality,
            inverse: inverse_name.clone(),
            owner: true,
            required: relation.required,
            on_delete: relation.on_delete,
            origin: relation.origin.clone(),
        };
        let inverse = Edge {
            name: inverse_name,
            target: owner.clone(),
            cardinality: relation.cardinality.reverse(),
            inverse: owner_edge,
            owner: false,
            required: false,
            on_delete: relation.on_delete,
            origin: relation.origin.clone(),
        };

        if let Some(builder) = builders.get_mut(relation.table.as_str()) {
            builder.add_edge(edge)?;
        }
        if let Some(builder) = builders.get_mut(relation.target.as_str()) {
            builder.add_edge(inverse)?;
        }
    }

    let entities: Vec<Entity> = builders.into_values().map(EntityBuilder::finish).collect();
    tracing::debug!(entities = entities.len(), "built schema model");
    Ok(SchemaModel { entities })
}

/// Owner-side and inverse edge names for a relation. `shared` is set when
/// the owning table holds more than one foreign key to the same target.
fn edge_names(relation: &Relation, shared: bool, names: &Normalizer) -> (String, String) {
    let owner_singular = names.singular_name(&relation.table);
    let owner_plural = names.plural_name(&relation.table);

    if relation.cardinality == Cardinality::ManyToMany {
        return (names.plural_name(&relation.target), owner_plural);
    }

    let child = if relation.cardinality.reverse().is_to_many() {
        owner_plural
    } else {
        owner_singular.clone()
    };
    let role = edge_role(relation, shared, names);

    if relation.is_self_referential() {
        let owner = if role == owner_singular {
            format!("parent_{}", role)
        } else {
            role.clone()
        };
        let inverse = if role == owner_singular || role == "parent" {
            format!("child_{}", child)
        } else {
            format!("{}_{}", role, child)
        };
        return (owner, inverse);
    }

    let inverse = if role == names.singular_name(&relation.target) {
        child
    } else {
        format!("{}_{}", role, child)
    };
    (role, inverse)
}

/// The relation's role: the foreign-key column without its `_id` suffix, or
/// the whole column when it has none. Bare `id` columns and composite keys
/// fall back to the target's singular name, or to the constraint name when
/// that would be ambiguous.
fn edge_role(relation: &Relation, shared: bool, names: &Normalizer) -> String {
    let from_column = relation
        .single_column()
        .filter(|column| *column != "id")
        .map(|column| names.field_name(column.strip_suffix("_id").unwrap_or(column)))
        .filter(|role| !role.is_empty());
    if let Some(role) = from_column {
        return role;
    }
    match &relation.origin {
        EdgeOrigin::ForeignKey { constraint, .. } if shared => names.field_name(constraint),
        _ => names.singular_name(&relation.target),
    }
}

/// Accumulates one entity while tracking which declaration owns each name.
struct EntityBuilder {
    entity: Entity,
    claims: BTreeMap<String, String>,
}

impl EntityBuilder {
    fn new(
        name: String,
        table: &Table,
        inference: &Inference,
        names: &Normalizer,
        dialect: &dyn DialectTypes,
    ) -> ImportResult<Self> {
        let mut builder = Self {
            entity: Entity::new(name, table.name.clone()),
            claims: BTreeMap::new(),
        };

        for key in &table.primary_key {
            let Some(column) = table.column(key) else {
                continue;
            };
            builder.entity.primary_key.push(KeyPart {
                column: column.name.clone(),
                field_type: map_type(table, column, dialect)?,
                auto_increment: column.auto_increment,
            });
        }

        let consumed = inference.edge_columns(&table.name);
        for column in table
            .columns
            .iter()
            .filter(|c| !c.primary_key && !consumed.contains(c.name.as_str()))
        {
            let field_type = map_type(table, column, dialect)?;
            let default = column
                .default
                .as_deref()
                .and_then(|raw| dialect.parse_default(raw, &field_type));
            let unique = table
                .indexes
                .iter()
                .any(|i| i.unique && i.columns.len() == 1 && i.columns[0] == column.name);
            let field = Field {
                name: names.field_name(&column.name),
                column: column.name.clone(),
                field_type,
                nullable: column.nullable,
                unique,
                default,
            };
            builder.claim(&field.name, format!("column '{}'", column.name))?;
            builder.entity.fields.push(field);
        }

        for index in table.indexes.iter().filter(|i| i.columns.len() > 1) {
            let fields: Option<Vec<String>> = index
                .columns
                .iter()
                .map(|c| builder.field_for_column(c).map(|f| f.name.clone()))
                .collect();
            if let Some(fields) = fields {
                builder.entity.indexes.push(EntityIndex {
                    name: index.name.clone(),
                    fields,
                    unique: index.unique,
                });
            }
        }

        Ok(builder)
    }

    fn field_for_column(&self, column: &str) -> Option<&Field> {
        self.entity.fields.iter().find(|f| f.column == column)
    }

    fn claim(&mut self, name: &str, owner: String) -> ImportResult<()> {
        if let Some(first) = self.claims.get(name) {
            return Err(ImportError::SchemaConflict {
                entity: self.entity.name.clone(),
                name: name.to_string(),
                first: first.clone(),
                second: owner,
            });
        }
        self.claims.insert(name.to_string(), owner);
        Ok(())
    }

    fn add_edge(&mut self, edge: Edge) -> ImportResult<()> {
        self.claim(&edge.name, format!("edge '{}' ({})", edge.name, edge.origin))?;
        self.entity.edges.push(edge);
        Ok(())
    }

    fn finish(mut self) -> Entity {
        self.entity.edges.sort_by(|a, b| a.name.cmp(&b.name));
        self.entity
    }
}

fn map_type(table: &Table, column: &Column, dialect: &dyn DialectTypes) -> ImportResult<FieldType> {
    dialect
        .field_type(&column.column_type)
        .ok_or_else(|| ImportError::UnsupportedType {
            table: table.name.clone(),
            column: column.name.clone(),
            data_type: column.raw_type.clone(),
        })
}
