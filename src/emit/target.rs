//! Idempotent application of mutations to a schema declaration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Mutation;
use crate::model::{Entity, SchemaModel};

/// A mutation could not be applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("cannot apply '{mutation}': entity '{entity}' does not exist")]
    UnknownEntity { entity: String, mutation: String },
}

/// Effect of one applied mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Created,
    /// An existing definition with the same name was replaced.
    Updated,
    Unchanged,
}

/// Counts of applied mutations by effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl ApplySummary {
    pub fn is_changed(&self) -> bool {
        self.created + self.updated > 0
    }

    fn record(&mut self, applied: Applied) {
        match applied {
            Applied::Created => self.created += 1,
            Applied::Updated => self.updated += 1,
            Applied::Unchanged => self.unchanged += 1,
        }
    }
}

/// An existing schema declaration that mutations are applied to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetSchema {
    model: SchemaModel,
}

impl TargetSchema {
    pub fn new(model: SchemaModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &SchemaModel {
        &self.model
    }

    pub fn into_model(self) -> SchemaModel {
        self.model
    }

    /// Apply one mutation. Re-applying an identical mutation is a no-op.
    pub fn apply(&mut self, mutation: &Mutation) -> Result<Applied, ApplyError> {
        if let Mutation::CreateEntity {
            name,
            table,
            primary_key,
        } = mutation
        {
            let Some(position) = self.model.entities.iter().position(|e| &e.name == name) else {
                let mut entity = Entity::new(name.clone(), table.clone());
                entity.primary_key = primary_key.clone();
                self.model.entities.push(entity);
                return Ok(Applied::Created);
            };
            let entity = &mut self.model.entities[position];
            if &entity.table == table && &entity.primary_key == primary_key {
                return Ok(Applied::Unchanged);
            }
            entity.table = table.clone();
            entity.primary_key = primary_key.clone();
            return Ok(Applied::Updated);
        }

        let entity = self
            .model
            .entities
            .iter_mut()
            .find(|e| e.name == mutation.entity())
            .ok_or_else(|| ApplyError::UnknownEntity {
                entity: mutation.entity().to_string(),
                mutation: mutation.to_string(),
            })?;

        let applied = match mutation {
            Mutation::AddField { field, .. } => {
                upsert(&mut entity.fields, field, |f| f.name == field.name)
            }
            Mutation::AddIndex { index, .. } => {
                upsert(&mut entity.indexes, index, |i| i.name == index.name)
            }
            Mutation::AddEdge { edge, .. } => {
                upsert(&mut entity.edges, edge, |e| e.name == edge.name)
            }
            Mutation::CreateEntity { .. } => Applied::Unchanged,
        };
        Ok(applied)
    }

    /// Apply mutations in order, stopping at the first failure.
    pub fn apply_all<'a>(
        &mut self,
        mutations: impl IntoIterator<Item = &'a Mutation>,
    ) -> Result<ApplySummary, ApplyError> {
        let mut summary = ApplySummary::default();
        for mutation in mutations {
            summary.record(self.apply(mutation)?);
        }
        Ok(summary)
    }
}

fn upsert<T: Clone + PartialEq>(
    items: &mut Vec<T>,
    item: &T,
    same: impl Fn(&T) -> bool,
) -> Applied {
    match items.iter_mut().find(|existing| same(existing)) {
        Some(existing) if *existing == *item => Applied::Unchanged,
        Some(existing) => {
            *existing = item.clone();
            Applied::Updated
        }
        None => {
            items.push(item.clone());
            Applied::Created
        }
    }
}
