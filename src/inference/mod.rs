//! Relation inference: table roles and relationship cardinality.
//!
//! Every loaded table is classified as an entity or a pure junction table,
//! and every foreign key becomes a [`Relation`] between two entities.
//!
//! - A foreign key whose columns contain a unique key is one-to-one,
//!   otherwise many-to-one (with a one-to-many inverse).
//! - A junction table (exactly two foreign keys to two other distinct
//!   tables, primary key equal to their columns, nothing else) becomes one
//!   many-to-many relation and no entity.
//! - A foreign key pointing outside the loaded set is dropped with a
//!   [`DanglingReference`] warning.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::DanglingReference;
use crate::metadata::{ForeignKey, ReferentialAction, Table};
use crate::model::{Cardinality, EdgeOrigin};

/// How a table appears in the generated schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableRole {
    Entity,
    Junction,
}

/// A relationship between two tables, seen from its owning side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// Owning table: the foreign key holder, or the junction's first side.
    pub table: String,
    /// The other side.
    pub target: String,
    /// Cardinality from the owning side.
    pub cardinality: Cardinality,
    /// Owning foreign key is not nullable.
    pub required: bool,
    pub on_delete: ReferentialAction,
    pub origin: EdgeOrigin,
}

impl Relation {
    pub fn is_self_referential(&self) -> bool {
        self.table == self.target
    }

    /// The owning foreign key's single column, for single-column keys.
    pub fn single_column(&self) -> Option<&str> {
        match &self.origin {
            EdgeOrigin::ForeignKey { columns, .. } if columns.len() == 1 => {
                Some(columns[0].as_str())
            }
            _ => None,
        }
    }
}

/// Result of relation inference over one snapshot.
#[derive(Debug, Clone, Default)]
pub struct Inference {
    pub roles: BTreeMap<String, TableRole>,
    /// Relations ordered by owning table, then constraint name.
    pub relations: Vec<Relation>,
    pub warnings: Vec<DanglingReference>,
}

impl Inference {
    pub fn role(&self, table: &str) -> Option<TableRole> {
        self.roles.get(table).copied()
    }

    pub fn is_junction(&self, table: &str) -> bool {
        self.role(table) == Some(TableRole::Junction)
    }

    /// Columns of `table` consumed by foreign-key relations it owns.
    pub fn edge_columns(&self, table: &str) -> BTreeSet<&str> {
        self.relations
            .iter()
            .filter_map(|r| match &r.origin {
                EdgeOrigin::ForeignKey {
                    table: holder,
                    columns,
                    ..
                } if holder == table => Some(columns),
                _ => None,
            })
            .flatten()
            .map(String::as_str)
            .collect()
    }
}

/// Classify tables and derive relations. `tables` must be sorted by name.
pub fn infer(tables: &[Table]) -> Inference {
    let loaded: BTreeSet<&str> = tables.iter().map(|t| t.name.as_str()).collect();

    // Tables that some other table points at need an entity of their own.
    let referenced: BTreeSet<&str> = tables
        .iter()
        .flat_map(|t| {
            t.foreign_keys
                .iter()
                .filter(move |fk| fk.referenced_table != t.name)
                .map(|fk| fk.referenced_table.as_str())
        })
        .collect();

    let mut inference = Inference::default();

    for table in tables {
        let junction = junction_sides(table).filter(|_| !referenced.contains(table.name.as_str()));

        if let Some((first, second)) = junction {
            inference
                .roles
                .insert(table.name.clone(), TableRole::Junction);

            let dangling: Vec<&ForeignKey> = [first, second]
                .into_iter()
                .filter(|fk| !loaded.contains(fk.referenced_table.as_str()))
                .collect();
            if !dangling.is_empty() {
                for fk in dangling {
                    inference.warn(table, fk);
                }
                continue;
            }

            tracing::debug!(
                table = %table.name,
                left = %first.referenced_table,
                right = %second.referenced_table,
                "junction table"
            );
            inference.relations.push(Relation {
                table: first.referenced_table.clone(),
                target: second.referenced_table.clone(),
                cardinality: Cardinality::ManyToMany,
                required: false,
                on_delete: ReferentialAction::NoAction,
                origin: EdgeOrigin::Junction {
                    table: table.name.clone(),
                    columns: first.columns.clone(),
                    target_columns: second.columns.clone(),
                },
            });
            continue;
        }

        inference
            .roles
            .insert(table.name.clone(), TableRole::Entity);

        for fk in &table.foreign_keys {
            if !loaded.contains(fk.referenced_table.as_str()) {
                inference.warn(table, fk);
                continue;
            }
            let cardinality = if fk.unique {
                Cardinality::OneToOne
            } else {
                Cardinality::ManyToOne
            };
            inference.relations.push(Relation {
                table: table.name.clone(),
                target: fk.referenced_table.clone(),
                cardinality,
                required: !fk.nullable,
                on_delete: fk.on_delete,
                origin: EdgeOrigin::ForeignKey {
                    table: table.name.clone(),
                    constraint: fk.name.clone(),
                    columns: fk.columns.clone(),
                    referenced_columns: fk.referenced_columns.clone(),
                },
            });
        }
    }

    tracing::debug!(
        relations = inference.relations.len(),
        junctions = inference
            .roles
            .values()
            .filter(|r| **r == TableRole::Junction)
            .count(),
        dangling = inference.warnings.len(),
        "inferred relations"
    );
    inference
}

impl Inference {
    fn warn(&mut self, table: &Table, fk: &ForeignKey) {
        let warning = DanglingReference {
            table: table.name.clone(),
            constraint: fk.name.clone(),
            referenced_table: fk.referenced_table.clone(),
        };
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }
}

/// The two foreign keys of a pure junction table, ordered by the position of
/// their first column in the table.
fn junction_sides(table: &Table) -> Option<(&ForeignKey, &ForeignKey)> {
    let [a, b] = table.foreign_keys.as_slice() else {
        return None;
    };
    if a.referenced_table == b.referenced_table
        || a.referenced_table == table.name
        || b.referenced_table == table.name
    {
        return None;
    }

    let union: BTreeSet<&str> = a
        .columns
        .iter()
        .chain(&b.columns)
        .map(String::as_str)
        .collect();
    let primary_key: BTreeSet<&str> = table.primary_key.iter().map(String::as_str).collect();
    let columns: BTreeSet<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    if primary_key != union || columns != union {
        return None;
    }

    let position = |fk: &ForeignKey| {
        table
            .columns
            .iter()
            .position(|c| fk.columns.first() == Some(&c.name))
    };
    if position(b) < position(a) {
        Some((b, a))
    } else {
        Some((a, b))
    }
}
