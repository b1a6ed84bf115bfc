//! Name normalization: table names to entity names, columns to field names.
//!
//! All functions here are pure, total and idempotent. Exclusion sets let a
//! caller opt individual tables out of singularization or camel-casing when
//! the rules produce an unwanted name.

mod case;
mod inflection;

pub use case::{camelize, snake};
pub use inflection::{pluralize, singularize};

use std::collections::BTreeSet;

use crate::config::ImportOptions;

/// Upper bound on rule re-application before giving up on convergence.
const MAX_ITERATIONS: usize = 8;

/// Apply `f` until its output stops changing.
///
/// If no fixed point is reached the input is returned unchanged, which keeps
/// the wrapped function idempotent either way.
pub(crate) fn fixed_point(input: &str, f: impl Fn(&str) -> String) -> String {
    let mut current = input.to_string();
    for _ in 0..MAX_ITERATIONS {
        let next = f(&current);
        if next == current {
            return current;
        }
        current = next;
    }
    input.to_string()
}

/// Per-table naming rules for one import run.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    exclude_singularize: BTreeSet<String>,
    exclude_camelize: BTreeSet<String>,
}

impl Normalizer {
    pub fn new(
        exclude_singularize: impl IntoIterator<Item = String>,
        exclude_camelize: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            exclude_singularize: exclude_singularize.into_iter().collect(),
            exclude_camelize: exclude_camelize.into_iter().collect(),
        }
    }

    pub fn from_options(options: &ImportOptions) -> Self {
        Self::new(
            options.exclude_singularize.iter().cloned(),
            options.exclude_camelize.iter().cloned(),
        )
    }

    /// Entity name for a table: `user_roles` → `UserRole`.
    pub fn entity_name(&self, table: &str) -> String {
        let base = if self.exclude_singularize.contains(table) {
            table.to_string()
        } else {
            singularize(table)
        };
        if self.exclude_camelize.contains(table) {
            base
        } else {
            camelize(&base)
        }
    }

    /// Snake-case singular form used for to-one edge names: `user_roles` → `user_role`.
    pub fn singular_name(&self, table: &str) -> String {
        if self.exclude_singularize.contains(table) {
            snake(table)
        } else {
            snake(&singularize(table))
        }
    }

    /// Snake-case plural form used for to-many edge names: `user_role` → `user_roles`.
    pub fn plural_name(&self, table: &str) -> String {
        if self.exclude_singularize.contains(table) {
            snake(table)
        } else {
            pluralize(&self.singular_name(table))
        }
    }

    /// Field name for a column.
    pub fn field_name(&self, column: &str) -> String {
        snake(column)
    }
}
