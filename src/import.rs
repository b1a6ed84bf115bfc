//! The import pipeline.
//!
//! ```text
//! Driver ──► MetadataReader ──► infer ──► build ──► emit ──► ImportPlan
//!                                  ▲         ▲
//!                                  └ Normalizer
//! ```

use std::fmt;

use serde::Serialize;

use crate::config::ImportConfig;
use crate::context::Context;
use crate::dialect::Dialect;
use crate::emit::{emit, Mutation};
use crate::error::{DanglingReference, ImportResult};
use crate::inference::infer;
use crate::metadata::MetadataReader;
use crate::model::{build, SchemaModel};
use crate::naming::Normalizer;

/// Output of one import run.
#[derive(Debug, Clone, Serialize)]
pub struct ImportPlan {
    pub dialect: Dialect,
    pub mutations: Vec<Mutation>,
    pub model: SchemaModel,
    /// Relationships dropped because they point outside the import scope.
    pub warnings: Vec<DanglingReference>,
}

impl ImportPlan {
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }
}

impl fmt::Display for ImportPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for mutation in &self.mutations {
            writeln!(f, "{}", mutation)?;
        }
        for warning in &self.warnings {
            writeln!(f, "warning: {}", warning)?;
        }
        Ok(())
    }
}

/// Runs the import pipeline for one configuration.
#[derive(Debug)]
pub struct Importer {
    config: ImportConfig,
}

impl Importer {
    pub fn new(config: ImportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Read the database and compute the mutations that bring a schema
    /// declaration in line with it.
    ///
    /// Fails without a partial plan on any fatal error. Dangling foreign
    /// keys are reported in [`ImportPlan::warnings`].
    pub async fn schema_mutations(&self, cx: &Context) -> ImportResult<ImportPlan> {
        let driver = self.config.driver();
        let options = self.config.options();
        let dialect = driver.dialect();

        let tables = MetadataReader::new(driver.as_ref()).read(cx, options).await?;
        tracing::debug!(%dialect, tables = tables.len(), "read metadata");

        let inference = infer(&tables);
        let names = Normalizer::from_options(options);
        let model = build(&tables, &inference, &names, dialect.types())?;
        let mutations = emit(&model);
        tracing::debug!(mutations = mutations.len(), "emitted mutations");

        Ok(ImportPlan {
            dialect,
            mutations,
            model,
            warnings: inference.warnings,
        })
    }
}
