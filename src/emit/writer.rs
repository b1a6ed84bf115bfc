//! Schema declaration writers.

use std::fs;
use std::path::Path;

use super::target::{ApplySummary, TargetSchema};
use crate::error::{ImportError, ImportResult};
use crate::import::ImportPlan;

/// Persists an import plan at a location.
pub trait SchemaWriter {
    /// Apply `plan` to whatever declaration exists at `path`.
    fn write(&self, plan: &ImportPlan, path: &Path) -> ImportResult<ApplySummary>;
}

/// Writes the schema as pretty-printed JSON.
///
/// An existing file is loaded first and the plan applied on top of it, so
/// declarations outside the import scope survive. The file is only rewritten
/// when the plan changed something.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaWriter;

impl JsonSchemaWriter {
    pub fn new() -> Self {
        Self
    }

    /// Load the declaration at `path`, or an empty one if there is none.
    pub fn load(&self, path: &Path) -> ImportResult<Option<TargetSchema>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|source| ImportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

impl SchemaWriter for JsonSchemaWriter {
    fn write(&self, plan: &ImportPlan, path: &Path) -> ImportResult<ApplySummary> {
        let existing = self.load(path)?;
        let exists = existing.is_some();
        let mut target = existing.unwrap_or_default();

        let summary = target.apply_all(&plan.mutations)?;
        if exists && !summary.is_changed() {
            tracing::info!(path = %path.display(), "schema is up to date");
            return Ok(summary);
        }

        let write_err = |source| ImportError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let mut json = serde_json::to_string_pretty(&target)?;
        json.push('\n');
        fs::write(path, json).map_err(write_err)?;

        tracing::info!(
            path = %path.display(),
            created = summary.created,
            updated = summary.updated,
            "schema written"
        );
        Ok(summary)
    }
}
