//! Import options and the validated import configuration.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ImportError, ImportResult};
use crate::metadata::{Driver, DriverRegistry};

/// Default number of table descriptions fetched concurrently.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// User-supplied import options.
///
/// All table lists are sets: duplicates and order are irrelevant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Tables to import. Empty means every table.
    pub tables: BTreeSet<String>,

    /// Tables to skip.
    pub exclude_tables: BTreeSet<String>,

    /// Tables whose entity name is not singularized.
    pub exclude_singularize: BTreeSet<String>,

    /// Tables whose entity name is not camel-cased.
    pub exclude_camelize: BTreeSet<String>,

    /// Maximum table descriptions in flight.
    pub concurrency: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            tables: BTreeSet::new(),
            exclude_tables: BTreeSet::new(),
            exclude_singularize: BTreeSet::new(),
            exclude_camelize: BTreeSet::new(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl ImportOptions {
    /// Whether a table is in scope.
    pub fn is_selected(&self, table: &str) -> bool {
        !self.exclude_tables.contains(table)
            && (self.tables.is_empty() || self.tables.contains(table))
    }

    /// Reject contradictory options.
    pub fn validate(&self) -> ImportResult<()> {
        let conflicting: Vec<&str> = self
            .tables
            .intersection(&self.exclude_tables)
            .map(String::as_str)
            .collect();
        if !conflicting.is_empty() {
            return Err(ImportError::configuration(format!(
                "tables both included and excluded: {}",
                conflicting.join(", ")
            )));
        }

        if self.concurrency == 0 {
            return Err(ImportError::configuration("concurrency must be at least 1"));
        }

        Ok(())
    }

    /// Overlay non-empty values from `other` (command-line flags over file settings).
    pub fn merge(mut self, other: ImportOptions) -> Self {
        if !other.tables.is_empty() {
            self.tables = other.tables;
        }
        if !other.exclude_tables.is_empty() {
            self.exclude_tables = other.exclude_tables;
        }
        self.exclude_singularize.extend(other.exclude_singularize);
        self.exclude_camelize.extend(other.exclude_camelize);
        if other.concurrency != DEFAULT_CONCURRENCY {
            self.concurrency = other.concurrency;
        }
        self
    }
}

/// Validated, immutable configuration for one import run.
#[derive(Clone)]
pub struct ImportConfig {
    options: ImportOptions,
    driver: Arc<dyn Driver>,
}

impl ImportConfig {
    /// Combine options with a driver handle, validating the options once.
    pub fn new(options: ImportOptions, driver: Arc<dyn Driver>) -> ImportResult<Self> {
        options.validate()?;
        Ok(Self { options, driver })
    }

    /// Validate `options`, then open a driver for `dsn` through `registry`.
    ///
    /// Option errors are reported before any driver factory runs.
    pub async fn connect(
        options: ImportOptions,
        registry: &DriverRegistry,
        dsn: &str,
    ) -> ImportResult<Self> {
        options.validate()?;
        let driver = registry.open(dsn).await?;
        Ok(Self { options, driver })
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }
}

impl fmt::Debug for ImportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportConfig")
            .field("options", &self.options)
            .field("driver", &self.driver)
            .finish()
    }
}
