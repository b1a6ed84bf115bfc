//! DSN scheme to driver resolution.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;

use super::driver::{Driver, DriverError};
use super::snapshot::SnapshotDriver;
use super::worker_driver::WorkerDriver;
use crate::config::{Dsn, WorkerSettings};
use crate::dialect::Dialect;
use crate::error::{ImportError, ImportResult};
use crate::worker::WorkerClient;

/// Future returned by a driver factory.
pub type DriverFuture = BoxFuture<'static, ImportResult<Arc<dyn Driver>>>;

/// Opens a driver for a parsed DSN.
pub type DriverFactory = Arc<dyn Fn(Dsn) -> DriverFuture + Send + Sync>;

/// Maps DSN schemes to driver factories.
///
/// The scheme is checked before any factory runs, so an unknown scheme fails
/// without I/O.
#[derive(Clone, Default)]
pub struct DriverRegistry {
    factories: BTreeMap<String, DriverFactory>,
}

impl DriverRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in schemes: `mysql`, `postgres`, `postgresql`
    /// (through the introspection worker) and `snapshot`.
    pub fn with_defaults(worker: WorkerSettings) -> Self {
        let mut registry = Self::new();
        for scheme in ["mysql", "postgres", "postgresql"] {
            registry.register(scheme, worker_factory(worker.clone()));
        }
        registry.register(
            "snapshot",
            Arc::new(|dsn: Dsn| {
                async move {
                    let driver = SnapshotDriver::from_file(&dsn.path())?;
                    Ok::<_, ImportError>(Arc::new(driver) as Arc<dyn Driver>)
                }
                .boxed()
            }),
        );
        registry
    }

    /// Register (or replace) the factory for a scheme.
    pub fn register(&mut self, scheme: impl Into<String>, factory: DriverFactory) {
        self.factories.insert(scheme.into().to_lowercase(), factory);
    }

    /// Registered schemes in sorted order.
    pub fn schemes(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Parse `dsn` and open a driver for it.
    pub async fn open(&self, dsn: &str) -> ImportResult<Arc<dyn Driver>> {
        let dsn = Dsn::parse(dsn)?;
        let factory = self.factories.get(dsn.scheme()).ok_or_else(|| {
            ImportError::configuration(format!(
                "unsupported DSN scheme '{}' (supported: {})",
                dsn.scheme(),
                self.schemes().join(", ")
            ))
        })?;
        tracing::debug!(%dsn, "opening driver");
        factory(dsn).await
    }
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("schemes", &self.schemes())
            .finish()
    }
}

fn worker_factory(settings: WorkerSettings) -> DriverFactory {
    Arc::new(move |dsn: Dsn| {
        let settings = settings.clone();
        async move {
            let dialect = Dialect::from_scheme(dsn.scheme()).ok_or_else(|| {
                ImportError::configuration(format!("no dialect for scheme '{}'", dsn.scheme()))
            })?;
            let client = WorkerClient::spawn_with_settings(&settings)
                .await
                .map_err(DriverError::from)?;
            tracing::debug!(
                timeout = ?Duration::from_secs(settings.timeout_seconds),
                "introspection worker started"
            );
            let driver = WorkerDriver::new(Arc::new(client), dialect, dsn.as_str());
            Ok::<_, ImportError>(Arc::new(driver) as Arc<dyn Driver>)
        }
        .boxed()
    })
}
