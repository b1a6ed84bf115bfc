//! Database metadata access.
//!
//! Drivers return raw catalog records ([`TableDescription`]); the
//! [`MetadataReader`] fetches the tables in scope and normalizes them into
//! immutable [`Table`] values for inference.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MetadataReader                             │
//! │  - filter by ImportOptions      - parse types per dialect       │
//! │  - bounded concurrent describe  - derive unique/nullable keys   │
//! └─────────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌──────────────────────────────┐  ┌──────────────────────────────┐
//! │ WorkerDriver                 │  │ SnapshotDriver               │
//! │ (NDJSON introspection worker)│  │ (JSON metadata dump)         │
//! └──────────────────────────────┘  └──────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use schema_import::metadata::{DriverRegistry, MetadataReader};
//!
//! let driver = DriverRegistry::with_defaults(settings.worker).open(dsn).await?;
//! let tables = MetadataReader::new(driver.as_ref()).read(&cx, &options).await?;
//! ```

mod driver;
mod reader;
mod registry;
mod snapshot;
mod types;
mod worker_driver;

pub use driver::{Driver, DriverError, DriverResult};
pub use reader::{normalize_table, MetadataReader};
pub use registry::{DriverFactory, DriverFuture, DriverRegistry};
pub use snapshot::{Snapshot, SnapshotDriver};
pub use types::*;
pub use worker_driver::WorkerDriver;
