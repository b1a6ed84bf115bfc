//! # schema-import
//!
//! Reverse-engineers an application schema from a live relational database.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Driver (introspection worker / snapshot)          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [metadata]
//! ┌─────────────────────────────────────────────────────────┐
//! │            Tables (columns, keys, indexes)               │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [inference + naming]
//! ┌─────────────────────────────────────────────────────────┐
//! │       Table roles, relations, normalized names           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [model]
//! ┌─────────────────────────────────────────────────────────┐
//! │          Entities, fields, indexes, edge pairs           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [emit]
//! ┌─────────────────────────────────────────────────────────┐
//! │         Ordered, idempotent schema mutations             │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod context;
pub mod dialect;
pub mod emit;
pub mod error;
pub mod import;
pub mod inference;
pub mod metadata;
pub mod model;
pub mod naming;
pub mod worker;

pub use config::{ImportConfig, ImportOptions};
pub use context::{CancelHandle, Context};
pub use error::{DanglingReference, ImportError, ImportResult};
pub use import::{ImportPlan, Importer};
