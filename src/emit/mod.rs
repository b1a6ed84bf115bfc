//! Mutation emission and idempotent application.
//!
//! [`emit`] turns a [`SchemaModel`](crate::model::SchemaModel) into an
//! ordered list of [`Mutation`]s. A [`TargetSchema`] applies them so that a
//! second application of the same list changes nothing, and a
//! [`SchemaWriter`] persists the result.

mod mutation;
mod target;
mod writer;

pub use mutation::{emit, Mutation};
pub use target::{Applied, ApplyError, ApplySummary, TargetSchema};
pub use writer::{JsonSchemaWriter, SchemaWriter};
