//! Driver implementation backed by the introspection worker.

use std::sync::Arc;

use async_trait::async_trait;

use super::driver::{Driver, DriverResult};
use super::types::TableDescription;
use crate::context::Context;
use crate::dialect::Dialect;
use crate::worker::protocol::ConnectionParams;
use crate::worker::WorkerClient;

/// Driver that forwards every call to a [`WorkerClient`].
///
/// # Example
///
/// ```ignore
/// let client = WorkerClient::spawn("./schema-import-worker").await?;
/// let driver = WorkerDriver::new(Arc::new(client), Dialect::Postgres, "postgres://localhost/app");
/// let tables = driver.list_tables(&Context::background()).await?;
/// ```
#[derive(Debug)]
pub struct WorkerDriver {
    /// The worker client for RPC calls.
    client: Arc<WorkerClient>,
    dialect: Dialect,
    /// Cached connection parameters to avoid repeated allocations.
    connection: ConnectionParams,
}

impl WorkerDriver {
    pub fn new(
        client: Arc<WorkerClient>,
        dialect: Dialect,
        connection_string: impl Into<String>,
    ) -> Self {
        Self {
            client,
            dialect,
            connection: ConnectionParams {
                driver: dialect.worker_driver().to_string(),
                connection_string: connection_string.into(),
            },
        }
    }

    /// Get the connection parameters sent with every request.
    pub fn connection(&self) -> &ConnectionParams {
        &self.connection
    }
}

#[async_trait]
impl Driver for WorkerDriver {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn list_tables(&self, cx: &Context) -> DriverResult<Vec<String>> {
        let response = self.client.list_tables(cx, &self.connection).await?;
        Ok(response.tables)
    }

    async fn describe_table(&self, cx: &Context, table: &str) -> DriverResult<TableDescription> {
        let response = self
            .client
            .describe_table(cx, &self.connection, table)
            .await?;
        Ok(response)
    }
}
