//! Protocol types for introspection worker communication.
//!
//! Every message is one JSON object per line. Requests carry a unique id;
//! the worker answers each with a response envelope holding the same id.

use serde::{Deserialize, Serialize};

use crate::metadata::TableDescription;

// ============================================================================
// Request/Response Envelope
// ============================================================================

/// Request envelope sent to the worker.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope {
    /// Unique request ID for correlation.
    pub id: String,
    /// Method name (e.g., "introspect.list_tables").
    pub method: String,
    /// Method-specific parameters.
    pub params: serde_json::Value,
}

/// Response envelope received from the worker.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    /// Request ID this response corresponds to.
    pub id: String,
    /// Whether the request succeeded.
    pub success: bool,
    /// Result data (present if success = true).
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Error information (present if success = false).
    #[serde(default)]
    pub error: Option<ErrorInfo>,
}

/// Error information in a failed response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorInfo {
    /// Error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

// ============================================================================
// Connection Parameters (included in all requests)
// ============================================================================

/// Database connection parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Database driver name ("mysql", "postgres").
    pub driver: String,
    /// Driver-specific connection string.
    pub connection_string: String,
}

// ============================================================================
// Introspection
// ============================================================================

/// Parameters for `introspect.list_tables`.
#[derive(Debug, Clone, Serialize)]
pub struct ListTablesParams {
    #[serde(flatten)]
    pub connection: ConnectionParams,
}

/// Response for `introspect.list_tables`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListTablesResponse {
    #[serde(default)]
    pub tables: Vec<String>,
}

/// Parameters for `introspect.describe_table`.
#[derive(Debug, Clone, Serialize)]
pub struct DescribeTableParams {
    #[serde(flatten)]
    pub connection: ConnectionParams,
    /// Table name.
    pub table: String,
}

/// Response for `introspect.describe_table`.
pub type DescribeTableResponse = TableDescription;

/// Method names.
pub mod methods {
    pub const LIST_TABLES: &str = "introspect.list_tables";
    pub const DESCRIBE_TABLE: &str = "introspect.describe_table";
}
