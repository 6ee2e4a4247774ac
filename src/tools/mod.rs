//! MCP tool implementations.
//!
//! This module contains the tool handlers behind the MCP surface:
//! - `query`: Execute validated SQL queries
//! - `metadata`: SHOW/DESCRIBE listings and the connection probe
//! - `cortex`: Cortex Complete/Search/Analyst and the service listing
//!
//! Handlers return `Result<String, SnowflakeError>`; the service layer turns
//! errors into prefixed text so nothing propagates to the transport.

pub mod cortex;
pub mod metadata;
pub mod query;

pub use cortex::{
    CortexAnalystInput, CortexCompleteInput, CortexSearchInput, CortexToolHandler,
    ListCortexServicesInput, ServiceTypeFilter,
};
pub use metadata::{
    GetColumnsInput, GetSchemasInput, GetTablesInput, MetadataToolHandler,
};
pub use query::{ExecuteQueryInput, QueryToolHandler};

use serde_json::Value as JsonValue;

/// Look up the display name of a listing row.
///
/// Snowflake reports `SHOW` output with a lower-case `name` column, but
/// result decoding elsewhere (and other warehouses) may upper-case it, so the
/// lookup is case-insensitive with an "Unknown" fallback.
pub(crate) fn row_name(row: &serde_json::Map<String, JsonValue>) -> &str {
    row_field(row, "name").unwrap_or("Unknown")
}

/// Case-insensitive string field lookup.
pub(crate) fn row_field<'a>(
    row: &'a serde_json::Map<String, JsonValue>,
    field: &str,
) -> Option<&'a str> {
    if let Some(value) = row.get(field).and_then(JsonValue::as_str) {
        return Some(value);
    }
    row.iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(field))
        .and_then(|(_, value)| value.as_str())
}
