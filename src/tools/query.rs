//! Query execution tool.
//!
//! This module implements the `execute_query` MCP tool. Arguments are
//! validated, the query runs through the client, and results are rendered as
//! a human-readable text block.

use crate::client::SnowflakeClient;
use crate::error::{SnowflakeError, SnowflakeResult};
use crate::models::QueryRequest;
use crate::validate;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::info;

/// Rows shown inline before the output is elided.
const ROW_DISPLAY_LIMIT: usize = 10;

/// Input for the execute_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExecuteQueryInput {
    /// SQL query to execute
    pub query: String,
    /// Optional named query parameters (scalar values only)
    #[serde(default)]
    pub params: Option<serde_json::Map<String, JsonValue>>,
}

/// Handler for query execution.
pub struct QueryToolHandler {
    client: Arc<SnowflakeClient>,
}

impl QueryToolHandler {
    /// Create a new query tool handler.
    pub fn new(client: Arc<SnowflakeClient>) -> Self {
        Self { client }
    }

    /// Handle the execute_query tool call.
    pub async fn execute_query(&self, input: ExecuteQueryInput) -> SnowflakeResult<String> {
        if input.query.is_empty() {
            return Ok("Error: Query is required".to_string());
        }

        let params = validate::validate_params(input.params.as_ref())
            .map_err(|e| SnowflakeError::query(format!("Query validation failed: {e}")))?;

        let request = QueryRequest::new(&input.query).with_params(params);
        let output = self.client.execute_query(&request).await?;

        info!(
            row_count = output.row_count(),
            column_count = output.columns.len(),
            "Query executed"
        );

        Ok(format_query_results(&output.columns, &output.rows))
    }
}

/// Render query results as text: column list, row count, and the first rows.
fn format_query_results(
    columns: &[String],
    rows: &[serde_json::Map<String, JsonValue>],
) -> String {
    if rows.is_empty() {
        return "Query executed successfully. No results returned.".to_string();
    }

    let mut output = String::from("Query Results:\n\n");
    output.push_str(&format!("Columns: {}\n\n", columns.join(", ")));
    output.push_str(&format!("Rows: {}\n\n", rows.len()));

    for (i, row) in rows.iter().take(ROW_DISPLAY_LIMIT).enumerate() {
        let rendered = serde_json::to_string(row).unwrap_or_else(|_| "{}".to_string());
        output.push_str(&format!("Row {}: {}\n", i + 1, rendered));
    }

    if rows.len() > ROW_DISPLAY_LIMIT {
        output.push_str(&format!(
            "\n... and {} more rows",
            rows.len() - ROW_DISPLAY_LIMIT
        ));
    }

    output
}
