//! Warehouse metadata tools.
//!
//! Listing tools (`get_databases`, `get_schemas`, `get_tables`,
//! `get_columns`, `get_warehouses`, `get_roles`) and the `test_connection`
//! probe. Identifier arguments are validated here before they reach the
//! client's SHOW/DESCRIBE statement builders.

use crate::client::SnowflakeClient;
use crate::error::SnowflakeResult;
use crate::tools::{row_field, row_name};
use crate::validate::validate_identifier;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Input for the get_schemas tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct GetSchemasInput {
    /// Database name (optional)
    #[serde(default)]
    pub database: Option<String>,
}

/// Input for the get_tables tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct GetTablesInput {
    /// Database name (optional)
    #[serde(default)]
    pub database: Option<String>,
    /// Schema name (optional)
    #[serde(default)]
    pub schema: Option<String>,
}

/// Input for the get_columns tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct GetColumnsInput {
    /// Table name
    #[serde(default)]
    pub table: String,
    /// Database name (optional)
    #[serde(default)]
    pub database: Option<String>,
    /// Schema name (optional)
    #[serde(default)]
    pub schema: Option<String>,
}

/// Handler for metadata listings.
pub struct MetadataToolHandler {
    client: Arc<SnowflakeClient>,
}

impl MetadataToolHandler {
    /// Create a new metadata tool handler.
    pub fn new(client: Arc<SnowflakeClient>) -> Self {
        Self { client }
    }

    /// Handle the get_databases tool call.
    pub async fn get_databases(&self) -> SnowflakeResult<String> {
        let databases = self.client.get_databases().await?;
        Ok(format_listing("Available Databases:", &databases))
    }

    /// Handle the get_schemas tool call.
    pub async fn get_schemas(&self, input: GetSchemasInput) -> SnowflakeResult<String> {
        if let Some(database) = &input.database {
            validate_identifier(database, "database name")?;
        }
        let schemas = self.client.get_schemas(input.database.as_deref()).await?;
        let scope = input
            .database
            .as_deref()
            .map(|db| format!(" in {db}"))
            .unwrap_or_default();
        Ok(format_listing(&format!("Available Schemas{scope}:"), &schemas))
    }

    /// Handle the get_tables tool call.
    pub async fn get_tables(&self, input: GetTablesInput) -> SnowflakeResult<String> {
        if let Some(database) = &input.database {
            validate_identifier(database, "database name")?;
        }
        if let Some(schema) = &input.schema {
            validate_identifier(schema, "schema name")?;
        }

        let tables = self
            .client
            .get_tables(input.database.as_deref(), input.schema.as_deref())
            .await?;

        let scope = match (input.database.as_deref(), input.schema.as_deref()) {
            (Some(db), Some(schema)) => format!(" in {db}.{schema}"),
            (Some(db), None) => format!(" in {db}"),
            (None, Some(schema)) => format!(" in {schema}"),
            (None, None) => String::new(),
        };
        Ok(format_listing(&format!("Available Tables{scope}:"), &tables))
    }

    /// Handle the get_columns tool call.
    pub async fn get_columns(&self, input: GetColumnsInput) -> SnowflakeResult<String> {
        if input.table.is_empty() {
            return Ok("Error: Table name is required".to_string());
        }
        validate_identifier(&input.table, "table name")?;
        if let Some(database) = &input.database {
            validate_identifier(database, "database name")?;
        }
        if let Some(schema) = &input.schema {
            validate_identifier(schema, "schema name")?;
        }

        let columns = self
            .client
            .get_columns(
                &input.table,
                input.database.as_deref(),
                input.schema.as_deref(),
            )
            .await?;

        let scope = match (input.database.as_deref(), input.schema.as_deref()) {
            (Some(db), Some(schema)) => format!("{db}.{schema}.{}", input.table),
            _ => input.table.clone(),
        };

        let mut output = format!("Columns in {scope}:\n\n");
        for column in &columns {
            let name = row_name(column);
            let type_name = row_field(column, "type").unwrap_or("Unknown");
            output.push_str(&format!("- {name} ({type_name})\n"));
        }
        Ok(output)
    }

    /// Handle the get_warehouses tool call.
    pub async fn get_warehouses(&self) -> SnowflakeResult<String> {
        let warehouses = self.client.get_warehouses().await?;
        Ok(format_listing("Available Warehouses:", &warehouses))
    }

    /// Handle the get_roles tool call.
    pub async fn get_roles(&self) -> SnowflakeResult<String> {
        let roles = self.client.get_roles().await?;
        Ok(format_listing("Available Roles:", &roles))
    }

    /// Handle the test_connection tool call. Never fails.
    pub async fn test_connection(&self) -> SnowflakeResult<String> {
        if self.client.test_connection().await {
            Ok("Connection test successful!".to_string())
        } else {
            Ok("Connection test failed!".to_string())
        }
    }
}

/// Render a name listing under a header.
fn format_listing(header: &str, rows: &[serde_json::Map<String, JsonValue>]) -> String {
    let mut output = format!("{header}\n\n");
    for row in rows {
        output.push_str(&format!("- {}\n", row_name(row)));
    }
    output
}
