//! MCP service implementation using rmcp.
//!
//! This module defines the SnowflakeService struct with all warehouse and
//! Cortex tools exposed via the MCP protocol using the rmcp framework's
//! macros, plus the `warehouse://` resource catalog.
//!
//! Every tool handler returns `Result<String, SnowflakeError>`; errors are
//! converted here into prefixed text results and never reach the transport
//! as protocol failures.

use crate::client::SnowflakeClient;
use crate::error::SnowflakeResult;
use crate::mcp::resources::{RESOURCE_CATALOG, ResourceReader};
use crate::registry::ServiceRegistry;
use crate::tools::cortex::{
    CortexAnalystInput, CortexCompleteInput, CortexSearchInput, CortexToolHandler,
    ListCortexServicesInput,
};
use crate::tools::metadata::{
    GetColumnsInput, GetSchemasInput, GetTablesInput, MetadataToolHandler,
};
use crate::tools::query::{ExecuteQueryInput, QueryToolHandler};
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{
        AnnotateAble, CallToolResult, Content, Implementation, ListResourcesResult,
        PaginatedRequestParam, ProtocolVersion, RawResource, ReadResourceRequestParam,
        ReadResourceResult, ResourceContents, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use std::sync::Arc;
use tracing::error;

#[derive(Clone)]
pub struct SnowflakeService {
    /// Shared warehouse client for all operations
    client: Arc<SnowflakeClient>,
    /// Shared Cortex service registry
    registry: Arc<ServiceRegistry>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl SnowflakeService {
    /// Create a new SnowflakeService instance.
    ///
    /// # Arguments
    ///
    /// * `client` - Shared warehouse client
    /// * `registry` - Shared Cortex service registry
    pub fn new(client: Arc<SnowflakeClient>, registry: Arc<ServiceRegistry>) -> Self {
        Self {
            client,
            registry,
            tool_router: Self::tool_router(),
        }
    }

    fn query_handler(&self) -> QueryToolHandler {
        QueryToolHandler::new(self.client.clone())
    }

    fn metadata_handler(&self) -> MetadataToolHandler {
        MetadataToolHandler::new(self.client.clone())
    }

    fn cortex_handler(&self) -> CortexToolHandler {
        CortexToolHandler::new(self.client.clone(), self.registry.clone())
    }

    /// Convert a handler outcome into a tool result.
    ///
    /// Errors become `CallToolResult::error` with a prefixed message; the
    /// protocol-level result is always Ok.
    fn text_result(result: SnowflakeResult<String>) -> Result<CallToolResult, McpError> {
        Ok(match result {
            Ok(text) => CallToolResult::success(vec![Content::text(text)]),
            Err(err) => {
                error!(error = %err, kind = err.prefix(), "Tool call failed");
                CallToolResult::error(vec![Content::text(err.display_message())])
            }
        })
    }
}

#[tool_router]
impl SnowflakeService {
    #[tool(description = "Execute a SQL query on Snowflake database")]
    async fn execute_query(
        &self,
        Parameters(input): Parameters<ExecuteQueryInput>,
    ) -> Result<CallToolResult, McpError> {
        Self::text_result(self.query_handler().execute_query(input).await)
    }

    #[tool(description = "Get list of available databases")]
    async fn get_databases(&self) -> Result<CallToolResult, McpError> {
        Self::text_result(self.metadata_handler().get_databases().await)
    }

    #[tool(description = "Get list of schemas in a database")]
    async fn get_schemas(
        &self,
        Parameters(input): Parameters<GetSchemasInput>,
    ) -> Result<CallToolResult, McpError> {
        Self::text_result(self.metadata_handler().get_schemas(input).await)
    }

    #[tool(description = "Get list of tables in a database/schema")]
    async fn get_tables(
        &self,
        Parameters(input): Parameters<GetTablesInput>,
    ) -> Result<CallToolResult, McpError> {
        Self::text_result(self.metadata_handler().get_tables(input).await)
    }

    #[tool(description = "Get column information for a table")]
    async fn get_columns(
        &self,
        Parameters(input): Parameters<GetColumnsInput>,
    ) -> Result<CallToolResult, McpError> {
        Self::text_result(self.metadata_handler().get_columns(input).await)
    }

    #[tool(description = "Get list of available warehouses")]
    async fn get_warehouses(&self) -> Result<CallToolResult, McpError> {
        Self::text_result(self.metadata_handler().get_warehouses().await)
    }

    #[tool(description = "Get list of available roles")]
    async fn get_roles(&self) -> Result<CallToolResult, McpError> {
        Self::text_result(self.metadata_handler().get_roles().await)
    }

    #[tool(description = "Test the Snowflake database connection")]
    async fn test_connection(&self) -> Result<CallToolResult, McpError> {
        Self::text_result(self.metadata_handler().test_connection().await)
    }

    #[tool(
        description = "Use Cortex Complete for chat completion with large language models"
    )]
    async fn cortex_complete(
        &self,
        Parameters(input): Parameters<CortexCompleteInput>,
    ) -> Result<CallToolResult, McpError> {
        Self::text_result(self.cortex_handler().cortex_complete(input).await)
    }

    #[tool(description = "Use Cortex Search Service for semantic search over text data")]
    async fn cortex_search(
        &self,
        Parameters(input): Parameters<CortexSearchInput>,
    ) -> Result<CallToolResult, McpError> {
        Self::text_result(self.cortex_handler().cortex_search(input).await)
    }

    #[tool(
        description = "Use Cortex Analyst for natural language querying over structured data"
    )]
    async fn cortex_analyst(
        &self,
        Parameters(input): Parameters<CortexAnalystInput>,
    ) -> Result<CallToolResult, McpError> {
        Self::text_result(self.cortex_handler().cortex_analyst(input).await)
    }

    #[tool(description = "List available Cortex services (Search and Analyst)")]
    async fn list_cortex_services(
        &self,
        Parameters(input): Parameters<ListCortexServicesInput>,
    ) -> Result<CallToolResult, McpError> {
        Self::text_result(self.cortex_handler().list_cortex_services(input).await)
    }
}

#[tool_handler]
impl ServerHandler for SnowflakeService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "snowflake-mcp-server".to_owned(),
                title: Some("Snowflake MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                ..Implementation::from_build_env()
            },
            instructions: Some(
                "Snowflake tools for querying warehouse data and Cortex AI services.\n\
                \n\
                ## Workflow\n\
                1. Use `get_databases`, `get_schemas`, `get_tables`, and `get_columns` to explore the warehouse\n\
                2. Use `execute_query` to run SELECT queries (mutating statements are blocked)\n\
                3. Use `cortex_complete` for text completion, `cortex_search` for semantic search,\n\
                   and `cortex_analyst` for natural-language questions over structured data\n\
                4. Call `list_cortex_services` to see which search/analyst services are configured\n\
                \n\
                ## Resources\n\
                Read-only JSON snapshots are available under `warehouse://` URIs\n\
                (databases, schemas, tables, warehouses, roles, and the Cortex registry).\n\
                \n\
                ## Errors\n\
                Failures are returned as prefixed text (e.g. \"Query Error: ...\"); use\n\
                `test_connection` to check connectivity when calls fail."
                    .to_string(),
            ),
        }
    }

    fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        async move {
            let resources = RESOURCE_CATALOG
                .iter()
                .map(|(uri, name, description)| {
                    RawResource {
                        uri: (*uri).to_string(),
                        name: (*name).to_string(),
                        title: Some((*name).to_string()),
                        description: Some((*description).to_string()),
                        mime_type: Some("application/json".to_string()),
                        size: None,
                        icons: None,
                        meta: None,
                    }
                    .no_annotation()
                })
                .collect();

            Ok(ListResourcesResult {
                meta: None,
                resources,
                next_cursor: None,
            })
        }
    }

    fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        async move {
            let reader = ResourceReader::new(self.client.clone(), self.registry.clone());
            match reader.read(&request.uri).await {
                Some(text) => Ok(ReadResourceResult {
                    contents: vec![ResourceContents::TextResourceContents {
                        uri: request.uri.clone(),
                        mime_type: Some("application/json".to_string()),
                        text,
                        meta: None,
                    }],
                }),
                None => Err(McpError::resource_not_found(
                    format!("Unknown resource URI: {}", request.uri),
                    None,
                )),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverResult, WarehouseConnection, WarehouseDriver};
    use crate::models::{ConnectionParams, ParamValue, StatementOutput};
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    struct NullDriver;

    struct NullConnection;

    #[async_trait]
    impl WarehouseDriver for NullDriver {
        async fn connect(
            &self,
            _params: &ConnectionParams,
        ) -> DriverResult<Box<dyn WarehouseConnection>> {
            Ok(Box::new(NullConnection))
        }
    }

    #[async_trait]
    impl WarehouseConnection for NullConnection {
        async fn execute(
            &mut self,
            _sql: &str,
            _params: &BTreeMap<String, ParamValue>,
        ) -> DriverResult<StatementOutput> {
            Ok(StatementOutput::default())
        }

        async fn close(self: Box<Self>) {}
    }

    fn create_test_service() -> SnowflakeService {
        let params = ConnectionParams {
            user: "analyst".to_string(),
            password: "secret".to_string(),
            account: "acme".to_string(),
            database: "ANALYTICS".to_string(),
            warehouse: "COMPUTE_WH".to_string(),
            schema: None,
            role: None,
            region: None,
            authenticator: "snowflake".to_string(),
            client_session_keep_alive: true,
        };
        let client = Arc::new(SnowflakeClient::new(Arc::new(NullDriver), params).unwrap());
        let registry = Arc::new(ServiceRegistry::empty());
        SnowflakeService::new(client, registry)
    }

    #[test]
    fn test_service_creation() {
        let _service = create_test_service();
    }

    #[test]
    fn test_server_info() {
        let service = create_test_service();
        let info = service.get_info();
        assert!(!info.server_info.name.is_empty());
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_some());
    }

    #[test]
    fn test_text_result_success() {
        let result = SnowflakeService::text_result(Ok("all good".to_string())).unwrap();
        assert_ne!(result.is_error, Some(true));
    }

    #[test]
    fn test_text_result_error_is_prefixed_text() {
        let err = crate::error::SnowflakeError::validation("Query cannot be empty");
        let result = SnowflakeService::text_result(Err(err)).unwrap();
        assert_eq!(result.is_error, Some(true));
    }
}
