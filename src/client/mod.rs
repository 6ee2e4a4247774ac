//! Snowflake client.
//!
//! One client instance is constructed at startup with a [`WarehouseDriver`]
//! and validated connection parameters, then shared behind an `Arc`. Every
//! operation opens its own connection, runs a single statement, and closes
//! the connection on all exit paths; there is no pooling, caching, or retry.

pub mod cortex;

pub use cortex::{AnalystOptions, CompleteOptions};

use crate::driver::{DriverError, WarehouseConnection, WarehouseDriver};
use crate::error::{SnowflakeError, SnowflakeResult};
use crate::models::{ConnectionParams, QueryRequest, StatementOutput};
use crate::validate;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error};

/// Client for Snowflake operations, including the Cortex AI services.
pub struct SnowflakeClient {
    driver: Arc<dyn WarehouseDriver>,
    params: ConnectionParams,
}

impl std::fmt::Debug for SnowflakeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnowflakeClient").finish_non_exhaustive()
    }
}

impl SnowflakeClient {
    /// Create a client over the given driver.
    ///
    /// Connection parameters are validated here; an invalid set is a
    /// configuration error and the client is never constructed.
    pub fn new(
        driver: Arc<dyn WarehouseDriver>,
        params: ConnectionParams,
    ) -> SnowflakeResult<Self> {
        validate::validate_connection_params(&params).map_err(|e| {
            SnowflakeError::configuration(format!("Invalid connection configuration: {e}"))
        })?;
        Ok(Self { driver, params })
    }

    /// The connection parameters this client was constructed with.
    pub fn connection_params(&self) -> &ConnectionParams {
        &self.params
    }

    /// Open a connection, mapping driver failures onto the error taxonomy.
    async fn open_connection(&self) -> SnowflakeResult<Box<dyn WarehouseConnection>> {
        self.driver.connect(&self.params).await.map_err(|e| match e {
            DriverError::Authentication(message) => {
                error!(error = %message, "Snowflake authentication error");
                SnowflakeError::authentication(message)
            }
            DriverError::Connect(message) | DriverError::Statement(message) => {
                error!(error = %message, "Snowflake connection error");
                SnowflakeError::connection(message)
            }
        })
    }

    /// Run a single statement on a fresh connection.
    ///
    /// The connection is closed on every exit path, including statement
    /// failure.
    async fn run_statement(
        &self,
        sql: &str,
        params: &BTreeMap<String, crate::models::ParamValue>,
    ) -> SnowflakeResult<StatementOutput> {
        let mut conn = self.open_connection().await?;
        let result = conn.execute(sql, params).await;
        conn.close().await;

        result.map_err(|e| {
            error!(error = %e, "Query execution failed");
            SnowflakeError::query(e.to_string())
        })
    }

    /// Execute a SQL query and return rows plus column names.
    ///
    /// Validators run first: the query text is checked against the dangerous
    /// keyword/pattern rules, and parameter names must be valid identifiers.
    /// Validation failures surface as query errors.
    pub async fn execute_query(&self, request: &QueryRequest) -> SnowflakeResult<StatementOutput> {
        let validated = validate::validate_query(&request.sql, request.allow_ddl).and_then(|()| {
            for key in request.params.keys() {
                validate::validate_identifier(key, "parameter name")?;
            }
            Ok(())
        });
        validated.map_err(|e| SnowflakeError::query(format!("Query validation failed: {e}")))?;

        debug!(param_count = request.params.len(), "Executing query");
        self.run_statement(&request.sql, &request.params).await
    }

    // =========================================================================
    // Metadata operations.
    //
    // These interpolate database/schema/table names into SHOW/DESCRIBE text
    // without re-validating them here; callers must pass trusted or
    // already-validated names (the tool layer validates its arguments).
    // =========================================================================

    /// List available databases.
    pub async fn get_databases(&self) -> SnowflakeResult<Vec<serde_json::Map<String, JsonValue>>> {
        let output = self.execute_query(&QueryRequest::new("SHOW DATABASES")).await?;
        Ok(output.rows)
    }

    /// List schemas, optionally scoped to a database.
    pub async fn get_schemas(
        &self,
        database: Option<&str>,
    ) -> SnowflakeResult<Vec<serde_json::Map<String, JsonValue>>> {
        let sql = match database {
            Some(database) => format!("SHOW SCHEMAS IN DATABASE {database}"),
            None => "SHOW SCHEMAS".to_string(),
        };
        let output = self.execute_query(&QueryRequest::new(sql)).await?;
        Ok(output.rows)
    }

    /// List tables, optionally scoped to a database and schema.
    pub async fn get_tables(
        &self,
        database: Option<&str>,
        schema: Option<&str>,
    ) -> SnowflakeResult<Vec<serde_json::Map<String, JsonValue>>> {
        let sql = match (database, schema) {
            (Some(database), Some(schema)) => format!("SHOW TABLES IN {database}.{schema}"),
            (Some(database), None) => format!("SHOW TABLES IN DATABASE {database}"),
            _ => "SHOW TABLES".to_string(),
        };
        let output = self.execute_query(&QueryRequest::new(sql)).await?;
        Ok(output.rows)
    }

    /// Describe the columns of a table.
    pub async fn get_columns(
        &self,
        table: &str,
        database: Option<&str>,
        schema: Option<&str>,
    ) -> SnowflakeResult<Vec<serde_json::Map<String, JsonValue>>> {
        let sql = match (database, schema) {
            (Some(database), Some(schema)) => {
                format!("DESCRIBE TABLE {database}.{schema}.{table}")
            }
            (Some(database), None) => format!("DESCRIBE TABLE {database}..{table}"),
            _ => format!("DESCRIBE TABLE {table}"),
        };
        let output = self.execute_query(&QueryRequest::new(sql)).await?;
        Ok(output.rows)
    }

    /// List available warehouses.
    pub async fn get_warehouses(&self) -> SnowflakeResult<Vec<serde_json::Map<String, JsonValue>>> {
        let output = self.execute_query(&QueryRequest::new("SHOW WAREHOUSES")).await?;
        Ok(output.rows)
    }

    /// List available roles.
    pub async fn get_roles(&self) -> SnowflakeResult<Vec<serde_json::Map<String, JsonValue>>> {
        let output = self.execute_query(&QueryRequest::new("SHOW ROLES")).await?;
        Ok(output.rows)
    }

    /// Probe the connection with `SELECT 1`.
    ///
    /// Returns true iff the probe yields the scalar 1; every failure mode
    /// logs and returns false, never an error.
    pub async fn test_connection(&self) -> bool {
        match self.run_statement("SELECT 1", &BTreeMap::new()).await {
            Ok(output) => match output.rows.first().and_then(|row| row.values().next()) {
                Some(JsonValue::Number(n)) => n.as_i64() == Some(1),
                // REST result sets encode cells as strings
                Some(JsonValue::String(s)) => s == "1",
                _ => false,
            },
            Err(e) => {
                error!(error = %e, "Connection test failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::DriverResult;
    use crate::models::ParamValue;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Driver returning canned outputs and recording executed SQL.
    struct ScriptedDriver {
        outputs: Mutex<Vec<DriverResult<StatementOutput>>>,
        executed: Arc<Mutex<Vec<String>>>,
        connect_error: Option<fn() -> DriverError>,
    }

    struct ScriptedConnection {
        outputs: Vec<DriverResult<StatementOutput>>,
        executed: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl WarehouseDriver for ScriptedDriver {
        async fn connect(
            &self,
            _params: &ConnectionParams,
        ) -> DriverResult<Box<dyn WarehouseConnection>> {
            if let Some(make_error) = self.connect_error {
                return Err(make_error());
            }
            let outputs = std::mem::take(&mut *self.outputs.lock().unwrap());
            Ok(Box::new(ScriptedConnection {
                outputs,
                executed: self.executed.clone(),
            }))
        }
    }

    #[async_trait]
    impl WarehouseConnection for ScriptedConnection {
        async fn execute(
            &mut self,
            sql: &str,
            _params: &BTreeMap<String, ParamValue>,
        ) -> DriverResult<StatementOutput> {
            self.executed.lock().unwrap().push(sql.to_string());
            if self.outputs.is_empty() {
                Ok(StatementOutput::default())
            } else {
                self.outputs.remove(0)
            }
        }

        async fn close(self: Box<Self>) {}
    }

    fn params() -> ConnectionParams {
        ConnectionParams {
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
        }
    }

    fn scalar_output(value: JsonValue) -> StatementOutput {
        let mut row = serde_json::Map::new();
        row.insert("1".to_string(), value);
        StatementOutput {
            rows: vec![row],
            columns: vec!["1".to_string()],
        }
    }

    fn client_with(
        outputs: Vec<DriverResult<StatementOutput>>,
    ) -> (SnowflakeClient, Arc<Mutex<Vec<String>>>) {
        let executed = Arc::new(Mutex::new(Vec::new()));
        let driver = Arc::new(ScriptedDriver {
            outputs: Mutex::new(outputs),
            executed: executed.clone(),
            connect_error: None,
        });
        (SnowflakeClient::new(driver, params()).unwrap(), executed)
    }

    #[test]
    fn test_new_rejects_invalid_params() {
        let driver = Arc::new(ScriptedDriver {
            outputs: Mutex::new(Vec::new()),
            executed: Arc::new(Mutex::new(Vec::new())),
            connect_error: None,
        });
        let mut bad = params();
        bad.password.clear();
        let err = SnowflakeClient::new(driver, bad).unwrap_err();
        assert!(matches!(err, SnowflakeError::Configuration { .. }));
        assert!(err.to_string().contains("Invalid connection configuration"));
    }

    #[tokio::test]
    async fn test_execute_query_validation_failure_wraps_as_query_error() {
        let (client, executed) = client_with(vec![]);
        let err = client
            .execute_query(&QueryRequest::new("DROP TABLE users"))
            .await
            .unwrap_err();
        assert!(matches!(err, SnowflakeError::Query { .. }));
        assert!(err.to_string().contains("Query validation failed"));
        // Warehouse never touched
        assert!(executed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_metadata_sql_shapes() {
        let (client, executed) = client_with(vec![]);
        client.get_databases().await.unwrap();
        client.get_schemas(Some("DB1")).await.unwrap();
        client.get_tables(Some("DB1"), Some("S1")).await.unwrap();
        client.get_tables(Some("DB1"), None).await.unwrap();
        client.get_columns("T1", Some("DB1"), None).await.unwrap();
        client.get_warehouses().await.unwrap();
        client.get_roles().await.unwrap();

        let sql = executed.lock().unwrap().clone();
        assert_eq!(
            sql,
            vec![
                "SHOW DATABASES",
                "SHOW SCHEMAS IN DATABASE DB1",
                "SHOW TABLES IN DB1.S1",
                "SHOW TABLES IN DATABASE DB1",
                "DESCRIBE TABLE DB1..T1",
                "SHOW WAREHOUSES",
                "SHOW ROLES",
            ]
        );
    }

    #[tokio::test]
    async fn test_test_connection_scalar_one() {
        let (client, _) = client_with(vec![Ok(scalar_output(json!(1)))]);
        assert!(client.test_connection().await);
    }

    #[tokio::test]
    async fn test_test_connection_string_one() {
        let (client, _) = client_with(vec![Ok(scalar_output(json!("1")))]);
        assert!(client.test_connection().await);
    }

    #[tokio::test]
    async fn test_test_connection_wrong_scalar() {
        let (client, _) = client_with(vec![Ok(scalar_output(json!(0)))]);
        assert!(!client.test_connection().await);
    }

    #[tokio::test]
    async fn test_test_connection_error_returns_false() {
        let (client, _) = client_with(vec![Err(DriverError::Statement("boom".to_string()))]);
        assert!(!client.test_connection().await);
    }

    #[tokio::test]
    async fn test_auth_failure_maps_to_authentication_error() {
        let driver = Arc::new(ScriptedDriver {
            outputs: Mutex::new(Vec::new()),
            executed: Arc::new(Mutex::new(Vec::new())),
            connect_error: Some(|| DriverError::Authentication("bad password".to_string())),
        });
        let client = SnowflakeClient::new(driver, params()).unwrap();
        let err = client.get_databases().await.unwrap_err();
        assert!(matches!(err, SnowflakeError::Authentication { .. }));
    }

    #[tokio::test]
    async fn test_connect_failure_maps_to_connection_error() {
        let driver = Arc::new(ScriptedDriver {
            outputs: Mutex::new(Vec::new()),
            executed: Arc::new(Mutex::new(Vec::new())),
            connect_error: Some(|| DriverError::Connect("timed out".to_string())),
        });
        let client = SnowflakeClient::new(driver, params()).unwrap();
        let err = client.get_databases().await.unwrap_err();
        assert!(matches!(err, SnowflakeError::Connection { .. }));
    }
}
