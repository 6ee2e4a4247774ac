//! Shared test fixtures: a scriptable warehouse driver and client builders.

// Not every test binary uses every helper.
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use snowflake_mcp_server::client::SnowflakeClient;
use snowflake_mcp_server::driver::{
    DriverError, DriverResult, WarehouseConnection, WarehouseDriver,
};
use snowflake_mcp_server::models::{ConnectionParams, ParamValue, StatementOutput};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// A driver whose connections answer from a scripted queue of results and
/// record every executed statement.
#[derive(Default)]
pub struct MockDriver {
    results: Mutex<Vec<DriverResult<StatementOutput>>>,
    executed: Arc<Mutex<Vec<String>>>,
    fail_connect: Mutex<Option<DriverError>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next statement result.
    pub fn push_result(&self, result: DriverResult<StatementOutput>) {
        self.results.lock().unwrap().push(result);
    }

    /// Queue a rowset built from (column, value) rows.
    pub fn push_rows(&self, columns: &[&str], rows: &[&[JsonValue]]) {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .iter()
            .map(|cells| {
                columns
                    .iter()
                    .cloned()
                    .zip(cells.iter().cloned())
                    .collect::<serde_json::Map<String, JsonValue>>()
            })
            .collect();
        self.push_result(Ok(StatementOutput { rows, columns }));
    }

    /// Make the next connect attempt fail.
    pub fn fail_next_connect(&self, error: DriverError) {
        *self.fail_connect.lock().unwrap() = Some(error);
    }

    /// Statements executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

pub struct MockConnection {
    results: Vec<DriverResult<StatementOutput>>,
    executed: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl WarehouseDriver for MockDriver {
    async fn connect(
        &self,
        _params: &ConnectionParams,
    ) -> DriverResult<Box<dyn WarehouseConnection>> {
        if let Some(error) = self.fail_connect.lock().unwrap().take() {
            return Err(error);
        }
        let results = std::mem::take(&mut *self.results.lock().unwrap());
        Ok(Box::new(MockConnection {
            results,
            executed: self.executed.clone(),
        }))
    }
}

#[async_trait]
impl WarehouseConnection for MockConnection {
    async fn execute(
        &mut self,
        sql: &str,
        _params: &BTreeMap<String, ParamValue>,
    ) -> DriverResult<StatementOutput> {
        self.executed.lock().unwrap().push(sql.to_string());
        if self.results.is_empty() {
            Ok(StatementOutput::default())
        } else {
            self.results.remove(0)
        }
    }

    async fn close(self: Box<Self>) {}
}

/// Connection parameters that pass validation.
pub fn test_params() -> ConnectionParams {
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

/// Build a client over a fresh mock driver.
pub fn test_client() -> (Arc<SnowflakeClient>, Arc<MockDriver>) {
    let driver = Arc::new(MockDriver::new());
    let client = Arc::new(SnowflakeClient::new(driver.clone(), test_params()).unwrap());
    (client, driver)
}
