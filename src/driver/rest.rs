//! REST driver for Snowflake.
//!
//! Speaks the account-endpoint REST interface directly: a login request
//! establishes a session token, each statement is a single query request, and
//! logout releases the session. One [`RestConnection`] backs exactly one
//! client operation; there is no pooling or retry here.

use crate::driver::{DriverError, DriverResult, WarehouseConnection, WarehouseDriver};
use crate::models::{ConnectionParams, ParamValue, StatementOutput};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

const LOGIN_PATH: &str = "/session/v1/login-request";
const QUERY_PATH: &str = "/queries/v1/query-request";
const LOGOUT_PATH: &str = "/session/logout-request";

const CLIENT_APP_ID: &str = "snowflake-mcp-server";

/// Session error codes that indicate bad credentials rather than an
/// unreachable or misbehaving endpoint.
const AUTH_FAILURE_CODES: &[&str] = &["390100", "390102", "390103", "390104", "390303"];

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Driver that opens one REST session per connection.
pub struct RestDriver {
    http: reqwest::Client,
}

impl RestDriver {
    /// Create a driver with default timeouts.
    pub fn new() -> DriverResult<Self> {
        Self::with_timeouts(
            Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Create a driver with explicit connect and per-request timeouts.
    pub fn with_timeouts(connect_timeout: Duration, request_timeout: Duration) -> DriverResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| DriverError::Connect(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }
}

#[derive(Debug, Deserialize)]
struct RestResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    data: Option<JsonValue>,
}

impl RestResponse {
    fn message_or(&self, fallback: &str) -> String {
        self.message.clone().unwrap_or_else(|| fallback.to_string())
    }
}

#[async_trait]
impl WarehouseDriver for RestDriver {
    async fn connect(
        &self,
        params: &ConnectionParams,
    ) -> DriverResult<Box<dyn WarehouseConnection>> {
        let base_url = params.base_url();
        let url = format!("{base_url}{LOGIN_PATH}");

        let mut query: Vec<(&str, &str)> = vec![
            ("databaseName", params.database.as_str()),
            ("warehouse", params.warehouse.as_str()),
        ];
        if let Some(schema) = &params.schema {
            query.push(("schemaName", schema.as_str()));
        }
        if let Some(role) = &params.role {
            query.push(("roleName", role.as_str()));
        }

        let body = json!({
            "data": {
                "LOGIN_NAME": params.user,
                "PASSWORD": params.password,
                "ACCOUNT_NAME": params.account,
                "AUTHENTICATOR": params.authenticator,
                "CLIENT_APP_ID": CLIENT_APP_ID,
                "CLIENT_APP_VERSION": env!("CARGO_PKG_VERSION"),
                "SESSION_PARAMETERS": {
                    "CLIENT_SESSION_KEEP_ALIVE": params.client_session_keep_alive,
                },
            }
        });

        debug!(host = %params.host(), user = %params.user, "Opening Snowflake session");

        let response = self
            .http
            .post(&url)
            .query(&query)
            .json(&body)
            .send()
            .await
            .map_err(|e| DriverError::Connect(format!("Login request failed: {e}")))?;

        let status = response.status();
        let login: RestResponse = response
            .json()
            .await
            .map_err(|e| DriverError::Connect(format!("Invalid login response: {e}")))?;

        if !login.success {
            let message = login.message_or("login rejected");
            if is_auth_failure(login.code.as_deref(), &message) {
                return Err(DriverError::Authentication(message));
            }
            return Err(DriverError::Connect(format!(
                "Login rejected (HTTP {status}): {message}"
            )));
        }

        let token = login
            .data
            .as_ref()
            .and_then(|d| d.get("token"))
            .and_then(JsonValue::as_str)
            .ok_or_else(|| {
                DriverError::Connect("Login response did not contain a session token".to_string())
            })?
            .to_string();

        Ok(Box::new(RestConnection {
            http: self.http.clone(),
            base_url,
            token,
        }))
    }
}

/// Session error codes or message fragments that mean "bad credentials".
fn is_auth_failure(code: Option<&str>, message: &str) -> bool {
    if let Some(code) = code {
        if AUTH_FAILURE_CODES.contains(&code) {
            return true;
        }
    }
    let lower = message.to_lowercase();
    lower.contains("authentication failed")
        || lower.contains("invalid credentials")
        || lower.contains("incorrect username or password")
}

/// A live REST session.
pub struct RestConnection {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl RestConnection {
    fn auth_header(&self) -> String {
        format!("Snowflake Token=\"{}\"", self.token)
    }
}

#[async_trait]
impl WarehouseConnection for RestConnection {
    async fn execute(
        &mut self,
        sql: &str,
        params: &BTreeMap<String, ParamValue>,
    ) -> DriverResult<StatementOutput> {
        let request_id = Uuid::new_v4();
        let url = format!("{}{QUERY_PATH}", self.base_url);

        let mut body = json!({
            "sqlText": sql,
            "sequenceId": 1,
        });
        if !params.is_empty() {
            let bindings: serde_json::Map<String, JsonValue> = params
                .iter()
                .map(|(name, value)| {
                    (
                        name.clone(),
                        json!({
                            "type": binding_type(value),
                            "value": value.to_json(),
                        }),
                    )
                })
                .collect();
            body["bindings"] = JsonValue::Object(bindings);
        }

        debug!(%request_id, "Submitting statement");

        let response = self
            .http
            .post(&url)
            .query(&[("requestId", request_id.to_string())])
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(&body)
            .send()
            .await
            .map_err(|e| DriverError::Statement(format!("Query request failed: {e}")))?;

        let result: RestResponse = response
            .json()
            .await
            .map_err(|e| DriverError::Statement(format!("Invalid query response: {e}")))?;

        if !result.success {
            return Err(DriverError::Statement(
                result.message_or("statement rejected"),
            ));
        }

        let data = result.data.unwrap_or(JsonValue::Null);
        Ok(decode_rowset(&data))
    }

    async fn close(self: Box<Self>) {
        let url = format!("{}{LOGOUT_PATH}", self.base_url);
        let outcome = self
            .http
            .post(&url)
            .query(&[("requestId", Uuid::new_v4().to_string())])
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await;
        if let Err(e) = outcome {
            warn!(error = %e, "Error closing Snowflake session");
        }
    }
}

/// Binding type tag for a parameter value.
fn binding_type(value: &ParamValue) -> &'static str {
    match value {
        ParamValue::Null | ParamValue::String(_) => "TEXT",
        ParamValue::Bool(_) => "BOOLEAN",
        ParamValue::Int(_) => "FIXED",
        ParamValue::Float(_) => "REAL",
    }
}

/// Decode the `rowtype`/`rowset` payload into named rows.
fn decode_rowset(data: &JsonValue) -> StatementOutput {
    let columns: Vec<String> = data
        .get("rowtype")
        .and_then(JsonValue::as_array)
        .map(|cols| {
            cols.iter()
                .filter_map(|c| c.get("name").and_then(JsonValue::as_str))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    let rows = data
        .get("rowset")
        .and_then(JsonValue::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(JsonValue::as_array)
                .map(|cells| {
                    columns
                        .iter()
                        .zip(cells.iter())
                        .map(|(name, cell)| (name.clone(), cell.clone()))
                        .collect::<serde_json::Map<String, JsonValue>>()
                })
                .collect()
        })
        .unwrap_or_default();

    StatementOutput { rows, columns }
}
