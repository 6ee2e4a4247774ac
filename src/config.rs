//! Configuration handling for the Snowflake MCP Server.
//!
//! This module provides configuration management via CLI arguments and
//! environment variables. Credentials come from the standard `SNOWFLAKE_*`
//! variables; transport and logging options mirror the CLI flags.

use crate::models::ConnectionParams;
use crate::models::connection::DEFAULT_AUTHENTICATOR;
use crate::registry::DEFAULT_SERVICE_CONFIG_PATH;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_MCP_ENDPOINT: &str = "/";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Transport mode for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    /// Standard input/output (for CLI integration)
    #[default]
    Stdio,
    /// HTTP with streaming responses (for web clients)
    Http,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Configuration for the Snowflake MCP Server.
#[derive(Clone, Parser)]
#[command(
    name = "snowflake-mcp-server",
    about = "MCP server for Snowflake - query warehouse metadata, run SQL, and call Cortex AI services",
    version,
    author
)]
pub struct Config {
    /// Snowflake user name
    #[arg(long, env = "SNOWFLAKE_USER")]
    pub user: Option<String>,

    /// Snowflake password (sensitive - only via environment in production)
    #[arg(long, env = "SNOWFLAKE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Snowflake account identifier
    #[arg(long, env = "SNOWFLAKE_ACCOUNT")]
    pub account: Option<String>,

    /// Default database
    #[arg(long, env = "SNOWFLAKE_DATABASE")]
    pub database: Option<String>,

    /// Default warehouse
    #[arg(long, env = "SNOWFLAKE_WAREHOUSE")]
    pub warehouse: Option<String>,

    /// Default schema (optional)
    #[arg(long, env = "SNOWFLAKE_SCHEMA")]
    pub schema: Option<String>,

    /// Role to assume (optional)
    #[arg(long, env = "SNOWFLAKE_ROLE")]
    pub role: Option<String>,

    /// Deployment region (optional, folded into the account hostname)
    #[arg(long, env = "SNOWFLAKE_REGION")]
    pub region: Option<String>,

    /// Authenticator (default: password authentication)
    #[arg(long, env = "SNOWFLAKE_AUTHENTICATOR", default_value = DEFAULT_AUTHENTICATOR)]
    pub authenticator: String,

    /// Keep the warehouse session alive between statements
    #[arg(
        long,
        env = "SNOWFLAKE_CLIENT_SESSION_KEEP_ALIVE",
        default_value_t = true
    )]
    pub client_session_keep_alive: bool,

    /// Path to the Cortex service registry file
    #[arg(
        long,
        env = "SNOWFLAKE_SERVICE_CONFIG",
        default_value = DEFAULT_SERVICE_CONFIG_PATH
    )]
    pub service_config: PathBuf,

    /// Transport mode (stdio or http)
    #[arg(
        short,
        long,
        value_enum,
        default_value = "stdio",
        env = "MCP_TRANSPORT"
    )]
    pub transport: TransportMode,

    /// HTTP host to bind to (only used with http transport)
    #[arg(
        long,
        default_value = DEFAULT_HTTP_HOST,
        env = "MCP_HTTP_HOST"
    )]
    pub http_host: String,

    /// HTTP port to bind to (only used with http transport)
    #[arg(
        long,
        default_value_t = DEFAULT_HTTP_PORT,
        env = "MCP_HTTP_PORT"
    )]
    pub http_port: u16,

    /// MCP endpoint path (only used with http transport)
    #[arg(
        long,
        default_value = DEFAULT_MCP_ENDPOINT,
        env = "MCP_ENDPOINT"
    )]
    pub mcp_endpoint: String,

    /// Connection timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        env = "MCP_CONNECT_TIMEOUT"
    )]
    pub connect_timeout: u64,

    /// Per-statement request timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS,
        env = "MCP_REQUEST_TIMEOUT"
    )]
    pub request_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,

    /// Enable logging output (disabled by default to avoid interfering with stdio transport)
    #[arg(long, env = "MCP_ENABLE_LOGS")]
    pub enable_logs: bool,

    /// Authentication tokens for HTTP transport.
    /// Can be specified multiple times or as comma-separated values.
    /// When set, all HTTP requests must include a valid Bearer token.
    #[arg(
        long = "auth-token",
        value_name = "TOKEN",
        env = "MCP_AUTH_TOKENS",
        value_delimiter = ','
    )]
    pub auth_tokens: Vec<String>,
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            user: None,
            password: None,
            account: None,
            database: None,
            warehouse: None,
            schema: None,
            role: None,
            region: None,
            authenticator: DEFAULT_AUTHENTICATOR.to_string(),
            client_session_keep_alive: true,
            service_config: PathBuf::from(DEFAULT_SERVICE_CONFIG_PATH),
            transport: TransportMode::Stdio,
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            mcp_endpoint: DEFAULT_MCP_ENDPOINT.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: "info".to_string(),
            json_logs: false,
            enable_logs: false,
            auth_tokens: Vec::new(),
        }
    }

    /// Assemble connection parameters from the configured credential fields.
    ///
    /// Missing required fields become empty strings here and are rejected by
    /// connection-parameter validation when the client is constructed.
    pub fn connection_params(&self) -> ConnectionParams {
        ConnectionParams {
            user: self.user.clone().unwrap_or_default(),
            password: self.password.clone().unwrap_or_default(),
            account: self.account.clone().unwrap_or_default(),
            database: self.database.clone().unwrap_or_default(),
            warehouse: self.warehouse.clone().unwrap_or_default(),
            schema: self.schema.clone(),
            role: self.role.clone(),
            region: self.region.clone(),
            authenticator: self.authenticator.clone(),
            client_session_keep_alive: self.client_session_keep_alive,
        }
    }

    /// Get the HTTP bind address.
    pub fn http_bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Get the connection timeout as a Duration.
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    /// Get the request timeout as a Duration.
    pub fn request_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

/// Debug prints everything except the password.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("account", &self.account)
            .field("database", &self.database)
            .field("warehouse", &self.warehouse)
            .field("schema", &self.schema)
            .field("role", &self.role)
            .field("region", &self.region)
            .field("authenticator", &self.authenticator)
            .field("service_config", &self.service_config)
            .field("transport", &self.transport)
            .field("http_host", &self.http_host)
            .field("http_port", &self.http_port)
            .field("mcp_endpoint", &self.mcp_endpoint)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.transport, TransportMode::Stdio);
        assert_eq!(config.http_host, DEFAULT_HTTP_HOST);
        assert_eq!(config.http_port, DEFAULT_HTTP_PORT);
        assert_eq!(config.authenticator, DEFAULT_AUTHENTICATOR);
        assert!(config.client_session_keep_alive);
    }

    #[test]
    fn test_http_bind_addr() {
        let config = Config {
            http_host: "0.0.0.0".to_string(),
            http_port: 3000,
            ..Config::default()
        };
        assert_eq!(config.http_bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_timeout_durations() {
        let config = Config {
            connect_timeout: 15,
            request_timeout: 120,
            ..Config::default()
        };
        assert_eq!(config.connect_timeout_duration(), Duration::from_secs(15));
        assert_eq!(config.request_timeout_duration(), Duration::from_secs(120));
    }

    #[test]
    fn test_connection_params_missing_fields_are_empty() {
        let params = Config::default().connection_params();
        assert!(params.user.is_empty());
        assert!(params.password.is_empty());
        assert_eq!(params.authenticator, DEFAULT_AUTHENTICATOR);
    }

    #[test]
    fn test_connection_params_assembly() {
        let config = Config {
            user: Some("analyst".to_string()),
            password: Some("secret".to_string()),
            account: Some("acme".to_string()),
            database: Some("ANALYTICS".to_string()),
            warehouse: Some("COMPUTE_WH".to_string()),
            schema: Some("PUBLIC".to_string()),
            region: Some("eu-west-1".to_string()),
            ..Config::default()
        };
        let params = config.connection_params();
        assert_eq!(params.user, "analyst");
        assert_eq!(params.schema.as_deref(), Some("PUBLIC"));
        assert_eq!(params.host(), "acme.eu-west-1.snowflakecomputing.com");
    }

    #[test]
    fn test_debug_masks_password() {
        let config = Config {
            password: Some("hunter2".to_string()),
            ..Config::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_transport_mode_display() {
        assert_eq!(TransportMode::Stdio.to_string(), "stdio");
        assert_eq!(TransportMode::Http.to_string(), "http");
    }
}
