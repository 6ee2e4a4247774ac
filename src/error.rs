//! Error types for the Snowflake MCP Server.
//!
//! This module defines all error types using `thiserror` for ergonomic error
//! handling. The taxonomy mirrors the failure surfaces of the system:
//! connection/authentication failures, query execution failures, configuration
//! problems, input validation, and the Cortex AI service error kinds.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnowflakeError {
    #[error("Failed to connect to Snowflake: {message}")]
    Connection { message: String },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Query execution failed: {message}")]
    Query { message: String },

    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("Cortex Complete failed: {message}")]
    CortexComplete { message: String },

    #[error("Cortex Search failed: {message}")]
    CortexSearch { message: String },

    #[error("Cortex Analyst failed: {message}")]
    CortexAnalyst { message: String },

    #[error("{message}")]
    ServiceNotFound { message: String },

    #[error("{message}")]
    ModelNotSupported { message: String },
}

impl SnowflakeError {
    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create a query error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a Cortex Complete error.
    pub fn cortex_complete(message: impl Into<String>) -> Self {
        Self::CortexComplete {
            message: message.into(),
        }
    }

    /// Create a Cortex Search error.
    pub fn cortex_search(message: impl Into<String>) -> Self {
        Self::CortexSearch {
            message: message.into(),
        }
    }

    /// Create a Cortex Analyst error.
    pub fn cortex_analyst(message: impl Into<String>) -> Self {
        Self::CortexAnalyst {
            message: message.into(),
        }
    }

    /// Create a service-not-found error.
    pub fn service_not_found(message: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            message: message.into(),
        }
    }

    /// Create a model-not-supported error.
    pub fn model_not_supported(message: impl Into<String>) -> Self {
        Self::ModelNotSupported {
            message: message.into(),
        }
    }

    /// Display prefix used when converting an error into tool output text.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "Connection Error",
            Self::Authentication { .. } => "Authentication Error",
            Self::Query { .. } => "Query Error",
            Self::Configuration { .. } => "Configuration Error",
            Self::Validation { .. } => "Validation Error",
            Self::CortexComplete { .. } => "Cortex Complete Error",
            Self::CortexSearch { .. } => "Cortex Search Error",
            Self::CortexAnalyst { .. } => "Cortex Analyst Error",
            Self::ServiceNotFound { .. } => "Cortex Service Not Found",
            Self::ModelNotSupported { .. } => "Cortex Model Not Supported",
        }
    }

    /// Format this error as the prefixed text returned to the MCP caller.
    ///
    /// Tool handlers never propagate errors to the transport layer; every
    /// error kind becomes a human-readable text result with a stable prefix.
    pub fn display_message(&self) -> String {
        format!("{}: {}", self.prefix(), self)
    }
}

/// Result type alias for Snowflake operations.
pub type SnowflakeResult<T> = Result<T, SnowflakeError>;

/// Convert SnowflakeError to MCP ErrorData for the resource read path, where
/// protocol-level errors are appropriate (unknown URI, serialization failure).
impl From<SnowflakeError> for rmcp::ErrorData {
    fn from(err: SnowflakeError) -> Self {
        match &err {
            SnowflakeError::Validation { .. }
            | SnowflakeError::ModelNotSupported { .. }
            | SnowflakeError::Configuration { .. } => {
                rmcp::ErrorData::invalid_params(err.to_string(), None)
            }
            SnowflakeError::ServiceNotFound { .. } => {
                rmcp::ErrorData::resource_not_found(err.to_string(), None)
            }
            SnowflakeError::Connection { .. }
            | SnowflakeError::Authentication { .. }
            | SnowflakeError::Query { .. }
            | SnowflakeError::CortexComplete { .. }
            | SnowflakeError::CortexSearch { .. }
            | SnowflakeError::CortexAnalyst { .. } => {
                rmcp::ErrorData::internal_error(err.to_string(), None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SnowflakeError::connection("network unreachable");
        assert!(err.to_string().contains("Failed to connect to Snowflake"));
        assert!(err.to_string().contains("network unreachable"));
    }

    #[test]
    fn test_validation_display_has_no_builtin_prefix() {
        // The prefix is added by display_message, not the Display impl,
        // so validation messages can be embedded in other error texts.
        let err = SnowflakeError::validation("Query cannot be empty");
        assert_eq!(err.to_string(), "Query cannot be empty");
        assert_eq!(
            err.display_message(),
            "Validation Error: Query cannot be empty"
        );
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(
            SnowflakeError::query("x").display_message(),
            "Query Error: Query execution failed: x"
        );
        assert_eq!(
            SnowflakeError::service_not_found("Search service 'a' not found in configuration")
                .prefix(),
            "Cortex Service Not Found"
        );
        assert_eq!(
            SnowflakeError::model_not_supported("m").prefix(),
            "Cortex Model Not Supported"
        );
    }

    #[test]
    fn test_validation_maps_to_invalid_params() {
        let err = SnowflakeError::validation("bad input");
        let mcp_err: rmcp::ErrorData = err.into();
        // invalid_params uses -32602
        assert_eq!(mcp_err.code.0, -32602);
    }

    #[test]
    fn test_service_not_found_maps_to_resource_not_found() {
        let err = SnowflakeError::service_not_found("no such service");
        let mcp_err: rmcp::ErrorData = err.into();
        // resource_not_found uses -32002 in rmcp
        assert_eq!(mcp_err.code.0, -32002);
    }

    #[test]
    fn test_query_maps_to_internal_error() {
        let err = SnowflakeError::query("syntax error");
        let mcp_err: rmcp::ErrorData = err.into();
        // internal_error uses -32603
        assert_eq!(mcp_err.code.0, -32603);
    }
}
