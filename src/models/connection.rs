//! Connection-related data models.
//!
//! This module defines the set of credential and session fields used to open
//! Snowflake connections. Parameters are assembled once at startup from the
//! environment-driven configuration and are immutable afterwards.

use serde::Serialize;

/// Default authenticator when none is configured.
pub const DEFAULT_AUTHENTICATOR: &str = "snowflake";

/// Snowflake connection parameters.
///
/// Required fields (user, password, account, database, warehouse) are checked
/// by [`crate::validate::validate_connection_params`] before a client is
/// constructed; the optional fields are forwarded to the driver as-is.
#[derive(Clone, Serialize)]
pub struct ConnectionParams {
    pub user: String,
    /// Contains sensitive data - never log
    #[serde(skip_serializing)]
    pub password: String,
    pub account: String,
    pub database: String,
    pub warehouse: String,
    pub schema: Option<String>,
    pub role: Option<String>,
    pub region: Option<String>,
    /// Default: "snowflake" (password authentication)
    pub authenticator: String,
    /// Default: true
    pub client_session_keep_alive: bool,
}

impl ConnectionParams {
    /// Hostname of the account endpoint, including the region segment when set.
    pub fn host(&self) -> String {
        match &self.region {
            Some(region) if !region.is_empty() => {
                format!("{}.{}.snowflakecomputing.com", self.account, region)
            }
            _ => format!("{}.snowflakecomputing.com", self.account),
        }
    }

    /// Base URL of the account endpoint.
    pub fn base_url(&self) -> String {
        format!("https://{}", self.host())
    }
}

/// Debug prints everything except the password.
impl std::fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("user", &self.user)
            .field("password", &"***")
            .field("account", &self.account)
            .field("database", &self.database)
            .field("warehouse", &self.warehouse)
            .field("schema", &self.schema)
            .field("role", &self.role)
            .field("region", &self.region)
            .field("authenticator", &self.authenticator)
            .field(
                "client_session_keep_alive",
                &self.client_session_keep_alive,
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ConnectionParams {
        ConnectionParams {
            user: "analyst".to_string(),
            password: "secret".to_string(),
            account: "acme-prod".to_string(),
            database: "ANALYTICS".to_string(),
            warehouse: "COMPUTE_WH".to_string(),
            schema: None,
            role: None,
            region: None,
            authenticator: DEFAULT_AUTHENTICATOR.to_string(),
            client_session_keep_alive: true,
        }
    }

    #[test]
    fn test_host_without_region() {
        assert_eq!(params().host(), "acme-prod.snowflakecomputing.com");
    }

    #[test]
    fn test_host_with_region() {
        let mut p = params();
        p.region = Some("eu-west-1".to_string());
        assert_eq!(p.host(), "acme-prod.eu-west-1.snowflakecomputing.com");
        assert_eq!(
            p.base_url(),
            "https://acme-prod.eu-west-1.snowflakecomputing.com"
        );
    }

    #[test]
    fn test_debug_masks_password() {
        let rendered = format!("{:?}", params());
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("***"));
    }
}
