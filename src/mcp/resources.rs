//! MCP resource catalog and read dispatch.
//!
//! Resources are URI-addressed read-only snapshots under the `warehouse://`
//! scheme: the metadata listings as JSON plus the Cortex service registry
//! sections. Read failures are reported inside the JSON body (an `error`
//! field) so a partially-unavailable warehouse still yields readable
//! resources; only unknown URIs become protocol errors.

use crate::client::SnowflakeClient;
use crate::registry::ServiceRegistry;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

pub const URI_DATABASES: &str = "warehouse://databases";
pub const URI_SCHEMAS: &str = "warehouse://schemas";
pub const URI_TABLES: &str = "warehouse://tables";
pub const URI_WAREHOUSES: &str = "warehouse://warehouses";
pub const URI_ROLES: &str = "warehouse://roles";
pub const URI_SEARCH_SERVICES: &str = "warehouse://cortex/search_services";
pub const URI_ANALYST_SERVICES: &str = "warehouse://cortex/analyst_services";
pub const URI_COMPLETE_CONFIG: &str = "warehouse://cortex/complete_config";

/// Static resource catalog: (uri, name, description).
pub const RESOURCE_CATALOG: &[(&str, &str, &str)] = &[
    (URI_DATABASES, "Databases", "List of available databases"),
    (URI_SCHEMAS, "Schemas", "List of available schemas"),
    (URI_TABLES, "Tables", "List of available tables"),
    (URI_WAREHOUSES, "Warehouses", "List of available warehouses"),
    (URI_ROLES, "Roles", "List of available roles"),
    (
        URI_SEARCH_SERVICES,
        "Cortex Search Services",
        "List of available Cortex Search services",
    ),
    (
        URI_ANALYST_SERVICES,
        "Cortex Analyst Services",
        "List of available Cortex Analyst services",
    ),
    (
        URI_COMPLETE_CONFIG,
        "Cortex Complete Configuration",
        "Cortex Complete configuration and available models",
    ),
];

/// Reads resource snapshots on demand.
pub struct ResourceReader {
    client: Arc<SnowflakeClient>,
    registry: Arc<ServiceRegistry>,
}

impl ResourceReader {
    pub fn new(client: Arc<SnowflakeClient>, registry: Arc<ServiceRegistry>) -> Self {
        Self { client, registry }
    }

    /// Whether a URI names a known resource.
    pub fn is_known_uri(uri: &str) -> bool {
        RESOURCE_CATALOG.iter().any(|(known, _, _)| *known == uri)
    }

    /// Produce the JSON body for a known resource URI.
    ///
    /// Returns None for unknown URIs; the caller turns that into a
    /// resource-not-found protocol error.
    pub async fn read(&self, uri: &str) -> Option<String> {
        let body = match uri {
            URI_DATABASES => self.listing(self.client.get_databases().await),
            URI_SCHEMAS => self.listing(self.client.get_schemas(None).await),
            URI_TABLES => self.listing(self.client.get_tables(None, None).await),
            URI_WAREHOUSES => self.listing(self.client.get_warehouses().await),
            URI_ROLES => self.listing(self.client.get_roles().await),
            URI_SEARCH_SERVICES => serialize(self.registry.search_services()),
            URI_ANALYST_SERVICES => serialize(self.registry.analyst_services()),
            URI_COMPLETE_CONFIG => serialize(self.registry.complete_config()),
            _ => return None,
        };
        Some(body)
    }

    fn listing(
        &self,
        rows: crate::error::SnowflakeResult<Vec<serde_json::Map<String, serde_json::Value>>>,
    ) -> String {
        match rows {
            Ok(rows) => serialize(&rows),
            Err(e) => {
                error!(error = %e, "Error reading resource");
                json!({"error": e.to_string()}).to_string()
            }
        }
    }
}

fn serialize<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| json!({"error": e.to_string()}).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_all_uris() {
        assert_eq!(RESOURCE_CATALOG.len(), 8);
        assert!(ResourceReader::is_known_uri(URI_DATABASES));
        assert!(ResourceReader::is_known_uri(URI_COMPLETE_CONFIG));
        assert!(!ResourceReader::is_known_uri("warehouse://unknown"));
    }

    #[test]
    fn test_catalog_uris_use_warehouse_scheme() {
        for (uri, name, description) in RESOURCE_CATALOG {
            assert!(uri.starts_with("warehouse://"), "bad scheme: {uri}");
            assert!(!name.is_empty());
            assert!(!description.is_empty());
        }
    }
}
