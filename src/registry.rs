//! Cortex service registry.
//!
//! A static, file-backed mapping from service names to their backing
//! warehouse objects, loaded once at startup from a YAML file. A missing or
//! malformed file logs and yields an empty registry instead of aborting
//! startup; the registry is read-only for the process lifetime.

use crate::error::{SnowflakeError, SnowflakeResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, warn};

/// Default registry file path, relative to the working directory.
pub const DEFAULT_SERVICE_CONFIG_PATH: &str = "service_config.yaml";

/// Fallback model when neither the caller nor the registry names one.
pub const DEFAULT_COMPLETE_MODEL: &str = "snowflake-llama-3.3-70b";

/// A configured Cortex Search service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchServiceConfig {
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub database_name: Option<String>,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A configured Cortex Analyst service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalystServiceConfig {
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub semantic_model: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Cortex Complete defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompleteConfig {
    #[serde(default)]
    pub default_model: Option<String>,
}

/// The registry file contents. All sections are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub search_services: Vec<SearchServiceConfig>,
    #[serde(default)]
    pub analyst_services: Vec<AnalystServiceConfig>,
    #[serde(default)]
    pub cortex_complete: CompleteConfig,
}

/// A resolved search service target: `{database}.{schema}.{service}`.
#[derive(Debug, Clone)]
pub struct SearchTarget {
    pub database: String,
    pub schema: String,
    pub service_name: String,
}

impl SearchTarget {
    /// Fully qualified service path used in the Cortex call.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}.{}", self.database, self.schema, self.service_name)
    }
}

/// Read-only registry of configured Cortex services.
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    config: ServiceConfig,
}

impl ServiceRegistry {
    /// Build a registry from an already-parsed configuration.
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    /// An empty registry (no services configured).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the registry from a YAML file.
    ///
    /// Missing files and parse failures are logged and produce an empty
    /// registry; only startup ever calls this.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "Cortex configuration file not found");
            return Self::empty();
        }

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Error reading Cortex configuration");
                return Self::empty();
            }
        };

        match serde_yaml::from_str::<ServiceConfig>(&contents) {
            Ok(config) => Self::new(config),
            Err(e) => {
                error!(path = %path.display(), error = %e, "Error loading Cortex configuration");
                Self::empty()
            }
        }
    }

    /// All configured search services.
    pub fn search_services(&self) -> &[SearchServiceConfig] {
        &self.config.search_services
    }

    /// All configured analyst services.
    pub fn analyst_services(&self) -> &[AnalystServiceConfig] {
        &self.config.analyst_services
    }

    /// Cortex Complete defaults.
    pub fn complete_config(&self) -> &CompleteConfig {
        &self.config.cortex_complete
    }

    /// Model used when the caller does not name one.
    pub fn default_complete_model(&self) -> &str {
        self.config
            .cortex_complete
            .default_model
            .as_deref()
            .unwrap_or(DEFAULT_COMPLETE_MODEL)
    }

    /// Resolve a search service by name (linear scan, first match).
    pub fn find_search_service(&self, service_name: &str) -> SnowflakeResult<SearchTarget> {
        let service = self
            .config
            .search_services
            .iter()
            .find(|s| s.service_name == service_name)
            .ok_or_else(|| {
                SnowflakeError::service_not_found(format!(
                    "Search service '{service_name}' not found in configuration"
                ))
            })?;

        match (&service.database_name, &service.schema_name) {
            (Some(database), Some(schema)) if !database.is_empty() && !schema.is_empty() => {
                Ok(SearchTarget {
                    database: database.clone(),
                    schema: schema.clone(),
                    service_name: service.service_name.clone(),
                })
            }
            _ => Err(SnowflakeError::configuration(format!(
                "Search service '{service_name}' missing database or schema configuration"
            ))),
        }
    }

    /// Resolve an analyst service's semantic model by name.
    pub fn find_analyst_service(&self, service_name: &str) -> SnowflakeResult<String> {
        let service = self
            .config
            .analyst_services
            .iter()
            .find(|s| s.service_name == service_name)
            .ok_or_else(|| {
                SnowflakeError::service_not_found(format!(
                    "Analyst service '{service_name}' not found in configuration"
                ))
            })?;

        match &service.semantic_model {
            Some(model) if !model.is_empty() => Ok(model.clone()),
            _ => Err(SnowflakeError::configuration(format!(
                "Analyst service '{service_name}' missing semantic model configuration"
            ))),
        }
    }
}
