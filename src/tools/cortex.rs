//! Cortex AI tools.
//!
//! Handlers for `cortex_complete`, `cortex_search`, `cortex_analyst`, and
//! `list_cortex_services`. Cortex parameter validation runs here; service
//! names are resolved against the registry before the client is invoked.

use crate::client::{AnalystOptions, CompleteOptions, SnowflakeClient};
use crate::error::SnowflakeResult;
use crate::registry::ServiceRegistry;
use crate::validate;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Input for the cortex_complete tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CortexCompleteInput {
    /// The input prompt for completion
    pub prompt: String,
    /// Optional model name (defaults to the configured model)
    #[serde(default)]
    pub model: Option<String>,
    /// Temperature for response generation (0.0 to 1.0)
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Maximum number of tokens to generate
    #[serde(default)]
    pub max_tokens: Option<i64>,
}

fn default_search_limit() -> i64 {
    10
}

/// Input for the cortex_search tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CortexSearchInput {
    /// Name of the search service to use
    pub service_name: String,
    /// Search query
    pub query: String,
    /// Maximum number of results to return (1 to 100)
    #[serde(default = "default_search_limit")]
    pub limit: i64,
    /// Optional filter expression for search results
    #[serde(default)]
    pub filter: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Input for the cortex_analyst tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CortexAnalystInput {
    /// Name of the analyst service to use
    pub service_name: String,
    /// Natural language question about the data
    pub question: String,
    /// Whether to include the generated SQL in the response
    #[serde(default = "default_true")]
    pub include_sql: bool,
    /// Whether to include the query results in the response
    #[serde(default = "default_true")]
    pub include_data: bool,
}

/// Which service section list_cortex_services reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ServiceTypeFilter {
    Search,
    Analyst,
    Complete,
    #[default]
    All,
}

impl ServiceTypeFilter {
    fn includes_search(self) -> bool {
        matches!(self, Self::Search | Self::All)
    }

    fn includes_analyst(self) -> bool {
        matches!(self, Self::Analyst | Self::All)
    }

    fn includes_complete(self) -> bool {
        matches!(self, Self::Complete | Self::All)
    }
}

/// Input for the list_cortex_services tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListCortexServicesInput {
    /// Type of services to list: search, analyst, complete, or all
    #[serde(default)]
    pub service_type: ServiceTypeFilter,
}

/// Handler for the Cortex tools.
pub struct CortexToolHandler {
    client: Arc<SnowflakeClient>,
    registry: Arc<ServiceRegistry>,
}

impl CortexToolHandler {
    /// Create a new Cortex tool handler.
    pub fn new(client: Arc<SnowflakeClient>, registry: Arc<ServiceRegistry>) -> Self {
        Self { client, registry }
    }

    /// Handle the cortex_complete tool call.
    pub async fn cortex_complete(&self, input: CortexCompleteInput) -> SnowflakeResult<String> {
        if input.prompt.is_empty() {
            return Ok("Error: Prompt is required".to_string());
        }

        validate::validate_cortex_complete_params(
            &input.prompt,
            input.model.as_deref(),
            input.temperature,
            input.max_tokens,
        )?;

        // Resolution order: explicit argument, registry default, built-in default.
        let model = input
            .model
            .as_deref()
            .unwrap_or_else(|| self.registry.default_complete_model());

        let options = CompleteOptions {
            temperature: input.temperature,
            max_tokens: input.max_tokens,
        };

        let response = self
            .client
            .cortex_complete(&input.prompt, model, &options)
            .await?;

        Ok(format!("Cortex Complete Response:\n\n{response}"))
    }

    /// Handle the cortex_search tool call.
    pub async fn cortex_search(&self, input: CortexSearchInput) -> SnowflakeResult<String> {
        if input.service_name.is_empty() || input.query.is_empty() {
            return Ok("Error: Service name and query are required".to_string());
        }

        validate::validate_cortex_search_params(
            &input.service_name,
            &input.query,
            input.limit,
            input.filter.as_deref(),
        )?;

        let target = self.registry.find_search_service(&input.service_name)?;
        let results = self
            .client
            .cortex_search(&target, &input.query, input.limit, input.filter.as_deref())
            .await?;

        let mut output = format!("Cortex Search Results for '{}':\n\n", input.query);
        if results.is_empty() {
            output.push_str("No results found.");
        } else {
            for (i, result) in results.iter().enumerate() {
                output.push_str(&format!("Result {}:\n", i + 1));
                for (key, value) in result {
                    output.push_str(&format!("  {key}: {}\n", render_value(value)));
                }
                output.push('\n');
            }
        }
        Ok(output)
    }

    /// Handle the cortex_analyst tool call.
    pub async fn cortex_analyst(&self, input: CortexAnalystInput) -> SnowflakeResult<String> {
        if input.service_name.is_empty() || input.question.is_empty() {
            return Ok("Error: Service name and question are required".to_string());
        }

        validate::validate_cortex_analyst_params(&input.service_name, &input.question)?;

        let semantic_model = self.registry.find_analyst_service(&input.service_name)?;
        let options = AnalystOptions {
            include_sql: input.include_sql,
            include_data: input.include_data,
        };

        let result = self
            .client
            .cortex_analyst(&semantic_model, &input.question, &options)
            .await?;

        Ok(format_analyst_result(
            &input.question,
            &result,
            input.include_sql,
            input.include_data,
        ))
    }

    /// Handle the list_cortex_services tool call.
    pub async fn list_cortex_services(
        &self,
        input: ListCortexServicesInput,
    ) -> SnowflakeResult<String> {
        let filter = input.service_type;
        let mut output = String::from("Available Cortex Services:\n\n");

        if filter.includes_search() {
            output.push_str("Search Services:\n");
            let services = self.registry.search_services();
            if services.is_empty() {
                output.push_str("  No search services configured\n");
            } else {
                for service in services {
                    output.push_str(&format!(
                        "  - {}: {}\n",
                        service.service_name,
                        service.description.as_deref().unwrap_or("No description")
                    ));
                }
            }
            output.push('\n');
        }

        if filter.includes_analyst() {
            output.push_str("Analyst Services:\n");
            let services = self.registry.analyst_services();
            if services.is_empty() {
                output.push_str("  No analyst services configured\n");
            } else {
                for service in services {
                    output.push_str(&format!(
                        "  - {}: {}\n",
                        service.service_name,
                        service.description.as_deref().unwrap_or("No description")
                    ));
                }
            }
            output.push('\n');
        }

        if filter.includes_complete() {
            output.push_str("Complete Configuration:\n");
            match &self.registry.complete_config().default_model {
                Some(model) => output.push_str(&format!("  - Default Model: {model}\n")),
                None => output.push_str("  No complete configuration found\n"),
            }
        }

        Ok(output)
    }
}

/// Render a JSON value for the search result listing.
fn render_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render the analyst result object as sectioned text.
fn format_analyst_result(
    question: &str,
    result: &JsonValue,
    include_sql: bool,
    include_data: bool,
) -> String {
    let mut output = format!("Cortex Analyst Response for '{question}':\n\n");

    let Some(object) = result.as_object() else {
        output.push_str(&render_value(result));
        return output;
    };

    if let Some(error) = object.get("error") {
        output.push_str(&format!("Error: {}", render_value(error)));
        return output;
    }

    if include_sql {
        if let Some(sql) = object.get("sql") {
            output.push_str(&format!("Generated SQL:\n{}\n\n", render_value(sql)));
        }
    }

    if include_data {
        if let Some(data) = object.get("data") {
            output.push_str(&format!("Query Results:\n{}\n\n", render_value(data)));
        }
    }

    if let Some(explanation) = object.get("explanation") {
        output.push_str(&format!("Explanation:\n{}\n\n", render_value(explanation)));
    }

    for (key, value) in object {
        if !matches!(key.as_str(), "sql" | "data" | "explanation") {
            output.push_str(&format!("{key}: {}\n", render_value(value)));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_service_type_filter_deserialization() {
        let input: ListCortexServicesInput =
            serde_json::from_str(r#"{"service_type": "search"}"#).unwrap();
        assert_eq!(input.service_type, ServiceTypeFilter::Search);

        let input: ListCortexServicesInput = serde_json::from_str("{}").unwrap();
        assert_eq!(input.service_type, ServiceTypeFilter::All);
    }

    #[test]
    fn test_service_type_filter_sections() {
        assert!(ServiceTypeFilter::All.includes_search());
        assert!(ServiceTypeFilter::All.includes_analyst());
        assert!(ServiceTypeFilter::All.includes_complete());
        assert!(ServiceTypeFilter::Search.includes_search());
        assert!(!ServiceTypeFilter::Search.includes_analyst());
        assert!(!ServiceTypeFilter::Complete.includes_search());
    }

    #[test]
    fn test_search_input_default_limit() {
        let input: CortexSearchInput =
            serde_json::from_str(r#"{"service_name": "docs", "query": "q"}"#).unwrap();
        assert_eq!(input.limit, 10);
        assert!(input.filter.is_none());
    }

    #[test]
    fn test_analyst_input_defaults() {
        let input: CortexAnalystInput =
            serde_json::from_str(r#"{"service_name": "sales", "question": "q"}"#).unwrap();
        assert!(input.include_sql);
        assert!(input.include_data);
    }

    #[test]
    fn test_format_analyst_result_sections() {
        let result = json!({
            "sql": "SELECT SUM(amount) FROM orders",
            "data": "[{\"SUM(AMOUNT)\": 42}]",
            "explanation": "Total of all orders",
            "confidence": 0.9,
        });
        let text = format_analyst_result("total?", &result, true, true);
        assert!(text.contains("Cortex Analyst Response for 'total?'"));
        assert!(text.contains("Generated SQL:\nSELECT SUM(amount) FROM orders"));
        assert!(text.contains("Query Results:"));
        assert!(text.contains("Explanation:\nTotal of all orders"));
        assert!(text.contains("confidence: 0.9"));
    }

    #[test]
    fn test_format_analyst_result_respects_flags() {
        let result = json!({"sql": "SELECT 1", "data": "rows"});
        let text = format_analyst_result("q", &result, false, false);
        assert!(!text.contains("Generated SQL"));
        assert!(!text.contains("Query Results"));
    }

    #[test]
    fn test_format_analyst_result_error() {
        let result = json!({"error": "No analysis result generated"});
        let text = format_analyst_result("q", &result, true, true);
        assert!(text.contains("Error: No analysis result generated"));
        assert!(!text.contains("Generated SQL"));
    }
}
