//! Cortex AI operations.
//!
//! Completion, semantic search, and natural-language analysis are all plain
//! SQL calls into the `SNOWFLAKE.CORTEX` functions. Call text embeds the
//! resolved model/service identifier and the caller's prompt/query/question
//! as quoted literals (not bound parameters); optional settings are appended
//! as `'key' => value` pairs.

use crate::client::SnowflakeClient;
use crate::error::{SnowflakeError, SnowflakeResult};
use crate::models::QueryRequest;
use crate::registry::SearchTarget;
use crate::validate::VALID_CORTEX_MODELS;
use serde_json::Value as JsonValue;
use tracing::error;

/// Optional settings for Cortex Complete.
#[derive(Debug, Clone, Default)]
pub struct CompleteOptions {
    pub temperature: Option<f64>,
    pub max_tokens: Option<i64>,
}

impl CompleteOptions {
    fn to_kwargs(&self) -> Vec<(&'static str, JsonValue)> {
        let mut kwargs = Vec::new();
        if let Some(temperature) = self.temperature {
            kwargs.push(("temperature", JsonValue::from(temperature)));
        }
        if let Some(max_tokens) = self.max_tokens {
            kwargs.push(("max_tokens", JsonValue::from(max_tokens)));
        }
        kwargs
    }
}

/// Optional settings for Cortex Analyst.
#[derive(Debug, Clone)]
pub struct AnalystOptions {
    pub include_sql: bool,
    pub include_data: bool,
}

impl Default for AnalystOptions {
    fn default() -> Self {
        Self {
            include_sql: true,
            include_data: true,
        }
    }
}

impl AnalystOptions {
    /// Only non-default (false) flags are forwarded to the call.
    fn to_kwargs(&self) -> Vec<(&'static str, JsonValue)> {
        let mut kwargs = Vec::new();
        if !self.include_sql {
            kwargs.push(("include_sql", JsonValue::Bool(false)));
        }
        if !self.include_data {
            kwargs.push(("include_data", JsonValue::Bool(false)));
        }
        kwargs
    }
}

/// Render one `'key' => value` argument. String values are quoted, scalars
/// are embedded verbatim.
fn render_kwarg(key: &str, value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => format!("'{key}' => '{s}'"),
        other => format!("'{key}' => {other}"),
    }
}

/// Append rendered kwargs to a call under construction.
fn push_kwargs(sql: &mut String, kwargs: &[(&str, JsonValue)]) {
    for (key, value) in kwargs {
        sql.push_str(", ");
        sql.push_str(&render_kwarg(key, value));
    }
}

impl SnowflakeClient {
    /// Run Cortex Complete with the given (already resolved) model.
    ///
    /// An unsupported model fails before any statement is built or executed.
    /// An empty result yields the documented fallback text.
    pub async fn cortex_complete(
        &self,
        prompt: &str,
        model: &str,
        options: &CompleteOptions,
    ) -> SnowflakeResult<String> {
        if !VALID_CORTEX_MODELS.contains(&model) {
            return Err(SnowflakeError::model_not_supported(format!(
                "Model '{model}' is not supported. Valid models: {}",
                VALID_CORTEX_MODELS.join(", ")
            )));
        }

        let mut sql = format!("SELECT SNOWFLAKE.CORTEX.COMPLETE('{model}', '{prompt}'");
        push_kwargs(&mut sql, &options.to_kwargs());
        sql.push_str(") AS response");

        let output = self
            .execute_query(&QueryRequest::new(sql))
            .await
            .map_err(|e| {
                error!(error = %e, "Cortex Complete query error");
                SnowflakeError::cortex_complete(format!("Cortex Complete query failed: {e}"))
            })?;

        match output.first_row_value("RESPONSE") {
            Some(JsonValue::String(text)) => Ok(text.clone()),
            Some(other) => Ok(other.to_string()),
            None => Ok("No response generated".to_string()),
        }
    }

    /// Run Cortex Search against a resolved service target.
    ///
    /// The result column carries a JSON document; an empty result yields an
    /// empty list.
    pub async fn cortex_search(
        &self,
        target: &SearchTarget,
        query: &str,
        limit: i64,
        filter: Option<&str>,
    ) -> SnowflakeResult<Vec<serde_json::Map<String, JsonValue>>> {
        let mut sql = format!(
            "SELECT SNOWFLAKE.CORTEX.SEARCH('{}', '{query}', {limit}",
            target.qualified_name()
        );
        if let Some(filter) = filter {
            push_kwargs(&mut sql, &[("filter", JsonValue::String(filter.to_string()))]);
        }
        sql.push_str(") AS search_results");

        let output = self
            .execute_query(&QueryRequest::new(sql))
            .await
            .map_err(|e| {
                error!(error = %e, "Cortex Search query error");
                SnowflakeError::cortex_search(format!("Cortex Search query failed: {e}"))
            })?;

        let Some(cell) = output.first_row_value("SEARCH_RESULTS") else {
            return Ok(Vec::new());
        };

        parse_json_cell(cell)
            .and_then(|value| serde_json::from_value(value).ok())
            .ok_or_else(|| {
                SnowflakeError::cortex_search(
                    "Cortex Search returned a result that is not a JSON list".to_string(),
                )
            })
    }

    /// Run Cortex Analyst against a resolved semantic model.
    ///
    /// An empty result yields the documented error object.
    pub async fn cortex_analyst(
        &self,
        semantic_model: &str,
        question: &str,
        options: &AnalystOptions,
    ) -> SnowflakeResult<JsonValue> {
        let mut sql = format!("SELECT SNOWFLAKE.CORTEX.ANALYST('{semantic_model}', '{question}'");
        push_kwargs(&mut sql, &options.to_kwargs());
        sql.push_str(") AS analysis_result");

        let output = self
            .execute_query(&QueryRequest::new(sql))
            .await
            .map_err(|e| {
                error!(error = %e, "Cortex Analyst query error");
                SnowflakeError::cortex_analyst(format!("Cortex Analyst query failed: {e}"))
            })?;

        match output.first_row_value("ANALYSIS_RESULT") {
            Some(cell) => parse_json_cell(cell).ok_or_else(|| {
                SnowflakeError::cortex_analyst(
                    "Cortex Analyst returned a result that is not valid JSON".to_string(),
                )
            }),
            None => Ok(serde_json::json!({"error": "No analysis result generated"})),
        }
    }
}

/// The driver may deliver the JSON column either as a string to parse or as
/// an already-decoded value.
fn parse_json_cell(cell: &JsonValue) -> Option<JsonValue> {
    match cell {
        JsonValue::String(text) => serde_json::from_str(text).ok(),
        other => Some(other.clone()),
    }
}
