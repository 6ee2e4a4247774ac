//! Input validation for Snowflake MCP operations.
//!
//! Pure functions gating SQL text, identifiers, query parameters, connection
//! parameters, and Cortex service parameters. Validators have no side effects
//! and fail fast with [`SnowflakeError::Validation`].

use crate::error::{SnowflakeError, SnowflakeResult};
use crate::models::{ConnectionParams, ParamValue};
use regex::Regex;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// SQL keywords rejected unless DDL is explicitly allowed.
///
/// Matched as substrings of the upper-cased query text, which intentionally
/// over-rejects (e.g. a column named `CREATED_AT` trips `CREATE`): this gate
/// prefers false positives over letting a mutating statement through.
pub const DANGEROUS_KEYWORDS: &[&str] = &[
    "DROP", "DELETE", "TRUNCATE", "ALTER", "CREATE", "INSERT", "UPDATE", "GRANT", "REVOKE",
    "EXEC", "EXECUTE", "CALL", "MERGE",
];

/// Cortex Complete models accepted by validation.
pub const VALID_CORTEX_MODELS: &[&str] = &[
    "snowflake-llama-3.3-70b",
    "snowflake-llama-3.1-8b",
    "snowflake-llama-3.1-70b",
];

/// Injection-style patterns rejected regardless of the DDL flag.
///
/// Stored as (source, compiled) pairs so error messages can echo the pattern.
static DANGEROUS_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        r";\s*DROP\s+",
        r";\s*DELETE\s+",
        r";\s*TRUNCATE\s+",
        r";\s*ALTER\s+",
        r";\s*CREATE\s+",
        r";\s*INSERT\s+",
        r";\s*UPDATE\s+",
        r"UNION\s+SELECT",
        r"--",
        r"/\*.*\*/",
        r"EXEC\s*\(",
        r"EXECUTE\s*\(",
    ]
    .iter()
    .map(|p| {
        let re = Regex::new(&format!("(?i){p}")).expect("dangerous pattern must be a valid regex");
        (*p, re)
    })
    .collect()
});

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("valid regex"));

static ACCOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("valid regex"));

static USER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_.-]+$").expect("valid regex"));

/// Validate a SQL query for safety.
///
/// Rejects blank queries, queries containing dangerous keywords (unless
/// `allow_ddl` is set), and queries matching injection-style patterns.
pub fn validate_query(query: &str, allow_ddl: bool) -> SnowflakeResult<()> {
    if query.trim().is_empty() {
        return Err(SnowflakeError::validation("Query cannot be empty"));
    }

    let query_upper = query.trim().to_uppercase();

    if !allow_ddl {
        for keyword in DANGEROUS_KEYWORDS {
            if query_upper.contains(keyword) {
                return Err(SnowflakeError::validation(format!(
                    "Query contains potentially dangerous keyword: {keyword}"
                )));
            }
        }
    }

    for (source, pattern) in DANGEROUS_PATTERNS.iter() {
        if pattern.is_match(&query_upper) {
            return Err(SnowflakeError::validation(format!(
                "Query contains potentially dangerous pattern: {source}"
            )));
        }
    }

    Ok(())
}

/// Validate a database identifier (table name, column name, service name, ...).
///
/// `kind` names the identifier in error messages, e.g. "table name".
pub fn validate_identifier(identifier: &str, kind: &str) -> SnowflakeResult<()> {
    let identifier = identifier.trim();

    if identifier.is_empty() {
        return Err(SnowflakeError::validation(format!("{kind} cannot be empty")));
    }

    if !IDENTIFIER_RE.is_match(identifier) {
        return Err(SnowflakeError::validation(format!(
            "Invalid {kind}: {identifier}"
        )));
    }

    if identifier.len() > 255 {
        return Err(SnowflakeError::validation(format!(
            "{kind} too long: {identifier}"
        )));
    }

    Ok(())
}

/// Validate and normalize query parameters.
///
/// Keys must be valid identifiers; values must be NULL, string, integer,
/// float, or boolean. Returns the normalized parameter map.
pub fn validate_params(
    params: Option<&serde_json::Map<String, JsonValue>>,
) -> SnowflakeResult<BTreeMap<String, ParamValue>> {
    let Some(params) = params else {
        return Ok(BTreeMap::new());
    };

    let mut validated = BTreeMap::new();
    for (key, value) in params {
        validate_identifier(key, "parameter name")?;

        let value = match value {
            JsonValue::Null => ParamValue::Null,
            JsonValue::Bool(v) => ParamValue::Bool(*v),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ParamValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    ParamValue::Float(f)
                } else {
                    return Err(SnowflakeError::validation(format!(
                        "Invalid parameter value type for '{key}': number out of range"
                    )));
                }
            }
            JsonValue::String(s) => ParamValue::String(s.clone()),
            JsonValue::Array(_) => {
                return Err(SnowflakeError::validation(format!(
                    "Invalid parameter value type for '{key}': array"
                )));
            }
            JsonValue::Object(_) => {
                return Err(SnowflakeError::validation(format!(
                    "Invalid parameter value type for '{key}': object"
                )));
            }
        };
        validated.insert(key.clone(), value);
    }

    Ok(validated)
}

/// Validate Snowflake connection parameters.
pub fn validate_connection_params(params: &ConnectionParams) -> SnowflakeResult<()> {
    let required = [
        ("user", &params.user),
        ("password", &params.password),
        ("account", &params.account),
        ("database", &params.database),
        ("warehouse", &params.warehouse),
    ];

    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(SnowflakeError::validation(format!(
                "Missing required parameter: {name}"
            )));
        }
    }

    if !ACCOUNT_RE.is_match(&params.account) {
        return Err(SnowflakeError::validation("Invalid account format"));
    }

    if !USER_RE.is_match(&params.user) {
        return Err(SnowflakeError::validation("Invalid user format"));
    }

    Ok(())
}

/// Validate Cortex Complete parameters.
pub fn validate_cortex_complete_params(
    prompt: &str,
    model: Option<&str>,
    temperature: Option<f64>,
    max_tokens: Option<i64>,
) -> SnowflakeResult<()> {
    if prompt.trim().is_empty() {
        return Err(SnowflakeError::validation("Prompt cannot be empty"));
    }

    if prompt.len() > 10_000 {
        return Err(SnowflakeError::validation(
            "Prompt too long (max 10000 characters)",
        ));
    }

    if let Some(model) = model {
        if !VALID_CORTEX_MODELS.contains(&model) {
            return Err(SnowflakeError::validation(format!(
                "Invalid model: {model}. Valid models: {}",
                VALID_CORTEX_MODELS.join(", ")
            )));
        }
    }

    if let Some(temperature) = temperature {
        if !(0.0..=1.0).contains(&temperature) {
            return Err(SnowflakeError::validation(
                "Temperature must be between 0.0 and 1.0",
            ));
        }
    }

    if let Some(max_tokens) = max_tokens {
        if !(1..=4000).contains(&max_tokens) {
            return Err(SnowflakeError::validation(
                "Max tokens must be between 1 and 4000",
            ));
        }
    }

    Ok(())
}

/// Validate Cortex Search parameters.
pub fn validate_cortex_search_params(
    service_name: &str,
    query: &str,
    limit: i64,
    filter: Option<&str>,
) -> SnowflakeResult<()> {
    if service_name.trim().is_empty() {
        return Err(SnowflakeError::validation("Service name cannot be empty"));
    }

    validate_identifier(service_name, "service name")?;

    if query.trim().is_empty() {
        return Err(SnowflakeError::validation("Search query cannot be empty"));
    }

    if query.len() > 1_000 {
        return Err(SnowflakeError::validation(
            "Search query too long (max 1000 characters)",
        ));
    }

    if !(1..=100).contains(&limit) {
        return Err(SnowflakeError::validation("Limit must be between 1 and 100"));
    }

    if let Some(filter) = filter {
        if filter.len() > 500 {
            return Err(SnowflakeError::validation(
                "Filter expression too long (max 500 characters)",
            ));
        }
    }

    Ok(())
}

/// Validate Cortex Analyst parameters.
pub fn validate_cortex_analyst_params(service_name: &str, question: &str) -> SnowflakeResult<()> {
    if service_name.trim().is_empty() {
        return Err(SnowflakeError::validation("Service name cannot be empty"));
    }

    validate_identifier(service_name, "service name")?;

    if question.trim().is_empty() {
        return Err(SnowflakeError::validation("Question cannot be empty"));
    }

    if question.len() > 2_000 {
        return Err(SnowflakeError::validation(
            "Question too long (max 2000 characters)",
        ));
    }

    Ok(())
}
