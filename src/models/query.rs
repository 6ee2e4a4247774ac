//! Query-related data models.
//!
//! This module defines types for SQL query requests and results.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// A named parameter value for parameterized queries.
///
/// Only scalar values (and NULL) are accepted; arrays and objects are
/// rejected by [`crate::validate::validate_params`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (stored as i64 for maximum range)
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
}

impl ParamValue {
    /// Check if this parameter is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the type name of this parameter for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }

    /// Render as a JSON value (used by the driver when building bindings).
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(v) => JsonValue::Bool(*v),
            Self::Int(v) => JsonValue::from(*v),
            Self::Float(v) => {
                serde_json::Number::from_f64(*v).map_or(JsonValue::Null, JsonValue::Number)
            }
            Self::String(v) => JsonValue::String(v.clone()),
        }
    }
}

/// A validated SQL statement ready for execution.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub sql: String,
    /// Named parameters, already validated
    pub params: BTreeMap<String, ParamValue>,
    /// Default: false for safety
    pub allow_ddl: bool,
}

impl QueryRequest {
    /// Create a new query request without parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: BTreeMap::new(),
            allow_ddl: false,
        }
    }

    /// Attach named parameters.
    pub fn with_params(mut self, params: BTreeMap<String, ParamValue>) -> Self {
        self.params = params;
        self
    }

    /// Allow DDL keywords through query validation.
    pub fn with_ddl_allowed(mut self) -> Self {
        self.allow_ddl = true;
        self
    }
}

/// Rows and column names produced by a single statement execution.
///
/// Column order is whatever the driver reports; rows are keyed by column
/// name. Results are produced once per execution and never cached.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementOutput {
    pub rows: Vec<serde_json::Map<String, JsonValue>>,
    pub columns: Vec<String>,
}

impl StatementOutput {
    /// Number of rows in the result.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Look up a cell in the first row by column name, case-insensitively.
    ///
    /// Snowflake upper-cases unquoted aliases, so a `... AS response` column
    /// comes back as `RESPONSE`; fixtures and other warehouses may differ.
    pub fn first_row_value(&self, column: &str) -> Option<&JsonValue> {
        let row = self.rows.first()?;
        if let Some(value) = row.get(column) {
            return Some(value);
        }
        row.iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    }
}
