//! execute_query tool behavior against a scripted driver.

mod common;

use common::test_client;
use serde_json::json;
use snowflake_mcp_server::tools::query::{ExecuteQueryInput, QueryToolHandler};

#[tokio::test]
async fn empty_query_yields_literal_error_without_touching_warehouse() {
    let (client, driver) = test_client();
    let handler = QueryToolHandler::new(client);

    let text = handler
        .execute_query(ExecuteQueryInput {
            query: String::new(),
            params: None,
        })
        .await
        .unwrap();

    assert_eq!(text, "Error: Query is required");
    assert!(driver.executed().is_empty());
}

#[tokio::test]
async fn dangerous_query_fails_validation_before_execution() {
    let (client, driver) = test_client();
    let handler = QueryToolHandler::new(client);

    let err = handler
        .execute_query(ExecuteQueryInput {
            query: "DROP TABLE users".to_string(),
            params: None,
        })
        .await
        .unwrap_err();

    assert_eq!(err.prefix(), "Query Error");
    assert!(err.to_string().contains("Query validation failed"));
    assert!(driver.executed().is_empty());
}

#[tokio::test]
async fn invalid_params_fail_validation_before_execution() {
    let (client, driver) = test_client();
    let handler = QueryToolHandler::new(client);

    let err = handler
        .execute_query(ExecuteQueryInput {
            query: "SELECT 1".to_string(),
            params: json!({"bad key": 1}).as_object().cloned(),
        })
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Query validation failed"));
    assert!(driver.executed().is_empty());
}

#[tokio::test]
async fn results_render_columns_rows_and_cells() {
    let (client, driver) = test_client();
    driver.push_rows(
        &["ID", "NAME"],
        &[&[json!(1), json!("alice")], &[json!(2), json!("bob")]],
    );
    let handler = QueryToolHandler::new(client);

    let text = handler
        .execute_query(ExecuteQueryInput {
            query: "SELECT id, name FROM users_list".to_string(),
            params: None,
        })
        .await
        .unwrap();

    assert!(text.starts_with("Query Results:"));
    assert!(text.contains("Columns: ID, NAME"));
    assert!(text.contains("Rows: 2"));
    assert!(text.contains("Row 1:"));
    assert!(text.contains("alice"));
    assert!(text.contains("Row 2:"));
}

#[tokio::test]
async fn empty_result_reports_success_without_rows() {
    let (client, _driver) = test_client();
    let handler = QueryToolHandler::new(client);

    let text = handler
        .execute_query(ExecuteQueryInput {
            query: "SELECT 1 WHERE FALSE".to_string(),
            params: None,
        })
        .await
        .unwrap();

    assert_eq!(text, "Query executed successfully. No results returned.");
}

#[tokio::test]
async fn long_results_are_elided_after_ten_rows() {
    let (client, driver) = test_client();
    let cells: Vec<Vec<serde_json::Value>> = (0..12).map(|i| vec![json!(i)]).collect();
    let rows: Vec<&[serde_json::Value]> = cells.iter().map(|r| r.as_slice()).collect();
    driver.push_rows(&["N"], &rows);
    let handler = QueryToolHandler::new(client);

    let text = handler
        .execute_query(ExecuteQueryInput {
            query: "SELECT n FROM numbers".to_string(),
            params: None,
        })
        .await
        .unwrap();

    assert!(text.contains("Rows: 12"));
    assert!(text.contains("Row 10:"));
    assert!(!text.contains("Row 11:"));
    assert!(text.contains("... and 2 more rows"));
}
