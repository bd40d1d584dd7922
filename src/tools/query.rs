//! Query execution tool.
//!
//! This module implements the `execute_query` MCP tool: apply the row
//! cap to uncapped SELECTs, run the statement, and shape the result as
//! a JSON array of stringified rows.

use crate::client::Connector;
use crate::error::ChResult;
use crate::tools::format::render_value;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Input for the execute_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExecuteQueryInput {
    /// SQL query to execute
    pub query: String,
    /// Maximum number of rows to return (optional)
    #[serde(default)]
    pub limit: Option<u64>,
}

/// Append ` LIMIT <limit>` to uncapped SELECT statements.
///
/// This is a purely textual heuristic, kept deliberately: the trimmed,
/// upper-cased query must start with SELECT, and the upper-cased text
/// must not contain the substring LIMIT anywhere. A LIMIT inside a
/// subquery, string literal, or column name therefore suppresses the
/// cap, and a statement ending in a trailing semicolon can become
/// invalid SQL. Real SQL parsing would change the observable query text
/// sent to the server.
pub fn apply_row_limit(query: &str, limit: u64) -> String {
    let upper = query.to_uppercase();
    if upper.trim_start().starts_with("SELECT") && !upper.contains("LIMIT") {
        format!("{query} LIMIT {limit}")
    } else {
        query.to_string()
    }
}

pub struct QueryToolHandler {
    connector: Arc<Connector>,
}

impl QueryToolHandler {
    pub fn new(connector: Arc<Connector>) -> Self {
        Self { connector }
    }

    pub async fn execute_query(&self, input: ExecuteQueryInput) -> ChResult<String> {
        let limit = input.limit.unwrap_or(self.connector.config().query_limit);
        let sql = apply_row_limit(&input.query, limit);

        let handle = self.connector.handle().await?;
        let result = handle.query(&sql).await?;

        let rows: Vec<Vec<String>> = result
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(i, value)| {
                        let type_name = result
                            .columns
                            .get(i)
                            .map(|c| c.type_name.as_str())
                            .unwrap_or_default();
                        render_value(value, type_name)
                    })
                    .collect()
            })
            .collect();

        info!(rows = rows.len(), "Query executed");

        Ok(format!(
            "Query executed successfully. Results:\n{}",
            serde_json::to_string_pretty(&rows)?
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_without_limit_gets_capped() {
        assert_eq!(
            apply_row_limit("SELECT * FROM t", 1000),
            "SELECT * FROM t LIMIT 1000"
        );
    }

    #[test]
    fn test_select_with_limit_is_unmodified() {
        assert_eq!(
            apply_row_limit("SELECT * FROM t LIMIT 50", 1000),
            "SELECT * FROM t LIMIT 50"
        );
    }

    #[test]
    fn test_non_select_is_never_capped() {
        assert_eq!(apply_row_limit("SHOW TABLES", 1000), "SHOW TABLES");
        assert_eq!(apply_row_limit("DESCRIBE t", 1000), "DESCRIBE t");
    }

    #[test]
    fn test_lowercase_select_gets_capped() {
        assert_eq!(
            apply_row_limit("select id from t", 10),
            "select id from t LIMIT 10"
        );
    }

    #[test]
    fn test_leading_whitespace_is_trimmed_for_detection() {
        assert_eq!(
            apply_row_limit("  SELECT 1", 5),
            "  SELECT 1 LIMIT 5"
        );
    }

    #[test]
    fn test_limit_in_subquery_suppresses_cap() {
        // Known false negative of the textual heuristic.
        let sql = "SELECT * FROM (SELECT id FROM t LIMIT 5)";
        assert_eq!(apply_row_limit(sql, 1000), sql);
    }

    #[test]
    fn test_limit_in_column_name_suppresses_cap() {
        // Another documented false negative.
        let sql = "SELECT rate_limit FROM quotas";
        assert_eq!(apply_row_limit(sql, 1000), sql);
    }

    #[test]
    fn test_select_with_order_by_gets_capped_after_order() {
        assert_eq!(
            apply_row_limit("SELECT id FROM t ORDER BY id", 100),
            "SELECT id FROM t ORDER BY id LIMIT 100"
        );
    }

    #[test]
    fn test_input_limit_is_optional() {
        let input: ExecuteQueryInput =
            serde_json::from_str(r#"{"query": "SELECT 1"}"#).unwrap();
        assert_eq!(input.query, "SELECT 1");
        assert!(input.limit.is_none());
    }

    #[test]
    fn test_input_with_limit() {
        let input: ExecuteQueryInput =
            serde_json::from_str(r#"{"query": "SELECT 1", "limit": 25}"#).unwrap();
        assert_eq!(input.limit, Some(25));
    }
}
