//! Schema introspection tools.
//!
//! This module implements the `list_databases`, `list_tables`, and
//! `get_table_schema` MCP tools.

use crate::client::Connector;
use crate::error::ChResult;
use crate::tools::format::render_value;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Input for the list_tables tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTablesInput {
    /// Database name (optional, uses default if not specified)
    #[serde(default)]
    pub database: Option<String>,
}

/// Input for the get_table_schema tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TableSchemaInput {
    /// Table name
    pub table: String,
    /// Database name (optional, uses default if not specified)
    #[serde(default)]
    pub database: Option<String>,
}

/// One column of a DESCRIBE result. Field declaration order matches the
/// column order ClickHouse returns, and serde preserves it in the JSON
/// output.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub default_type: String,
    pub default_expression: String,
    pub comment: String,
    pub codec_expression: String,
    pub ttl_expression: String,
}

pub struct SchemaToolHandler {
    connector: Arc<Connector>,
}

impl SchemaToolHandler {
    pub fn new(connector: Arc<Connector>) -> Self {
        Self { connector }
    }

    fn default_database(&self, database: Option<String>) -> String {
        database.unwrap_or_else(|| self.connector.config().database.clone())
    }

    pub async fn list_databases(&self) -> ChResult<String> {
        let handle = self.connector.handle().await?;
        let result = handle.query("SHOW DATABASES").await?;

        let databases: Vec<String> = result
            .rows
            .iter()
            .filter_map(|row| row.first())
            .map(|value| render_value(value, "String"))
            .collect();

        info!(count = databases.len(), "Listed databases");

        Ok(format!("Available databases: {}", databases.join(", ")))
    }

    pub async fn list_tables(&self, input: ListTablesInput) -> ChResult<String> {
        let database = self.default_database(input.database);
        let handle = self.connector.handle().await?;

        // Context selection and the statement that depends on it form one
        // critical section on the shared session.
        let _ctx = handle.lock_context().await;
        handle.select_database(&database).await?;
        let result = handle.query("SHOW TABLES").await?;

        let tables: Vec<String> = result
            .rows
            .iter()
            .filter_map(|row| row.first())
            .map(|value| render_value(value, "String"))
            .collect();

        info!(database = %database, count = tables.len(), "Listed tables");

        Ok(format!(
            "Tables in database '{database}': {}",
            tables.join(", ")
        ))
    }

    pub async fn get_table_schema(&self, input: TableSchemaInput) -> ChResult<String> {
        let database = self.default_database(input.database);
        let table = input.table;
        let handle = self.connector.handle().await?;

        let _ctx = handle.lock_context().await;
        handle.select_database(&database).await?;
        let result = handle.query(&format!("DESCRIBE {table}")).await?;

        let cell = |row: &[serde_json::Value], i: usize| -> String {
            let type_name = result
                .columns
                .get(i)
                .map(|c| c.type_name.as_str())
                .unwrap_or_default();
            row.get(i)
                .map(|v| render_value(v, type_name))
                .unwrap_or_default()
        };

        let schema: Vec<ColumnSchema> = result
            .rows
            .iter()
            .map(|row| ColumnSchema {
                name: cell(row, 0),
                type_name: cell(row, 1),
                default_type: cell(row, 2),
                default_expression: cell(row, 3),
                comment: cell(row, 4),
                codec_expression: cell(row, 5),
                ttl_expression: cell(row, 6),
            })
            .collect();

        info!(database = %database, table = %table, columns = schema.len(), "Described table");

        Ok(format!(
            "Schema for table '{table}':\n{}",
            serde_json::to_string_pretty(&schema)?
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_tables_input_database_is_optional() {
        let input: ListTablesInput = serde_json::from_str("{}").unwrap();
        assert!(input.database.is_none());

        let input: ListTablesInput =
            serde_json::from_str(r#"{"database": "analytics"}"#).unwrap();
        assert_eq!(input.database.as_deref(), Some("analytics"));
    }

    #[test]
    fn test_table_schema_input_requires_table() {
        assert!(serde_json::from_str::<TableSchemaInput>("{}").is_err());

        let input: TableSchemaInput =
            serde_json::from_str(r#"{"table": "events"}"#).unwrap();
        assert_eq!(input.table, "events");
        assert!(input.database.is_none());
    }

    #[test]
    fn test_column_schema_serializes_seven_fields_in_order() {
        let column = ColumnSchema {
            name: "id".to_string(),
            type_name: "UInt64".to_string(),
            default_type: String::new(),
            default_expression: String::new(),
            comment: String::new(),
            codec_expression: String::new(),
            ttl_expression: String::new(),
        };

        let json = serde_json::to_string(&column).unwrap();
        let name_pos = json.find("\"name\"").unwrap();
        let type_pos = json.find("\"type\"").unwrap();
        let default_type_pos = json.find("\"default_type\"").unwrap();
        let ttl_pos = json.find("\"ttl_expression\"").unwrap();
        assert!(name_pos < type_pos);
        assert!(type_pos < default_type_pos);
        assert!(default_type_pos < ttl_pos);
    }
}
