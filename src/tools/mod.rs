//! MCP tool implementations.
//!
//! This module contains all ClickHouse tool handlers:
//! - `list_databases`: List all databases
//! - `list_tables`: List tables in a database
//! - `get_table_schema`: Describe a table's columns
//! - `execute_query`: Run a SQL query with automatic row capping
//! - `insert_data`: Bulk-insert rows into a table
//! - `format`: Textual rendering of result values

pub mod format;
pub mod insert;
pub mod query;
pub mod schema;

pub use insert::{InsertDataInput, InsertToolHandler};
pub use query::{ExecuteQueryInput, QueryToolHandler, apply_row_limit};
pub use schema::{ColumnSchema, ListTablesInput, SchemaToolHandler, TableSchemaInput};
