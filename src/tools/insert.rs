//! Data insertion tool.
//!
//! This module implements the `insert_data` MCP tool: select the target
//! database context, bulk-insert the given rows verbatim, and report the
//! row count.

use crate::client::{Connector, RowMap};
use crate::error::ChResult;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Input for the insert_data tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct InsertDataInput {
    /// Table name
    pub table: String,
    /// Database name (optional, uses default if not specified)
    #[serde(default)]
    pub database: Option<String>,
    /// Array of data rows to insert
    pub data: Vec<RowMap>,
}

pub struct InsertToolHandler {
    connector: Arc<Connector>,
}

impl InsertToolHandler {
    pub fn new(connector: Arc<Connector>) -> Self {
        Self { connector }
    }

    pub async fn insert_data(&self, input: InsertDataInput) -> ChResult<String> {
        let database = input
            .database
            .unwrap_or_else(|| self.connector.config().database.clone());
        let handle = self.connector.handle().await?;

        let _ctx = handle.lock_context().await;
        handle.select_database(&database).await?;
        handle.insert(&input.table, &input.data).await?;

        info!(
            database = %database,
            table = %input.table,
            rows = input.data.len(),
            "Inserted rows"
        );

        Ok(format!(
            "Successfully inserted {} rows into table '{}'",
            input.data.len(),
            input.table
        ))
    }
}
