//! MCP service implementation using rmcp.
//!
//! This module defines the ClickHouseService with all five tools exposed
//! via the MCP protocol using the rmcp framework's macros.
//!
//! Every tool returns a plain text response for both success and failure:
//! a fault of any kind (driver error, missing or ill-typed argument,
//! network fault) is converted to `"Error <operation>: <message>"` text
//! rather than an MCP protocol error. Callers distinguish outcomes by
//! inspecting the text. Arguments deserialize through [`LenientInput`]
//! so argument faults reach the envelope instead of failing parameter
//! extraction.

use crate::client::Connector;
use crate::error::{ChError, ChResult};
use crate::mcp::arguments::LenientInput;
use crate::tools::insert::{InsertDataInput, InsertToolHandler};
use crate::tools::query::{ExecuteQueryInput, QueryToolHandler};
use crate::tools::schema::{ListTablesInput, SchemaToolHandler, TableSchemaInput};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
};
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct ClickHouseService {
    /// Shared connector owning the lazily-created session handle
    connector: Arc<Connector>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl ClickHouseService {
    /// Create a new ClickHouseService instance.
    pub fn new(connector: Arc<Connector>) -> Self {
        Self {
            connector,
            tool_router: Self::tool_router(),
        }
    }

    /// The tools this service advertises to MCP clients.
    pub fn advertised_tools(&self) -> Vec<rmcp::model::Tool> {
        self.tool_router.list_all()
    }

    /// Wrap a tool outcome in the uniform text envelope. Failures become
    /// successful text responses with an "Error ..." prefix.
    fn envelope(outcome: ChResult<String>, operation: &str) -> CallToolResult {
        CallToolResult::success(vec![Content::text(envelope_text(outcome, operation))])
    }

    /// Unwrap a lenient input, mapping an argument fault into the error
    /// the envelope renders.
    fn validated<T>(input: LenientInput<T>) -> ChResult<T> {
        input.into_result().map_err(ChError::invalid_input)
    }
}

/// The text delivered to callers for a tool outcome. Success passes the
/// tool's text through; any fault becomes `"Error <operation>: <message>"`.
pub fn envelope_text(outcome: ChResult<String>, operation: &str) -> String {
    match outcome {
        Ok(text) => text,
        Err(e) => {
            warn!(operation = %operation, error = %e, "Tool operation failed");
            format!("Error {operation}: {e}")
        }
    }
}

#[tool_router]
impl ClickHouseService {
    #[tool(description = "List all databases in ClickHouse")]
    pub async fn list_databases(&self) -> Result<CallToolResult, McpError> {
        let handler = SchemaToolHandler::new(self.connector.clone());
        Ok(Self::envelope(
            handler.list_databases().await,
            "listing databases",
        ))
    }

    #[tool(description = "List tables in a specific database")]
    pub async fn list_tables(
        &self,
        Parameters(input): Parameters<LenientInput<ListTablesInput>>,
    ) -> Result<CallToolResult, McpError> {
        let handler = SchemaToolHandler::new(self.connector.clone());
        let outcome = match Self::validated(input) {
            Ok(input) => handler.list_tables(input).await,
            Err(e) => Err(e),
        };
        Ok(Self::envelope(outcome, "listing tables"))
    }

    #[tool(description = "Get schema information for a specific table")]
    pub async fn get_table_schema(
        &self,
        Parameters(input): Parameters<LenientInput<TableSchemaInput>>,
    ) -> Result<CallToolResult, McpError> {
        let handler = SchemaToolHandler::new(self.connector.clone());
        let outcome = match Self::validated(input) {
            Ok(input) => handler.get_table_schema(input).await,
            Err(e) => Err(e),
        };
        Ok(Self::envelope(outcome, "getting table schema"))
    }

    #[tool(description = "Execute a SQL query")]
    pub async fn execute_query(
        &self,
        Parameters(input): Parameters<LenientInput<ExecuteQueryInput>>,
    ) -> Result<CallToolResult, McpError> {
        let handler = QueryToolHandler::new(self.connector.clone());
        let outcome = match Self::validated(input) {
            Ok(input) => handler.execute_query(input).await,
            Err(e) => Err(e),
        };
        Ok(Self::envelope(outcome, "executing query"))
    }

    #[tool(description = "Insert data into a table")]
    pub async fn insert_data(
        &self,
        Parameters(input): Parameters<LenientInput<InsertDataInput>>,
    ) -> Result<CallToolResult, McpError> {
        let handler = InsertToolHandler::new(self.connector.clone());
        let outcome = match Self::validated(input) {
            Ok(input) => handler.insert_data(input).await,
            Err(e) => Err(e),
        };
        Ok(Self::envelope(outcome, "inserting data"))
    }
}

#[tool_handler]
impl ServerHandler for ClickHouseService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "clickhouse-mcp-server".to_owned(),
                title: Some("ClickHouse MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Tools for querying and inspecting a ClickHouse database.\n\
                \n\
                - `list_databases`: list all databases on the server\n\
                - `list_tables`: list tables (optional `database`, defaults to the configured one)\n\
                - `get_table_schema`: describe a table's columns\n\
                - `execute_query`: run SQL; SELECTs without a LIMIT are capped automatically\n\
                - `insert_data`: bulk-insert an array of row objects into a table\n\
                \n\
                All tools respond with text. A response starting with \"Error\" indicates\n\
                the operation failed; the remainder of the text carries the fault message."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClickHouseConfig;

    fn create_test_service() -> ClickHouseService {
        let connector = Arc::new(Connector::new(ClickHouseConfig::default()));
        ClickHouseService::new(connector)
    }

    #[test]
    fn test_service_creation() {
        let _service = create_test_service();
    }

    #[test]
    fn test_server_info() {
        let service = create_test_service();
        let info = service.get_info();
        assert_eq!(info.server_info.name, "clickhouse-mcp-server");
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.is_some());
    }

    #[test]
    fn test_envelope_success_passes_text_through() {
        let text = envelope_text(Ok("Available databases: default".into()), "listing databases");
        assert_eq!(text, "Available databases: default");
    }

    #[test]
    fn test_envelope_failure_prefixes_error() {
        let outcome = Err(crate::error::ChError::connection("refused"));
        let text = envelope_text(outcome, "listing databases");
        assert!(text.starts_with("Error listing databases:"));
        assert!(text.contains("refused"));
    }

    #[test]
    fn test_missing_required_argument_becomes_envelope_text() {
        let input: LenientInput<TableSchemaInput> =
            serde_json::from_value(serde_json::json!({})).unwrap();
        let outcome = ClickHouseService::validated(input).map(|_| String::new());
        let text = envelope_text(outcome, "getting table schema");
        assert!(text.starts_with("Error getting table schema:"));
        assert!(text.contains("table"));
    }

    #[test]
    fn test_ill_typed_argument_becomes_envelope_text() {
        let input: LenientInput<ExecuteQueryInput> =
            serde_json::from_value(serde_json::json!({"query": 42})).unwrap();
        let outcome = ClickHouseService::validated(input).map(|_| String::new());
        let text = envelope_text(outcome, "executing query");
        assert!(text.starts_with("Error executing query:"));
    }
}
