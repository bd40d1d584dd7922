//! ClickHouse client layer.
//!
//! This module owns everything that talks to the database:
//! - [`ChClient`]: the driver seam, four operations consumed by the tools
//! - [`HttpClient`]: the real driver over the ClickHouse HTTP interface
//! - [`Handle`]: one live session, shared by every tool invocation
//! - [`Connector`]: lazy creation and caching of the single handle

pub mod connector;
pub mod http;

pub use connector::Connector;
pub use http::HttpClient;

use crate::error::ChResult;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::{Mutex, MutexGuard};

/// A single row to insert, as a column-name to value mapping.
pub type RowMap = serde_json::Map<String, JsonValue>;

/// Column metadata as reported by the server alongside query results.
#[derive(Debug, Clone)]
pub struct ColumnMeta {
    pub name: String,
    /// ClickHouse type string, e.g. "UInt64", "Nullable(DateTime)"
    pub type_name: String,
}

/// Rows returned by a query, with no schema known in advance.
#[derive(Debug, Clone, Default)]
pub struct QueryRows {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Vec<JsonValue>>,
}

/// The driver seam: the four operations the dispatcher needs from a
/// ClickHouse client. The real implementation is [`HttpClient`]; tests
/// substitute a recording mock.
#[async_trait]
pub trait ChClient: Send + Sync {
    /// Execute a statement that returns rows.
    async fn query(&self, sql: &str) -> ChResult<QueryRows>;

    /// Execute a statement without a row result (USE, DDL).
    async fn command(&self, sql: &str) -> ChResult<()>;

    /// Bulk-insert rows into a table in the current database context.
    async fn insert(&self, table: &str, rows: &[RowMap]) -> ChResult<()>;
}

/// One live session to ClickHouse, reused for the process lifetime.
///
/// The handle is never closed, never health-checked, and never recreated
/// after its first successful creation. The context mutex serializes
/// "USE + statement" sequences so concurrent dispatches on the shared
/// session cannot observe each other's database context.
pub struct Handle {
    client: std::sync::Arc<dyn ChClient>,
    context: Mutex<()>,
}

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle").finish_non_exhaustive()
    }
}

impl Handle {
    pub fn new(client: std::sync::Arc<dyn ChClient>) -> Self {
        Self {
            client,
            context: Mutex::new(()),
        }
    }

    /// Acquire the context lock. Hold the guard across a `USE` and the
    /// statement that depends on it.
    pub async fn lock_context(&self) -> MutexGuard<'_, ()> {
        self.context.lock().await
    }

    /// Select the database context for subsequent statements on this
    /// session. Callers switching context must hold the context lock.
    pub async fn select_database(&self, database: &str) -> ChResult<()> {
        self.client.command(&format!("USE {database}")).await
    }

    pub async fn query(&self, sql: &str) -> ChResult<QueryRows> {
        self.client.query(sql).await
    }

    pub async fn command(&self, sql: &str) -> ChResult<()> {
        self.client.command(sql).await
    }

    pub async fn insert(&self, table: &str, rows: &[RowMap]) -> ChResult<()> {
        self.client.insert(table, rows).await
    }
}
