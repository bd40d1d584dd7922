//! Lazy connection management.
//!
//! The connector owns the finalized [`ClickHouseConfig`] and produces the
//! single shared [`Handle`] on first use. Creation failures are not
//! cached: a tool call that fails to connect leaves the connector empty,
//! and the next call attempts creation again from scratch.

use crate::client::{ChClient, Handle, HttpClient};
use crate::config::ClickHouseConfig;
use crate::error::ChResult;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

pub struct Connector {
    config: ClickHouseConfig,
    handle: OnceCell<Arc<Handle>>,
}

impl Connector {
    /// Create a connector. No network activity happens until the first
    /// call to [`Connector::handle`].
    pub fn new(config: ClickHouseConfig) -> Self {
        Self {
            config,
            handle: OnceCell::new(),
        }
    }

    /// Create a connector pre-seeded with an existing client, bypassing
    /// lazy creation. Used by tests to inject a mock driver.
    pub fn with_client(config: ClickHouseConfig, client: Arc<dyn ChClient>) -> Self {
        let handle = OnceCell::new();
        let _ = handle.set(Arc::new(Handle::new(client)));
        Self { config, handle }
    }

    /// The finalized connection configuration.
    pub fn config(&self) -> &ClickHouseConfig {
        &self.config
    }

    /// Get the shared session handle, creating it on first call.
    ///
    /// Every call after a successful creation returns the same handle.
    /// If creation fails the error propagates and nothing is cached, so
    /// the next call retries.
    pub async fn handle(&self) -> ChResult<Arc<Handle>> {
        let handle = self
            .handle
            .get_or_try_init(|| async {
                info!(
                    host = %self.config.host,
                    port = self.config.port,
                    database = %self.config.database,
                    secure = self.config.secure,
                    "Opening ClickHouse session"
                );
                let client = HttpClient::connect(&self.config).await?;
                Ok::<_, crate::error::ChError>(Arc::new(Handle::new(Arc::new(client))))
            })
            .await?;
        Ok(handle.clone())
    }
}
