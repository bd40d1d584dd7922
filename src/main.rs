//! ClickHouse MCP Server - Main entry point.
//!
//! This server provides MCP (Model Context Protocol) tools for AI
//! assistants to interact with a ClickHouse database.

use clap::Parser;
use clickhouse_mcp_server::client::Connector;
use clickhouse_mcp_server::config::{ClickHouseConfig, Config, TransportMode};
use clickhouse_mcp_server::transport::{HttpTransport, StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse server options from command line and environment
    let config = Config::parse();

    init_tracing(&config);

    info!(
        transport = %config.transport,
        "Starting ClickHouse MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load the connection configuration. A missing file means defaults;
    // a malformed file fails startup here.
    let ch_config = ClickHouseConfig::load(config.config.clone())?;
    info!(
        host = %ch_config.host,
        port = ch_config.port,
        database = %ch_config.database,
        "Loaded ClickHouse configuration"
    );

    // The connector creates the session lazily on the first tool call.
    let connector = Arc::new(Connector::new(ch_config));

    let result = match config.transport {
        TransportMode::Stdio => {
            info!("Using stdio transport");
            let transport = StdioTransport::new(connector);
            transport.run().await
        }
        TransportMode::Http => {
            info!(
                host = %config.http_host,
                port = config.http_port,
                endpoint = %config.mcp_endpoint,
                "Using HTTP transport"
            );
            let transport = HttpTransport::new(
                connector,
                &config.http_host,
                config.http_port,
                &config.mcp_endpoint,
            );
            transport.run().await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
