//! Configuration handling for the ClickHouse MCP Server.
//!
//! Two layers of configuration:
//! - [`ClickHouseConfig`]: the database endpoint, loaded once at startup
//!   from an optional JSON file and immutable afterwards.
//! - [`Config`]: server options (transport, logging) parsed from CLI
//!   arguments and environment variables.

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ChError, ChResult};

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_MCP_ENDPOINT: &str = "/";

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "CLICKHOUSE_CONFIG";
/// Fallback config file path when neither CLI nor env specify one.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

// ClickHouse connection defaults
pub const DEFAULT_CH_HOST: &str = "localhost";
pub const DEFAULT_CH_PORT: u16 = 8123;
pub const DEFAULT_CH_USERNAME: &str = "default";
pub const DEFAULT_CH_DATABASE: &str = "default";
pub const DEFAULT_QUERY_LIMIT: u64 = 1000;

/// ClickHouse connection configuration.
///
/// Every field has a default, so an absent config file yields a working
/// configuration for a local unsecured ClickHouse instance. A partial
/// file overrides only the fields it names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickHouseConfig {
    /// ClickHouse host
    pub host: String,
    /// ClickHouse HTTP interface port
    pub port: u16,
    /// Username for authentication
    pub username: String,
    /// Password for authentication (sensitive - not logged)
    pub password: String,
    /// Default database for tools that take an optional `database` argument
    pub database: String,
    /// Use TLS for the connection
    pub secure: bool,
    /// Verify TLS certificates (only relevant when `secure` is true)
    pub verify: bool,
    /// Request compressed responses from the server
    pub compress: bool,
    /// Default row cap applied to SELECT queries without a LIMIT clause
    pub query_limit: u64,
}

impl Default for ClickHouseConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CH_HOST.to_string(),
            port: DEFAULT_CH_PORT,
            username: DEFAULT_CH_USERNAME.to_string(),
            password: String::new(),
            database: DEFAULT_CH_DATABASE.to_string(),
            secure: false,
            verify: true,
            compress: true,
            query_limit: DEFAULT_QUERY_LIMIT,
        }
    }
}

impl ClickHouseConfig {
    /// Load configuration, resolving the file location.
    ///
    /// Priority: explicit path > `CLICKHOUSE_CONFIG` env var > `config.json`.
    /// A missing file is not an error; all defaults apply. A file that
    /// exists but cannot be read or parsed is a startup error.
    pub fn load(explicit: Option<PathBuf>) -> ChResult<Self> {
        let path = explicit
            .or_else(|| std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::from_path(&path)
    }

    /// Load configuration from a specific file path.
    pub fn from_path(path: &Path) -> ChResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|e| {
            ChError::config(format!("Failed to read {}: {e}", path.display()))
        })?;

        serde_json::from_str(&raw).map_err(|e| {
            ChError::config(format!("Malformed config file {}: {e}", path.display()))
        })
    }
}

/// Transport mode for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    /// Standard input/output (for CLI integration)
    #[default]
    Stdio,
    /// Streamable HTTP (for web clients)
    Http,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Configuration for the ClickHouse MCP Server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "clickhouse-mcp-server",
    about = "MCP server for ClickHouse - enables AI assistants to query and inspect ClickHouse databases",
    version,
    author
)]
pub struct Config {
    /// Path to the ClickHouse connection config file (JSON).
    /// Falls back to $CLICKHOUSE_CONFIG, then ./config.json.
    /// A missing file is fine; all fields have defaults.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Transport mode (stdio or http)
    #[arg(
        short,
        long,
        value_enum,
        default_value = "stdio",
        env = "MCP_TRANSPORT"
    )]
    pub transport: TransportMode,

    /// HTTP host to bind to (only used with http transport)
    #[arg(
        long,
        default_value = DEFAULT_HTTP_HOST,
        env = "MCP_HTTP_HOST"
    )]
    pub http_host: String,

    /// HTTP port to bind to (only used with http transport)
    #[arg(
        long,
        default_value_t = DEFAULT_HTTP_PORT,
        env = "MCP_HTTP_PORT"
    )]
    pub http_port: u16,

    /// MCP endpoint path (only used with http transport)
    #[arg(
        long,
        default_value = DEFAULT_MCP_ENDPOINT,
        env = "MCP_ENDPOINT"
    )]
    pub mcp_endpoint: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            config: None,
            transport: TransportMode::Stdio,
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            mcp_endpoint: DEFAULT_MCP_ENDPOINT.to_string(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }

    /// Get the HTTP bind address.
    pub fn http_bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.transport, TransportMode::Stdio);
        assert_eq!(config.http_host, DEFAULT_HTTP_HOST);
        assert_eq!(config.http_port, DEFAULT_HTTP_PORT);
        assert!(config.config.is_none());
    }

    #[test]
    fn test_http_bind_addr() {
        let config = Config {
            http_host: "0.0.0.0".to_string(),
            http_port: 3000,
            ..Config::default()
        };
        assert_eq!(config.http_bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_clickhouse_defaults_exact() {
        let config = ClickHouseConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 8123);
        assert_eq!(config.username, "default");
        assert_eq!(config.password, "");
        assert_eq!(config.database, "default");
        assert!(!config.secure);
        assert!(config.verify);
        assert!(config.compress);
        assert_eq!(config.query_limit, 1000);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config =
            ClickHouseConfig::from_path(Path::new("/nonexistent/clickhouse-config.json")).unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.query_limit, 1000);
    }

    #[test]
    fn test_partial_file_overrides_only_named_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"host": "clickhouse.internal", "port": 8443, "secure": true}}"#
        )
        .unwrap();

        let config = ClickHouseConfig::from_path(file.path()).unwrap();
        assert_eq!(config.host, "clickhouse.internal");
        assert_eq!(config.port, 8443);
        assert!(config.secure);
        // Untouched fields keep their defaults
        assert_eq!(config.username, "default");
        assert_eq!(config.database, "default");
        assert!(config.verify);
        assert!(config.compress);
        assert_eq!(config.query_limit, 1000);
    }

    #[test]
    fn test_full_file_overrides_everything() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "host": "ch.example.com",
                "port": 9000,
                "username": "reader",
                "password": "secret",
                "database": "analytics",
                "secure": true,
                "verify": false,
                "compress": false,
                "query_limit": 50
            }}"#
        )
        .unwrap();

        let config = ClickHouseConfig::from_path(file.path()).unwrap();
        assert_eq!(config.host, "ch.example.com");
        assert_eq!(config.port, 9000);
        assert_eq!(config.username, "reader");
        assert_eq!(config.password, "secret");
        assert_eq!(config.database, "analytics");
        assert!(config.secure);
        assert!(!config.verify);
        assert!(!config.compress);
        assert_eq!(config.query_limit, 50);
    }

    #[test]
    fn test_malformed_file_is_a_startup_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let err = ClickHouseConfig::from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("Malformed config file"));
    }

    #[test]
    fn test_transport_mode_display() {
        assert_eq!(TransportMode::Stdio.to_string(), "stdio");
        assert_eq!(TransportMode::Http.to_string(), "http");
    }
}
