//! ClickHouse MCP Server Library
//!
//! This library provides MCP (Model Context Protocol) tools for AI
//! assistants to interact with a ClickHouse database: listing databases
//! and tables, describing schemas, running queries with automatic row
//! capping, and bulk-inserting rows.

pub mod client;
pub mod config;
pub mod error;
pub mod mcp;
pub mod tools;
pub mod transport;

pub use client::Connector;
pub use config::{ClickHouseConfig, Config};
pub use error::ChError;
pub use mcp::ClickHouseService;
