//! MCP protocol layer.
//!
//! Contains the ClickHouseService that exposes database tools via rmcp.

pub mod arguments;
pub mod service;

pub use arguments::LenientInput;
pub use service::{ClickHouseService, envelope_text};
