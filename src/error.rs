//! Error types for the ClickHouse MCP Server.
//!
//! This module defines all error types using `thiserror`. Errors carry a
//! plain message; the MCP service layer converts them into the textual
//! "Error ..." response envelope at the boundary, so tool callers always
//! receive a well-formed text response rather than a protocol fault.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Connection failed: {message}")]
    Connection { message: String },

    /// A statement was rejected or failed on the ClickHouse server.
    /// Displays as the raw server message so the envelope text matches
    /// what the database reported.
    #[error("{message}")]
    Query { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ChError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error carrying the server's message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ChError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            ChError::connection(err.to_string())
        } else if err.is_decode() {
            ChError::internal(format!("Failed to decode server response: {err}"))
        } else {
            ChError::query(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ChError {
    fn from(err: serde_json::Error) -> Self {
        ChError::internal(format!("JSON serialization failed: {err}"))
    }
}

/// Result type alias for ClickHouse operations.
pub type ChResult<T> = Result<T, ChError>;
