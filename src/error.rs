//! Error types for adls-proxy.
//!
//! Defines the main error enum used throughout the proxy, and the two-tier
//! classification (bad request vs. internal failure) the HTTP layer maps to
//! status codes.

use thiserror::Error;

/// Main error type for proxy operations.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The request document is malformed. The message is returned to the
    /// caller verbatim.
    #[error("{0}")]
    MalformedRequest(String),

    /// Database connection errors (host unreachable, TLS failure, login failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Access token acquisition errors.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Query execution errors (syntax errors, invalid objects, timeouts, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// The backend returned a result set of an unexpected shape.
    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),

    /// Configuration errors (invalid config file, missing credentials, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// How an error is surfaced to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Client-caused; the message is safe to return.
    BadRequest,
    /// Everything else; details stay in the log.
    Internal,
}

impl ProxyError {
    /// Creates a malformed request error with the given message.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRequest(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates an authentication error with the given message.
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates an unexpected result error with the given message.
    pub fn unexpected_result(msg: impl Into<String>) -> Self {
        Self::UnexpectedResult(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for log output.
    pub fn category(&self) -> &'static str {
        match self {
            Self::MalformedRequest(_) => "Malformed Request",
            Self::Connection(_) => "Connection Error",
            Self::Auth(_) => "Authentication Error",
            Self::Query(_) => "Query Error",
            Self::UnexpectedResult(_) => "Unexpected Result",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns how this error is surfaced to the client.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::MalformedRequest(_) => ErrorClass::BadRequest,
            _ => ErrorClass::Internal,
        }
    }
}

/// Result type alias using ProxyError.
pub type Result<T> = std::result::Result<T, ProxyError>;
