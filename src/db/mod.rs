//! Database abstraction layer for adls-proxy.
//!
//! Provides a trait-based interface for executing statements, so the
//! orchestrator can run against the TDS client in production and an in-memory
//! mock in tests.

mod mock;
mod mssql;
mod types;

pub use mock::{FailingConnector, MockConnector, MockDatabaseClient};
pub use mssql::{MssqlClient, MssqlConnector};
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::error::Result;
use crate::request::Target;
use async_trait::async_trait;

/// Trait defining the interface for database clients.
///
/// All database operations are async and return Results with ProxyError.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Executes a SQL statement and returns its first result set.
    async fn execute_query(&self, sql: &str) -> Result<QueryResult>;

    /// Closes the database connection.
    async fn close(&self) -> Result<()>;
}

/// Opens database clients for request targets.
///
/// The server and database come from each request, so connections are opened
/// per request rather than once at startup.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connects to the target's server and database.
    async fn connect(&self, target: &Target) -> Result<Box<dyn DatabaseClient>>;
}
