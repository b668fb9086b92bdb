//! Mock database clients for testing.
//!
//! Provides in-memory connectors that return a canned result set and record
//! every statement and target they see.

use super::{Connector, DatabaseClient, QueryResult};
use crate::error::{ProxyError, Result};
use crate::request::Target;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

type Log<T> = Arc<Mutex<Vec<T>>>;

fn push<T>(log: &Log<T>, item: T) {
    log.lock().unwrap_or_else(|e| e.into_inner()).push(item);
}

fn snapshot<T: Clone>(log: &Log<T>) -> Vec<T> {
    log.lock().unwrap_or_else(|e| e.into_inner()).clone()
}

/// A mock database client that returns a predefined result.
pub struct MockDatabaseClient {
    result: QueryResult,
    query_error: Option<String>,
    statements: Log<String>,
}

impl MockDatabaseClient {
    /// Creates a client that answers every statement with `result`.
    pub fn new(result: QueryResult) -> Self {
        Self {
            result,
            query_error: None,
            statements: Arc::default(),
        }
    }

    /// Returns the statements executed so far.
    pub fn statements(&self) -> Vec<String> {
        snapshot(&self.statements)
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        push(&self.statements, sql.to_string());
        match &self.query_error {
            Some(msg) => Err(ProxyError::query(msg.clone())),
            None => Ok(self.result.clone()),
        }
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A connector whose clients all share one canned result and one statement log.
#[derive(Clone, Default)]
pub struct MockConnector {
    result: QueryResult,
    query_error: Option<String>,
    statements: Log<String>,
    targets: Log<Target>,
}

impl MockConnector {
    /// Creates a connector whose clients return `result`.
    pub fn new(result: QueryResult) -> Self {
        Self {
            result,
            ..Default::default()
        }
    }

    /// Creates a connector whose clients fail every statement with `message`.
    pub fn failing_query(message: impl Into<String>) -> Self {
        Self {
            query_error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Returns the statements executed so far, across all clients.
    pub fn statements(&self) -> Vec<String> {
        snapshot(&self.statements)
    }

    /// Returns the targets connected to so far.
    pub fn targets(&self) -> Vec<Target> {
        snapshot(&self.targets)
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, target: &Target) -> Result<Box<dyn DatabaseClient>> {
        push(&self.targets, target.clone());
        Ok(Box::new(MockDatabaseClient {
            result: self.result.clone(),
            query_error: self.query_error.clone(),
            statements: Arc::clone(&self.statements),
        }))
    }
}

/// A connector that always fails to connect.
pub struct FailingConnector {
    message: String,
}

impl FailingConnector {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl Connector for FailingConnector {
    async fn connect(&self, _target: &Target) -> Result<Box<dyn DatabaseClient>> {
        Err(ProxyError::connection(self.message.clone()))
    }
}
