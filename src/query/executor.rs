//! Request processing pipeline.
//!
//! Parses a request body, builds the statement, runs it on a connection to the
//! requested target and encodes the result. Malformed requests are rejected
//! before any connection is opened.

use std::sync::Arc;

use serde_json::{json, Value as JsonValue};
use tracing::{info, instrument, warn};

use super::{encode_result, OperationKind, QueryBuilder};
use crate::db::Connector;
use crate::error::Result;
use crate::request::QueryRequest;

/// Executes proxy operations against connections opened by a [`Connector`].
#[derive(Clone)]
pub struct QueryExecutor {
    connector: Arc<dyn Connector>,
    builder: QueryBuilder,
}

impl QueryExecutor {
    /// Creates a new query executor.
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            builder: QueryBuilder::new(),
        }
    }

    /// Processes a raw request body, returning `{"result": ...}` on success.
    pub async fn process(&self, kind: OperationKind, body: &str) -> Result<JsonValue> {
        let request = QueryRequest::parse(body)?;
        self.execute(kind, &request).await
    }

    /// Executes an already validated request.
    #[instrument(skip_all, fields(operation = %kind, entity = %request.target.entity))]
    pub async fn execute(&self, kind: OperationKind, request: &QueryRequest) -> Result<JsonValue> {
        let sql = self.builder.build(kind, request);
        info!("Connecting to {}", request.target.display_string());
        info!("Query constructed: {sql}");

        let client = self.connector.connect(&request.target).await?;
        let result = client.execute_query(&sql).await;
        if let Err(e) = client.close().await {
            warn!("Failed to close connection: {e}");
        }
        let result = result?;

        info!(
            "{kind} returned {} rows in {:?}",
            result.row_count(),
            result.execution_time
        );

        let value = encode_result(kind, &result)?;
        Ok(json!({ "result": value }))
    }
}
