//! HTTP surface tests.
//!
//! Serves the router on an ephemeral local port backed by the mock connector
//! and drives it with a real HTTP client.

use std::net::SocketAddr;
use std::sync::Arc;

use adls_proxy::db::{ColumnInfo, Connector, FailingConnector, MockConnector, QueryResult, Value};
use adls_proxy::query::QueryExecutor;
use adls_proxy::server::{self, AppState, INTERNAL_ERROR_MESSAGE};
use pretty_assertions::assert_eq;
use reqwest::{header, StatusCode};
use serde_json::json;
use tokio::net::TcpListener;

const LEDGER_REQUEST: &str = r#"{
    "server": "myendpoint-ondemand.sql.azuresynapse.net",
    "database": "db",
    "entity": "custledgerentry_21",
    "fields": ["EntryNo-1", "PostingDate-4"],
    "filters": [
        {"op": "GreaterThanOrEquals", "field": "CustomerNo-3", "value": "40000"},
        {"op": "LessThan", "field": "EntryNo-1", "value": 1559}
    ],
    "orderBy": [{"field": "PostingDate-4", "ascending": false}, {"field": "EntryNo-1"}]
}"#;

/// Starts the proxy on 127.0.0.1 with an OS-assigned port.
async fn spawn_app(connector: Arc<dyn Connector>) -> SocketAddr {
    let state = AppState {
        executor: QueryExecutor::new(connector),
    };
    let app = server::router(state, "/api");

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn post(connector: Arc<dyn Connector>, path: &str, body: &str) -> (StatusCode, String, String) {
    let addr = spawn_app(connector).await;
    let response = reqwest::Client::new()
        .post(format!("http://{addr}{path}"))
        .body(body.to_string())
        .send()
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    (status, content_type, response.text().await.unwrap())
}

#[tokio::test]
async fn test_find_set_returns_rows() {
    let connector = MockConnector::new(QueryResult::with_data(
        vec![
            ColumnInfo::new("EntryNo-1"),
            ColumnInfo::new("PostingDate-4"),
        ],
        vec![
            vec![Value::Int(1001), Value::Null],
            vec![Value::Int(1002), Value::from("x")],
        ],
    ));
    let (status, content_type, body) =
        post(Arc::new(connector.clone()), "/api/FindSet", LEDGER_REQUEST).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "text/json; charset=utf-8");
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        body,
        json!({"result": [
            {"EntryNo-1": 1001, "PostingDate-4": null},
            {"EntryNo-1": 1002, "PostingDate-4": "x"}
        ]})
    );
    assert_eq!(
        connector.statements(),
        vec![
            "SELECT [EntryNo-1],[PostingDate-4] FROM [db].[dbo].[custledgerentry_21] \
             WHERE [CustomerNo-3] >= '40000' AND [EntryNo-1] < 1559 \
             ORDER BY [PostingDate-4] DESC,[EntryNo-1] ASC;"
        ]
    );
}

#[tokio::test]
async fn test_count_route() {
    let connector = MockConnector::new(QueryResult::scalar(42));
    let (status, _, body) = post(Arc::new(connector.clone()), "/api/Count", LEDGER_REQUEST).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<serde_json::Value>(&body).unwrap(), json!({"result": 42}));
    assert_eq!(
        connector.statements(),
        vec![
            "SELECT COUNT(*) FROM [db].[dbo].[custledgerentry_21] \
             WHERE [CustomerNo-3] >= '40000' AND [EntryNo-1] < 1559;"
        ]
    );
}

#[tokio::test]
async fn test_is_empty_route() {
    let connector = MockConnector::new(QueryResult::scalar(5));
    let (status, _, body) =
        post(Arc::new(connector.clone()), "/api/IsEmpty", LEDGER_REQUEST).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<serde_json::Value>(&body).unwrap(), json!({"result": false}));
    assert!(connector.statements()[0].starts_with("IF EXISTS (SELECT TOP 1 1 FROM"));
}

#[tokio::test]
async fn test_malformed_request_is_bad_request() {
    let connector = MockConnector::new(QueryResult::scalar(1));
    let (status, content_type, body) = post(
        Arc::new(connector.clone()),
        "/api/FindSet",
        r#"{"database": "db", "entity": "t"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(content_type, "text/plain; charset=utf-8");
    assert_eq!(body, "Bad or missing SQL endpoint.");
    assert!(connector.statements().is_empty());
}

#[tokio::test]
async fn test_bad_operator_message_names_clause() {
    let (status, _, body) = post(
        Arc::new(MockConnector::default()),
        "/api/Count",
        r#"{"server": "s", "database": "db", "entity": "t",
            "filters": [{"op": "Between", "field": "No", "value": 1}]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with("Bad operator passed in the filter"));
    assert!(body.contains("Between"));
}

#[tokio::test]
async fn test_invalid_json_is_bad_request() {
    let (status, _, body) = post(Arc::new(MockConnector::default()), "/api/Count", "{").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Body in the request must be in the correct JSON format.");
}

#[tokio::test]
async fn test_backend_failure_is_opaque() {
    let (status, content_type, body) = post(
        Arc::new(FailingConnector::new("Login failed for user '<token-identified principal>'")),
        "/api/FindSet",
        LEDGER_REQUEST,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(content_type, "text/plain; charset=utf-8");
    assert_eq!(body, INTERNAL_ERROR_MESSAGE);
    assert!(!body.contains("Login failed"));
}

#[tokio::test]
async fn test_query_failure_is_opaque() {
    let (status, _, body) = post(
        Arc::new(MockConnector::failing_query("Invalid column name 'Nope'.")),
        "/api/Count",
        LEDGER_REQUEST,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, INTERNAL_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_get_is_not_allowed() {
    let addr = spawn_app(Arc::new(MockConnector::default())).await;
    let response = reqwest::get(format!("http://{addr}/api/FindSet")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_healthz() {
    let addr = spawn_app(Arc::new(MockConnector::default())).await;
    let response = reqwest::get(format!("http://{addr}/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.json::<serde_json::Value>().await.unwrap(),
        json!({"status": "ok"})
    );
}
