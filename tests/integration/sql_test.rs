//! Generated SQL tests.
//!
//! Builds statements from request documents and checks them against the exact
//! expected text and, where the parser supports it, the MS SQL grammar.

use adls_proxy::query::{OperationKind, QueryBuilder};
use adls_proxy::request::QueryRequest;
use pretty_assertions::assert_eq;
use serde_json::json;
use sqlparser::dialect::MsSqlDialect;
use sqlparser::parser::Parser;

fn build(kind: OperationKind, request: serde_json::Value) -> String {
    let request = QueryRequest::from_json(&request).unwrap();
    QueryBuilder::new().build(kind, &request)
}

fn assert_parses(sql: &str) {
    let statements = Parser::parse_sql(&MsSqlDialect {}, sql)
        .unwrap_or_else(|e| panic!("Failed to parse {sql}: {e}"));
    assert_eq!(statements.len(), 1);
}

#[test]
fn test_ledger_example() {
    let sql = build(
        OperationKind::FindSet,
        json!({
            "server": "s",
            "database": "db",
            "entity": "custledgerentry_21",
            "filters": [{"op": "GreaterThanOrEquals", "field": "CustomerNo-3", "value": "40000"}],
            "orderBy": [{"field": "EntryNo-1"}]
        }),
    );

    assert_eq!(
        sql,
        "SELECT * FROM [db].[dbo].[custledgerentry_21] WHERE [CustomerNo-3] >= '40000' ORDER BY [EntryNo-1] ASC;"
    );
    assert_parses(&sql);
}

#[test]
fn test_mixed_value_types() {
    let sql = build(
        OperationKind::FindSet,
        json!({
            "server": "s",
            "database": "db",
            "entity": "item_27",
            "fields": ["No-1", "Description-3", "UnitPrice-18"],
            "filters": [
                {"op": "equals", "field": "Blocked-54", "value": false},
                {"op": "LESSTHANOREQUALS", "field": "UnitPrice-18", "value": 99.5},
                {"op": "NotEquals", "field": "LastDateModified-62", "value": "2021-03-23T00:00:00"}
            ]
        }),
    );

    assert_eq!(
        sql,
        "SELECT [No-1],[Description-3],[UnitPrice-18] FROM [db].[dbo].[item_27] \
         WHERE [Blocked-54] = 0 AND [UnitPrice-18] <= 99.5 AND [LastDateModified-62] != '2021-03-23T00:00:00';"
    );
    assert_parses(&sql);
}

#[test]
fn test_count_parses() {
    let sql = build(
        OperationKind::Count,
        json!({
            "server": "s",
            "database": "db",
            "entity": "custledgerentry_21",
            "fields": ["EntryNo-1"],
            "filters": [{"op": "GreaterThan", "field": "EntryNo-1", "value": 10}],
            "orderBy": [{"field": "EntryNo-1", "ascending": false}]
        }),
    );

    assert_eq!(
        sql,
        "SELECT COUNT(*) FROM [db].[dbo].[custledgerentry_21] WHERE [EntryNo-1] > 10;"
    );
    assert_parses(&sql);
}

#[test]
fn test_is_empty_text() {
    let sql = build(
        OperationKind::IsEmpty,
        json!({"server": "s", "database": "db", "entity": "custledgerentry_21", "filters": []}),
    );

    assert_eq!(
        sql,
        "IF EXISTS (SELECT TOP 1 1 FROM [db].[dbo].[custledgerentry_21]) SELECT 0 ELSE SELECT 1;"
    );
}

#[test]
fn test_empty_sections_render_nothing() {
    let sql = build(
        OperationKind::FindSet,
        json!({
            "server": "s", "database": "db", "entity": "t",
            "fields": [], "filters": [], "orderBy": []
        }),
    );
    assert_eq!(sql, "SELECT * FROM [db].[dbo].[t];");
    assert_parses(&sql);
}
