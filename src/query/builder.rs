//! SQL statement construction.
//!
//! Renders a validated [`QueryRequest`] into a single statement for one of the
//! three operation kinds. Output is deterministic: clauses appear in request
//! order.

use super::render::{InlineLiterals, ValueRenderer};
use super::OperationKind;
use crate::request::{FilterClause, QueryRequest, SortKey};

/// Schema every queried table lives in.
const SCHEMA: &str = "dbo";

/// Builds SQL text from request documents.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder<R = InlineLiterals> {
    renderer: R,
}

impl QueryBuilder {
    /// Creates a builder that inlines values as SQL literals.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: ValueRenderer> QueryBuilder<R> {
    /// Creates a builder with a custom value renderer.
    pub fn with_renderer(renderer: R) -> Self {
        Self { renderer }
    }

    /// Renders the statement for the given operation.
    pub fn build(&self, kind: OperationKind, request: &QueryRequest) -> String {
        match kind {
            OperationKind::FindSet => self.find_set(request),
            OperationKind::Count => self.count(request),
            OperationKind::IsEmpty => self.is_empty(request),
        }
    }

    /// `SELECT <fields> FROM <table>[ WHERE ...][ ORDER BY ...];`
    pub fn find_set(&self, request: &QueryRequest) -> String {
        format!(
            "SELECT {} FROM {}{}{};",
            self.field_list(request.fields.as_deref()),
            self.table(request),
            self.where_clause(&request.filters),
            self.order_by_clause(&request.order_by),
        )
    }

    /// `SELECT COUNT(*) FROM <table>[ WHERE ...];`
    pub fn count(&self, request: &QueryRequest) -> String {
        format!(
            "SELECT COUNT(*) FROM {}{};",
            self.table(request),
            self.where_clause(&request.filters),
        )
    }

    /// `IF EXISTS (SELECT TOP 1 1 FROM <table>[ WHERE ...]) SELECT 0 ELSE SELECT 1;`
    pub fn is_empty(&self, request: &QueryRequest) -> String {
        format!(
            "IF EXISTS (SELECT TOP 1 1 FROM {}{}) SELECT 0 ELSE SELECT 1;",
            self.table(request),
            self.where_clause(&request.filters),
        )
    }

    fn table(&self, request: &QueryRequest) -> String {
        format!(
            "{}.{}.{}",
            self.renderer.identifier(&request.target.database),
            self.renderer.identifier(SCHEMA),
            self.renderer.identifier(&request.target.entity),
        )
    }

    fn field_list(&self, fields: Option<&[String]>) -> String {
        match fields {
            Some(fields) if !fields.is_empty() => fields
                .iter()
                .map(|field| self.renderer.identifier(field))
                .collect::<Vec<_>>()
                .join(","),
            _ => "*".to_string(),
        }
    }

    fn where_clause(&self, filters: &[FilterClause]) -> String {
        if filters.is_empty() {
            return String::new();
        }
        let predicates: Vec<String> = filters.iter().map(|f| self.predicate(f)).collect();
        format!(" WHERE {}", predicates.join(" AND "))
    }

    fn predicate(&self, filter: &FilterClause) -> String {
        format!(
            "{} {} {}",
            self.renderer.identifier(&filter.field),
            filter.op.to_sql(),
            self.renderer.value(&filter.value),
        )
    }

    fn order_by_clause(&self, keys: &[SortKey]) -> String {
        if keys.is_empty() {
            return String::new();
        }
        let keys: Vec<String> = keys
            .iter()
            .map(|key| {
                let direction = if key.ascending { "ASC" } else { "DESC" };
                format!("{} {direction}", self.renderer.identifier(&key.field))
            })
            .collect();
        format!(" ORDER BY {}", keys.join(","))
    }
}
