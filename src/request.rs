//! Request document parsing.
//!
//! Turns the raw JSON body of a request into a strongly typed [`QueryRequest`].
//! All schema checks happen here, before any SQL is rendered; every failure is
//! a [`ProxyError::MalformedRequest`] naming the offending sub-document.

use std::fmt;

use serde_json::{Map, Value as JsonValue};

use crate::error::{ProxyError, Result};

/// The six comparison operators a filter clause may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEquals,
    LessThan,
    LessThanOrEquals,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 6] = [
        Self::Equals,
        Self::NotEquals,
        Self::GreaterThan,
        Self::GreaterThanOrEquals,
        Self::LessThan,
        Self::LessThanOrEquals,
    ];

    /// Parses an operator name, ignoring ASCII case.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(s))
    }

    /// Returns the operator's request-document name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Equals => "Equals",
            Self::NotEquals => "NotEquals",
            Self::GreaterThan => "GreaterThan",
            Self::GreaterThanOrEquals => "GreaterThanOrEquals",
            Self::LessThan => "LessThan",
            Self::LessThanOrEquals => "LessThanOrEquals",
        }
    }

    /// Returns the SQL comparison symbol.
    pub fn to_sql(&self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::NotEquals => "!=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEquals => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEquals => "<=",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A scalar filter value.
///
/// Dates arrive as JSON strings and are kept as strings; they are rendered
/// quoted like any other string.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl Scalar {
    fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::String(s) => Some(Self::String(s.clone())),
            JsonValue::Number(n) => Some(Self::Number(n.clone())),
            JsonValue::Bool(b) => Some(Self::Bool(*b)),
            JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
        }
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::String(v.to_string())
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Number(v.into())
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Number(v.into())
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

/// One `field operator value` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub op: FilterOperator,
    pub field: String,
    pub value: Scalar,
}

impl FilterClause {
    pub fn new(op: FilterOperator, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self {
            op,
            field: field.into(),
            value: value.into(),
        }
    }
}

/// One ORDER BY column and its direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub ascending: bool,
}

impl SortKey {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: true,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: false,
        }
    }
}

/// The server, database and table a request targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub server: String,
    pub database: String,
    pub entity: String,
}

impl Target {
    /// Returns a display-safe description for log output.
    pub fn display_string(&self) -> String {
        format!("{}.dbo.{} @ {}", self.database, self.entity, self.server)
    }
}

/// A validated request document.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub target: Target,
    /// Columns to project; `None` selects all columns.
    pub fields: Option<Vec<String>>,
    pub filters: Vec<FilterClause>,
    pub order_by: Vec<SortKey>,
}

impl QueryRequest {
    /// Creates a request for all columns of a table with no filters or ordering.
    pub fn new(
        server: impl Into<String>,
        database: impl Into<String>,
        entity: impl Into<String>,
    ) -> Self {
        Self {
            target: Target {
                server: server.into(),
                database: database.into(),
                entity: entity.into(),
            },
            fields: None,
            filters: Vec::new(),
            order_by: Vec::new(),
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_filter(mut self, filter: FilterClause) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_order_by(mut self, key: SortKey) -> Self {
        self.order_by.push(key);
        self
    }

    /// Parses and validates a raw request body.
    pub fn parse(body: &str) -> Result<Self> {
        let json: JsonValue = serde_json::from_str(body).map_err(|_| {
            ProxyError::malformed("Body in the request must be in the correct JSON format.")
        })?;
        Self::from_json(&json)
    }

    /// Validates an already-parsed JSON document.
    pub fn from_json(json: &JsonValue) -> Result<Self> {
        let body = json.as_object().ok_or_else(|| {
            ProxyError::malformed("Body in the request must be in the correct JSON format.")
        })?;

        let server = required_string(body, "server", "Bad or missing SQL endpoint.")?;
        let database = required_string(body, "database", "Bad or missing SQL database name.")?;
        let entity = required_string(body, "entity", "Bad or missing entity to be queried.")?;

        let fields = optional_array(body, "fields")?
            .map(|items| items.iter().map(parse_field_name).collect::<Result<Vec<_>>>())
            .transpose()?
            .filter(|fields| !fields.is_empty());

        let filters = optional_array(body, "filters")?
            .map(|items| items.iter().map(parse_filter).collect::<Result<Vec<_>>>())
            .transpose()?
            .unwrap_or_default();

        let order_by = optional_array(body, "orderBy")?
            .map(|items| items.iter().map(parse_sort_key).collect::<Result<Vec<_>>>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            target: Target {
                server,
                database,
                entity,
            },
            fields,
            filters,
            order_by,
        })
    }
}

fn required_string(body: &Map<String, JsonValue>, key: &str, message: &str) -> Result<String> {
    match body.get(key) {
        Some(JsonValue::String(s)) if !s.is_empty() => Ok(s.clone()),
        _ => Err(ProxyError::malformed(message)),
    }
}

/// Returns the array under `key`, `None` if the key is absent or null.
fn optional_array<'a>(
    body: &'a Map<String, JsonValue>,
    key: &str,
) -> Result<Option<&'a Vec<JsonValue>>> {
    match body.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Array(items)) => Ok(Some(items)),
        Some(other) => Err(ProxyError::malformed(format!(
            "The {key} expression must be an array, got {other}."
        ))),
    }
}

fn parse_field_name(item: &JsonValue) -> Result<String> {
    match item {
        JsonValue::String(s) if !s.is_empty() => Ok(s.clone()),
        _ => Err(ProxyError::malformed(format!(
            "Bad item {item} in the fields expression."
        ))),
    }
}

fn parse_filter(item: &JsonValue) -> Result<FilterClause> {
    let filter = item.as_object().ok_or_else(|| {
        ProxyError::malformed(format!("Bad item {item} in the filters expression."))
    })?;

    let op_name = match filter.get("op") {
        Some(JsonValue::String(s)) => s,
        _ => {
            return Err(ProxyError::malformed(format!(
                "Bad or missing operator in the filter {item}."
            )))
        }
    };
    let op = FilterOperator::parse(op_name).ok_or_else(|| {
        ProxyError::malformed(format!("Bad operator passed in the filter {item}."))
    })?;

    let field = match filter.get("field") {
        Some(JsonValue::String(s)) if !s.is_empty() => s.clone(),
        _ => {
            return Err(ProxyError::malformed(format!(
                "Bad or missing field in the expression {item}."
            )))
        }
    };

    let value = match filter.get("value") {
        None | Some(JsonValue::Null) => {
            return Err(ProxyError::malformed(format!(
                "Missing value in the filter {item}."
            )))
        }
        Some(v) => Scalar::from_json(v).ok_or_else(|| {
            ProxyError::malformed(format!("Bad value in the filter {item}."))
        })?,
    };

    Ok(FilterClause { op, field, value })
}

fn parse_sort_key(item: &JsonValue) -> Result<SortKey> {
    let key = item.as_object().ok_or_else(|| {
        ProxyError::malformed(format!("Bad item {item} in the order by expression."))
    })?;

    let field = match key.get("field") {
        Some(JsonValue::String(s)) if !s.is_empty() => s.clone(),
        _ => {
            return Err(ProxyError::malformed(format!(
                "Bad or missing field in the expression {item} in the order by expression."
            )))
        }
    };

    let ascending = match key.get("ascending") {
        None | Some(JsonValue::Null) => true,
        Some(JsonValue::Bool(b)) => *b,
        Some(_) => {
            return Err(ProxyError::malformed(format!(
                "Bad ascending flag in the expression {item} in the order by expression."
            )))
        }
    };

    Ok(SortKey { field, ascending })
}
