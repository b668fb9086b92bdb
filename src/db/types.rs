//! Query result types for adls-proxy.
//!
//! Defines the structures used to represent result sets returned by the
//! backend, independent of the driver that produced them.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use std::time::Duration;

/// Represents the result of executing a SQL statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Column metadata for the result set, in cursor order.
    pub columns: Vec<ColumnInfo>,

    /// Rows of data. Each row has one value per column.
    pub rows: Vec<Row>,

    /// Time taken to execute the statement.
    pub execution_time: Duration,
}

impl QueryResult {
    /// Creates a new empty query result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query result with the given columns and rows.
    pub fn with_data(columns: Vec<ColumnInfo>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            execution_time: Duration::ZERO,
        }
    }

    /// Creates a one-row, one-column result holding `value`.
    pub fn scalar(value: impl Into<Value>) -> Self {
        Self::with_data(vec![ColumnInfo::new("")], vec![vec![value.into()]])
    }

    /// Sets the execution time.
    pub fn with_execution_time(mut self, duration: Duration) -> Self {
        self.execution_time = duration;
        self
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the first column of the first row, if any.
    pub fn first_value(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.first())
    }
}

/// Metadata about a column in a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name. May be empty for unnamed expressions.
    pub name: String,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A row of data from a query result.
pub type Row = Vec<Value>;

/// Represents a single value from a result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// Boolean (`bit`) value.
    Bool(bool),

    /// Signed integer (`tinyint` through `bigint`).
    Int(i64),

    /// Floating point number (`real`, `float`).
    Float(f64),

    /// Fixed-point number (`decimal`, `numeric`) as exact decimal text.
    Decimal(String),

    /// Text value (`char`, `varchar`, `nvarchar`, `xml`, ...).
    String(String),

    /// Binary data.
    Bytes(Vec<u8>),

    /// `uniqueidentifier` in its canonical hyphenated form.
    Guid(String),

    /// `date` value.
    Date(NaiveDate),

    /// `time` value.
    Time(NaiveTime),

    /// `datetime`, `datetime2` or `smalldatetime` value.
    DateTime(NaiveDateTime),

    /// `datetimeoffset` value.
    DateTimeOffset(DateTime<FixedOffset>),
}

impl Value {
    /// Returns the value as an integer, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the SQL type family name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bit",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Bytes(_) => "binary",
            Value::Guid(_) => "uniqueidentifier",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
            Value::DateTimeOffset(_) => "datetimeoffset",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}
