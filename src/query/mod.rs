//! Query construction, execution and result encoding.
//!
//! The builder and encoder are pure functions over the request document and
//! the backend's result set. The executor ties them to a database connection.

pub mod builder;
pub mod encoder;
pub mod executor;
pub mod render;

pub use builder::QueryBuilder;
pub use encoder::encode_result;
pub use executor::QueryExecutor;
pub use render::{InlineLiterals, ValueRenderer};

use std::fmt;

/// The three operations the proxy exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Return the matching rows, optionally projected and sorted.
    FindSet,
    /// Return the number of matching rows.
    Count,
    /// Return whether no rows match.
    IsEmpty,
}

impl OperationKind {
    pub const ALL: [OperationKind; 3] = [Self::FindSet, Self::Count, Self::IsEmpty];

    /// Returns the operation name as used in routes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FindSet => "FindSet",
            Self::Count => "Count",
            Self::IsEmpty => "IsEmpty",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
