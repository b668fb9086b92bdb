//! Rendering of identifiers and filter values into SQL text.
//!
//! Values are interpolated into the statement as literals. Nothing is escaped:
//! names and values appear exactly as they were received. A renderer that
//! emits placeholders can be swapped in through [`ValueRenderer`] without
//! touching the statement layout in the builder.

use crate::request::Scalar;

/// Renders filter values and identifiers into SQL text.
pub trait ValueRenderer {
    /// Renders a column, schema or table name.
    fn identifier(&self, name: &str) -> String {
        format!("[{name}]")
    }

    /// Renders a filter value.
    fn value(&self, value: &Scalar) -> String;
}

/// Renders values as inline SQL literals.
///
/// Strings (dates included) are wrapped in single quotes; numbers are emitted
/// as-is and booleans as `1`/`0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineLiterals;

impl ValueRenderer for InlineLiterals {
    fn value(&self, value: &Scalar) -> String {
        match value {
            Scalar::String(s) => format!("'{s}'"),
            Scalar::Number(n) => n.to_string(),
            Scalar::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        }
    }
}
