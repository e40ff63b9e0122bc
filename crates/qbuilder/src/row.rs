//! Row mapping traits and utilities

use crate::error::QbResult;
use tokio_postgres::Row;

/// Trait for converting a database row into a Rust struct.
///
/// Positional access stays on [`Row`] itself (`row.get(0)`); implement this
/// for the associative, by-name mapping path.
///
/// # Example
///
/// ```ignore
/// use qbuilder::{FromRow, QbResult, RowExt};
///
/// struct User {
///     id: i64,
///     username: String,
/// }
///
/// impl FromRow for User {
///     fn from_row(row: &tokio_postgres::Row) -> QbResult<Self> {
///         Ok(Self {
///             id: row.try_get_column("id")?,
///             username: row.try_get_column("username")?,
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> QbResult<Self>;
}

/// Extension trait for Row to provide typed access
pub trait RowExt {
    /// Try to get a column value, returning QbError::Decode on failure
    fn try_get_column<T>(&self, column: &str) -> QbResult<T>
    where
        T: for<'a> tokio_postgres::types::FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> QbResult<T>
    where
        T: for<'a> tokio_postgres::types::FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| crate::error::QbError::decode(column, e.to_string()))
    }
}
