//! The statement-execution boundary.

use crate::error::SqlStdOpsError;
use crate::query_builder::NamedParams;
use crate::results::ResultSet;
use crate::translation::PlaceholderStyle;
use crate::types::DatabaseType;

/// Runs one built statement per call.
///
/// `sql` carries named placeholders (`:column`); implementations translate them to their
/// driver's positional style (see [`translate_named`](crate::translation::translate_named)).
/// Driver failures are returned as-is; this crate never retries them.
pub trait StatementExecutor {
    /// Dialect this executor talks to.
    fn database_type(&self) -> DatabaseType;

    /// Positional placeholder style used when translating `:name` parameters.
    fn placeholder_style(&self) -> PlaceholderStyle {
        self.database_type().placeholder_style()
    }

    /// Execute a statement that returns no rows; yields the affected-row count.
    ///
    /// # Errors
    /// Returns the driver's error, or `SqlStdOpsError::ParameterError` for an unbound placeholder.
    fn update(&mut self, sql: &str, params: &NamedParams) -> Result<usize, SqlStdOpsError>;

    /// Execute a statement that returns rows (SELECT, or INSERT ... RETURNING).
    ///
    /// # Errors
    /// Returns the driver's error, or `SqlStdOpsError::ParameterError` for an unbound placeholder.
    fn query(&mut self, sql: &str, params: &NamedParams) -> Result<ResultSet, SqlStdOpsError>;
}

impl<X: StatementExecutor + ?Sized> StatementExecutor for &mut X {
    fn database_type(&self) -> DatabaseType {
        (**self).database_type()
    }

    fn update(&mut self, sql: &str, params: &NamedParams) -> Result<usize, SqlStdOpsError> {
        (**self).update(sql, params)
    }

    fn query(&mut self, sql: &str, params: &NamedParams) -> Result<ResultSet, SqlStdOpsError> {
        (**self).query(sql, params)
    }
}
