use serde::{Deserialize, Serialize};

use crate::error::SqlStdOpsError;

use super::executor::SqliteExecutor;

/// Options for opening a `SQLite` executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteOptions {
    /// File path, or `":memory:"` for a private in-memory database.
    pub db_path: String,
    /// Register a `nextval(name)` SQL function so generated-id inserts work.
    #[serde(default = "default_emulate_sequences")]
    pub emulate_sequences: bool,
}

fn default_emulate_sequences() -> bool {
    true
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            emulate_sequences: true,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(":memory:")
    }

    #[must_use]
    pub fn with_sequence_emulation(mut self, emulate_sequences: bool) -> Self {
        self.emulate_sequences = emulate_sequences;
        self
    }

    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.db_path == ":memory:"
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            opts: SqliteOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn emulate_sequences(mut self, emulate_sequences: bool) -> Self {
        self.opts.emulate_sequences = emulate_sequences;
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }

    /// Open an executor with these options.
    ///
    /// # Errors
    /// Returns `SqlStdOpsError::SqliteError` if the database cannot be opened or the sequence
    /// function cannot be registered.
    pub fn open(self) -> Result<SqliteExecutor, SqlStdOpsError> {
        SqliteExecutor::open(&self.finish())
    }
}
