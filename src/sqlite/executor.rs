use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use rusqlite::Connection;
use rusqlite::functions::FunctionFlags;
use tracing::debug;

use crate::error::SqlStdOpsError;
use crate::executor::StatementExecutor;
use crate::query_builder::NamedParams;
use crate::results::ResultSet;
use crate::translation::translate_named;
use crate::types::DatabaseType;

use super::config::SqliteOptions;
use super::params::Params;
use super::query::build_result_set;

type SequenceCounters = Arc<Mutex<HashMap<String, i64>>>;

/// Blocking executor over one `rusqlite` connection.
///
/// With sequence emulation on, `nextval('name')` returns 1, 2, 3, ... per sequence name for the
/// lifetime of this executor. Use [`SqliteExecutor::set_sequence`] to continue numbering in a
/// file-backed database that already holds rows.
pub struct SqliteExecutor {
    conn: Connection,
    sequences: Option<SequenceCounters>,
}

impl std::fmt::Debug for SqliteExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteExecutor")
            .field("emulate_sequences", &self.sequences.is_some())
            .finish_non_exhaustive()
    }
}

impl SqliteExecutor {
    /// Open the database named by `opts`.
    ///
    /// # Errors
    /// Returns `SqlStdOpsError::SqliteError` if the database cannot be opened or the sequence
    /// function cannot be registered.
    pub fn open(opts: &SqliteOptions) -> Result<Self, SqlStdOpsError> {
        let conn = if opts.is_in_memory() {
            Connection::open_in_memory()?
        } else {
            Connection::open(&opts.db_path)?
        };
        debug!(db_path = %opts.db_path, emulate_sequences = opts.emulate_sequences, "opened sqlite database");
        Self::from_connection(conn, opts.emulate_sequences)
    }

    /// Wrap an already-open connection.
    ///
    /// # Errors
    /// Returns `SqlStdOpsError::SqliteError` if the sequence function cannot be registered.
    pub fn from_connection(conn: Connection, emulate_sequences: bool) -> Result<Self, SqlStdOpsError> {
        let sequences = if emulate_sequences {
            let counters = SequenceCounters::default();
            register_nextval(&conn, Arc::clone(&counters))?;
            Some(counters)
        } else {
            None
        };
        Ok(Self { conn, sequences })
    }

    /// Run a batch of `;`-separated statements without parameters (schema setup and the like).
    ///
    /// # Errors
    /// Returns `SqlStdOpsError::SqliteError` if any statement fails.
    pub fn execute_batch(&mut self, sql: &str) -> Result<(), SqlStdOpsError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Make the next `nextval(name)` return `last_value + 1`.
    ///
    /// # Errors
    /// Returns `SqlStdOpsError::ConfigurationError` when sequence emulation is off.
    pub fn set_sequence(&self, name: &str, last_value: i64) -> Result<(), SqlStdOpsError> {
        let counters = self.sequences.as_ref().ok_or_else(|| {
            SqlStdOpsError::config("sequence emulation is disabled for this executor")
        })?;
        counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_owned(), last_value);
        Ok(())
    }

    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn register_nextval(conn: &Connection, counters: SequenceCounters) -> Result<(), SqlStdOpsError> {
    conn.create_scalar_function("nextval", 1, FunctionFlags::SQLITE_UTF8, move |ctx| {
        let name: String = ctx.get(0)?;
        let mut counters = counters.lock().unwrap_or_else(PoisonError::into_inner);
        let next = counters.entry(name).or_insert(0);
        *next += 1;
        Ok(*next)
    })?;
    Ok(())
}

impl StatementExecutor for SqliteExecutor {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Sqlite
    }

    fn update(&mut self, sql: &str, params: &NamedParams) -> Result<usize, SqlStdOpsError> {
        let (sql, values) = translate_named(sql, self.placeholder_style(), params)?;
        let params = Params::convert(&values);
        let mut stmt = self.conn.prepare_cached(&sql)?;
        Ok(stmt.execute(rusqlite::params_from_iter(params.as_values().iter()))?)
    }

    fn query(&mut self, sql: &str, params: &NamedParams) -> Result<ResultSet, SqlStdOpsError> {
        let (sql, values) = translate_named(sql, self.placeholder_style(), params)?;
        let params = Params::convert(&values);
        let mut stmt = self.conn.prepare_cached(&sql)?;
        build_result_set(&mut stmt, params.as_values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RowValues;

    #[test]
    fn nextval_counts_per_sequence() {
        let mut exec = SqliteExecutor::open(&SqliteOptions::in_memory()).unwrap();
        let params = NamedParams::new();
        let first = exec.query("SELECT nextval('a') AS v", &params).unwrap();
        let second = exec.query("SELECT nextval('a') AS v", &params).unwrap();
        let other = exec.query("SELECT nextval('b') AS v", &params).unwrap();
        assert_eq!(first.results[0].get("v"), Some(&RowValues::Int(1)));
        assert_eq!(second.results[0].get("v"), Some(&RowValues::Int(2)));
        assert_eq!(other.results[0].get("v"), Some(&RowValues::Int(1)));

        exec.set_sequence("a", 41).unwrap();
        let seeded = exec.query("SELECT nextval('a') AS v", &params).unwrap();
        assert_eq!(seeded.results[0].get("v"), Some(&RowValues::Int(42)));
    }

    #[test]
    fn named_params_are_bound_positionally() {
        let mut exec = SqliteExecutor::open(&SqliteOptions::in_memory()).unwrap();
        exec.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)")
            .unwrap();
        let params: NamedParams = [
            ("id", RowValues::Int(1)),
            ("name", RowValues::Text("a".into())),
        ]
        .into_iter()
        .collect();
        let n = exec
            .update("INSERT INTO t (id,name) VALUES (:id,:name)", &params)
            .unwrap();
        assert_eq!(n, 1);
        let rs = exec
            .query("SELECT id,name FROM t WHERE name = :name", &params)
            .unwrap();
        assert_eq!(rs.len(), 1);
        assert_eq!(rs.results[0].get("id"), Some(&RowValues::Int(1)));
    }

    #[test]
    fn disabled_emulation_has_no_nextval() {
        let opts = SqliteOptions::in_memory().with_sequence_emulation(false);
        let mut exec = SqliteExecutor::open(&opts).unwrap();
        assert!(exec.query("SELECT nextval('a')", &NamedParams::new()).is_err());
        assert!(exec.set_sequence("a", 1).is_err());
    }
}
