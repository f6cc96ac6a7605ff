use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error};

use crate::error::SqlStdOpsError;
use crate::executor::StatementExecutor;
use crate::query_builder::NamedParams;
use crate::results::ResultSet;
use crate::translation::translate_named;
use crate::types::DatabaseType;

use super::config::PostgresOptions;
use super::params::Params;
use super::query::build_result_set;

/// Blocking executor over one `tokio_postgres` client.
///
/// The executor owns a current-thread runtime; the connection task runs whenever a call blocks
/// on it, so no background threads are started.
pub struct PostgresExecutor {
    runtime: Runtime,
    client: Client,
    connection: JoinHandle<()>,
}

impl std::fmt::Debug for PostgresExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresExecutor")
            .field("closed", &self.client.is_closed())
            .finish_non_exhaustive()
    }
}

impl PostgresExecutor {
    /// Validate `opts` and connect.
    ///
    /// # Errors
    /// Returns `SqlStdOpsError::ConfigurationError` for a missing option, otherwise as
    /// [`PostgresExecutor::connect_str`].
    pub fn connect(opts: &PostgresOptions) -> Result<Self, SqlStdOpsError> {
        let conn_str = opts.connection_string()?;
        Self::connect_str(&conn_str)
    }

    /// Connect with a libpq-style connection string or `postgres://` URL.
    ///
    /// # Errors
    /// Returns `SqlStdOpsError::ConnectionError` if the runtime cannot start and
    /// `SqlStdOpsError::PostgresError` if the connection fails.
    pub fn connect_str(conn_str: &str) -> Result<Self, SqlStdOpsError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                SqlStdOpsError::ConnectionError(format!("Failed to start tokio runtime: {e}"))
            })?;
        let (client, connection) = runtime.block_on(tokio_postgres::connect(conn_str, NoTls))?;
        let connection = runtime.spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "postgres connection closed with an error");
            }
        });
        debug!("connected to postgres");
        Ok(Self {
            runtime,
            client,
            connection,
        })
    }

    /// Run `;`-separated statements without parameters.
    ///
    /// # Errors
    /// Returns `SqlStdOpsError::PostgresError` if any statement fails.
    pub fn execute_batch(&mut self, sql: &str) -> Result<(), SqlStdOpsError> {
        self.runtime.block_on(self.client.batch_execute(sql))?;
        Ok(())
    }
}

impl Drop for PostgresExecutor {
    fn drop(&mut self) {
        self.connection.abort();
    }
}

impl StatementExecutor for PostgresExecutor {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Postgres
    }

    fn update(&mut self, sql: &str, params: &NamedParams) -> Result<usize, SqlStdOpsError> {
        let (sql, values) = translate_named(sql, self.placeholder_style(), params)?;
        let params = Params::convert(&values);
        let affected = self
            .runtime
            .block_on(self.client.execute(sql.as_str(), params.as_refs()))?;
        usize::try_from(affected).map_err(|e| {
            SqlStdOpsError::ConnectionError(format!("affected-row count overflow: {e}"))
        })
    }

    fn query(&mut self, sql: &str, params: &NamedParams) -> Result<ResultSet, SqlStdOpsError> {
        let (sql, values) = translate_named(sql, self.placeholder_style(), params)?;
        let params = Params::convert(&values);
        let rows = self
            .runtime
            .block_on(self.client.query(sql.as_str(), params.as_refs()))?;
        build_result_set(&rows)
    }
}
