use serde::{Deserialize, Serialize};

use crate::error::SqlStdOpsError;

use super::executor::PostgresExecutor;

/// Connection options for a Postgres executor. Every field must be set before connecting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostgresOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub dbname: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl PostgresOptions {
    #[must_use]
    pub fn builder() -> PostgresOptionsBuilder {
        PostgresOptionsBuilder::default()
    }

    /// Check that all required fields are present.
    ///
    /// # Errors
    /// Returns `SqlStdOpsError::ConfigurationError` naming the first missing field.
    pub fn validate(&self) -> Result<(), SqlStdOpsError> {
        if self.dbname.is_none() {
            return Err(SqlStdOpsError::config("dbname is required"));
        }
        if self.host.is_none() {
            return Err(SqlStdOpsError::config("host is required"));
        }
        if self.port.is_none() {
            return Err(SqlStdOpsError::config("port is required"));
        }
        if self.user.is_none() {
            return Err(SqlStdOpsError::config("user is required"));
        }
        if self.password.is_none() {
            return Err(SqlStdOpsError::config("password is required"));
        }
        Ok(())
    }

    /// Key/value connection string as understood by `tokio_postgres::connect`.
    ///
    /// # Errors
    /// Returns `SqlStdOpsError::ConfigurationError` if a required field is missing.
    pub fn connection_string(&self) -> Result<String, SqlStdOpsError> {
        self.validate()?;
        let quote = |v: &str| format!("'{}'", v.replace('\\', "\\\\").replace('\'', "\\'"));
        Ok(format!(
            "host={} port={} dbname={} user={} password={}",
            quote(self.host.as_deref().unwrap_or_default()),
            self.port.unwrap_or_default(),
            quote(self.dbname.as_deref().unwrap_or_default()),
            quote(self.user.as_deref().unwrap_or_default()),
            quote(self.password.as_deref().unwrap_or_default()),
        ))
    }
}

/// Fluent builder for Postgres options.
#[derive(Debug, Clone, Default)]
pub struct PostgresOptionsBuilder {
    opts: PostgresOptions,
}

impl PostgresOptionsBuilder {
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.opts.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.opts.port = Some(port);
        self
    }

    #[must_use]
    pub fn dbname(mut self, dbname: impl Into<String>) -> Self {
        self.opts.dbname = Some(dbname.into());
        self
    }

    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.opts.user = Some(user.into());
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.opts.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn finish(self) -> PostgresOptions {
        self.opts
    }

    /// Validate the options and connect.
    ///
    /// # Errors
    /// Returns `SqlStdOpsError::ConfigurationError` for missing fields, or the connection error.
    pub fn connect(self) -> Result<PostgresExecutor, SqlStdOpsError> {
        PostgresExecutor::connect(&self.finish())
    }
}
