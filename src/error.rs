use thiserror::Error;

#[cfg(feature = "sqlite")]
use rusqlite;
#[cfg(feature = "postgres")]
use tokio_postgres;

/// Every failure surfaced by this crate.
///
/// The first four variants are raised by the crate itself; the rest come from the
/// statement-execution collaborator and are passed through unmodified.
#[derive(Debug, Error)]
pub enum SqlStdOpsError {
    /// Invalid record-type metadata, detected once while building the descriptors.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A statement builder was misused (built twice, missing table, ...).
    #[error("Builder state error: {0}")]
    BuilderStateError(String),

    /// Result rows could not be turned into records.
    #[error("Mapping error: {0}")]
    MappingError(String),

    /// A single value could not be converted to or from its storage representation.
    #[error("Conversion error: {0}")]
    ConversionError(String),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),
}

/// Coarse category of a [`SqlStdOpsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    BuilderState,
    Mapping,
    Conversion,
    Execution,
}

impl SqlStdOpsError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            SqlStdOpsError::ConfigurationError(_) => ErrorKind::Configuration,
            SqlStdOpsError::BuilderStateError(_) => ErrorKind::BuilderState,
            SqlStdOpsError::MappingError(_) => ErrorKind::Mapping,
            SqlStdOpsError::ConversionError(_) => ErrorKind::Conversion,
            _ => ErrorKind::Execution,
        }
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        SqlStdOpsError::ConfigurationError(msg.into())
    }

    pub(crate) fn builder_state(msg: impl Into<String>) -> Self {
        SqlStdOpsError::BuilderStateError(msg.into())
    }

    pub(crate) fn mapping(msg: impl Into<String>) -> Self {
        SqlStdOpsError::MappingError(msg.into())
    }

    pub(crate) fn conversion(msg: impl Into<String>) -> Self {
        SqlStdOpsError::ConversionError(msg.into())
    }
}
