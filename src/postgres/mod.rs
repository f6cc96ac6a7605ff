// PostgreSQL backend for the statement executor
//
// - config: connection options, validation and the connection string
// - params: `ToSql` for bound values
// - query: result-set extraction
// - executor: the blocking `StatementExecutor` over tokio-postgres

pub mod config;
pub mod executor;
pub mod params;
pub mod query;

pub use config::{PostgresOptions, PostgresOptionsBuilder};
pub use executor::PostgresExecutor;
pub use params::Params;
pub use query::{build_result_set, postgres_extract_value};
