//! Standard CRUD statements for record types, generated from declared field metadata.
//!
//! A record type implements [`Entity`]: it names its table, declares its fields as
//! [`FieldSpec`]s (column, nullability, identifier and enum markers) and supplies a
//! [`Constructor`]. [`StandardOperations`] validates that metadata once, then builds and runs
//! `INSERT`, upsert, `SELECT` and `DELETE` statements through any [`StatementExecutor`], mapping
//! result rows back into records. Identifiers assigned by a database sequence are written back
//! into the record's [`DeferredId`] after a successful insert.
//!
//! Statements carry named placeholders (`:column`); the SQLite and PostgreSQL executors
//! translate them to their positional style before binding.
//!
//! ```rust
//! use sql_stdops::prelude::*;
//!
//! let mut builder = StatementBuilder::new();
//! builder
//!     .set_table_name("person")
//!     .set_query_type(QueryType::Select)
//!     .set_columns_to_select(["id", "name"])
//!     .add_condition(&ColumnDef::new("id", ValueType::Int), FieldValue::Int(7));
//! let query = builder.build()?;
//! assert_eq!(query.sql(), "SELECT id,name FROM person WHERE id = :id");
//!
//! let (sql, params) = translate_named(query.sql(), PlaceholderStyle::Postgres, query.params())?;
//! assert_eq!(sql, "SELECT id,name FROM person WHERE id = $1");
//! assert_eq!(params, vec![RowValues::Int(7)]);
//! # Ok::<(), SqlStdOpsError>(())
//! ```

pub mod prelude;

pub mod codec;
pub mod entity;
pub mod error;
pub mod executor;
pub mod operations;
pub mod query_builder;
pub mod results;
pub mod schema;
pub mod translation;
pub mod types;
pub mod value;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use entity::Entity;
pub use error::{ErrorKind, SqlStdOpsError};
pub use executor::StatementExecutor;
pub use operations::{OperationType, OperationsOptions, QueryFunction, StandardOperations};
pub use query_builder::{NamedParams, Query, QueryType, StatementBuilder};
pub use results::{CustomDbRow, ResultSet};
pub use schema::{ColumnDef, Constructor, FieldSpec};
pub use translation::{PlaceholderStyle, translate_named};
pub use types::{DatabaseType, RowValues};
pub use value::{DeferredId, EnumCodec, FieldValue, SqlEnum, ValueType};

#[cfg(feature = "postgres")]
pub use postgres::{PostgresExecutor, PostgresOptions};
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteExecutor, SqliteOptions};
