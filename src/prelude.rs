//! Convenient imports for common functionality.
//!
//! Re-exports what a record type declaration and a typical call site need.

pub use crate::codec::{decode, from_storage, to_storage};
pub use crate::entity::Entity;
pub use crate::error::{ErrorKind, SqlStdOpsError};
pub use crate::executor::StatementExecutor;
pub use crate::operations::{OperationType, OperationsOptions, StandardOperations};
pub use crate::query_builder::{NamedParams, Query, QueryType, StatementBuilder};
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::schema::{
    Args, ColumnDef, ColumnDescriptor, ComponentSpec, CompositeKey, Constructor, EnumMetadata,
    Enumerated, FieldSpec, IdentifierMetadata,
};
pub use crate::translation::{PlaceholderStyle, translate_named};
pub use crate::types::{DatabaseType, RowValues};
pub use crate::value::{
    DeferredId, EnumCodec, EnumValue, FieldValue, FromFieldValue, IdScalar, SqlEnum, ValueType,
};

#[cfg(feature = "postgres")]
pub use crate::postgres::{PostgresExecutor, PostgresOptions, PostgresOptionsBuilder};
#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteExecutor, SqliteOptions, SqliteOptionsBuilder};
