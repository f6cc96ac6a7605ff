//! Per-record-type operation facade.

mod mapping;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::entity::Entity;
use crate::error::SqlStdOpsError;
use crate::executor::StatementExecutor;
use crate::query_builder::{Query, QueryType, StatementBuilder};
use crate::results::CustomDbRow;
use crate::schema::{ColumnDef, ColumnDescriptor, Constructor, extract_descriptors, validate_identifier};
use crate::types::DatabaseType;
use crate::value::FieldValue;

/// Operations offered by [`StandardOperations`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Create,
    CreateOrUpdate,
    GetAll,
    FindOne,
    Delete,
}

impl OperationType {
    #[must_use]
    pub fn query_type(self) -> QueryType {
        match self {
            OperationType::Create => QueryType::Insert,
            OperationType::CreateOrUpdate => QueryType::Upsert,
            OperationType::GetAll | OperationType::FindOne => QueryType::Select,
            OperationType::Delete => QueryType::Delete,
        }
    }
}

/// Facade behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationsOptions {
    /// Order `get_all_paged` by the identifier column(s) so pages are stable.
    pub order_paged_by_id: bool,
    /// Log every bound parameter at debug level.
    pub log_parameters: bool,
}

impl Default for OperationsOptions {
    fn default() -> Self {
        Self {
            order_paged_by_id: true,
            log_parameters: false,
        }
    }
}

impl OperationsOptions {
    #[must_use]
    pub fn with_order_paged_by_id(mut self, order_paged_by_id: bool) -> Self {
        self.order_paged_by_id = order_paged_by_id;
        self
    }

    #[must_use]
    pub fn with_log_parameters(mut self, log_parameters: bool) -> Self {
        self.log_parameters = log_parameters;
        self
    }
}

/// Statement-producing closure prebound with table, identifier and select columns. The
/// argument adjusts the fresh builder before it is built.
pub type QueryFunction =
    Box<dyn Fn(&dyn Fn(&mut StatementBuilder)) -> Result<Query, SqlStdOpsError> + Send + Sync>;

struct QueryFunctions {
    create: QueryFunction,
    create_or_update: QueryFunction,
    get_all: QueryFunction,
    find_one: QueryFunction,
    delete: QueryFunction,
}

impl QueryFunctions {
    fn prebind(table: &str, id_columns: &[ColumnDef], select_columns: &[String]) -> Self {
        let bind = |op: OperationType| -> QueryFunction {
            let table = table.to_owned();
            let id_columns = id_columns.to_vec();
            let select_columns = select_columns.to_vec();
            Box::new(move |mutate: &dyn Fn(&mut StatementBuilder)| {
                let mut builder = StatementBuilder::new();
                builder
                    .set_table_name(table.as_str())
                    .set_query_type(op.query_type())
                    .set_id_columns(id_columns.clone());
                if op.query_type() == QueryType::Select {
                    builder.set_columns_to_select(select_columns.iter().cloned());
                }
                mutate(&mut builder);
                builder.build()
            })
        };
        Self {
            create: bind(OperationType::Create),
            create_or_update: bind(OperationType::CreateOrUpdate),
            get_all: bind(OperationType::GetAll),
            find_one: bind(OperationType::FindOne),
            delete: bind(OperationType::Delete),
        }
    }

    fn get(&self, op: OperationType) -> &QueryFunction {
        match op {
            OperationType::Create => &self.create,
            OperationType::CreateOrUpdate => &self.create_or_update,
            OperationType::GetAll => &self.get_all,
            OperationType::FindOne => &self.find_one,
            OperationType::Delete => &self.delete,
        }
    }
}

/// Create / upsert / find / list / delete for one record type.
///
/// Built once per type: the field metadata is validated and turned into descriptors here, and
/// every later call only reads them, so one instance can be shared across threads. Each call
/// takes the executor to run its statement on.
///
/// `create` and `create_or_update` take the record mutably: when the identifier is
/// database-generated and still empty, it is filled from the `RETURNING` row after the insert
/// succeeds. That is the only write this type makes to caller data.
pub struct StandardOperations<E: Entity> {
    table_name: &'static str,
    descriptors: Vec<ColumnDescriptor<E>>,
    id_index: usize,
    id_columns: Vec<ColumnDef>,
    select_columns: Vec<String>,
    constructor: Constructor<E>,
    functions: QueryFunctions,
    options: OperationsOptions,
}

impl<E: Entity> std::fmt::Debug for StandardOperations<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardOperations")
            .field("table_name", &self.table_name)
            .field("descriptors", &self.descriptors)
            .field("select_columns", &self.select_columns)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<E: Entity> StandardOperations<E> {
    /// Build the facade with default options.
    ///
    /// # Errors
    /// Returns `SqlStdOpsError::ConfigurationError` if the record type's metadata is invalid.
    pub fn new() -> Result<Self, SqlStdOpsError> {
        Self::with_options(OperationsOptions::default())
    }

    /// Build the facade.
    ///
    /// # Errors
    /// Returns `SqlStdOpsError::ConfigurationError` if the table name is not a valid identifier
    /// or the record type's field metadata is invalid.
    pub fn with_options(options: OperationsOptions) -> Result<Self, SqlStdOpsError> {
        let table_name = E::table_name();
        validate_identifier("table", table_name)?;

        let descriptors = extract_descriptors(E::fields())?;
        let id_index = descriptors
            .iter()
            .position(|d| d.def().is_identifier())
            .ok_or_else(|| SqlStdOpsError::config("no identifier field"))?;
        let id_columns = descriptors[id_index].def().storage_columns();
        let select_columns: Vec<String> = descriptors
            .iter()
            .flat_map(|d| d.def().storage_columns())
            .map(|c| c.name().to_owned())
            .collect();
        let functions = QueryFunctions::prebind(table_name, &id_columns, &select_columns);

        let id_names: Vec<&str> = id_columns.iter().map(ColumnDef::name).collect();
        debug!(
            table = table_name,
            descriptors = descriptors.len(),
            id_columns = ?id_names,
            "built standard operations"
        );

        Ok(Self {
            table_name,
            descriptors,
            id_index,
            id_columns,
            select_columns,
            constructor: E::constructor(),
            functions,
            options,
        })
    }

    #[must_use]
    pub fn table_name(&self) -> &'static str {
        self.table_name
    }

    #[must_use]
    pub fn descriptors(&self) -> &[ColumnDescriptor<E>] {
        &self.descriptors
    }

    /// Identifier storage columns (one per component for a composite identifier).
    #[must_use]
    pub fn id_columns(&self) -> &[ColumnDef] {
        &self.id_columns
    }

    #[must_use]
    pub fn select_columns(&self) -> &[String] {
        &self.select_columns
    }

    #[must_use]
    pub fn options(&self) -> OperationsOptions {
        self.options
    }

    fn id_descriptor(&self) -> &ColumnDescriptor<E> {
        &self.descriptors[self.id_index]
    }

    /// Build the statement for `op`, letting `mutate` adjust the prebound builder.
    ///
    /// # Errors
    /// Returns whatever [`StatementBuilder::build`] returns.
    pub fn build_statement(
        &self,
        op: OperationType,
        mutate: &dyn Fn(&mut StatementBuilder),
    ) -> Result<Query, SqlStdOpsError> {
        (self.functions.get(op))(mutate)
    }

    /// Insert `record`, backfilling a database-generated identifier when it is still empty.
    ///
    /// # Errors
    /// Returns builder, conversion or executor errors, and `SqlStdOpsError::MappingError` when a
    /// generated insert returns no usable identifier. On error the record is left untouched.
    ///
    /// A `MappingError` from a generated insert means the statement already ran: the row exists
    /// in the database while the record's identifier is still empty.
    pub fn create<X: StatementExecutor>(
        &self,
        executor: &mut X,
        record: &mut E,
    ) -> Result<(), SqlStdOpsError> {
        self.insert(executor, record, OperationType::Create)
    }

    /// Insert `record`, or update the row with the same identifier.
    ///
    /// # Errors
    /// Same as [`StandardOperations::create`].
    pub fn create_or_update<X: StatementExecutor>(
        &self,
        executor: &mut X,
        record: &mut E,
    ) -> Result<(), SqlStdOpsError> {
        self.insert(executor, record, OperationType::CreateOrUpdate)
    }

    fn insert<X: StatementExecutor>(
        &self,
        executor: &mut X,
        record: &mut E,
        op: OperationType,
    ) -> Result<(), SqlStdOpsError> {
        let id = self.id_descriptor();
        let generate = id.def().is_database_generated() && id.read(record).is_null();
        let values: Vec<(&ColumnDef, FieldValue)> = self
            .descriptors
            .iter()
            .map(|d| (d.def(), d.read(record)))
            .collect();

        let query = self.build_statement(op, &|builder: &mut StatementBuilder| {
            for (def, value) in &values {
                builder.add_column_to_insert(def, value.clone());
            }
            builder.set_generate_and_return_id(generate);
        })?;
        self.log_query(executor.database_type(), op, &query);

        if !generate {
            executor.update(query.sql(), query.params())?;
            return Ok(());
        }

        let returned = executor.query(query.sql(), query.params())?;
        let row = returned.results.first().ok_or_else(|| {
            SqlStdOpsError::mapping(format!(
                "insert into {} returned no generated identifier",
                self.table_name
            ))
        })?;
        let raw = row
            .get(id.def().name())
            .or_else(|| row.get_by_index(0))
            .filter(|raw| !raw.is_null())
            .ok_or_else(|| {
                SqlStdOpsError::mapping(format!(
                    "insert into {} returned a NULL identifier",
                    self.table_name
                ))
            })?;
        let fill = id.deferred_setter.as_ref().ok_or_else(|| {
            SqlStdOpsError::mapping(format!(
                "identifier `{}` cannot be backfilled",
                id.def().field_name
            ))
        })?;
        fill(record, raw).map_err(|e| {
            SqlStdOpsError::mapping(format!(
                "row was inserted into {} but its generated identifier could not be read: {e}",
                self.table_name
            ))
        })
    }

    /// Fetch the record with identifier `id`, if any.
    ///
    /// # Errors
    /// Returns `SqlStdOpsError::MappingError` when more than one row matches or a row cannot be
    /// mapped, and builder, conversion or executor errors otherwise.
    pub fn find_one<X: StatementExecutor>(
        &self,
        executor: &mut X,
        id: E::Id,
    ) -> Result<Option<E>, SqlStdOpsError> {
        let id_value: FieldValue = id.into();
        let id_def = self.id_descriptor().def();
        let query = self.build_statement(OperationType::FindOne, &|builder: &mut StatementBuilder| {
            builder.add_condition(id_def, id_value.clone());
        })?;
        self.log_query(executor.database_type(), OperationType::FindOne, &query);

        let rows = executor.query(query.sql(), query.params())?;
        match rows.results.as_slice() {
            [] => Ok(None),
            [row] => self.map_row(row).map(Some),
            more => Err(SqlStdOpsError::mapping(format!(
                "expected at most one {} row for one identifier, got {}",
                self.table_name,
                more.len()
            ))),
        }
    }

    /// Fetch every record.
    ///
    /// # Errors
    /// Returns mapping, builder, conversion or executor errors.
    pub fn get_all<X: StatementExecutor>(&self, executor: &mut X) -> Result<Vec<E>, SqlStdOpsError> {
        let query = self.build_statement(OperationType::GetAll, &|_: &mut StatementBuilder| {})?;
        self.fetch(executor, OperationType::GetAll, &query)
    }

    /// Fetch at most `limit` records after skipping `offset`, ordered by identifier unless
    /// [`OperationsOptions::order_paged_by_id`] is off.
    ///
    /// # Errors
    /// Same as [`StandardOperations::get_all`].
    pub fn get_all_paged<X: StatementExecutor>(
        &self,
        executor: &mut X,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<E>, SqlStdOpsError> {
        let order_by: Vec<&str> = if self.options.order_paged_by_id {
            self.id_columns.iter().map(ColumnDef::name).collect()
        } else {
            Vec::new()
        };
        let query = self.build_statement(OperationType::GetAll, &|builder: &mut StatementBuilder| {
            builder
                .set_order_by(order_by.iter().copied())
                .set_limit(limit)
                .set_offset(offset);
        })?;
        self.fetch(executor, OperationType::GetAll, &query)
    }

    /// Delete the record with identifier `id`. Deleting a missing record is not an error.
    ///
    /// # Errors
    /// Returns builder, conversion or executor errors.
    pub fn delete_one<X: StatementExecutor>(
        &self,
        executor: &mut X,
        id: E::Id,
    ) -> Result<(), SqlStdOpsError> {
        let id_value: FieldValue = id.into();
        let id_def = self.id_descriptor().def();
        let query = self.build_statement(OperationType::Delete, &|builder: &mut StatementBuilder| {
            builder.add_condition(id_def, id_value.clone());
        })?;
        self.log_query(executor.database_type(), OperationType::Delete, &query);
        executor.update(query.sql(), query.params())?;
        Ok(())
    }

    /// Decode one result row into a record.
    ///
    /// # Errors
    /// Returns `SqlStdOpsError::MappingError` for a missing column, a NULL in a non-nullable
    /// column, or a constructor arity mismatch; `SqlStdOpsError::ConversionError` when a value
    /// cannot be decoded.
    pub fn map_row(&self, row: &CustomDbRow) -> Result<E, SqlStdOpsError> {
        mapping::map_row(&self.descriptors, &self.constructor, row)
    }

    fn fetch<X: StatementExecutor>(
        &self,
        executor: &mut X,
        op: OperationType,
        query: &Query,
    ) -> Result<Vec<E>, SqlStdOpsError> {
        self.log_query(executor.database_type(), op, query);
        let rows = executor.query(query.sql(), query.params())?;
        rows.iter().map(|row| self.map_row(row)).collect()
    }

    fn log_query(&self, database: DatabaseType, op: OperationType, query: &Query) {
        info!(
            database = ?database,
            operation = ?op,
            table = self.table_name,
            sql = query.sql(),
            params = query.params().len(),
            "Running query"
        );
        if self.options.log_parameters {
            debug!(params = ?query.params(), "query parameters");
        }
    }
}
