//! Single-use builder for the four statement kinds.
//!
//! SQL is rendered with named placeholders (`:column`); executors translate them to the
//! backend's positional style before running the statement.

use std::collections::HashSet;
use std::fmt;

use crate::error::SqlStdOpsError;
use crate::schema::ColumnDef;
use crate::types::RowValues;
use crate::value::FieldValue;

mod dml;
mod select;

/// Statement kind produced by [`StatementBuilder::build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    Insert,
    Upsert,
    Select,
    Delete,
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QueryType::Insert => "INSERT",
            QueryType::Upsert => "UPSERT",
            QueryType::Select => "SELECT",
            QueryType::Delete => "DELETE",
        })
    }
}

/// Named parameter bindings in first-bound order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedParams {
    entries: Vec<(String, RowValues)>,
}

impl NamedParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` to `name`, replacing an earlier binding of the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, value: RowValues) {
        let name = name.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RowValues> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<S: Into<String>> FromIterator<(S, RowValues)> for NamedParams {
    fn from_iter<I: IntoIterator<Item = (S, RowValues)>>(iter: I) -> Self {
        let mut params = NamedParams::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// A built statement: SQL text, its bindings, and whether it returns a generated id.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    query_type: QueryType,
    sql: String,
    params: NamedParams,
    has_returning_clause: bool,
}

impl Query {
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn params(&self) -> &NamedParams {
        &self.params
    }

    #[must_use]
    pub fn has_returning_clause(&self) -> bool {
        self.has_returning_clause
    }

    #[must_use]
    pub fn query_type(&self) -> QueryType {
        self.query_type
    }
}

/// Assembles one statement from column definitions, values and flags.
///
/// Setters may be called in any order; all validation happens in [`StatementBuilder::build`],
/// which may be called only once.
///
/// ```rust
/// use sql_stdops::prelude::*;
///
/// let id = ColumnDef::new("id", ValueType::Int);
/// let mut builder = StatementBuilder::new();
/// builder
///     .set_table_name("foobar")
///     .set_query_type(QueryType::Delete)
///     .add_condition(&id, FieldValue::Int(1));
/// let query = builder.build()?;
/// assert_eq!(query.sql(), "DELETE FROM foobar WHERE id = :id");
/// assert!(builder.build().is_err());
/// # Ok::<(), SqlStdOpsError>(())
/// ```
#[derive(Debug, Default)]
pub struct StatementBuilder {
    table_name: Option<String>,
    query_type: Option<QueryType>,
    id_columns: Vec<ColumnDef>,
    select_columns: Vec<String>,
    inserts: Vec<(ColumnDef, FieldValue)>,
    conditions: Vec<(ColumnDef, FieldValue)>,
    order_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    generate_and_return_id: bool,
    built: bool,
}

impl StatementBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_table_name(&mut self, table_name: impl Into<String>) -> &mut Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn set_query_type(&mut self, query_type: QueryType) -> &mut Self {
        self.query_type = Some(query_type);
        self
    }

    /// Identifier column; a composite definition contributes one column per component.
    pub fn set_id_column(&mut self, id_column: &ColumnDef) -> &mut Self {
        self.id_columns = id_column.storage_columns();
        self
    }

    pub fn set_id_columns(&mut self, id_columns: Vec<ColumnDef>) -> &mut Self {
        self.id_columns = id_columns;
        self
    }

    pub fn set_columns_to_select<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_column_to_select(&mut self, column: impl Into<String>) -> &mut Self {
        self.select_columns.push(column.into());
        self
    }

    /// Column to insert, in call order. Repeating a column replaces its value in place.
    pub fn add_column_to_insert(&mut self, column: &ColumnDef, value: FieldValue) -> &mut Self {
        upsert_entry(&mut self.inserts, column, value);
        self
    }

    /// Equality condition; a null value renders `IS NULL`. Repeating a column replaces it.
    pub fn add_condition(&mut self, column: &ColumnDef, value: FieldValue) -> &mut Self {
        upsert_entry(&mut self.conditions, column, value);
        self
    }

    pub fn set_generate_and_return_id(&mut self, generate: bool) -> &mut Self {
        self.generate_and_return_id = generate;
        self
    }

    pub fn set_order_by<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order_by = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn set_limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn set_offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    /// Render the configured statement.
    ///
    /// # Errors
    /// Returns `SqlStdOpsError::BuilderStateError` when called a second time, when the table or
    /// statement kind is unset, or when the configuration does not fit the statement kind.
    /// Value encoding failures surface as `SqlStdOpsError::ConversionError`.
    pub fn build(&mut self) -> Result<Query, SqlStdOpsError> {
        if self.built {
            return Err(SqlStdOpsError::builder_state(
                "build() was already called on this builder",
            ));
        }
        self.built = true;

        let table = self
            .table_name
            .clone()
            .ok_or_else(|| SqlStdOpsError::builder_state("table name is not set"))?;
        let query_type = self
            .query_type
            .ok_or_else(|| SqlStdOpsError::builder_state("query type is not set"))?;

        let (sql, params, has_returning_clause) = match query_type {
            QueryType::Insert => self.render_insert(&table, false)?,
            QueryType::Upsert => self.render_insert(&table, true)?,
            QueryType::Select => self.render_select(&table)?,
            QueryType::Delete => self.render_delete(&table)?,
        };

        Ok(Query {
            query_type,
            sql,
            params,
            has_returning_clause,
        })
    }
}

/// Entries are matched per descriptor: a composite field never shares a slot with a simple
/// column, even when the field name and the column name are equal.
#[derive(PartialEq, Eq)]
enum EntryKey<'a> {
    Column(&'a str),
    Composite(&'a str),
}

fn entry_key(column: &ColumnDef) -> EntryKey<'_> {
    if column.is_composite() {
        EntryKey::Composite(column.field_name.as_str())
    } else {
        EntryKey::Column(
            column
                .column_name
                .as_deref()
                .unwrap_or(column.field_name.as_str()),
        )
    }
}

fn upsert_entry(entries: &mut Vec<(ColumnDef, FieldValue)>, column: &ColumnDef, value: FieldValue) {
    let key = entry_key(column);
    if let Some(slot) = entries.iter_mut().find(|(c, _)| entry_key(c) == key) {
        *slot = (column.clone(), value);
    } else {
        entries.push((column.clone(), value));
    }
}

/// Split composite entries into one simple entry per component, in component order.
fn expand(entries: &[(ColumnDef, FieldValue)]) -> Result<Vec<(ColumnDef, FieldValue)>, SqlStdOpsError> {
    let mut out = Vec::with_capacity(entries.len());
    for (column, value) in entries {
        if !column.is_composite() {
            out.push((column.clone(), value.clone()));
            continue;
        }
        let parts = column.storage_columns();
        match value {
            FieldValue::Composite(values) if values.len() == parts.len() => {
                out.extend(parts.into_iter().zip(values.iter().cloned()));
            }
            FieldValue::Null => {
                out.extend(parts.into_iter().map(|p| (p, FieldValue::Null)));
            }
            other => {
                return Err(SqlStdOpsError::conversion(format!(
                    "composite `{}` has {} components, got {} value{}",
                    column.field_name,
                    parts.len(),
                    other.kind_name(),
                    match other {
                        FieldValue::Composite(v) => format!(" with {} parts", v.len()),
                        _ => String::new(),
                    }
                )));
            }
        }
    }
    {
        let mut seen = HashSet::with_capacity(out.len());
        for (column, _) in &out {
            if !seen.insert(column.name()) {
                return Err(SqlStdOpsError::builder_state(format!(
                    "column `{}` is bound more than once",
                    column.name()
                )));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::schema::{ColumnComponentDescriptor, IdentifierMetadata};
    use crate::value::ValueType;

    fn col(name: &str) -> ColumnDef {
        ColumnDef::new(name, ValueType::Int)
    }

    fn composite_id() -> ColumnDef {
        let part = |name: &str| ColumnComponentDescriptor {
            field_name: name.to_owned(),
            column_name: name.to_owned(),
            value_type: ValueType::Int,
            enum_metadata: None,
            nullable: false,
        };
        ColumnDef::composite("id", vec![part("first_part"), part("second_part")])
    }

    #[test]
    fn select_without_conditions() {
        let mut b = StatementBuilder::new();
        b.set_table_name("foobar")
            .set_query_type(QueryType::Select)
            .set_columns_to_select(["col1", "col2", "col3"]);
        let q = b.build().unwrap();
        assert_eq!(q.sql(), "SELECT col1,col2,col3 FROM foobar");
        assert!(q.params().is_empty());
        assert!(!q.has_returning_clause());
    }

    #[test]
    fn select_requires_columns() {
        let mut b = StatementBuilder::new();
        b.set_table_name("foobar").set_query_type(QueryType::Select);
        assert_eq!(b.build().unwrap_err().kind(), ErrorKind::BuilderState);
    }

    #[test]
    fn plain_insert() {
        let mut b = StatementBuilder::new();
        b.set_table_name("foobar")
            .set_query_type(QueryType::Insert)
            .add_column_to_insert(&col("col1"), FieldValue::Int(1))
            .add_column_to_insert(&col("col2"), FieldValue::Int(2));
        let q = b.build().unwrap();
        assert_eq!(q.sql(), "INSERT INTO foobar (col1,col2) VALUES (:col1,:col2)");
        let params: Vec<(&str, &RowValues)> = q.params().iter().collect();
        assert_eq!(
            params,
            [("col1", &RowValues::Int(1)), ("col2", &RowValues::Int(2))]
        );
        assert!(!q.has_returning_clause());
    }

    #[test]
    fn upsert_sets_every_inserted_column() {
        let id = col("col1").with_id(IdentifierMetadata::plain());
        let mut b = StatementBuilder::new();
        b.set_table_name("foobar")
            .set_query_type(QueryType::Upsert)
            .set_id_column(&id)
            .add_column_to_insert(&id, FieldValue::Int(1))
            .add_column_to_insert(&col("col2"), FieldValue::Int(2));
        let q = b.build().unwrap();
        assert_eq!(
            q.sql(),
            "INSERT INTO foobar (col1,col2) VALUES (:col1,:col2) ON CONFLICT (col1) DO UPDATE SET col1 = :col1,col2 = :col2"
        );
        assert_eq!(q.params().len(), 2);
    }

    #[test]
    fn upsert_requires_id_columns() {
        let mut b = StatementBuilder::new();
        b.set_table_name("foobar")
            .set_query_type(QueryType::Upsert)
            .add_column_to_insert(&col("col2"), FieldValue::Int(2));
        assert_eq!(b.build().unwrap_err().kind(), ErrorKind::BuilderState);
    }

    #[test]
    fn generated_upsert_skips_id_in_set_list() {
        let id = ColumnDef::new("id", ValueType::DeferredId)
            .with_id(IdentifierMetadata::generated("seq1"));
        let mut b = StatementBuilder::new();
        b.set_table_name("foobar")
            .set_query_type(QueryType::Upsert)
            .set_id_column(&id)
            .set_generate_and_return_id(true)
            .add_column_to_insert(&id, FieldValue::Deferred(None))
            .add_column_to_insert(&col("name"), FieldValue::Text("x".into()));
        let q = b.build().unwrap();
        assert_eq!(
            q.sql(),
            "INSERT INTO foobar (id,name) VALUES (nextval('seq1'),:name) ON CONFLICT (id) DO UPDATE SET name = :name RETURNING id"
        );
        assert!(q.has_returning_clause());
    }

    #[test]
    fn upsert_with_nothing_to_update() {
        let id = ColumnDef::new("id", ValueType::DeferredId)
            .with_id(IdentifierMetadata::generated("seq1"));
        let mut b = StatementBuilder::new();
        b.set_table_name("foobar")
            .set_query_type(QueryType::Upsert)
            .set_id_column(&id)
            .set_generate_and_return_id(true)
            .add_column_to_insert(&id, FieldValue::Deferred(None));
        let q = b.build().unwrap();
        assert_eq!(
            q.sql(),
            "INSERT INTO foobar (id) VALUES (nextval('seq1')) ON CONFLICT (id) DO NOTHING RETURNING id"
        );
    }

    #[test]
    fn delete_without_and_with_condition() {
        let mut b = StatementBuilder::new();
        b.set_table_name("foobar").set_query_type(QueryType::Delete);
        let q = b.build().unwrap();
        assert_eq!(q.sql(), "DELETE FROM foobar");
        assert!(q.params().is_empty());

        let mut b = StatementBuilder::new();
        b.set_table_name("foobar")
            .set_query_type(QueryType::Delete)
            .add_condition(&col("id"), FieldValue::Int(1));
        let q = b.build().unwrap();
        assert_eq!(q.sql(), "DELETE FROM foobar WHERE id = :id");
        assert_eq!(q.params().get("id"), Some(&RowValues::Int(1)));
    }

    #[test]
    fn generated_insert_uses_sequence_and_returning() {
        let id = ColumnDef::new("id", ValueType::DeferredId)
            .with_id(IdentifierMetadata::generated("seq1"));
        let mut b = StatementBuilder::new();
        b.set_table_name("foobar")
            .set_query_type(QueryType::Insert)
            .set_id_column(&id)
            .set_generate_and_return_id(true)
            .add_column_to_insert(&id, FieldValue::Deferred(None))
            .add_column_to_insert(&col("col2"), FieldValue::Int(2));
        let q = b.build().unwrap();
        assert_eq!(
            q.sql(),
            "INSERT INTO foobar (id,col2) VALUES (nextval('seq1'),:col2) RETURNING id"
        );
        assert!(q.params().get("id").is_none());
        assert!(q.has_returning_clause());
    }

    #[test]
    fn generate_requires_generated_id_column() {
        let id = col("id").with_id(IdentifierMetadata::plain());
        let mut b = StatementBuilder::new();
        b.set_table_name("foobar")
            .set_query_type(QueryType::Insert)
            .set_id_column(&id)
            .set_generate_and_return_id(true)
            .add_column_to_insert(&id, FieldValue::Int(1));
        assert_eq!(b.build().unwrap_err().kind(), ErrorKind::BuilderState);
    }

    #[test]
    fn composite_condition_follows_component_order() {
        let id = composite_id();
        let mut b = StatementBuilder::new();
        b.set_table_name("entity_composite")
            .set_query_type(QueryType::Select)
            .set_columns_to_select(["first_part", "second_part", "name"])
            .add_condition(
                &id,
                FieldValue::Composite(vec![FieldValue::Int(1), FieldValue::Int(2)]),
            );
        let q = b.build().unwrap();
        assert_eq!(
            q.sql(),
            "SELECT first_part,second_part,name FROM entity_composite WHERE first_part = :first_part AND second_part = :second_part"
        );
        assert_eq!(q.params().names().collect::<Vec<_>>(), ["first_part", "second_part"]);
    }

    #[test]
    fn composite_insert_expands_columns() {
        let id = composite_id();
        let mut b = StatementBuilder::new();
        b.set_table_name("entity_composite")
            .set_query_type(QueryType::Upsert)
            .set_id_column(&id)
            .add_column_to_insert(
                &id,
                FieldValue::Composite(vec![FieldValue::Int(1), FieldValue::Int(2)]),
            )
            .add_column_to_insert(&col("name"), FieldValue::Text("n".into()));
        let q = b.build().unwrap();
        assert_eq!(
            q.sql(),
            "INSERT INTO entity_composite (first_part,second_part,name) VALUES (:first_part,:second_part,:name) ON CONFLICT (first_part,second_part) DO UPDATE SET first_part = :first_part,second_part = :second_part,name = :name"
        );
    }

    #[test]
    fn composite_with_wrong_arity_is_rejected() {
        let mut b = StatementBuilder::new();
        b.set_table_name("t")
            .set_query_type(QueryType::Delete)
            .add_condition(&composite_id(), FieldValue::Composite(vec![FieldValue::Int(1)]));
        assert_eq!(b.build().unwrap_err().kind(), ErrorKind::Conversion);
    }

    #[test]
    fn null_condition_binds_nothing() {
        let mut b = StatementBuilder::new();
        b.set_table_name("foobar")
            .set_query_type(QueryType::Select)
            .set_columns_to_select(["id"])
            .add_condition(&col("nullname"), FieldValue::Null)
            .add_condition(&col("id"), FieldValue::Int(3));
        let q = b.build().unwrap();
        assert_eq!(
            q.sql(),
            "SELECT id FROM foobar WHERE nullname IS NULL AND id = :id"
        );
        assert_eq!(q.params().names().collect::<Vec<_>>(), ["id"]);
    }

    #[test]
    fn repeated_condition_replaces_in_place() {
        let mut b = StatementBuilder::new();
        b.set_table_name("foobar")
            .set_query_type(QueryType::Delete)
            .add_condition(&col("a"), FieldValue::Int(1))
            .add_condition(&col("b"), FieldValue::Int(2))
            .add_condition(&col("a"), FieldValue::Int(3));
        let q = b.build().unwrap();
        assert_eq!(q.sql(), "DELETE FROM foobar WHERE a = :a AND b = :b");
        assert_eq!(q.params().get("a"), Some(&RowValues::Int(3)));
    }

    #[test]
    fn second_build_fails_for_every_kind() {
        for kind in [
            QueryType::Insert,
            QueryType::Upsert,
            QueryType::Select,
            QueryType::Delete,
        ] {
            let id = col("id").with_id(IdentifierMetadata::plain());
            let mut b = StatementBuilder::new();
            b.set_table_name("foobar")
                .set_query_type(kind)
                .set_id_column(&id)
                .set_columns_to_select(["id"])
                .add_column_to_insert(&id, FieldValue::Int(1));
            assert!(b.build().is_ok(), "first build of {kind}");
            assert_eq!(b.build().unwrap_err().kind(), ErrorKind::BuilderState);
        }
    }

    #[test]
    fn unset_table_or_kind_fails() {
        let mut b = StatementBuilder::new();
        b.set_query_type(QueryType::Delete);
        assert_eq!(b.build().unwrap_err().kind(), ErrorKind::BuilderState);

        let mut b = StatementBuilder::new();
        b.set_table_name("foobar");
        assert_eq!(b.build().unwrap_err().kind(), ErrorKind::BuilderState);
    }

    #[test]
    fn paging_and_ordering() {
        let mut b = StatementBuilder::new();
        b.set_table_name("foobar")
            .set_query_type(QueryType::Select)
            .set_columns_to_select(["id", "name"])
            .set_order_by(["id"])
            .set_limit(10)
            .set_offset(20);
        let q = b.build().unwrap();
        assert_eq!(
            q.sql(),
            "SELECT id,name FROM foobar ORDER BY id LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn identical_input_renders_identical_sql() {
        let render = || {
            let mut b = StatementBuilder::new();
            b.set_table_name("foobar")
                .set_query_type(QueryType::Insert)
                .add_column_to_insert(&col("z"), FieldValue::Int(1))
                .add_column_to_insert(&col("a"), FieldValue::Int(2))
                .add_column_to_insert(&col("m"), FieldValue::Int(3));
            b.build().unwrap()
        };
        assert_eq!(render(), render());
        assert_eq!(render().sql(), "INSERT INTO foobar (z,a,m) VALUES (:z,:a,:m)");
    }

    #[test]
    fn composite_field_and_equally_named_column_keep_separate_slots() {
        let key = {
            let part = |name: &str| ColumnComponentDescriptor {
                field_name: name.to_owned(),
                column_name: name.to_owned(),
                value_type: ValueType::Int,
                enum_metadata: None,
                nullable: false,
            };
            ColumnDef::composite("key", vec![part("first_part"), part("second_part")])
        };
        let label = ColumnDef::new("key", ValueType::Text);
        let mut b = StatementBuilder::new();
        b.set_table_name("tagged")
            .set_query_type(QueryType::Insert)
            .add_column_to_insert(
                &key,
                FieldValue::Composite(vec![FieldValue::Int(1), FieldValue::Int(2)]),
            )
            .add_column_to_insert(&label, FieldValue::Text("x".into()));
        let q = b.build().unwrap();
        assert_eq!(
            q.sql(),
            "INSERT INTO tagged (first_part,second_part,key) VALUES (:first_part,:second_part,:key)"
        );
        assert_eq!(q.params().len(), 3);
    }

    #[test]
    fn column_bound_twice_after_expansion_is_rejected() {
        let mut b = StatementBuilder::new();
        b.set_table_name("foobar")
            .set_query_type(QueryType::Insert)
            .add_column_to_insert(
                &composite_id(),
                FieldValue::Composite(vec![FieldValue::Int(1), FieldValue::Int(2)]),
            )
            .add_column_to_insert(&col("first_part"), FieldValue::Int(3));
        assert_eq!(b.build().unwrap_err().kind(), ErrorKind::BuilderState);
    }
}
