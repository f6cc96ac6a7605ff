use crate::codec::to_storage;
use crate::error::SqlStdOpsError;
use crate::schema::ColumnDef;

use super::{NamedParams, StatementBuilder, expand};

impl StatementBuilder {
    fn generated_id_column(&self) -> Option<&ColumnDef> {
        self.id_columns.iter().find(|c| c.is_database_generated())
    }

    /// INSERT, or UPSERT when `upsert` is set. Returns SQL, bindings and the RETURNING flag.
    pub(super) fn render_insert(
        &self,
        table: &str,
        upsert: bool,
    ) -> Result<(String, NamedParams, bool), SqlStdOpsError> {
        let entries = expand(&self.inserts)?;
        if entries.is_empty() {
            return Err(SqlStdOpsError::builder_state("no columns to insert"));
        }
        if upsert && self.id_columns.is_empty() {
            return Err(SqlStdOpsError::builder_state(
                "upsert requires at least one identifier column",
            ));
        }

        let generated = if self.generate_and_return_id {
            let id = self.generated_id_column().ok_or_else(|| {
                SqlStdOpsError::builder_state(
                    "generate-and-return-id needs a database-generated identifier column",
                )
            })?;
            let sequence = id.sequence_name().ok_or_else(|| {
                SqlStdOpsError::builder_state(format!(
                    "generated identifier `{}` has no sequence name",
                    id.name()
                ))
            })?;
            Some((id.name(), sequence))
        } else {
            None
        };

        let mut columns = Vec::with_capacity(entries.len());
        let mut values = Vec::with_capacity(entries.len());
        let mut updates = Vec::with_capacity(entries.len());
        let mut params = NamedParams::new();
        for (column, value) in &entries {
            let name = column.name();
            columns.push(name);
            match generated {
                Some((id_name, sequence)) if id_name == name => {
                    values.push(format!("nextval('{sequence}')"));
                }
                _ => {
                    values.push(format!(":{name}"));
                    updates.push(format!("{name} = :{name}"));
                    params.insert(name, to_storage(value, column)?);
                }
            }
        }

        let mut sql = format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            columns.join(","),
            values.join(",")
        );
        if upsert {
            let conflict: Vec<&str> = self.id_columns.iter().map(ColumnDef::name).collect();
            sql.push_str(&format!(" ON CONFLICT ({}) ", conflict.join(",")));
            if updates.is_empty() {
                sql.push_str("DO NOTHING");
            } else {
                sql.push_str("DO UPDATE SET ");
                sql.push_str(&updates.join(","));
            }
        }
        if let Some((id_name, _)) = generated {
            sql.push_str(" RETURNING ");
            sql.push_str(id_name);
        }

        Ok((sql, params, generated.is_some()))
    }

    pub(super) fn render_delete(
        &self,
        table: &str,
    ) -> Result<(String, NamedParams, bool), SqlStdOpsError> {
        let mut sql = format!("DELETE FROM {table}");
        let mut params = NamedParams::new();
        self.render_conditions(&mut sql, &mut params)?;
        Ok((sql, params, false))
    }
}
