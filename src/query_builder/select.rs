use crate::codec::to_storage;
use crate::error::SqlStdOpsError;

use super::{NamedParams, StatementBuilder, expand};

impl StatementBuilder {
    pub(super) fn render_select(
        &self,
        table: &str,
    ) -> Result<(String, NamedParams, bool), SqlStdOpsError> {
        if self.select_columns.is_empty() {
            return Err(SqlStdOpsError::builder_state("no columns to select"));
        }
        let mut sql = format!("SELECT {} FROM {table}", self.select_columns.join(","));
        let mut params = NamedParams::new();
        self.render_conditions(&mut sql, &mut params)?;

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(","));
        }
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => {
                sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
            }
            (Some(limit), None) => {
                sql.push_str(&format!(" LIMIT {limit}"));
            }
            (None, Some(_)) => {
                return Err(SqlStdOpsError::builder_state("offset requires a limit"));
            }
            (None, None) => {}
        }
        Ok((sql, params, false))
    }

    /// Append ` WHERE ...` for the configured conditions, binding non-null values.
    pub(super) fn render_conditions(
        &self,
        sql: &mut String,
        params: &mut NamedParams,
    ) -> Result<(), SqlStdOpsError> {
        let entries = expand(&self.conditions)?;
        if entries.is_empty() {
            return Ok(());
        }
        let mut clauses = Vec::with_capacity(entries.len());
        for (column, value) in &entries {
            let name = column.name();
            if value.is_null() {
                clauses.push(format!("{name} IS NULL"));
            } else {
                clauses.push(format!("{name} = :{name}"));
                params.insert(name, to_storage(value, column)?);
            }
        }
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
        Ok(())
    }
}
