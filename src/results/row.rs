use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValues;

/// Column-name lookup shared by every row of one result set.
pub(crate) type ColumnIndex = Arc<HashMap<String, usize>>;

pub(crate) fn index_columns(column_names: &[String]) -> ColumnIndex {
    Arc::new(
        column_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect(),
    )
}

/// One result row with random access by column name or position.
#[derive(Debug, Clone)]
pub struct CustomDbRow {
    /// Column names, shared across all rows of the result set
    pub column_names: Arc<Vec<String>>,
    /// Values in column order
    pub rows: Vec<RowValues>,
    #[doc(hidden)]
    pub(crate) column_index: ColumnIndex,
}

impl CustomDbRow {
    /// Standalone row; builds its own column index.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, rows: Vec<RowValues>) -> Self {
        let column_index = index_columns(&column_names);
        Self {
            column_names,
            rows,
            column_index,
        }
    }

    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_index.get(column_name).copied()
    }

    /// Value of `column_name`, or `None` when the row has no such column.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.rows.get(idx))
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.rows.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
