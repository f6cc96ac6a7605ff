use std::fmt;
use std::sync::Arc;

use crate::error::SqlStdOpsError;
use crate::types::RowValues;
use crate::value::{FieldValue, ValueType};

use super::metadata::{EnumMetadata, IdentifierMetadata};

pub(crate) type Getter<E> = Arc<dyn Fn(&E) -> FieldValue + Send + Sync>;
pub(crate) type DeferredSetter<E> =
    Arc<dyn Fn(&mut E, &RowValues) -> Result<(), SqlStdOpsError> + Send + Sync>;

/// One storage column of a composite identifier.
#[derive(Debug, Clone)]
pub struct ColumnComponentDescriptor {
    pub field_name: String,
    pub column_name: String,
    pub value_type: ValueType,
    pub enum_metadata: Option<EnumMetadata>,
    pub nullable: bool,
}

impl ColumnComponentDescriptor {
    /// The component as a standalone simple column.
    #[must_use]
    pub fn to_column_def(&self) -> ColumnDef {
        ColumnDef {
            field_name: self.field_name.clone(),
            column_name: Some(self.column_name.clone()),
            value_type: self.value_type,
            id_metadata: None,
            enum_metadata: self.enum_metadata.clone(),
            nullable: self.nullable,
            components: Vec::new(),
        }
    }
}

/// Column metadata independent of the record type: what the statement builder and the value
/// codec work with.
///
/// A definition is either simple (has `column_name`, no components) or composite (no
/// `column_name`, at least one component).
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub field_name: String,
    pub column_name: Option<String>,
    pub value_type: ValueType,
    pub id_metadata: Option<IdentifierMetadata>,
    pub enum_metadata: Option<EnumMetadata>,
    pub nullable: bool,
    pub components: Vec<ColumnComponentDescriptor>,
}

impl ColumnDef {
    /// Simple non-null column whose field is named after the column.
    #[must_use]
    pub fn new(column_name: impl Into<String>, value_type: ValueType) -> Self {
        let column_name = column_name.into();
        Self {
            field_name: column_name.clone(),
            column_name: Some(column_name),
            value_type,
            id_metadata: None,
            enum_metadata: None,
            nullable: false,
            components: Vec::new(),
        }
    }

    /// Composite identifier spanning `components`.
    #[must_use]
    pub fn composite(
        field_name: impl Into<String>,
        components: Vec<ColumnComponentDescriptor>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            column_name: None,
            value_type: ValueType::Composite,
            id_metadata: Some(IdentifierMetadata::composite()),
            enum_metadata: None,
            nullable: false,
            components,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id_metadata: IdentifierMetadata) -> Self {
        self.id_metadata = Some(id_metadata);
        self
    }

    #[must_use]
    pub fn with_enum(mut self, enum_metadata: EnumMetadata) -> Self {
        self.enum_metadata = Some(enum_metadata);
        self
    }

    #[must_use]
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    #[must_use]
    pub fn is_composite(&self) -> bool {
        !self.components.is_empty()
    }

    #[must_use]
    pub fn is_identifier(&self) -> bool {
        self.id_metadata.is_some()
    }

    #[must_use]
    pub fn is_database_generated(&self) -> bool {
        self.id_metadata
            .as_ref()
            .is_some_and(|id| id.database_generated)
    }

    #[must_use]
    pub fn sequence_name(&self) -> Option<&str> {
        self.id_metadata
            .as_ref()
            .and_then(|id| id.sequence_name.as_deref())
    }

    /// Storage column name; empty for a composite definition.
    #[must_use]
    pub fn name(&self) -> &str {
        self.column_name.as_deref().unwrap_or_default()
    }

    /// Simple definitions this one stands for: itself, or one per component.
    #[must_use]
    pub fn storage_columns(&self) -> Vec<ColumnDef> {
        if self.is_composite() {
            self.components
                .iter()
                .map(ColumnComponentDescriptor::to_column_def)
                .collect()
        } else {
            vec![self.clone()]
        }
    }
}

/// Name and arity of the constructor a composite identifier is rebuilt with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorRef {
    pub type_name: &'static str,
    pub arity: usize,
}

/// A record field bound to its column(s): the descriptor derived once per record type.
pub struct ColumnDescriptor<E> {
    pub(crate) def: ColumnDef,
    pub(crate) getter: Getter<E>,
    pub(crate) deferred_setter: Option<DeferredSetter<E>>,
    pub(crate) composite_constructor: Option<ConstructorRef>,
}

impl<E> fmt::Debug for ColumnDescriptor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("def", &self.def)
            .field("composite_constructor", &self.composite_constructor)
            .finish_non_exhaustive()
    }
}

impl<E> ColumnDescriptor<E> {
    #[must_use]
    pub fn def(&self) -> &ColumnDef {
        &self.def
    }

    #[must_use]
    pub fn composite_constructor(&self) -> Option<&ConstructorRef> {
        self.composite_constructor.as_ref()
    }

    /// Read this field from `record`.
    #[must_use]
    pub fn read(&self, record: &E) -> FieldValue {
        (self.getter)(record)
    }
}
