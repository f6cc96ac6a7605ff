//! Declarative field metadata supplied by record types.

use std::fmt;
use std::sync::Arc;

use crate::error::SqlStdOpsError;
use crate::types::RowValues;
use crate::value::{
    DeferredId, EnumCodec, FieldValue, FromFieldValue, IdScalar, SqlEnum, ValueType,
};

use super::descriptor::{ConstructorRef, DeferredSetter, Getter};
use super::metadata::Enumerated;

/// Identifier marker carried by a [`FieldSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum IdMarker {
    Plain,
    Composite,
}

/// One field of a record type, as declared by [`Entity::fields`](crate::Entity::fields).
///
/// ```rust
/// use sql_stdops::prelude::*;
///
/// struct Person { id: i64, name: Option<String> }
///
/// let fields: Vec<FieldSpec<Person>> = vec![
///     FieldSpec::new("id", ValueType::Int, |p: &Person| p.id.into()).column("id").id(),
///     FieldSpec::new("name", ValueType::Text, |p: &Person| p.name.clone().into())
///         .column("name")
///         .nullable(),
/// ];
/// assert_eq!(fields.len(), 2);
/// ```
pub struct FieldSpec<E> {
    pub(crate) field_name: &'static str,
    pub(crate) value_type: ValueType,
    pub(crate) column_name: Option<String>,
    pub(crate) nullable: bool,
    pub(crate) id: Option<IdMarker>,
    pub(crate) sequence_name: Option<String>,
    pub(crate) enumerated: Option<(Enumerated, Arc<EnumCodec>)>,
    pub(crate) getter: Getter<E>,
    pub(crate) deferred_setter: Option<DeferredSetter<E>>,
    pub(crate) composite: Option<CompositeParts>,
}

/// Type-erased view of a composite identifier's declared components.
pub(crate) struct CompositeParts {
    pub(crate) components: Vec<ComponentPart>,
    pub(crate) constructor: ConstructorRef,
}

pub(crate) struct ComponentPart {
    pub(crate) field_name: &'static str,
    pub(crate) column_name: Option<String>,
    pub(crate) value_type: ValueType,
    pub(crate) nullable: bool,
    pub(crate) enumerated: Option<(Enumerated, Arc<EnumCodec>)>,
}

impl<E> fmt::Debug for FieldSpec<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("field_name", &self.field_name)
            .field("value_type", &self.value_type)
            .field("column_name", &self.column_name)
            .field("nullable", &self.nullable)
            .field("id", &self.id)
            .field("sequence_name", &self.sequence_name)
            .finish_non_exhaustive()
    }
}

impl<E: 'static> FieldSpec<E> {
    /// Field read through `getter`. Add `.column(..)` to map it to storage.
    pub fn new<F>(field_name: &'static str, value_type: ValueType, getter: F) -> Self
    where
        F: Fn(&E) -> FieldValue + Send + Sync + 'static,
    {
        Self {
            field_name,
            value_type,
            column_name: None,
            nullable: false,
            id: None,
            sequence_name: None,
            enumerated: None,
            getter: Arc::new(getter),
            deferred_setter: None,
            composite: None,
        }
    }

    /// Identifier field held in a [`DeferredId`]; `get_mut` is used to backfill a generated id.
    pub fn deferred_id<T>(
        field_name: &'static str,
        get: fn(&E) -> &DeferredId<T>,
        get_mut: fn(&mut E) -> &mut DeferredId<T>,
    ) -> Self
    where
        T: IdScalar + 'static,
    {
        let mut spec = Self::new(field_name, ValueType::DeferredId, move |e: &E| {
            FieldValue::from(get(e))
        });
        spec.id = Some(IdMarker::Plain);
        spec.deferred_setter = Some(Arc::new(move |e: &mut E, raw: &RowValues| {
            let value = T::from_row_value(raw)?;
            get_mut(e).fill(value);
            Ok(())
        }));
        spec
    }

    /// Composite identifier of type `K`; its columns come from [`CompositeKey::components`].
    pub fn composite_id<K: CompositeKey>(field_name: &'static str, get: fn(&E) -> &K) -> Self {
        let components = K::components();
        let arity = K::constructor().arity();
        let getters: Vec<Getter<K>> = components
            .iter()
            .filter(|c| c.column_name.is_some())
            .map(|c| Arc::clone(&c.getter))
            .collect();
        let parts = components
            .into_iter()
            .map(|c| ComponentPart {
                field_name: c.field_name,
                column_name: c.column_name,
                value_type: c.value_type,
                nullable: c.nullable,
                enumerated: c.enumerated,
            })
            .collect();

        let mut spec = Self::new(field_name, ValueType::Composite, move |e: &E| {
            let key = get(e);
            FieldValue::Composite(getters.iter().map(|g| g(key)).collect())
        });
        spec.id = Some(IdMarker::Composite);
        spec.composite = Some(CompositeParts {
            components: parts,
            constructor: ConstructorRef {
                type_name: std::any::type_name::<K>(),
                arity,
            },
        });
        spec
    }

    #[must_use]
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.column_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Mark this field as the record's identifier.
    #[must_use]
    pub fn id(mut self) -> Self {
        if self.id.is_none() {
            self.id = Some(IdMarker::Plain);
        }
        self
    }

    /// Identifier value comes from `nextval('<sequence_name>')` when the holder is empty.
    #[must_use]
    pub fn generated(mut self, sequence_name: impl Into<String>) -> Self {
        self.sequence_name = Some(sequence_name.into());
        self
    }

    #[must_use]
    pub fn enumerated(mut self, codec: Arc<EnumCodec>, selector: Enumerated) -> Self {
        self.enumerated = Some((selector, codec));
        self
    }

    #[must_use]
    pub fn field_name(&self) -> &'static str {
        self.field_name
    }
}

/// One component of a composite identifier. Components without a column are ignored.
pub struct ComponentSpec<K> {
    field_name: &'static str,
    column_name: Option<String>,
    value_type: ValueType,
    nullable: bool,
    enumerated: Option<(Enumerated, Arc<EnumCodec>)>,
    getter: Getter<K>,
}

impl<K> ComponentSpec<K> {
    pub fn new<F>(field_name: &'static str, value_type: ValueType, getter: F) -> Self
    where
        F: Fn(&K) -> FieldValue + Send + Sync + 'static,
    {
        Self {
            field_name,
            column_name: None,
            value_type,
            nullable: false,
            enumerated: None,
            getter: Arc::new(getter),
        }
    }

    #[must_use]
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.column_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub fn enumerated(mut self, codec: Arc<EnumCodec>, selector: Enumerated) -> Self {
        self.enumerated = Some((selector, codec));
        self
    }
}

/// Value type of a composite identifier.
///
/// The constructor receives the mapped components in declared order, so its arity must equal the
/// number of components that carry a column.
pub trait CompositeKey: Sized + Send + Sync + 'static {
    fn components() -> Vec<ComponentSpec<Self>>;

    fn constructor() -> Constructor<Self>;

    /// Mapped component values in declared order, as used for identifier conditions.
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Composite(
            Self::components()
                .iter()
                .filter(|c| c.column_name.is_some())
                .map(|c| (c.getter)(self))
                .collect(),
        )
    }
}

type BuildFn<T> = Arc<dyn Fn(&mut Args) -> Result<T, SqlStdOpsError> + Send + Sync>;

/// Positional constructor of a record or composite key.
pub struct Constructor<T> {
    arity: usize,
    build: BuildFn<T>,
}

impl<T> Clone for Constructor<T> {
    fn clone(&self) -> Self {
        Self {
            arity: self.arity,
            build: Arc::clone(&self.build),
        }
    }
}

impl<T> fmt::Debug for Constructor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("target", &std::any::type_name::<T>())
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

impl<T> Constructor<T> {
    pub fn new<F>(arity: usize, build: F) -> Self
    where
        F: Fn(&mut Args) -> Result<T, SqlStdOpsError> + Send + Sync + 'static,
    {
        Self {
            arity,
            build: Arc::new(build),
        }
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Build a value from positional arguments.
    ///
    /// # Errors
    /// Returns `SqlStdOpsError::MappingError` when the argument count differs from the arity or
    /// when the build function leaves arguments unconsumed. Conversion failures of individual
    /// arguments are returned as raised by [`Args`].
    pub fn construct(&self, values: Vec<FieldValue>) -> Result<T, SqlStdOpsError> {
        let target = std::any::type_name::<T>();
        if values.len() != self.arity {
            return Err(SqlStdOpsError::mapping(format!(
                "constructor for {target} takes {} arguments, got {}",
                self.arity,
                values.len()
            )));
        }
        let mut args = Args {
            values: values.into_iter(),
            position: 0,
            target,
        };
        let built = (self.build)(&mut args)?;
        let leftover = args.values.len();
        if leftover > 0 {
            return Err(SqlStdOpsError::mapping(format!(
                "constructor for {target} left {leftover} arguments unused"
            )));
        }
        Ok(built)
    }
}

/// Positional argument cursor handed to a [`Constructor`].
#[derive(Debug)]
pub struct Args {
    values: std::vec::IntoIter<FieldValue>,
    position: usize,
    target: &'static str,
}

impl Args {
    fn advance(&mut self) -> Result<FieldValue, SqlStdOpsError> {
        let value = self.values.next().ok_or_else(|| {
            SqlStdOpsError::mapping(format!(
                "constructor for {} asked for argument {} but only {} were supplied",
                self.target,
                self.position + 1,
                self.position
            ))
        })?;
        self.position += 1;
        Ok(value)
    }

    fn annotate(&self, err: SqlStdOpsError) -> SqlStdOpsError {
        match err {
            SqlStdOpsError::ConversionError(msg) => SqlStdOpsError::conversion(format!(
                "argument {} of {}: {msg}",
                self.position, self.target
            )),
            other => other,
        }
    }

    /// Next argument as `T`.
    ///
    /// # Errors
    /// `MappingError` when no argument is left, `ConversionError` on a type mismatch.
    pub fn take<T: FromFieldValue>(&mut self) -> Result<T, SqlStdOpsError> {
        let value = self.advance()?;
        T::from_field_value(value).map_err(|e| self.annotate(e))
    }

    /// Next argument as a variant of `En`.
    ///
    /// # Errors
    /// `MappingError` when no argument is left, `ConversionError` when the value is null or
    /// belongs to another type.
    pub fn take_enum<En: SqlEnum>(&mut self) -> Result<En, SqlStdOpsError> {
        let value = self.advance()?;
        self.enum_from(value)
    }

    /// Next argument as an optional variant of `En`; null maps to `None`.
    ///
    /// # Errors
    /// Same as [`Args::take_enum`], except that null is accepted.
    pub fn take_optional_enum<En: SqlEnum>(&mut self) -> Result<Option<En>, SqlStdOpsError> {
        match self.advance()? {
            FieldValue::Null => Ok(None),
            value => self.enum_from(value).map(Some),
        }
    }

    /// Next argument rebuilt as composite key `K`.
    ///
    /// # Errors
    /// `MappingError` when no argument is left or `K`'s constructor rejects the components,
    /// `ConversionError` when the value is not a composite.
    pub fn take_composite<K: CompositeKey>(&mut self) -> Result<K, SqlStdOpsError> {
        match self.advance()? {
            FieldValue::Composite(parts) => K::constructor().construct(parts),
            other => Err(self.annotate(SqlStdOpsError::conversion(format!(
                "expected composite {}, got {} value",
                std::any::type_name::<K>(),
                other.kind_name()
            )))),
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    fn enum_from<En: SqlEnum>(&self, value: FieldValue) -> Result<En, SqlStdOpsError> {
        match value {
            FieldValue::Enum(ev) => ev.to::<En>().ok_or_else(|| {
                self.annotate(SqlStdOpsError::conversion(format!(
                    "{}::{} is not a {}",
                    ev.type_name(),
                    ev.symbol(),
                    std::any::type_name::<En>()
                )))
            }),
            other => Err(self.annotate(SqlStdOpsError::conversion(format!(
                "expected enum {}, got {} value",
                std::any::type_name::<En>(),
                other.kind_name()
            )))),
        }
    }
}
