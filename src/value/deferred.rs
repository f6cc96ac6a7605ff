use crate::error::SqlStdOpsError;
use crate::types::RowValues;

use super::FieldValue;

/// Holder for an identifier the database assigns on insert.
///
/// A record is created with an empty holder (`DeferredId::new()`) or an already-known id
/// (`DeferredId::of(7)`). When the id column is database-generated and the holder is empty,
/// `StandardOperations::create` fills it from the `RETURNING` row; that is the only time the
/// crate writes into caller-owned data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeferredId<T> {
    value: Option<T>,
}

impl<T> DeferredId<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { value: None }
    }

    #[must_use]
    pub fn of(value: T) -> Self {
        Self { value: Some(value) }
    }

    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    pub(crate) fn fill(&mut self, value: T) {
        self.value = Some(value);
    }
}

impl<T> Default for DeferredId<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Scalar types that can sit inside a [`DeferredId`].
pub trait IdScalar: Sized + Clone {
    fn to_row_value(&self) -> RowValues;

    /// # Errors
    /// Returns `SqlStdOpsError::ConversionError` when `raw` has the wrong shape.
    fn from_row_value(raw: &RowValues) -> Result<Self, SqlStdOpsError>;
}

impl IdScalar for i64 {
    fn to_row_value(&self) -> RowValues {
        RowValues::Int(*self)
    }

    fn from_row_value(raw: &RowValues) -> Result<Self, SqlStdOpsError> {
        raw.as_int().copied().ok_or_else(|| {
            SqlStdOpsError::conversion(format!("expected integer identifier, got {raw:?}"))
        })
    }
}

impl IdScalar for i32 {
    fn to_row_value(&self) -> RowValues {
        RowValues::Int(i64::from(*self))
    }

    fn from_row_value(raw: &RowValues) -> Result<Self, SqlStdOpsError> {
        let wide = i64::from_row_value(raw)?;
        i32::try_from(wide).map_err(|_| {
            SqlStdOpsError::conversion(format!("identifier {wide} does not fit in i32"))
        })
    }
}

impl IdScalar for String {
    fn to_row_value(&self) -> RowValues {
        RowValues::Text(self.clone())
    }

    fn from_row_value(raw: &RowValues) -> Result<Self, SqlStdOpsError> {
        raw.as_text().map(str::to_owned).ok_or_else(|| {
            SqlStdOpsError::conversion(format!("expected text identifier, got {raw:?}"))
        })
    }
}

impl<T: IdScalar> From<&DeferredId<T>> for FieldValue {
    fn from(id: &DeferredId<T>) -> Self {
        FieldValue::Deferred(id.get().map(IdScalar::to_row_value))
    }
}

impl<T: IdScalar> DeferredId<T> {
    pub(crate) fn from_raw(raw: Option<&RowValues>) -> Result<Self, SqlStdOpsError> {
        match raw {
            None | Some(RowValues::Null) => Ok(Self::new()),
            Some(v) => T::from_row_value(v).map(Self::of),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_filled_states() {
        let mut id: DeferredId<i64> = DeferredId::new();
        assert!(id.is_empty());
        assert_eq!(FieldValue::from(&id), FieldValue::Deferred(None));

        id.fill(5);
        assert_eq!(id.get(), Some(&5));
        assert_eq!(
            FieldValue::from(&id),
            FieldValue::Deferred(Some(RowValues::Int(5)))
        );
    }

    #[test]
    fn narrow_ids_reject_overflow() {
        let raw = RowValues::Int(i64::from(i32::MAX) + 1);
        assert!(DeferredId::<i32>::from_raw(Some(&raw)).is_err());
        let ok = DeferredId::<i32>::from_raw(Some(&RowValues::Int(3))).unwrap();
        assert_eq!(ok, DeferredId::of(3));
    }
}
