//! In-memory field values.
//!
//! [`FieldValue`] is what a record's getters produce and what its constructor consumes.
//! The value codec turns it into [`RowValues`] for binding and back again when mapping rows.

mod deferred;
mod enums;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use crate::error::SqlStdOpsError;
use crate::types::RowValues;

pub use deferred::{DeferredId, IdScalar};
pub use enums::{EnumCodec, EnumCodecBuilder, EnumValue, SqlEnum};
pub(crate) use enums::{Accessor, Builder};

/// Declared type of a record field; selects the decode path for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Int,
    Float,
    Text,
    Bool,
    Timestamp,
    Json,
    Blob,
    Enum,
    DeferredId,
    Composite,
}

/// A record field value before encoding / after decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Json(JsonValue),
    Blob(Vec<u8>),
    Enum(EnumValue),
    /// Raw identifier held by a [`DeferredId`]; `None` while the database has not assigned it.
    Deferred(Option<RowValues>),
    /// Component values of a composite identifier, in declared component order.
    Composite(Vec<FieldValue>),
}

impl FieldValue {
    #[must_use]
    pub fn enumerated<E: SqlEnum>(value: &E) -> Self {
        FieldValue::Enum(EnumValue::of(value))
    }

    /// `true` for `Null` and for an empty deferred identifier.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null | FieldValue::Deferred(None))
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Int(_) => "int",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "text",
            FieldValue::Bool(_) => "bool",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Json(_) => "json",
            FieldValue::Blob(_) => "blob",
            FieldValue::Enum(_) => "enum",
            FieldValue::Deferred(_) => "deferred id",
            FieldValue::Composite(_) => "composite",
        }
    }
}

macro_rules! field_value_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for FieldValue {
                fn from(value: $t) -> Self {
                    FieldValue::$variant(value.into())
                }
            }
        )*
    };
}

field_value_from! {
    i64 => Int,
    i32 => Int,
    i16 => Int,
    f64 => Float,
    f32 => Float,
    String => Text,
    &str => Text,
    bool => Bool,
    DateTime<Utc> => Timestamp,
    JsonValue => Json,
    Vec<u8> => Blob,
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// Extraction of a typed value from a decoded [`FieldValue`].
pub trait FromFieldValue: Sized {
    /// # Errors
    /// Returns `SqlStdOpsError::ConversionError` when the value has another shape.
    fn from_field_value(value: FieldValue) -> Result<Self, SqlStdOpsError>;
}

fn mismatch<T>(expected: &str, got: &FieldValue) -> Result<T, SqlStdOpsError> {
    Err(SqlStdOpsError::conversion(format!(
        "expected {expected}, got {} value",
        got.kind_name()
    )))
}

impl FromFieldValue for i64 {
    fn from_field_value(value: FieldValue) -> Result<Self, SqlStdOpsError> {
        match value {
            FieldValue::Int(i) => Ok(i),
            other => mismatch("int", &other),
        }
    }
}

impl FromFieldValue for i32 {
    fn from_field_value(value: FieldValue) -> Result<Self, SqlStdOpsError> {
        let wide = i64::from_field_value(value)?;
        i32::try_from(wide)
            .map_err(|_| SqlStdOpsError::conversion(format!("{wide} does not fit in i32")))
    }
}

impl FromFieldValue for i16 {
    fn from_field_value(value: FieldValue) -> Result<Self, SqlStdOpsError> {
        let wide = i64::from_field_value(value)?;
        i16::try_from(wide)
            .map_err(|_| SqlStdOpsError::conversion(format!("{wide} does not fit in i16")))
    }
}

impl FromFieldValue for f64 {
    fn from_field_value(value: FieldValue) -> Result<Self, SqlStdOpsError> {
        match value {
            FieldValue::Float(f) => Ok(f),
            #[allow(clippy::cast_precision_loss)]
            FieldValue::Int(i) => Ok(i as f64),
            other => mismatch("float", &other),
        }
    }
}

impl FromFieldValue for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn from_field_value(value: FieldValue) -> Result<Self, SqlStdOpsError> {
        f64::from_field_value(value).map(|f| f as f32)
    }
}

impl FromFieldValue for String {
    fn from_field_value(value: FieldValue) -> Result<Self, SqlStdOpsError> {
        match value {
            FieldValue::Text(s) => Ok(s),
            other => mismatch("text", &other),
        }
    }
}

impl FromFieldValue for bool {
    fn from_field_value(value: FieldValue) -> Result<Self, SqlStdOpsError> {
        match value {
            FieldValue::Bool(b) => Ok(b),
            other => mismatch("bool", &other),
        }
    }
}

impl FromFieldValue for DateTime<Utc> {
    fn from_field_value(value: FieldValue) -> Result<Self, SqlStdOpsError> {
        match value {
            FieldValue::Timestamp(ts) => Ok(ts),
            other => mismatch("timestamp", &other),
        }
    }
}

impl FromFieldValue for JsonValue {
    fn from_field_value(value: FieldValue) -> Result<Self, SqlStdOpsError> {
        match value {
            FieldValue::Json(v) => Ok(v),
            other => mismatch("json", &other),
        }
    }
}

impl FromFieldValue for Vec<u8> {
    fn from_field_value(value: FieldValue) -> Result<Self, SqlStdOpsError> {
        match value {
            FieldValue::Blob(b) => Ok(b),
            other => mismatch("blob", &other),
        }
    }
}

impl<T: IdScalar> FromFieldValue for DeferredId<T> {
    fn from_field_value(value: FieldValue) -> Result<Self, SqlStdOpsError> {
        match value {
            FieldValue::Deferred(raw) => DeferredId::from_raw(raw.as_ref()),
            FieldValue::Null => Ok(DeferredId::new()),
            other => mismatch("deferred id", &other),
        }
    }
}

impl<T: FromFieldValue> FromFieldValue for Option<T> {
    fn from_field_value(value: FieldValue) -> Result<Self, SqlStdOpsError> {
        match value {
            FieldValue::Null => Ok(None),
            other => T::from_field_value(other).map(Some),
        }
    }
}
