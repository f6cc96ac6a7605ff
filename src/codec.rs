//! Conversion of single field values to and from their storage representation.

use chrono::{DateTime, Utc};

use crate::error::SqlStdOpsError;
use crate::results::CustomDbRow;
use crate::schema::{ColumnDef, EnumMetadata};
use crate::types::RowValues;
use crate::value::{EnumValue, FieldValue, ValueType};

/// Encode `value` for binding against `column`.
///
/// An empty deferred identifier encodes as `RowValues::Null`.
///
/// # Errors
/// Returns `SqlStdOpsError::ConversionError` when an enum value has no enum metadata on the
/// column, belongs to another enum type, or its accessor yields no value, and when a composite
/// value reaches this function undecomposed.
pub fn to_storage(value: &FieldValue, column: &ColumnDef) -> Result<RowValues, SqlStdOpsError> {
    Ok(match value {
        FieldValue::Null | FieldValue::Deferred(None) => RowValues::Null,
        FieldValue::Int(i) => RowValues::Int(*i),
        FieldValue::Float(f) => RowValues::Float(*f),
        FieldValue::Text(s) => RowValues::Text(s.clone()),
        FieldValue::Bool(b) => RowValues::Bool(*b),
        FieldValue::Timestamp(ts) => RowValues::Timestamp(ts.naive_utc()),
        FieldValue::Json(v) => RowValues::JSON(v.clone()),
        FieldValue::Blob(b) => RowValues::Blob(b.clone()),
        FieldValue::Deferred(Some(raw)) => raw.clone(),
        FieldValue::Enum(ev) => encode_enum(ev, column)?,
        FieldValue::Composite(_) => {
            return Err(SqlStdOpsError::conversion(format!(
                "composite value of `{}` must be split into its components before encoding",
                column.field_name
            )));
        }
    })
}

fn encode_enum(value: &EnumValue, column: &ColumnDef) -> Result<RowValues, SqlStdOpsError> {
    let meta = column.enum_metadata.as_ref().ok_or_else(|| {
        SqlStdOpsError::conversion(format!(
            "column `{}` holds enum {} but declares no enum metadata",
            column.name(),
            value.type_name()
        ))
    })?;
    if meta.codec().type_name() != value.type_name() {
        return Err(SqlStdOpsError::conversion(format!(
            "column `{}` is declared for enum {}, got {}",
            column.name(),
            meta.codec().type_name(),
            value.type_name()
        )));
    }
    match meta.encoder() {
        None => Ok(RowValues::Text(value.symbol().to_owned())),
        Some(accessor) => match accessor(value.symbol()) {
            Some(raw) if !raw.is_null() => Ok(raw),
            _ => Err(SqlStdOpsError::conversion(format!(
                "enum accessor for {}::{} returned no value",
                value.type_name(),
                value.symbol()
            ))),
        },
    }
}

/// Read `column_name` from `row` and decode it as `value_type`.
///
/// # Errors
/// Returns `SqlStdOpsError::MappingError` when the row lacks the column, otherwise whatever
/// [`decode`] returns.
pub fn from_storage(
    row: &CustomDbRow,
    column_name: &str,
    value_type: ValueType,
    enum_metadata: Option<&EnumMetadata>,
) -> Result<FieldValue, SqlStdOpsError> {
    let raw = row.get(column_name).ok_or_else(|| {
        SqlStdOpsError::mapping(format!("result row has no column `{column_name}`"))
    })?;
    decode(raw, value_type, enum_metadata)
        .map_err(|e| in_column(e, column_name))
}

/// Decode every storage column of `column` from `row`; composites come back as
/// `FieldValue::Composite` in declared component order.
///
/// # Errors
/// Same as [`from_storage`].
pub fn column_from_storage(
    row: &CustomDbRow,
    column: &ColumnDef,
) -> Result<FieldValue, SqlStdOpsError> {
    if column.is_composite() {
        let parts = column
            .components
            .iter()
            .map(|c| {
                from_storage(
                    row,
                    &c.column_name,
                    c.value_type,
                    c.enum_metadata.as_ref(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(FieldValue::Composite(parts));
    }
    from_storage(
        row,
        column.name(),
        column.value_type,
        column.enum_metadata.as_ref(),
    )
}

fn in_column(err: SqlStdOpsError, column_name: &str) -> SqlStdOpsError {
    match err {
        SqlStdOpsError::ConversionError(msg) => {
            SqlStdOpsError::conversion(format!("column `{column_name}`: {msg}"))
        }
        other => other,
    }
}

/// Decode a raw storage value as `value_type`.
///
/// # Errors
/// Returns `SqlStdOpsError::ConversionError` when the raw value cannot represent `value_type`,
/// when an enum column has no metadata, or when no enum variant matches.
pub fn decode(
    raw: &RowValues,
    value_type: ValueType,
    enum_metadata: Option<&EnumMetadata>,
) -> Result<FieldValue, SqlStdOpsError> {
    if value_type == ValueType::DeferredId {
        return Ok(FieldValue::Deferred(if raw.is_null() {
            None
        } else {
            Some(raw.clone())
        }));
    }
    if raw.is_null() {
        return Ok(FieldValue::Null);
    }

    let mismatch = || {
        SqlStdOpsError::conversion(format!("cannot read {raw:?} as {value_type:?}"))
    };

    match value_type {
        ValueType::Int => match raw {
            RowValues::Int(i) => Ok(FieldValue::Int(*i)),
            RowValues::Bool(b) => Ok(FieldValue::Int(i64::from(*b))),
            _ => Err(mismatch()),
        },
        ValueType::Float => raw.as_float().map(FieldValue::Float).ok_or_else(mismatch),
        ValueType::Text => raw
            .as_text()
            .map(|s| FieldValue::Text(s.to_owned()))
            .ok_or_else(mismatch),
        ValueType::Bool => match raw {
            RowValues::Bool(b) => Ok(FieldValue::Bool(*b)),
            RowValues::Int(i) => Ok(FieldValue::Bool(*i != 0)),
            _ => Err(mismatch()),
        },
        ValueType::Timestamp => raw
            .as_timestamp()
            .map(|ts| FieldValue::Timestamp(DateTime::<Utc>::from_naive_utc_and_offset(ts, Utc)))
            .ok_or_else(mismatch),
        ValueType::Json => match raw {
            RowValues::JSON(v) => Ok(FieldValue::Json(v.clone())),
            RowValues::Text(s) => serde_json::from_str(s)
                .map(FieldValue::Json)
                .map_err(|e| SqlStdOpsError::conversion(format!("invalid JSON text: {e}"))),
            _ => Err(mismatch()),
        },
        ValueType::Blob => raw
            .as_blob()
            .map(|b| FieldValue::Blob(b.to_vec()))
            .ok_or_else(mismatch),
        ValueType::Enum => decode_enum(raw, enum_metadata),
        ValueType::DeferredId => Ok(FieldValue::Deferred(Some(raw.clone()))),
        ValueType::Composite => Err(SqlStdOpsError::conversion(
            "composite values are decoded per component",
        )),
    }
}

fn decode_enum(
    raw: &RowValues,
    enum_metadata: Option<&EnumMetadata>,
) -> Result<FieldValue, SqlStdOpsError> {
    let meta = enum_metadata.ok_or_else(|| {
        SqlStdOpsError::conversion("enum column declares no enum metadata")
    })?;
    let codec = meta.codec();
    let symbol = match meta.decoder() {
        Some(build) => build(raw).ok_or_else(|| {
            SqlStdOpsError::conversion(format!(
                "builder for enum {} returned no variant for {raw:?}",
                codec.type_name()
            ))
        })?,
        None => {
            let text = raw.as_text().ok_or_else(|| {
                SqlStdOpsError::conversion(format!(
                    "enum {} is stored by name, got {raw:?}",
                    codec.type_name()
                ))
            })?;
            return codec
                .value_for_symbol(text)
                .map(FieldValue::Enum)
                .ok_or_else(|| {
                    SqlStdOpsError::conversion(format!(
                        "no variant `{text}` in enum {}",
                        codec.type_name()
                    ))
                });
        }
    };
    codec
        .value_for_symbol(symbol)
        .map(FieldValue::Enum)
        .ok_or_else(|| {
            SqlStdOpsError::conversion(format!(
                "no variant `{symbol}` in enum {}",
                codec.type_name()
            ))
        })
}
