use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::SqlStdOpsError;
use crate::value::ValueType;

use super::descriptor::{ColumnComponentDescriptor, ColumnDef, ColumnDescriptor};
use super::field::{ComponentPart, FieldSpec, IdMarker};
use super::metadata::{EnumMetadata, IdentifierMetadata};

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

static SEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
        .expect("sequence pattern is valid")
});

/// Check that `name` can be spliced into SQL text as a bare identifier.
///
/// # Errors
/// Returns `SqlStdOpsError::ConfigurationError` naming `what` when it cannot.
pub fn validate_identifier(what: &str, name: &str) -> Result<(), SqlStdOpsError> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(SqlStdOpsError::config(format!(
            "{what} `{name}` is not a valid SQL identifier"
        )))
    }
}

/// Turn a record type's declared fields into its column descriptors, in declared order.
///
/// # Errors
/// Returns `SqlStdOpsError::ConfigurationError` when
/// - a field has neither a column nor a composite identifier marker (or has both),
/// - there is not exactly one identifier field,
/// - a generated identifier is composite, lacks a sequence name, or is not a deferred identifier,
/// - a composite identifier maps no component or its constructor arity disagrees,
/// - an enum selector names an unknown accessor or an ambiguous/missing builder,
/// - a column name is invalid or mapped twice.
pub fn extract_descriptors<E>(
    fields: Vec<FieldSpec<E>>,
) -> Result<Vec<ColumnDescriptor<E>>, SqlStdOpsError> {
    let identifiers = fields.iter().filter(|f| f.id.is_some()).count();
    if identifiers != 1 {
        return Err(SqlStdOpsError::config(format!(
            "expected exactly one identifier field, found {identifiers}"
        )));
    }

    let mut seen_columns = HashSet::new();
    let mut descriptors = Vec::with_capacity(fields.len());
    for field in fields {
        let descriptor = extract_field(field)?;
        for column in descriptor.def.storage_columns() {
            if !seen_columns.insert(column.name().to_owned()) {
                return Err(SqlStdOpsError::config(format!(
                    "column `{}` is mapped by more than one field",
                    column.name()
                )));
            }
        }
        descriptors.push(descriptor);
    }
    Ok(descriptors)
}

fn extract_field<E>(field: FieldSpec<E>) -> Result<ColumnDescriptor<E>, SqlStdOpsError> {
    let name = field.field_name;
    let generated = field.sequence_name.is_some();

    if generated && field.id.is_none() {
        return Err(SqlStdOpsError::config(format!(
            "field `{name}` is database-generated but not an identifier"
        )));
    }

    let enum_metadata = field
        .enumerated
        .map(|(selector, codec)| EnumMetadata::resolve(selector, codec))
        .transpose()?;

    if let Some(parts) = field.composite {
        if generated {
            return Err(SqlStdOpsError::config(format!(
                "field `{name}` cannot be both a database-generated and a composite identifier"
            )));
        }
        if field.column_name.is_some() {
            return Err(SqlStdOpsError::config(format!(
                "composite identifier `{name}` cannot also declare its own column"
            )));
        }
        let components = extract_components(name, parts.components)?;
        if parts.constructor.arity != components.len() {
            return Err(SqlStdOpsError::config(format!(
                "no constructor of {} takes the {} mapped components of `{name}` (arity is {})",
                parts.constructor.type_name,
                components.len(),
                parts.constructor.arity
            )));
        }
        let def = ColumnDef::composite(name, components);
        return Ok(ColumnDescriptor {
            def,
            getter: field.getter,
            deferred_setter: None,
            composite_constructor: Some(parts.constructor),
        });
    }

    let Some(column_name) = field.column_name else {
        return Err(SqlStdOpsError::config(format!(
            "field `{name}` declares neither a column nor a composite identifier"
        )));
    };
    validate_identifier("column", &column_name)?;

    let id_metadata = match (&field.id, field.sequence_name) {
        (None, _) => None,
        (Some(IdMarker::Composite), _) => {
            return Err(SqlStdOpsError::config(format!(
                "composite identifier `{name}` has no components"
            )));
        }
        (Some(IdMarker::Plain), None) => Some(IdentifierMetadata::plain()),
        (Some(IdMarker::Plain), Some(sequence)) => {
            if sequence.is_empty() || !SEQUENCE.is_match(&sequence) {
                return Err(SqlStdOpsError::config(format!(
                    "generated identifier `{name}` has an invalid sequence name `{sequence}`"
                )));
            }
            if field.value_type != ValueType::DeferredId || field.deferred_setter.is_none() {
                return Err(SqlStdOpsError::config(format!(
                    "generated identifier `{name}` must be declared with FieldSpec::deferred_id"
                )));
            }
            Some(IdentifierMetadata::generated(sequence))
        }
    };

    Ok(ColumnDescriptor {
        def: ColumnDef {
            field_name: name.to_owned(),
            column_name: Some(column_name),
            value_type: field.value_type,
            id_metadata,
            enum_metadata,
            nullable: field.nullable,
            components: Vec::new(),
        },
        getter: field.getter,
        deferred_setter: field.deferred_setter,
        composite_constructor: None,
    })
}

fn extract_components(
    owner: &str,
    parts: Vec<ComponentPart>,
) -> Result<Vec<ColumnComponentDescriptor>, SqlStdOpsError> {
    let mut components = Vec::new();
    for part in parts {
        let Some(column_name) = part.column_name else {
            continue;
        };
        validate_identifier("column", &column_name)?;
        let enum_metadata = part
            .enumerated
            .map(|(selector, codec)| EnumMetadata::resolve(selector, codec))
            .transpose()?;
        components.push(ColumnComponentDescriptor {
            field_name: part.field_name.to_owned(),
            column_name,
            value_type: part.value_type,
            enum_metadata,
            nullable: part.nullable,
        });
    }
    if components.is_empty() {
        return Err(SqlStdOpsError::config(format!(
            "composite identifier `{owner}` maps no component to a column"
        )));
    }
    Ok(components)
}
