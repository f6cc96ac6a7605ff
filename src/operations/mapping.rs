use crate::codec::column_from_storage;
use crate::error::SqlStdOpsError;
use crate::results::CustomDbRow;
use crate::schema::{ColumnDef, ColumnDescriptor, Constructor};
use crate::value::FieldValue;

/// Decode one row into a record: every descriptor in declared order, then the constructor.
pub(crate) fn map_row<E>(
    descriptors: &[ColumnDescriptor<E>],
    constructor: &Constructor<E>,
    row: &CustomDbRow,
) -> Result<E, SqlStdOpsError> {
    let mut values = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        let def = descriptor.def();
        let value = column_from_storage(row, def)?;
        check_nullability(def, &value)?;
        values.push(value);
    }
    constructor.construct(values)
}

fn check_nullability(def: &ColumnDef, value: &FieldValue) -> Result<(), SqlStdOpsError> {
    match value {
        FieldValue::Null if !def.nullable => Err(SqlStdOpsError::mapping(format!(
            "column `{}` is not nullable but holds NULL",
            def.name()
        ))),
        FieldValue::Composite(parts) => {
            for (component, part) in def.components.iter().zip(parts) {
                if !component.nullable && matches!(part, FieldValue::Null) {
                    return Err(SqlStdOpsError::mapping(format!(
                        "column `{}` of `{}` is not nullable but holds NULL",
                        component.column_name, def.field_name
                    )));
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
