mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use common::{EntType1, EntType2, EntType3, Entity, EntityId, EntityWithCompositeId, EntityWithDeferredId};
use sql_stdops::prelude::*;

fn row(columns: &[&str], values: Vec<RowValues>) -> CustomDbRow {
    CustomDbRow::new(
        Arc::new(columns.iter().map(|c| (*c).to_string()).collect()),
        values,
    )
}

const ENTITY_COLUMNS: [&str; 7] = [
    "id",
    "name",
    "nullname",
    "type_1",
    "type_2",
    "type_3",
    "created_at",
];

#[test]
fn maps_every_enum_style_and_timestamp() -> Result<(), Box<dyn std::error::Error>> {
    let ops = StandardOperations::<Entity>::new()?;
    let mapped = ops.map_row(&row(
        &ENTITY_COLUMNS,
        vec![
            RowValues::Int(2),
            RowValues::Text("example-2".into()),
            RowValues::Text("notnull".into()),
            RowValues::Text("B".into()),
            RowValues::Text("e".into()),
            RowValues::Text("h".into()),
            RowValues::Text("2024-03-01 12:30:00".into()),
        ],
    ))?;

    assert_eq!(mapped.id, 2);
    assert_eq!(mapped.null_name.as_deref(), Some("notnull"));
    assert_eq!(mapped.entity_type_1, EntType1::B);
    assert_eq!(mapped.entity_type_2, EntType2::E);
    assert_eq!(mapped.entity_type_3, EntType3::H);
    assert_eq!(mapped.created_at, Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap());
    Ok(())
}

#[test]
fn encoded_record_maps_back_to_itself() -> Result<(), Box<dyn std::error::Error>> {
    let ops = StandardOperations::<Entity>::new()?;
    let stamped = Utc.with_ymd_and_hms(2021, 7, 4, 9, 15, 30).unwrap()
        + chrono::Duration::milliseconds(250);

    // every variant of each enum, each stored with its own selector
    for (i, ((t1, t2), t3)) in EntType1::variants()
        .iter()
        .zip(EntType2::variants())
        .zip(EntType3::variants())
        .enumerate()
    {
        let null_name = (i % 2 == 0).then_some("set");
        let mut original = Entity::new(7 + i as i64, "loop", null_name, (*t1, *t2, *t3));
        original.created_at = stamped;

        let mut values = Vec::new();
        for d in ops.descriptors() {
            values.push(to_storage(&d.read(&original), d.def())?);
        }
        let mapped = ops.map_row(&row(&ENTITY_COLUMNS, values))?;
        assert_eq!(mapped, original);
    }
    Ok(())
}

#[test]
fn null_in_nullable_column_maps_to_none() -> Result<(), Box<dyn std::error::Error>> {
    let ops = StandardOperations::<Entity>::new()?;
    let mapped = ops.map_row(&row(
        &ENTITY_COLUMNS,
        vec![
            RowValues::Int(1),
            RowValues::Text("n".into()),
            RowValues::Null,
            RowValues::Text("A".into()),
            RowValues::Text("d".into()),
            RowValues::Text("g".into()),
            RowValues::Timestamp(Utc.timestamp_opt(0, 0).unwrap().naive_utc()),
        ],
    ))?;
    assert!(mapped.null_name.is_none());
    Ok(())
}

#[test]
fn null_in_required_enum_is_mapping_error() -> Result<(), Box<dyn std::error::Error>> {
    let ops = StandardOperations::<Entity>::new()?;
    let err = ops
        .map_row(&row(
            &ENTITY_COLUMNS,
            vec![
                RowValues::Int(1),
                RowValues::Text("n".into()),
                RowValues::Null,
                RowValues::Null,
                RowValues::Text("d".into()),
                RowValues::Text("g".into()),
                RowValues::Text("1970-01-01 00:00:00".into()),
            ],
        ))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Mapping);
    assert!(err.to_string().contains("type_1"));
    Ok(())
}

#[test]
fn unknown_stored_enum_value_is_conversion_error() -> Result<(), Box<dyn std::error::Error>> {
    let ops = StandardOperations::<Entity>::new()?;
    let err = ops
        .map_row(&row(
            &ENTITY_COLUMNS,
            vec![
                RowValues::Int(1),
                RowValues::Text("n".into()),
                RowValues::Null,
                RowValues::Text("A".into()),
                RowValues::Text("zz".into()),
                RowValues::Text("g".into()),
                RowValues::Text("1970-01-01 00:00:00".into()),
            ],
        ))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conversion);
    Ok(())
}

#[test]
fn missing_column_is_mapping_error() -> Result<(), Box<dyn std::error::Error>> {
    let ops = StandardOperations::<EntityWithDeferredId>::new()?;
    let err = ops
        .map_row(&row(&["id"], vec![RowValues::Int(1)]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Mapping);
    Ok(())
}

#[test]
fn deferred_id_is_filled_from_the_row() -> Result<(), Box<dyn std::error::Error>> {
    let ops = StandardOperations::<EntityWithDeferredId>::new()?;
    let mapped = ops.map_row(&row(
        &["id", "name"],
        vec![RowValues::Int(3), RowValues::Text("def".into())],
    ))?;
    assert_eq!(mapped, EntityWithDeferredId::with_id(3, "def"));
    Ok(())
}

#[test]
fn composite_key_is_rebuilt_from_component_columns() -> Result<(), Box<dyn std::error::Error>> {
    let ops = StandardOperations::<EntityWithCompositeId>::new()?;
    let mapped = ops.map_row(&row(
        &["name", "second_part", "first_part"],
        vec![
            RowValues::Text("pair".into()),
            RowValues::Int(2),
            RowValues::Int(1),
        ],
    ))?;
    assert_eq!(mapped.id, EntityId { first_part: 1, second_part: 2 });
    assert_eq!(mapped.name, "pair");
    Ok(())
}

#[test]
fn null_composite_component_is_mapping_error() -> Result<(), Box<dyn std::error::Error>> {
    let ops = StandardOperations::<EntityWithCompositeId>::new()?;
    let err = ops
        .map_row(&row(
            &["first_part", "second_part", "name"],
            vec![RowValues::Int(1), RowValues::Null, RowValues::Text("x".into())],
        ))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Mapping);
    Ok(())
}
