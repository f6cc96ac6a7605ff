#![allow(dead_code)]

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Utc};
use sql_stdops::prelude::*;

pub const SQLITE_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS entity (
        id         INTEGER NOT NULL PRIMARY KEY,
        name       TEXT    NOT NULL,
        nullname   TEXT,
        type_1     TEXT    NOT NULL,
        type_2     TEXT    NOT NULL,
        type_3     TEXT    NOT NULL,
        created_at TEXT    NOT NULL
    );
    CREATE TABLE IF NOT EXISTS entity_deferred (
        id   INTEGER NOT NULL PRIMARY KEY,
        name TEXT    NOT NULL
    );
    CREATE TABLE IF NOT EXISTS entity_composite (
        first_part  INTEGER NOT NULL,
        second_part INTEGER NOT NULL,
        name        TEXT    NOT NULL,
        PRIMARY KEY (first_part, second_part)
    );
";

pub const POSTGRES_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS entity (
        id         BIGINT            NOT NULL PRIMARY KEY,
        name       CHARACTER VARYING NOT NULL,
        nullname   CHARACTER VARYING,
        type_1     CHARACTER VARYING NOT NULL,
        type_2     CHARACTER VARYING NOT NULL,
        type_3     CHARACTER VARYING NOT NULL,
        created_at TIMESTAMPTZ       NOT NULL
    );
    CREATE TABLE IF NOT EXISTS entity_deferred (
        id   BIGINT            NOT NULL PRIMARY KEY,
        name CHARACTER VARYING NOT NULL
    );
    CREATE SEQUENCE IF NOT EXISTS entity_deferred_id_seq;
    CREATE TABLE IF NOT EXISTS entity_composite (
        first_part  INTEGER           NOT NULL,
        second_part INTEGER           NOT NULL,
        name        CHARACTER VARYING NOT NULL,
        PRIMARY KEY (first_part, second_part)
    );
";

pub const POSTGRES_TEARDOWN: &str = "
    DROP TABLE IF EXISTS entity;
    DROP TABLE IF EXISTS entity_deferred;
    DROP SEQUENCE IF EXISTS entity_deferred_id_seq;
    DROP TABLE IF EXISTS entity_composite;
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntType1 {
    A,
    B,
    C,
}

impl SqlEnum for EntType1 {
    fn variants() -> &'static [Self] {
        &[EntType1::A, EntType1::B, EntType1::C]
    }

    fn symbol(&self) -> &'static str {
        match self {
            EntType1::A => "A",
            EntType1::B => "B",
            EntType1::C => "C",
        }
    }
}

/// Stored through its `to_value` method, read back through `of_value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntType2 {
    D,
    E,
    F,
}

impl EntType2 {
    pub fn to_value(self) -> &'static str {
        match self {
            EntType2::D => "d",
            EntType2::E => "e",
            EntType2::F => "f",
        }
    }

    pub fn of_value(raw: &str) -> Option<Self> {
        Self::variants().iter().copied().find(|v| v.to_value() == raw)
    }
}

impl SqlEnum for EntType2 {
    fn variants() -> &'static [Self] {
        &[EntType2::D, EntType2::E, EntType2::F]
    }

    fn symbol(&self) -> &'static str {
        match self {
            EntType2::D => "D",
            EntType2::E => "E",
            EntType2::F => "F",
        }
    }
}

/// Stored through its `value` field, read back through `of_value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntType3 {
    G,
    H,
    I,
}

impl EntType3 {
    pub fn value(self) -> &'static str {
        match self {
            EntType3::G => "g",
            EntType3::H => "h",
            EntType3::I => "i",
        }
    }
}

impl SqlEnum for EntType3 {
    fn variants() -> &'static [Self] {
        &[EntType3::G, EntType3::H, EntType3::I]
    }

    fn symbol(&self) -> &'static str {
        match self {
            EntType3::G => "G",
            EntType3::H => "H",
            EntType3::I => "I",
        }
    }
}

pub static TYPE_1: LazyLock<Arc<EnumCodec>> =
    LazyLock::new(|| Arc::new(EnumCodec::of::<EntType1>()));

pub static TYPE_2: LazyLock<Arc<EnumCodec>> = LazyLock::new(|| {
    Arc::new(
        EnumCodec::builder::<EntType2>()
            .method("to_value", |t| RowValues::Text(t.to_value().to_owned()))
            .builder("of_value", |raw| EntType2::of_value(raw.as_text()?))
            .finish(),
    )
});

pub static TYPE_3: LazyLock<Arc<EnumCodec>> = LazyLock::new(|| {
    Arc::new(
        EnumCodec::builder::<EntType3>()
            .field("value", |t| RowValues::Text(t.value().to_owned()))
            .builder("of_value", |raw| {
                let raw = raw.as_text()?;
                EntType3::variants().iter().copied().find(|v| v.value() == raw)
            })
            .finish(),
    )
});

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: i64,
    pub name: String,
    pub null_name: Option<String>,
    pub entity_type_1: EntType1,
    pub entity_type_2: EntType2,
    pub entity_type_3: EntType3,
    pub created_at: DateTime<Utc>,
}

impl Entity {
    pub fn new(
        id: i64,
        name: &str,
        null_name: Option<&str>,
        types: (EntType1, EntType2, EntType3),
    ) -> Self {
        Self {
            id,
            name: name.to_owned(),
            null_name: null_name.map(str::to_owned),
            entity_type_1: types.0,
            entity_type_2: types.1,
            entity_type_3: types.2,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

impl sql_stdops::Entity for Entity {
    type Id = i64;

    fn table_name() -> &'static str {
        "entity"
    }

    fn fields() -> Vec<FieldSpec<Self>> {
        vec![
            FieldSpec::new("id", ValueType::Int, |e: &Entity| e.id.into())
                .column("id")
                .id(),
            FieldSpec::new("name", ValueType::Text, |e: &Entity| e.name.clone().into())
                .column("name"),
            FieldSpec::new("null_name", ValueType::Text, |e: &Entity| {
                e.null_name.clone().into()
            })
            .column("nullname")
            .nullable(),
            FieldSpec::new("entity_type_1", ValueType::Enum, |e: &Entity| {
                FieldValue::enumerated(&e.entity_type_1)
            })
            .column("type_1")
            .enumerated(Arc::clone(&*TYPE_1), Enumerated::symbolic()),
            FieldSpec::new("entity_type_2", ValueType::Enum, |e: &Entity| {
                FieldValue::enumerated(&e.entity_type_2)
            })
            .column("type_2")
            .enumerated(
                Arc::clone(&*TYPE_2),
                Enumerated::accessor_method("to_value").with_builder("of_value"),
            ),
            FieldSpec::new("entity_type_3", ValueType::Enum, |e: &Entity| {
                FieldValue::enumerated(&e.entity_type_3)
            })
            .column("type_3")
            .enumerated(
                Arc::clone(&*TYPE_3),
                Enumerated::accessor_field("value").with_builder("of_value"),
            ),
            FieldSpec::new("created_at", ValueType::Timestamp, |e: &Entity| {
                e.created_at.into()
            })
            .column("created_at"),
        ]
    }

    fn constructor() -> Constructor<Self> {
        Constructor::new(7, |args| {
            Ok(Entity {
                id: args.take()?,
                name: args.take()?,
                null_name: args.take()?,
                entity_type_1: args.take_enum()?,
                entity_type_2: args.take_enum()?,
                entity_type_3: args.take_enum()?,
                created_at: args.take()?,
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityWithDeferredId {
    pub id: DeferredId<i64>,
    pub name: String,
}

impl EntityWithDeferredId {
    pub fn pending(name: &str) -> Self {
        Self {
            id: DeferredId::new(),
            name: name.to_owned(),
        }
    }

    pub fn with_id(id: i64, name: &str) -> Self {
        Self {
            id: DeferredId::of(id),
            name: name.to_owned(),
        }
    }
}

impl sql_stdops::Entity for EntityWithDeferredId {
    type Id = i64;

    fn table_name() -> &'static str {
        "entity_deferred"
    }

    fn fields() -> Vec<FieldSpec<Self>> {
        vec![
            FieldSpec::deferred_id(
                "id",
                |e: &EntityWithDeferredId| &e.id,
                |e: &mut EntityWithDeferredId| &mut e.id,
            )
            .column("id")
            .generated("entity_deferred_id_seq"),
            FieldSpec::new("name", ValueType::Text, |e: &EntityWithDeferredId| {
                e.name.clone().into()
            })
            .column("name"),
        ]
    }

    fn constructor() -> Constructor<Self> {
        Constructor::new(2, |args| {
            Ok(EntityWithDeferredId {
                id: args.take()?,
                name: args.take()?,
            })
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityId {
    pub first_part: i32,
    pub second_part: i32,
}

impl CompositeKey for EntityId {
    fn components() -> Vec<ComponentSpec<Self>> {
        vec![
            ComponentSpec::new("first_part", ValueType::Int, |k: &EntityId| {
                k.first_part.into()
            })
            .column("first_part"),
            ComponentSpec::new("second_part", ValueType::Int, |k: &EntityId| {
                k.second_part.into()
            })
            .column("second_part"),
        ]
    }

    fn constructor() -> Constructor<Self> {
        Constructor::new(2, |args| {
            Ok(EntityId {
                first_part: args.take()?,
                second_part: args.take()?,
            })
        })
    }
}

impl From<EntityId> for FieldValue {
    fn from(key: EntityId) -> Self {
        key.to_field_value()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityWithCompositeId {
    pub id: EntityId,
    pub name: String,
}

impl sql_stdops::Entity for EntityWithCompositeId {
    type Id = EntityId;

    fn table_name() -> &'static str {
        "entity_composite"
    }

    fn fields() -> Vec<FieldSpec<Self>> {
        vec![
            FieldSpec::composite_id("id", |e: &EntityWithCompositeId| &e.id),
            FieldSpec::new("name", ValueType::Text, |e: &EntityWithCompositeId| {
                e.name.clone().into()
            })
            .column("name"),
        ]
    }

    fn constructor() -> Constructor<Self> {
        Constructor::new(2, |args| {
            Ok(EntityWithCompositeId {
                id: args.take_composite()?,
                name: args.take()?,
            })
        })
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
