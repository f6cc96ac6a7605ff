use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::types::RowValues;

/// Enumerations that can be stored in a column.
///
/// `variants()` must list every variant; `symbol()` is the symbolic name used when no
/// accessor is selected for encoding and no builder is selected for decoding.
pub trait SqlEnum: Clone + Send + Sync + 'static {
    fn variants() -> &'static [Self];
    fn symbol(&self) -> &'static str;
}

/// Type-erased enum value as carried by [`FieldValue::Enum`](super::FieldValue::Enum).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    type_name: &'static str,
    symbol: &'static str,
}

impl EnumValue {
    #[must_use]
    pub fn of<E: SqlEnum>(value: &E) -> Self {
        Self {
            type_name: std::any::type_name::<E>(),
            symbol: value.symbol(),
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    /// Recover the typed variant; `None` if this value belongs to another enum type.
    #[must_use]
    pub fn to<E: SqlEnum>(&self) -> Option<E> {
        if self.type_name != std::any::type_name::<E>() {
            return None;
        }
        E::variants().iter().find(|v| v.symbol() == self.symbol).cloned()
    }
}

pub(crate) type Accessor = Arc<dyn Fn(&'static str) -> Option<RowValues> + Send + Sync>;
pub(crate) type Builder = Arc<dyn Fn(&RowValues) -> Option<&'static str> + Send + Sync>;

/// Encoding and decoding rules registered once per enum type.
///
/// Accessor fields and accessor methods both turn a variant into its stored value; they live in
/// separate namespaces because a column selects one or the other by name. Builders turn a stored
/// value back into a variant.
///
/// ```rust
/// use sql_stdops::prelude::*;
///
/// #[derive(Clone, Copy, PartialEq, Debug)]
/// enum Color { Red, Green }
///
/// impl SqlEnum for Color {
///     fn variants() -> &'static [Self] { &[Color::Red, Color::Green] }
///     fn symbol(&self) -> &'static str {
///         match self { Color::Red => "Red", Color::Green => "Green" }
///     }
/// }
///
/// let codec = EnumCodec::builder::<Color>()
///     .method("code", |c| RowValues::Text(c.symbol().to_lowercase()))
///     .builder("of_code", |raw| match raw.as_text()? {
///         "red" => Some(Color::Red),
///         "green" => Some(Color::Green),
///         _ => None,
///     })
///     .finish();
/// assert_eq!(codec.type_name(), std::any::type_name::<Color>());
/// ```
pub struct EnumCodec {
    type_name: &'static str,
    symbols: Vec<&'static str>,
    fields: Vec<(&'static str, Accessor)>,
    methods: Vec<(&'static str, Accessor)>,
    builders: Vec<(&'static str, Builder)>,
}

impl fmt::Debug for EnumCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumCodec")
            .field("type_name", &self.type_name)
            .field("symbols", &self.symbols)
            .field("fields", &self.fields.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .field("methods", &self.methods.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .field("builders", &self.builders.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .finish()
    }
}

impl EnumCodec {
    /// Codec with symbolic-name encoding only.
    #[must_use]
    pub fn of<E: SqlEnum>() -> Self {
        Self::builder::<E>().finish()
    }

    #[must_use]
    pub fn builder<E: SqlEnum>() -> EnumCodecBuilder<E> {
        EnumCodecBuilder {
            codec: EnumCodec {
                type_name: std::any::type_name::<E>(),
                symbols: E::variants().iter().map(SqlEnum::symbol).collect(),
                fields: Vec::new(),
                methods: Vec::new(),
                builders: Vec::new(),
            },
            _enum: PhantomData,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn field(&self, name: &str) -> Option<Accessor> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, a)| Arc::clone(a))
    }

    pub(crate) fn method(&self, name: &str) -> Option<Accessor> {
        self.methods
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, a)| Arc::clone(a))
    }

    pub(crate) fn builders_named(&self, name: &str) -> Vec<Builder> {
        self.builders
            .iter()
            .filter(|(n, _)| *n == name)
            .map(|(_, b)| Arc::clone(b))
            .collect()
    }

    pub(crate) fn value_for_symbol(&self, symbol: &str) -> Option<EnumValue> {
        self.symbols
            .iter()
            .find(|s| **s == symbol)
            .map(|s| EnumValue {
                type_name: self.type_name,
                symbol: *s,
            })
    }
}

/// Typed registration front-end for [`EnumCodec`].
pub struct EnumCodecBuilder<E> {
    codec: EnumCodec,
    _enum: PhantomData<fn(E)>,
}

impl<E: SqlEnum> EnumCodecBuilder<E> {
    /// Register a named accessor field.
    #[must_use]
    pub fn field<F>(mut self, name: &'static str, read: F) -> Self
    where
        F: Fn(&E) -> RowValues + Send + Sync + 'static,
    {
        self.codec.fields.push((name, erase_accessor(read)));
        self
    }

    /// Register a named accessor method.
    #[must_use]
    pub fn method<F>(mut self, name: &'static str, call: F) -> Self
    where
        F: Fn(&E) -> RowValues + Send + Sync + 'static,
    {
        self.codec.methods.push((name, erase_accessor(call)));
        self
    }

    /// Register a named builder. Registering two builders under one name is allowed here but
    /// makes any column that selects that name fail to configure.
    #[must_use]
    pub fn builder<F>(mut self, name: &'static str, build: F) -> Self
    where
        F: Fn(&RowValues) -> Option<E> + Send + Sync + 'static,
    {
        let erased: Builder = Arc::new(move |raw| build(raw).map(|v| v.symbol()));
        self.codec.builders.push((name, erased));
        self
    }

    #[must_use]
    pub fn finish(self) -> EnumCodec {
        self.codec
    }
}

fn erase_accessor<E, F>(read: F) -> Accessor
where
    E: SqlEnum,
    F: Fn(&E) -> RowValues + Send + Sync + 'static,
{
    Arc::new(move |symbol| {
        E::variants()
            .iter()
            .find(|v| v.symbol() == symbol)
            .map(&read)
    })
}
