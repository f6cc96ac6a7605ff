use std::fmt;
use std::sync::Arc;

use crate::error::SqlStdOpsError;
use crate::value::{Accessor, Builder, EnumCodec};

/// Identifier role of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierMetadata {
    pub database_generated: bool,
    pub composite_key: bool,
    /// Present iff `database_generated` (a generated id is never composite).
    pub sequence_name: Option<String>,
}

impl IdentifierMetadata {
    /// Plain caller-supplied identifier.
    #[must_use]
    pub fn plain() -> Self {
        Self {
            database_generated: false,
            composite_key: false,
            sequence_name: None,
        }
    }

    /// Identifier filled from `nextval('<sequence>')` on insert.
    #[must_use]
    pub fn generated(sequence_name: impl Into<String>) -> Self {
        Self {
            database_generated: true,
            composite_key: false,
            sequence_name: Some(sequence_name.into()),
        }
    }

    #[must_use]
    pub fn composite() -> Self {
        Self {
            database_generated: false,
            composite_key: true,
            sequence_name: None,
        }
    }
}

/// Enum encoding selector as declared on a field.
///
/// Precedence when encoding: accessor field, then accessor method, then the symbolic name.
/// Decoding uses the builder method when one is named, otherwise symbolic lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enumerated {
    pub accessor_field: Option<&'static str>,
    pub accessor_method: Option<&'static str>,
    pub builder_method: Option<&'static str>,
}

impl Enumerated {
    #[must_use]
    pub fn symbolic() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn accessor_field(name: &'static str) -> Self {
        Self {
            accessor_field: Some(name),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn accessor_method(name: &'static str) -> Self {
        Self {
            accessor_method: Some(name),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_builder(mut self, name: &'static str) -> Self {
        self.builder_method = Some(name);
        self
    }
}

/// Enum metadata of a column with the selector already resolved against the enum's codec.
#[derive(Clone)]
pub struct EnumMetadata {
    selector: Enumerated,
    codec: Arc<EnumCodec>,
    encoder: Option<Accessor>,
    decoder: Option<Builder>,
}

impl fmt::Debug for EnumMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumMetadata")
            .field("selector", &self.selector)
            .field("enum_type", &self.codec.type_name())
            .finish_non_exhaustive()
    }
}

impl EnumMetadata {
    /// Resolve the accessor and builder names of `selector` against `codec`.
    ///
    /// # Errors
    /// Returns `SqlStdOpsError::ConfigurationError` when a named accessor is not registered or
    /// when the named builder matches zero or several registrations.
    pub fn resolve(selector: Enumerated, codec: Arc<EnumCodec>) -> Result<Self, SqlStdOpsError> {
        let encoder = if let Some(field) = selector.accessor_field {
            Some(codec.field(field).ok_or_else(|| {
                SqlStdOpsError::config(format!(
                    "enum {} has no accessor field `{field}`",
                    codec.type_name()
                ))
            })?)
        } else if let Some(method) = selector.accessor_method {
            Some(codec.method(method).ok_or_else(|| {
                SqlStdOpsError::config(format!(
                    "enum {} has no accessor method `{method}`",
                    codec.type_name()
                ))
            })?)
        } else {
            None
        };

        let decoder = match selector.builder_method {
            None => None,
            Some(name) => {
                let mut found = codec.builders_named(name);
                match found.len() {
                    0 => {
                        return Err(SqlStdOpsError::config(format!(
                            "couldn't find builder method `{name}` for enum {}",
                            codec.type_name()
                        )));
                    }
                    1 => found.pop(),
                    n => {
                        return Err(SqlStdOpsError::config(format!(
                            "enum {} has {n} builder methods named `{name}`, expected one",
                            codec.type_name()
                        )));
                    }
                }
            }
        };

        Ok(Self {
            selector,
            codec,
            encoder,
            decoder,
        })
    }

    #[must_use]
    pub fn selector(&self) -> &Enumerated {
        &self.selector
    }

    #[must_use]
    pub fn codec(&self) -> &EnumCodec {
        &self.codec
    }

    pub(crate) fn encoder(&self) -> Option<&Accessor> {
        self.encoder.as_ref()
    }

    pub(crate) fn decoder(&self) -> Option<&Builder> {
        self.decoder.as_ref()
    }
}
