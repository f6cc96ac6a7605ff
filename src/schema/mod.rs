//! Record-type metadata: declared fields in, validated column descriptors out.

mod descriptor;
mod extract;
mod field;
mod metadata;

pub use descriptor::{ColumnComponentDescriptor, ColumnDef, ColumnDescriptor, ConstructorRef};
pub use extract::{extract_descriptors, validate_identifier};
pub use field::{Args, ComponentSpec, CompositeKey, Constructor, FieldSpec};
pub use metadata::{EnumMetadata, Enumerated, IdentifierMetadata};
