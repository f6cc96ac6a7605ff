use crate::schema::{Constructor, FieldSpec};
use crate::value::FieldValue;

/// A record type persisted through [`StandardOperations`](crate::StandardOperations).
///
/// `fields()` declares every field in constructor order; `constructor()` rebuilds a record from
/// the decoded values of those fields. Both are read once, when the operations facade is built.
///
/// ```rust
/// use sql_stdops::prelude::*;
///
/// #[derive(Debug, PartialEq)]
/// struct Note {
///     id: i64,
///     body: Option<String>,
/// }
///
/// impl Entity for Note {
///     type Id = i64;
///
///     fn table_name() -> &'static str {
///         "note"
///     }
///
///     fn fields() -> Vec<FieldSpec<Self>> {
///         vec![
///             FieldSpec::new("id", ValueType::Int, |n: &Note| n.id.into()).column("id").id(),
///             FieldSpec::new("body", ValueType::Text, |n: &Note| n.body.clone().into())
///                 .column("body")
///                 .nullable(),
///         ]
///     }
///
///     fn constructor() -> Constructor<Self> {
///         Constructor::new(2, |args| Ok(Note { id: args.take()?, body: args.take()? }))
///     }
/// }
///
/// let ops = StandardOperations::<Note>::new()?;
/// assert_eq!(ops.select_columns(), ["id", "body"]);
/// # Ok::<(), SqlStdOpsError>(())
/// ```
pub trait Entity: Sized + Send + Sync + 'static {
    /// Identifier accepted by `find_one` / `delete_one`.
    type Id: Into<FieldValue>;

    fn table_name() -> &'static str;

    fn fields() -> Vec<FieldSpec<Self>>;

    fn constructor() -> Constructor<Self>;
}
