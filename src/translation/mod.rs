//! Named-to-positional placeholder translation.
//!
//! Built statements carry `:name` placeholders; drivers want `$1` (Postgres) or `?1` (SQLite).
//! The scanner skips quoted strings, comments and dollar-quoted blocks, and leaves `::` casts
//! alone.

mod scanner;

use scanner::{
    State, block_comment_close_at, block_comment_open_at, dollar_quote_close_at,
    dollar_quote_open_at, line_comment_at, scan_name,
};

use crate::error::SqlStdOpsError;
use crate::query_builder::NamedParams;
use crate::types::RowValues;

/// Target placeholder style for translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// PostgreSQL-style placeholders like `$1`.
    Postgres,
    /// SQLite-style placeholders like `?1`.
    Sqlite,
}

impl PlaceholderStyle {
    fn marker(self) -> char {
        match self {
            PlaceholderStyle::Postgres => '$',
            PlaceholderStyle::Sqlite => '?',
        }
    }
}

/// Rewrite `:name` placeholders in `sql` as positional ones and collect the values in position
/// order. A name that appears more than once reuses its first position.
///
/// ```rust
/// use sql_stdops::prelude::*;
///
/// let params: NamedParams = [("id", RowValues::Int(7))].into_iter().collect();
/// let (sql, values) = translate_named(
///     "SELECT id::text FROM t WHERE id = :id OR parent = :id",
///     PlaceholderStyle::Postgres,
///     &params,
/// )?;
/// assert_eq!(sql, "SELECT id::text FROM t WHERE id = $1 OR parent = $1");
/// assert_eq!(values, vec![RowValues::Int(7)]);
/// # Ok::<(), SqlStdOpsError>(())
/// ```
///
/// # Errors
/// Returns `SqlStdOpsError::ParameterError` when a placeholder has no binding in `params`.
pub fn translate_named(
    sql: &str,
    style: PlaceholderStyle,
    params: &NamedParams,
) -> Result<(String, Vec<RowValues>), SqlStdOpsError> {
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len() + 8);
    let mut names: Vec<&str> = Vec::new();
    let mut values = Vec::new();
    let mut copied = 0;
    let mut state = State::Normal;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                _ if line_comment_at(bytes, idx) => state = State::LineComment,
                _ if block_comment_open_at(bytes, idx) => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'$' => {
                    if let Some((tag, close)) = dollar_quote_open_at(bytes, idx) {
                        state = State::DollarQuoted(tag);
                        idx = close;
                    }
                }
                b':' if bytes.get(idx + 1) == Some(&b':') => idx += 1,
                b':' => {
                    if let Some(end) = scan_name(bytes, idx + 1) {
                        let name = &sql[idx + 1..end];
                        let position = match names.iter().position(|n| *n == name) {
                            Some(p) => p + 1,
                            None => {
                                let value = params.get(name).ok_or_else(|| {
                                    SqlStdOpsError::ParameterError(format!(
                                        "no value bound for placeholder :{name}"
                                    ))
                                })?;
                                names.push(name);
                                values.push(value.clone());
                                names.len()
                            }
                        };
                        out.push_str(&sql[copied..idx]);
                        out.push(style.marker());
                        out.push_str(&position.to_string());
                        copied = end;
                        idx = end;
                        continue;
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if block_comment_open_at(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if block_comment_close_at(bytes, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
            State::DollarQuoted(ref tag) => {
                if b == b'$' && dollar_quote_close_at(bytes, idx, tag) {
                    idx += tag.len() + 1;
                    state = State::Normal;
                }
            }
        }
        idx += 1;
    }

    out.push_str(&sql[copied..]);
    Ok((out, values))
}
