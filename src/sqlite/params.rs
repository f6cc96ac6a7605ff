use rusqlite::types::Value;

use crate::types::RowValues;

/// Convert a single bound value to a rusqlite `Value`.
///
/// Timestamps are stored as `YYYY-MM-DD HH:MM:SS[.fff]` text, JSON as its text form and booleans
/// as 0/1, which is how [`RowValues::as_timestamp`] and the value codec read them back.
#[must_use]
pub fn row_value_to_sqlite_value(value: &RowValues) -> Value {
    match value {
        RowValues::Int(i) => Value::Integer(*i),
        RowValues::Float(f) => Value::Real(*f),
        RowValues::Text(s) => Value::Text(s.clone()),
        RowValues::Bool(b) => Value::Integer(i64::from(*b)),
        RowValues::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        RowValues::Null => Value::Null,
        RowValues::JSON(jval) => Value::Text(jval.to_string()),
        RowValues::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}

/// Positional `SQLite` parameters.
#[derive(Debug, Clone, Default)]
pub struct Params(pub Vec<Value>);

impl Params {
    #[must_use]
    pub fn convert(params: &[RowValues]) -> Self {
        Params(params.iter().map(row_value_to_sqlite_value).collect())
    }

    #[must_use]
    pub fn as_values(&self) -> &[Value] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn timestamps_and_bools_use_sqlite_affinities() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_milli_opt(3, 4, 5, 600)
            .unwrap();
        let p = Params::convert(&[RowValues::Timestamp(ts), RowValues::Bool(true)]);
        assert_eq!(
            p.as_values(),
            &[
                Value::Text("2024-01-02 03:04:05.600".into()),
                Value::Integer(1)
            ]
        );
        let back = RowValues::Text("2024-01-02 03:04:05.600".into());
        assert_eq!(back.as_timestamp(), Some(ts));
    }
}
