use rusqlite::types::Value;

use crate::error::SqlComposeError;
use crate::types::{Arg, RowValues};

/// Convert a single `RowValues` to a rusqlite `Value`.
///
/// Booleans become integers, and timestamps and JSON become text, matching how `SQLite`
/// stores them.
#[must_use]
pub fn row_value_to_sqlite_value(value: RowValues) -> Value {
    match value {
        RowValues::Int(i) => Value::Integer(i),
        RowValues::Float(f) => Value::Real(f),
        RowValues::Text(s) => Value::Text(s),
        RowValues::Bool(b) => Value::Integer(i64::from(b)),
        RowValues::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        RowValues::Null => Value::Null,
        RowValues::JSON(jval) => Value::Text(jval.to_string()),
        RowValues::Blob(bytes) => Value::Blob(bytes),
    }
}

/// Resolve bound arguments into values the worker can own.
///
/// # Errors
///
/// Returns the first error reported while encoding an argument, including
/// `SqlComposeError::ParameterError` for a sub-query that was never expanded.
pub fn convert_args(args: &[Arg]) -> Result<Vec<Value>, SqlComposeError> {
    args.iter()
        .map(|arg| arg.to_value().map(row_value_to_sqlite_value))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{Json, Query, args};

    #[test]
    fn converts_scalars() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|d| d.and_hms_milli_opt(3, 4, 5, 600))
            .unwrap();
        let values = convert_args(&args![true, ts, None::<i64>, Json(vec![1, 2])]).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Integer(1),
                Value::Text("2024-01-02 03:04:05.600".into()),
                Value::Null,
                Value::Text("[1,2]".into()),
            ]
        );
    }

    #[test]
    fn unexpanded_fragment_is_rejected() {
        let err = convert_args(&args![Query::new("select 1", [])]).unwrap_err();
        assert!(matches!(err, SqlComposeError::ParameterError(_)));
    }
}
