use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

use crate::error::SqlComposeError;
use crate::query::SqlFragment;

/// Values that can be stored in a database row or used as query parameters.
///
/// ```rust
/// use sql_compose::RowValues;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // Try "YYYY-MM-DD HH:MM:SS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            // Try "YYYY-MM-DD HH:MM:SS.SSS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            RowValues::Float(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            RowValues::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            RowValues::Int(_) => "integer",
            RowValues::Float(_) => "float",
            RowValues::Text(_) => "text",
            RowValues::Bool(_) => "bool",
            RowValues::Timestamp(_) => "timestamp",
            RowValues::Null => "null",
            RowValues::JSON(_) => "json",
            RowValues::Blob(_) => "blob",
        }
    }
}

/// A value that encodes itself into a [`RowValues`] when it is bound to a statement.
pub trait ToValue: fmt::Debug + Send + Sync {
    /// Produce the driver value.
    ///
    /// # Errors
    /// Returns [`SqlComposeError`] if the value cannot be encoded.
    fn to_value(&self) -> Result<RowValues, SqlComposeError>;
}

/// One positional argument of a [`crate::Query`].
#[derive(Debug, Clone)]
pub enum Arg {
    /// Passed through to the driver verbatim.
    Value(RowValues),
    /// Encoded at bind time.
    Valuer(Arc<dyn ToValue>),
    /// Expanded in place of its placeholder by [`crate::Query::sql`].
    Fragment(Arc<dyn SqlFragment>),
}

impl Arg {
    /// Wrap anything implementing [`SqlFragment`] as a sub-query argument.
    pub fn fragment<F: SqlFragment + 'static>(fragment: F) -> Self {
        Arg::Fragment(Arc::new(fragment))
    }

    #[must_use]
    pub fn is_fragment(&self) -> bool {
        matches!(self, Arg::Fragment(_))
    }

    #[must_use]
    pub fn as_value(&self) -> Option<&RowValues> {
        if let Arg::Value(value) = self {
            Some(value)
        } else {
            None
        }
    }

    /// Resolve this argument to the value handed to the driver.
    ///
    /// # Errors
    /// Returns `SqlComposeError::ParameterError` for a sub-query that was never expanded, or
    /// whatever the [`ToValue`] implementation reports.
    pub fn to_value(&self) -> Result<RowValues, SqlComposeError> {
        match self {
            Arg::Value(value) => Ok(value.clone()),
            Arg::Valuer(valuer) => valuer.to_value(),
            Arg::Fragment(fragment) => Err(SqlComposeError::ParameterError(format!(
                "unexpanded sub-query argument {fragment:?}"
            ))),
        }
    }
}

impl PartialEq for Arg {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Arg::Value(a), Arg::Value(b)) => a == b,
            (Arg::Valuer(a), Arg::Valuer(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            (Arg::Fragment(a), Arg::Fragment(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl From<RowValues> for Arg {
    fn from(value: RowValues) -> Self {
        Arg::Value(value)
    }
}

impl<T: Into<RowValues>> From<Option<T>> for RowValues {
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

impl<T: Into<RowValues>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        Arg::Value(value.into())
    }
}

macro_rules! impl_scalar {
    ($($ty:ty => |$v:ident| $conv:expr),+ $(,)?) => {
        $(
            impl From<$ty> for RowValues {
                fn from($v: $ty) -> Self {
                    $conv
                }
            }

            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Arg::Value(RowValues::from(value))
                }
            }
        )+
    };
}

impl_scalar! {
    i64 => |v| RowValues::Int(v),
    i32 => |v| RowValues::Int(i64::from(v)),
    i16 => |v| RowValues::Int(i64::from(v)),
    u32 => |v| RowValues::Int(i64::from(v)),
    u8 => |v| RowValues::Int(i64::from(v)),
    f64 => |v| RowValues::Float(v),
    f32 => |v| RowValues::Float(f64::from(v)),
    bool => |v| RowValues::Bool(v),
    String => |v| RowValues::Text(v),
    &str => |v| RowValues::Text(v.to_owned()),
    &String => |v| RowValues::Text(v.clone()),
    Vec<u8> => |v| RowValues::Blob(v),
    &[u8] => |v| RowValues::Blob(v.to_vec()),
    NaiveDateTime => |v| RowValues::Timestamp(v),
    JsonValue => |v| RowValues::JSON(v),
}

/// A column value paired with its column name, as reported by [`crate::Insertable`].
#[derive(Debug, Clone, PartialEq)]
pub struct NamedArg {
    pub name: &'static str,
    pub value: Arg,
}

impl NamedArg {
    pub fn new(name: &'static str, value: impl Into<Arg>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// Decode a Rust value out of one column of a row.
pub trait FromValue: Sized {
    /// # Errors
    /// Returns `SqlComposeError::ScanError` when the column holds an incompatible value.
    fn from_value(value: &RowValues) -> Result<Self, SqlComposeError>;
}

pub(crate) fn mismatch(expected: &str, got: &RowValues) -> SqlComposeError {
    SqlComposeError::ScanError(format!("expected {expected}, got {}", got.kind()))
}

impl FromValue for RowValues {
    fn from_value(value: &RowValues) -> Result<Self, SqlComposeError> {
        Ok(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(value: &RowValues) -> Result<Self, SqlComposeError> {
        match value {
            RowValues::Int(i) => Ok(*i),
            RowValues::Bool(b) => Ok(i64::from(*b)),
            other => Err(mismatch("integer", other)),
        }
    }
}

macro_rules! impl_from_value_narrow {
    ($($ty:ty),+) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &RowValues) -> Result<Self, SqlComposeError> {
                    let wide = i64::from_value(value)?;
                    <$ty>::try_from(wide).map_err(|_| {
                        SqlComposeError::ScanError(format!(
                            "integer {wide} out of range for {}",
                            stringify!($ty)
                        ))
                    })
                }
            }
        )+
    };
}

impl_from_value_narrow!(i32, i16, u32, u64, usize, u8);

impl FromValue for f64 {
    fn from_value(value: &RowValues) -> Result<Self, SqlComposeError> {
        value.as_float().ok_or_else(|| mismatch("float", value))
    }
}

impl FromValue for bool {
    fn from_value(value: &RowValues) -> Result<Self, SqlComposeError> {
        value.as_bool().copied().ok_or_else(|| mismatch("bool", value))
    }
}

impl FromValue for String {
    fn from_value(value: &RowValues) -> Result<Self, SqlComposeError> {
        match value {
            RowValues::Text(s) => Ok(s.clone()),
            RowValues::JSON(v) => Ok(v.to_string()),
            other => Err(mismatch("text", other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &RowValues) -> Result<Self, SqlComposeError> {
        match value {
            RowValues::Blob(b) => Ok(b.clone()),
            RowValues::Text(s) => Ok(s.as_bytes().to_vec()),
            other => Err(mismatch("blob", other)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &RowValues) -> Result<Self, SqlComposeError> {
        value.as_timestamp().ok_or_else(|| mismatch("timestamp", value))
    }
}

impl FromValue for JsonValue {
    fn from_value(value: &RowValues) -> Result<Self, SqlComposeError> {
        match value {
            RowValues::JSON(v) => Ok(v.clone()),
            RowValues::Null => Ok(JsonValue::Null),
            RowValues::Text(s) => Ok(serde_json::from_str(s)?),
            RowValues::Blob(b) => Ok(serde_json::from_slice(b)?),
            other => Err(mismatch("json", other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &RowValues) -> Result<Self, SqlComposeError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}
