use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::SqlComposeError;
use crate::types::{Arg, FromValue, RowValues, ToValue, mismatch};

/// Stores `T` in a text column as JSON.
///
/// Encoding happens when the argument is bound, so a value that fails to serialize surfaces as
/// [`SqlComposeError::JsonError`] from the statement call. A `NULL` column decodes to
/// `T::default()`.
///
/// ```rust
/// use sql_compose::{FromValue, Json, RowValues};
///
/// let tags = Json::<Vec<String>>::from_value(&RowValues::Text(r#"["a","b"]"#.into())).unwrap();
/// assert_eq!(tags.0, vec!["a".to_string(), "b".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> std::ops::DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> ToValue for Json<T>
where
    T: Serialize + std::fmt::Debug + Send + Sync,
{
    fn to_value(&self) -> Result<RowValues, SqlComposeError> {
        Ok(RowValues::Text(serde_json::to_string(&self.0)?))
    }
}

impl<T> From<Json<T>> for Arg
where
    T: Serialize + std::fmt::Debug + Send + Sync + 'static,
{
    fn from(value: Json<T>) -> Self {
        Arg::Valuer(Arc::new(value))
    }
}

impl<T: DeserializeOwned + Default> FromValue for Json<T> {
    fn from_value(value: &RowValues) -> Result<Self, SqlComposeError> {
        let inner = match value {
            RowValues::Null => T::default(),
            RowValues::Text(s) => serde_json::from_str(s)?,
            RowValues::Blob(b) => serde_json::from_slice(b)?,
            RowValues::JSON(v) => serde::Deserialize::deserialize(v)?,
            other => return Err(mismatch("json", other)),
        };
        Ok(Json(inner))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Debug)]
    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refused"))
        }
    }

    #[test]
    fn encodes_at_bind_time() {
        let arg = Arg::from(Json(BTreeMap::from([("k", 1)])));
        assert!(matches!(arg, Arg::Valuer(_)));
        assert_eq!(arg.to_value().unwrap(), RowValues::Text(r#"{"k":1}"#.into()));

        let bad = Arg::from(Json(Unserializable));
        assert!(matches!(bad.to_value(), Err(SqlComposeError::JsonError(_))));
    }

    #[test]
    fn null_decodes_to_default() {
        let decoded = Json::<Vec<i64>>::from_value(&RowValues::Null).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn rejects_non_json_columns() {
        assert!(Json::<Vec<i64>>::from_value(&RowValues::Int(1)).is_err());
        assert!(Json::<Vec<i64>>::from_value(&RowValues::Text("nope".into())).is_err());
    }
}
