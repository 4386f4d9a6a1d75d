use crate::error::SqlComposeError;
use crate::types::{FromValue, RowValues};

/// One row read from a cursor, with values in column order.
///
/// Column names live on the cursor and are handed to
/// [`Scannable::scan_from`](crate::Scannable::scan_from) alongside the row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<RowValues>,
}

impl Row {
    #[must_use]
    pub fn new(values: Vec<RowValues>) -> Self {
        Self { values }
    }

    /// Decode the value at `index`.
    ///
    /// # Errors
    /// Returns `SqlComposeError::ScanError` if the index is out of bounds or the value cannot be
    /// decoded as `T`.
    pub fn get<T: FromValue>(&self, index: usize) -> Result<T, SqlComposeError> {
        let value = self.value(index).ok_or_else(|| {
            SqlComposeError::ScanError(format!(
                "column index {index} out of range for row of {} columns",
                self.values.len()
            ))
        })?;
        T::from_value(value).map_err(|err| match err {
            SqlComposeError::ScanError(msg) => {
                SqlComposeError::ScanError(format!("column {index}: {msg}"))
            }
            other => other,
        })
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn value(&self, index: usize) -> Option<&RowValues> {
        self.values.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn values(&self) -> &[RowValues] {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<RowValues> {
        self.values
    }
}

impl From<Vec<RowValues>> for Row {
    fn from(values: Vec<RowValues>) -> Self {
        Self::new(values)
    }
}
