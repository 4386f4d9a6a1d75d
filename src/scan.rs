//! The row-scanning contract and the stock destinations built on it.

use std::collections::HashSet;
use std::hash::Hash;

use crate::error::SqlComposeError;
use crate::row::Row;
use crate::types::FromValue;

/// A value that populates itself from one row.
///
/// Implementations match on column names rather than positions, so reordered columns or a
/// subset of them scan correctly. An unrecognized column name must be reported as
/// [`SqlComposeError::UnknownColumn`].
pub trait Scannable {
    /// # Errors
    /// Returns [`SqlComposeError`] on an unknown column or a value that cannot be decoded.
    fn scan_from(&mut self, columns: &[String], row: &Row) -> Result<(), SqlComposeError>;
}

impl<S: Scannable + ?Sized> Scannable for &mut S {
    fn scan_from(&mut self, columns: &[String], row: &Row) -> Result<(), SqlComposeError> {
        (**self).scan_from(columns, row)
    }
}

/// Appends every scanned row to a `Vec<T>`.
pub fn append<T: Scannable + Default>(dest: &mut Vec<T>) -> Append<'_, T> {
    Append(dest)
}

#[derive(Debug)]
pub struct Append<'a, T>(&'a mut Vec<T>);

impl<T: Scannable + Default> Scannable for Append<'_, T> {
    fn scan_from(&mut self, columns: &[String], row: &Row) -> Result<(), SqlComposeError> {
        let mut item = T::default();
        item.scan_from(columns, row)?;
        self.0.push(item);
        Ok(())
    }
}

/// Appends every scanned row to a `Vec<Box<T>>`.
pub fn append_boxed<T: Scannable + Default>(dest: &mut Vec<Box<T>>) -> AppendBoxed<'_, T> {
    AppendBoxed(dest)
}

#[derive(Debug)]
pub struct AppendBoxed<'a, T>(&'a mut Vec<Box<T>>);

impl<T: Scannable + Default> Scannable for AppendBoxed<'_, T> {
    fn scan_from(&mut self, columns: &[String], row: &Row) -> Result<(), SqlComposeError> {
        let mut item = Box::<T>::default();
        item.scan_from(columns, row)?;
        self.0.push(item);
        Ok(())
    }
}

fn single_column(row: &Row) -> Result<&crate::RowValues, SqlComposeError> {
    match row.values() {
        [value] => Ok(value),
        other => Err(SqlComposeError::ScanError(format!(
            "expected 1 destination argument, got {} columns",
            other.len()
        ))),
    }
}

/// Appends the single column of every row to a `Vec<V>`.
pub fn append_value<V: FromValue>(dest: &mut Vec<V>) -> AppendValue<'_, V> {
    AppendValue(dest)
}

#[derive(Debug)]
pub struct AppendValue<'a, V>(&'a mut Vec<V>);

impl<V: FromValue> Scannable for AppendValue<'_, V> {
    fn scan_from(&mut self, _columns: &[String], row: &Row) -> Result<(), SqlComposeError> {
        self.0.push(V::from_value(single_column(row)?)?);
        Ok(())
    }
}

/// Inserts the single column of every row into a `HashSet<V>`.
pub fn set_value<V: FromValue + Eq + Hash>(dest: &mut HashSet<V>) -> SetValue<'_, V> {
    SetValue(dest)
}

#[derive(Debug)]
pub struct SetValue<'a, V>(&'a mut HashSet<V>);

impl<V: FromValue + Eq + Hash> Scannable for SetValue<'_, V> {
    fn scan_from(&mut self, _columns: &[String], row: &Row) -> Result<(), SqlComposeError> {
        self.0.insert(V::from_value(single_column(row)?)?);
        Ok(())
    }
}

/// A place one column value can be decoded into.
pub trait ScanTarget {
    /// # Errors
    /// Returns `SqlComposeError::ScanError` if the value cannot be decoded.
    fn assign(&mut self, value: &crate::RowValues) -> Result<(), SqlComposeError>;
}

impl<T: FromValue> ScanTarget for T {
    fn assign(&mut self, value: &crate::RowValues) -> Result<(), SqlComposeError> {
        *self = T::from_value(value)?;
        Ok(())
    }
}

/// Positional scan into scalar places, usually built with [`values!`](crate::values).
pub struct Values<'a>(Vec<&'a mut (dyn ScanTarget + Send)>);

impl<'a> Values<'a> {
    #[must_use]
    pub fn new(dests: Vec<&'a mut (dyn ScanTarget + Send)>) -> Self {
        Self(dests)
    }
}

impl Scannable for Values<'_> {
    fn scan_from(&mut self, _columns: &[String], row: &Row) -> Result<(), SqlComposeError> {
        if row.len() != self.0.len() {
            return Err(SqlComposeError::ScanError(format!(
                "expected {} destination arguments, got {} columns",
                self.0.len(),
                row.len()
            )));
        }
        for (idx, (dest, value)) in self.0.iter_mut().zip(row.values()).enumerate() {
            dest.assign(value).map_err(|err| match err {
                SqlComposeError::ScanError(msg) => {
                    SqlComposeError::ScanError(format!("column {idx}: {msg}"))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}
