//! Write-statement fragments derived from [`Insertable`] records.

use crate::query::Query;
use crate::types::{Arg, NamedArg};

/// A record that can describe its columns for `INSERT` and `UPDATE` fragments.
pub trait Insertable {
    /// Every column of the record, in declaration order, paired with its current value.
    fn column_values(&self) -> Vec<NamedArg>;

    /// True for columns assigned by the database, which write fragments skip.
    fn is_generated(&self, column: &str) -> bool;
}

/// Records usable with [`update_sql`]. Every [`Insertable`] qualifies.
pub trait Updatable: Insertable {}

impl<T: Insertable + ?Sized> Updatable for T {}

/// Build `(c1, c2) VALUES (?, ?), (?, ?)` for a batch of records.
///
/// Columns and the set of generated columns are taken from the first item; every item must
/// report the same columns in the same order.
///
/// # Panics
/// Panics if `items` is empty.
pub fn insert_sql<T: Insertable>(items: &[T]) -> Query {
    let Some(first) = items.first() else {
        panic!("insert_sql called with zero items");
    };

    let mask: Vec<bool> = first
        .column_values()
        .iter()
        .map(|column| !first.is_generated(column.name))
        .collect();
    let columns: Vec<&'static str> = first
        .column_values()
        .into_iter()
        .zip(&mask)
        .filter_map(|(column, keep)| keep.then_some(column.name))
        .collect();

    let row_placeholders = format!("({})", vec!["?"; columns.len()].join(", "));
    let mut args = Vec::with_capacity(columns.len() * items.len());
    for item in items {
        args.extend(
            item.column_values()
                .into_iter()
                .zip(&mask)
                .filter_map(|(column, keep)| keep.then_some(column.value)),
        );
    }

    let text = format!(
        "({}) VALUES {}",
        columns.join(", "),
        vec![row_placeholders.as_str(); items.len()].join(", ")
    );
    Query::new(&text, args)
}

/// Build `c1=?, c2=?` over the non-generated columns of `item`.
pub fn update_sql<T: Updatable + ?Sized>(item: &T) -> Query {
    let (assignments, args): (Vec<String>, Vec<Arg>) = item
        .column_values()
        .into_iter()
        .filter(|column| !item.is_generated(column.name))
        .map(|column| (format!("{}=?", column.name), column.value))
        .unzip();
    Query::new(&assignments.join(", "), args)
}

/// Build `(?, ?, ?)` with one argument per item.
///
/// # Panics
/// Panics if `items` is empty.
pub fn in_sql<I>(items: I) -> Query
where
    I: IntoIterator,
    I::Item: Into<Arg>,
{
    let args: Vec<Arg> = items.into_iter().map(Into::into).collect();
    if args.is_empty() {
        panic!("in_sql called with zero items");
    }
    let text = format!("({})", vec!["?"; args.len()].join(", "));
    Query::new(&text, args)
}
