/// Build a `Vec<Arg>` from heterogeneous values.
///
/// ```rust
/// use sql_compose::{Arg, args};
///
/// let args: Vec<Arg> = args![1, "two", 3.0, None::<i64>];
/// assert_eq!(args.len(), 4);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Arg>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Arg::from($arg)),+]
    };
}

/// Shorthand for [`Query::new`](crate::Query::new) with inline arguments.
///
/// ```rust
/// use sql_compose::query;
///
/// let q = query!("select * from t where a = ? and b = ?", 1, "x");
/// assert_eq!(q.text(), "select * from t where a = ? and b = ?");
/// ```
#[macro_export]
macro_rules! query {
    ($sql:expr $(, $arg:expr)* $(,)?) => {
        $crate::Query::new($sql, $crate::args![$($arg),*])
    };
}

/// Scan the columns of a row positionally into the given places.
///
/// ```rust,no_run
/// # use sql_compose::{scan_row, values, SqliteConnection, SqlComposeError};
/// # async fn demo(conn: &SqliteConnection) -> Result<(), SqlComposeError> {
/// let (mut id, mut name) = (0_i64, String::new());
/// scan_row(conn, &mut values![&mut id, &mut name], "select id, name from users limit 1", []).await?;
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! values {
    ($($dest:expr),+ $(,)?) => {
        $crate::Values::new(::std::vec![$($dest as &mut (dyn $crate::ScanTarget + Send)),+])
    };
}

/// Implement [`Scannable`](crate::Scannable) and [`Insertable`](crate::Insertable) for a
/// struct, mapping each listed field to the column of the same name.
///
/// Fields named in `generated` are assigned by the database and skipped by
/// [`insert_sql`](crate::insert_sql) and [`update_sql`](crate::update_sql). Field types must
/// implement [`FromValue`](crate::FromValue), `Clone` and `Into<Arg>`.
///
/// ```rust
/// use sql_compose::{Insertable, insert_sql, record};
///
/// #[derive(Debug, Default, Clone)]
/// struct Task {
///     id: i64,
///     name: String,
///     age: i64,
/// }
///
/// record!(Task { id, name, age }, generated = [id]);
///
/// let insert = insert_sql(&[Task::default()]);
/// assert_eq!(insert.sql().0, "(name, age) VALUES (?, ?)");
/// assert!(Task::default().is_generated("id"));
/// ```
#[macro_export]
macro_rules! record {
    ($ty:ty { $($field:ident),+ $(,)? } $(, generated = [$($generated:ident),* $(,)?])? $(,)?) => {
        impl $crate::Scannable for $ty {
            fn scan_from(
                &mut self,
                columns: &[::std::string::String],
                row: &$crate::Row,
            ) -> ::std::result::Result<(), $crate::SqlComposeError> {
                for (idx, column) in columns.iter().enumerate() {
                    match column.as_str() {
                        $(stringify!($field) => self.$field = row.get(idx)?,)+
                        other => {
                            return Err($crate::SqlComposeError::UnknownColumn(other.to_owned()));
                        }
                    }
                }
                Ok(())
            }
        }

        impl $crate::Insertable for $ty {
            fn column_values(&self) -> ::std::vec::Vec<$crate::NamedArg> {
                ::std::vec![
                    $($crate::NamedArg::new(stringify!($field), self.$field.clone())),+
                ]
            }

            fn is_generated(&self, column: &str) -> bool {
                match column {
                    $($(stringify!($generated) => true,)*)?
                    _ => false,
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{Arg, Insertable, Row, RowValues, Scannable, SqlComposeError};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Task {
        id: i64,
        name: String,
        age: i64,
    }

    record!(Task { id, name, age }, generated = [id]);

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Tag {
        label: String,
    }

    record!(Tag { label });

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn scans_by_column_name_in_any_order() {
        let mut task = Task::default();
        let row = Row::new(vec![RowValues::Int(30), RowValues::Int(4)]);
        task.scan_from(&columns(&["age", "id"]), &row).unwrap();
        assert_eq!(
            task,
            Task {
                id: 4,
                name: String::new(),
                age: 30
            }
        );
    }

    #[test]
    fn unknown_column_fails() {
        let mut task = Task::default();
        let row = Row::new(vec![RowValues::Int(1)]);
        let err = task.scan_from(&columns(&["owner"]), &row).unwrap_err();
        assert!(matches!(err, SqlComposeError::UnknownColumn(name) if name == "owner"));
    }

    #[test]
    fn generated_columns_are_reported() {
        let task = Task {
            id: 1,
            name: "n".into(),
            age: 2,
        };
        assert!(task.is_generated("id"));
        assert!(!task.is_generated("name"));
        let names: Vec<_> = task.column_values().iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["id", "name", "age"]);
        assert!(!Tag::default().is_generated("label"));
    }

    #[test]
    fn args_macro_handles_empty_and_mixed() {
        assert!(args![].is_empty());
        let mixed = args![1, "a", Some(2.5)];
        assert_eq!(mixed[1], Arg::Value(RowValues::Text("a".into())));
    }
}
