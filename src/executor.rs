//! Generic query execution: run a [`Query`] against any connection-like object and scan the
//! result.
//!
//! Every entry point takes `(db, sql, args)`, builds `Query::new(sql, args)` and expands it, so
//! sub-query arguments are inlined before the driver sees the text. Every call is reported to
//! the hook installed with [`with_log_fn`](crate::with_log_fn), if any.

use std::marker::PhantomData;

use futures_util::Stream;

use crate::conn::{Executor, Queryer, RowCursor};
use crate::error::SqlComposeError;
use crate::hook::{OpKind, QueryTimer};
use crate::query::Query;
use crate::scan::Scannable;
use crate::types::Arg;

/// Scan the first row of the result into `dest`.
///
/// # Errors
/// Returns [`SqlComposeError::NoRows`] when the query matched nothing, or the error reported
/// by the connection or by `dest`.
///
/// # Panics
/// Panics if the number of `?` in `sql` differs from the number of `args`.
pub async fn scan_row<Q, S, I>(db: &Q, mut dest: S, sql: &str, args: I) -> Result<(), SqlComposeError>
where
    Q: Queryer + ?Sized,
    S: Scannable,
    I: IntoIterator<Item = Arg>,
{
    let query = Query::new(sql, args);
    let (sql, args) = query.sql();
    let _timer = QueryTimer::start(OpKind::Query, &sql);

    let mut rows = db.query(&sql, &args).await?;
    let Some(row) = rows.next_row().await? else {
        return Err(SqlComposeError::NoRows);
    };
    dest.scan_from(rows.columns(), &row)
}

/// Scan every row of the result into `dest`, which usually accumulates them (see
/// [`append`](crate::append)).
///
/// # Errors
/// Returns the first error reported by the connection, the cursor or `dest`. Rows scanned
/// before the error stay in `dest`.
///
/// # Panics
/// Panics if the number of `?` in `sql` differs from the number of `args`.
pub async fn scan_rows<Q, S, I>(db: &Q, mut dest: S, sql: &str, args: I) -> Result<(), SqlComposeError>
where
    Q: Queryer + ?Sized,
    S: Scannable,
    I: IntoIterator<Item = Arg>,
{
    let query = Query::new(sql, args);
    let (sql, args) = query.sql();
    let _timer = QueryTimer::start(OpKind::Query, &sql);

    let mut rows = db.query(&sql, &args).await?;
    while let Some(row) = rows.next_row().await? {
        dest.scan_from(rows.columns(), &row)?;
    }
    Ok(())
}

/// Execute a statement for its side effects.
///
/// # Errors
/// Returns the error reported by the connection.
///
/// # Panics
/// Panics if the number of `?` in `sql` differs from the number of `args`.
pub async fn exec<E, I>(db: &E, sql: &str, args: I) -> Result<(), SqlComposeError>
where
    E: Executor + ?Sized,
    I: IntoIterator<Item = Arg>,
{
    let query = Query::new(sql, args);
    let (sql, args) = query.sql();
    let _timer = QueryTimer::start(OpKind::Exec, &sql);

    db.exec(&sql, &args).await?;
    Ok(())
}

/// Iterate the result one record at a time.
///
/// Nothing runs until the first call to [`RowIter::next`].
///
/// ```rust,no_run
/// # use sql_compose::{iter_rows, record, SqliteConnection, SqlComposeError};
/// # #[derive(Debug, Default, Clone)] struct Task { id: i64, name: String }
/// # record!(Task { id, name }, generated = [id]);
/// # async fn demo(conn: &SqliteConnection) -> Result<(), SqlComposeError> {
/// let mut tasks = iter_rows::<Task, _, _>(conn, "select id, name from tasks", []);
/// while let Some(task) = tasks.next().await {
///     let task = task?;
///     if task.name == "stop" {
///         break;
///     }
/// }
/// # Ok(())
/// # }
/// ```
///
/// # Panics
/// Panics if the number of `?` in `sql` differs from the number of `args`.
pub fn iter_rows<'a, T, Q, I>(db: &'a Q, sql: &str, args: I) -> RowIter<'a, T, Q>
where
    T: Scannable + Default,
    Q: Queryer + ?Sized,
    I: IntoIterator<Item = Arg>,
{
    let query = Query::new(sql, args);
    let (sql, args) = query.sql();
    RowIter {
        db,
        state: IterState::Pending {
            sql: sql.into_owned(),
            args: args.into_owned(),
        },
        _record: PhantomData,
    }
}

enum IterState<R> {
    Pending { sql: String, args: Vec<Arg> },
    Open { rows: R, _timer: QueryTimer },
    Done,
}

/// Pull-based iterator returned by [`iter_rows`].
///
/// Dropping it (or calling [`close`](Self::close)) before the end releases the cursor.
pub struct RowIter<'a, T, Q: Queryer + ?Sized> {
    db: &'a Q,
    state: IterState<Q::Rows>,
    _record: PhantomData<fn() -> T>,
}

impl<'a, T, Q> RowIter<'a, T, Q>
where
    T: Scannable + Default,
    Q: Queryer + ?Sized,
{
    /// Advance to the next record.
    ///
    /// Yields `Some(Err(_))` for a row that failed to scan, after which iteration may continue,
    /// and for a failed query or cursor, after which it yields `None`.
    pub async fn next(&mut self) -> Option<Result<T, SqlComposeError>> {
        if let IterState::Pending { sql, args } = &self.state {
            let timer = QueryTimer::start(OpKind::Query, sql);
            match self.db.query(sql, args).await {
                Ok(rows) => {
                    self.state = IterState::Open {
                        rows,
                        _timer: timer,
                    };
                }
                Err(err) => {
                    self.state = IterState::Done;
                    return Some(Err(err));
                }
            }
        }

        let IterState::Open { rows, .. } = &mut self.state else {
            return None;
        };
        match rows.next_row().await {
            Ok(Some(row)) => {
                let mut record = T::default();
                Some(record.scan_from(rows.columns(), &row).map(|()| record))
            }
            Ok(None) => {
                self.state = IterState::Done;
                None
            }
            Err(err) => {
                self.state = IterState::Done;
                Some(Err(err))
            }
        }
    }

    /// Stop iterating and release the cursor.
    pub fn close(mut self) {
        self.state = IterState::Done;
    }

    /// Adapt into a [`Stream`] of records.
    pub fn into_stream(self) -> impl Stream<Item = Result<T, SqlComposeError>> {
        futures_util::stream::unfold(self, |mut iter| async move {
            let item = iter.next().await?;
            Some((item, iter))
        })
    }
}
