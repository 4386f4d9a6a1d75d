use rusqlite::types::Value;
use rusqlite::{Statement, params_from_iter};
use tokio::sync::mpsc;

use crate::conn::ExecResult;
use crate::error::SqlComposeError;
use crate::row::Row;
use crate::types::RowValues;

use super::worker::{Cursor, Reply};

/// Extract a `RowValues` from a `SQLite` row.
///
/// # Errors
///
/// Returns `SqlComposeError` if the value cannot be read.
pub fn sqlite_extract_value_sync(
    row: &rusqlite::Row,
    idx: usize,
) -> Result<RowValues, SqlComposeError> {
    let value: Value = row.get(idx)?;
    match value {
        Value::Null => Ok(RowValues::Null),
        Value::Integer(i) => Ok(RowValues::Int(i)),
        Value::Real(f) => Ok(RowValues::Float(f)),
        Value::Text(s) => Ok(RowValues::Text(s)),
        Value::Blob(b) => Ok(RowValues::Blob(b)),
    }
}

fn extract_row(row: &rusqlite::Row, column_count: usize) -> Result<Row, SqlComposeError> {
    (0..column_count)
        .map(|idx| sqlite_extract_value_sync(row, idx))
        .collect::<Result<Vec<_>, _>>()
        .map(Row::new)
}

/// Run `stmt` and stream its rows to the consumer of the reply.
///
/// Blocks the worker until the result set is exhausted or the consumer drops its receiver;
/// the statement is reset on return either way.
pub(crate) fn stream_statement(stmt: &mut Statement<'_>, params: &[Value], respond_to: Reply<Cursor>) {
    let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_owned).collect();
    let column_count = columns.len();

    let mut rows = match stmt.query(params_from_iter(params)) {
        Ok(rows) => rows,
        Err(err) => {
            let _ = respond_to.send(Err(err.into()));
            return;
        }
    };

    let (row_tx, row_rx) = mpsc::channel(1);
    if respond_to
        .send(Ok(Cursor {
            columns,
            rows: row_rx,
        }))
        .is_err()
    {
        return;
    }

    loop {
        let next = match rows.next() {
            Ok(Some(row)) => extract_row(row, column_count),
            Ok(None) => break,
            Err(err) => Err(err.into()),
        };
        let failed = next.is_err();
        if row_tx.blocking_send(next).is_err() {
            tracing::trace!("sqlite cursor released before exhaustion");
            break;
        }
        if failed {
            break;
        }
    }
}

/// Run `stmt` to completion, discarding any rows it returns.
pub(crate) fn drain_statement(
    conn: &rusqlite::Connection,
    stmt: &mut Statement<'_>,
    params: &[Value],
) -> Result<ExecResult, SqlComposeError> {
    {
        let mut rows = stmt.query(params_from_iter(params))?;
        while rows.next()?.is_some() {}
    }

    if stmt.readonly() {
        return Ok(ExecResult::default());
    }
    let changes = conn.changes();
    Ok(ExecResult {
        rows_affected: u64::try_from(changes).unwrap_or(u64::MAX),
        last_insert_id: (changes > 0).then(|| conn.last_insert_rowid()),
    })
}
