use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::conn::RowCursor;
use crate::error::SqlComposeError;
use crate::row::Row;

use super::worker::Cursor;

/// Rows streamed from a `SQLite` worker.
///
/// The worker keeps the statement running until every row has been read or this value is
/// dropped.
#[derive(Debug)]
pub struct SqliteRows {
    columns: Vec<String>,
    rows: mpsc::Receiver<Result<Row, SqlComposeError>>,
}

impl SqliteRows {
    pub(crate) fn new(cursor: Cursor) -> Self {
        Self {
            columns: cursor.columns,
            rows: cursor.rows,
        }
    }
}

#[async_trait]
impl RowCursor for SqliteRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next_row(&mut self) -> Result<Option<Row>, SqlComposeError> {
        self.rows.recv().await.transpose()
    }
}
