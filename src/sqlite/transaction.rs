use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::conn::{ExecResult, Executor, Preparer, Queryer};
use crate::error::SqlComposeError;
use crate::types::Arg;

use super::connection::{exec_in_scope, prepare_in_scope, query_in_scope};
use super::prepared::SqliteStatement;
use super::rows::SqliteRows;
use super::worker::{Source, SqliteWorker};

/// An open transaction on a [`SqliteConnection`](super::SqliteConnection).
///
/// Implements the same connection contracts as the connection itself, so every engine
/// function and [`StmtCache`](crate::StmtCache) runs inside it unchanged. Dropping it without
/// [`commit`](Self::commit) rolls back.
pub struct SqliteTransaction {
    worker: Arc<SqliteWorker>,
    tx_id: u64,
    finished: bool,
}

impl SqliteTransaction {
    pub(crate) fn new(worker: Arc<SqliteWorker>, tx_id: u64) -> Self {
        Self {
            worker,
            tx_id,
            finished: false,
        }
    }

    /// Execute a batch of SQL statements inside the transaction.
    ///
    /// # Errors
    /// Returns `SqlComposeError` if executing the batch fails.
    pub async fn exec_batch(&self, sql: &str) -> Result<(), SqlComposeError> {
        self.worker.batch(Some(self.tx_id), sql.to_owned()).await
    }

    /// # Errors
    /// Returns `SqlComposeError` if committing fails. The transaction is over either way.
    pub async fn commit(mut self) -> Result<(), SqlComposeError> {
        self.finished = true;
        self.worker.commit(self.tx_id).await
    }

    /// # Errors
    /// Returns `SqlComposeError` if rolling back fails.
    pub async fn rollback(mut self) -> Result<(), SqlComposeError> {
        self.finished = true;
        self.worker.rollback(self.tx_id).await
    }
}

impl fmt::Debug for SqliteTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteTransaction")
            .field("tx_id", &self.tx_id)
            .field("finished", &self.finished)
            .finish()
    }
}

impl Drop for SqliteTransaction {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(tx_id = self.tx_id, "sqlite transaction dropped, rolling back");
            self.worker.rollback_detached(self.tx_id);
        }
    }
}

#[async_trait]
impl Queryer for SqliteTransaction {
    type Rows = SqliteRows;

    async fn query(&self, sql: &str, args: &[Arg]) -> Result<SqliteRows, SqlComposeError> {
        query_in_scope(&self.worker, Some(self.tx_id), Source::Sql(sql.to_owned()), args).await
    }
}

#[async_trait]
impl Executor for SqliteTransaction {
    async fn exec(&self, sql: &str, args: &[Arg]) -> Result<ExecResult, SqlComposeError> {
        exec_in_scope(&self.worker, Some(self.tx_id), Source::Sql(sql.to_owned()), args).await
    }
}

#[async_trait]
impl Preparer for SqliteTransaction {
    type Statement = SqliteStatement;

    async fn prepare(&self, sql: &str) -> Result<SqliteStatement, SqlComposeError> {
        prepare_in_scope(&self.worker, Some(self.tx_id), sql).await
    }
}
