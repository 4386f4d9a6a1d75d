use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::conn::{ExecResult, Executor, Preparer, Queryer};
use crate::error::SqlComposeError;
use crate::types::Arg;

use super::config::{SqliteOptions, SqliteOptionsBuilder};
use super::params::convert_args;
use super::prepared::SqliteStatement;
use super::rows::SqliteRows;
use super::transaction::SqliteTransaction;
use super::worker::{Scope, Source, SqliteWorker};

/// `SQLite` connection backed by a dedicated worker thread.
///
/// Clones share the same worker and therefore the same underlying connection. Only one cursor
/// can be open per connection at a time: finish or drop a [`SqliteRows`] before awaiting another
/// call on the same connection from the same task.
#[derive(Clone)]
pub struct SqliteConnection {
    worker: Arc<SqliteWorker>,
}

impl SqliteConnection {
    /// Open a connection on a new worker thread.
    ///
    /// # Errors
    /// Returns [`SqlComposeError`] if the worker thread cannot be spawned or the database cannot
    /// be opened.
    pub async fn open(options: SqliteOptions) -> Result<Self, SqlComposeError> {
        let worker = SqliteWorker::spawn(options).await?;
        Ok(Self {
            worker: Arc::new(worker),
        })
    }

    #[must_use]
    pub fn builder(db_path: impl Into<String>) -> SqliteOptionsBuilder {
        SqliteOptionsBuilder::new(db_path)
    }

    /// Execute a batch of SQL statements atomically.
    ///
    /// # Errors
    /// Propagates any [`SqlComposeError`] produced while dispatching the command or running the
    /// batch within the worker; nothing from a failed batch is kept.
    pub async fn exec_batch(&self, sql: &str) -> Result<(), SqlComposeError> {
        self.worker.batch(None, sql.to_owned()).await
    }

    /// Begin a transaction. Other calls through this connection (or its clones) are rejected
    /// until the transaction commits or rolls back.
    ///
    /// # Errors
    /// Returns [`SqlComposeError`] if a transaction is already in progress.
    pub async fn begin(&self) -> Result<SqliteTransaction, SqlComposeError> {
        let tx_id = self.worker.begin().await?;
        Ok(SqliteTransaction::new(Arc::clone(&self.worker), tx_id))
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("worker", &self.worker)
            .finish()
    }
}

pub(crate) async fn query_in_scope(
    worker: &SqliteWorker,
    scope: Scope,
    source: Source,
    args: &[Arg],
) -> Result<SqliteRows, SqlComposeError> {
    let params = convert_args(args)?;
    let cursor = worker.query(scope, source, params).await?;
    Ok(SqliteRows::new(cursor))
}

pub(crate) async fn exec_in_scope(
    worker: &SqliteWorker,
    scope: Scope,
    source: Source,
    args: &[Arg],
) -> Result<ExecResult, SqlComposeError> {
    let params = convert_args(args)?;
    worker.exec(scope, source, params).await
}

pub(crate) async fn prepare_in_scope(
    worker: &Arc<SqliteWorker>,
    scope: Scope,
    sql: &str,
) -> Result<SqliteStatement, SqlComposeError> {
    let id = worker.prepare(scope, sql.to_owned()).await?;
    Ok(SqliteStatement::new(Arc::clone(worker), scope, id, sql))
}

#[async_trait]
impl Queryer for SqliteConnection {
    type Rows = SqliteRows;

    async fn query(&self, sql: &str, args: &[Arg]) -> Result<SqliteRows, SqlComposeError> {
        query_in_scope(&self.worker, None, Source::Sql(sql.to_owned()), args).await
    }
}

#[async_trait]
impl Executor for SqliteConnection {
    async fn exec(&self, sql: &str, args: &[Arg]) -> Result<ExecResult, SqlComposeError> {
        exec_in_scope(&self.worker, None, Source::Sql(sql.to_owned()), args).await
    }
}

#[async_trait]
impl Preparer for SqliteConnection {
    type Statement = SqliteStatement;

    async fn prepare(&self, sql: &str) -> Result<SqliteStatement, SqlComposeError> {
        prepare_in_scope(&self.worker, None, sql).await
    }
}
