use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::conn::{ExecResult, PreparedStatement};
use crate::error::SqlComposeError;
use crate::types::Arg;

use super::connection::{exec_in_scope, query_in_scope};
use super::rows::SqliteRows;
use super::worker::{Scope, Source, SqliteWorker};

/// Handle to a statement prepared and held by a `SQLite` worker.
///
/// Dropping the handle without calling [`PreparedStatement::close`] queues the statement for
/// finalization.
pub struct SqliteStatement {
    worker: Arc<SqliteWorker>,
    scope: Scope,
    id: u64,
    sql: String,
    closed: AtomicBool,
}

impl SqliteStatement {
    pub(crate) fn new(worker: Arc<SqliteWorker>, scope: Scope, id: u64, sql: &str) -> Self {
        Self {
            worker,
            scope,
            id,
            sql: sql.to_owned(),
            closed: AtomicBool::new(false),
        }
    }
}

impl fmt::Debug for SqliteStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStatement")
            .field("id", &self.id)
            .field("sql", &self.sql)
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish()
    }
}

#[async_trait]
impl PreparedStatement for SqliteStatement {
    type Rows = SqliteRows;

    fn sql(&self) -> &str {
        &self.sql
    }

    async fn query(&self, args: &[Arg]) -> Result<SqliteRows, SqlComposeError> {
        query_in_scope(&self.worker, self.scope, Source::Prepared(self.id), args).await
    }

    async fn exec(&self, args: &[Arg]) -> Result<ExecResult, SqlComposeError> {
        exec_in_scope(&self.worker, self.scope, Source::Prepared(self.id), args).await
    }

    async fn close(&self) -> Result<(), SqlComposeError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.worker.finalize(self.id).await
    }
}

impl Drop for SqliteStatement {
    fn drop(&mut self) {
        if !self.closed.load(Ordering::Acquire) {
            self.worker.finalize_detached(self.id);
        }
    }
}
