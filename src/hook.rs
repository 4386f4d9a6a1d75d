//! Query logging callbacks.
//!
//! A [`LogFn`] is reported the kind of operation, the final SQL text and how long the call
//! took. It can be installed for a scope of calls with [`with_log_fn`], or attached to a
//! connection with [`HookConn`]. There is no process-wide hook.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::conn::{ExecResult, Executor, Preparer, Queryer};
use crate::error::SqlComposeError;
use crate::types::Arg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Query,
    Exec,
}

impl OpKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OpKind::Query => "query",
            OpKind::Exec => "exec",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type LogFn = Arc<dyn Fn(OpKind, &str, Duration) + Send + Sync>;

tokio::task_local! {
    static LOG_FN: LogFn;
}

/// Run `fut` with `log_fn` reporting every engine call made inside it.
///
/// The hook follows the call chain within the current task; work spawned onto other tasks
/// does not inherit it.
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use std::time::Duration;
/// # use sql_compose::{exec, with_log_fn, LogFn, OpKind, SqliteConnection, SqlComposeError};
/// # async fn demo(conn: &SqliteConnection) -> Result<(), SqlComposeError> {
/// let log: LogFn = Arc::new(|kind: OpKind, sql: &str, dur: Duration| {
///     tracing::info!(%kind, sql, ?dur, "sql");
/// });
/// with_log_fn(log, exec(conn, "delete from sessions", [])).await?;
/// # Ok(())
/// # }
/// ```
pub async fn with_log_fn<F: Future>(log_fn: LogFn, fut: F) -> F::Output {
    LOG_FN.scope(log_fn, fut).await
}

/// Times one engine call; reports to the scoped hook (if any) when dropped.
pub(crate) struct QueryTimer {
    kind: OpKind,
    started: Instant,
    sql: String,
    log_fn: Option<LogFn>,
}

impl QueryTimer {
    pub(crate) fn start(kind: OpKind, sql: &str) -> Self {
        Self {
            kind,
            started: Instant::now(),
            sql: sql.to_owned(),
            log_fn: LOG_FN.try_with(Arc::clone).ok(),
        }
    }
}

impl Drop for QueryTimer {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed();
        tracing::trace!(kind = %self.kind, sql = %self.sql, ?elapsed, "sql call finished");
        if let Some(log_fn) = &self.log_fn {
            log_fn(self.kind, &self.sql, elapsed);
        }
    }
}

/// Connection decorator reporting every `query` and `exec` to a [`LogFn`].
///
/// For `query` the reported duration covers opening the cursor, not reading it.
#[derive(Clone)]
pub struct HookConn<C> {
    inner: C,
    log_fn: LogFn,
}

impl<C> HookConn<C> {
    pub fn new(inner: C, log_fn: LogFn) -> Self {
        Self { inner, log_fn }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: fmt::Debug> fmt::Debug for HookConn<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookConn")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<C: Queryer> Queryer for HookConn<C> {
    type Rows = C::Rows;

    async fn query(&self, sql: &str, args: &[Arg]) -> Result<Self::Rows, SqlComposeError> {
        let started = Instant::now();
        let result = self.inner.query(sql, args).await;
        (self.log_fn)(OpKind::Query, sql, started.elapsed());
        result
    }
}

#[async_trait]
impl<C: Executor> Executor for HookConn<C> {
    async fn exec(&self, sql: &str, args: &[Arg]) -> Result<ExecResult, SqlComposeError> {
        let started = Instant::now();
        let result = self.inner.exec(sql, args).await;
        (self.log_fn)(OpKind::Exec, sql, started.elapsed());
        result
    }
}

#[async_trait]
impl<C: Preparer> Preparer for HookConn<C> {
    type Statement = C::Statement;

    async fn prepare(&self, sql: &str) -> Result<Self::Statement, SqlComposeError> {
        self.inner.prepare(sql).await
    }
}
