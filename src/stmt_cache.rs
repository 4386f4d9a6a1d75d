//! Memoized prepared statements keyed by SQL text.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::conn::{ExecResult, Executor, PreparedStatement, Preparer, Queryer};
use crate::error::SqlComposeError;
use crate::types::Arg;

type StatementMap<S> = HashMap<String, Arc<S>>;

/// Prepares each distinct SQL text once and reuses the statement for later calls.
///
/// Keys are the exact final text, so `select 1` and `SELECT 1` are cached separately. The cache
/// implements [`Queryer`] and [`Executor`], so it drops in wherever a connection is accepted:
///
/// ```rust,no_run
/// # use sql_compose::{exec, SqliteConnection, SqliteOptions, StmtCache, SqlComposeError, args};
/// # async fn demo() -> Result<(), SqlComposeError> {
/// let conn = SqliteConnection::open(SqliteOptions::in_memory()).await?;
/// let cache = StmtCache::new(conn);
/// for id in 0..3 {
///     exec(&cache, "insert into ids (id) values (?)", args![id]).await?;
/// }
/// cache.close().await?;
/// # Ok(())
/// # }
/// ```
///
/// A cache built over a transaction must not outlive it.
pub struct StmtCache<C: Preparer> {
    conn: C,
    statements: RwLock<StatementMap<C::Statement>>,
}

impl<C: Preparer> StmtCache<C> {
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            statements: RwLock::new(HashMap::new()),
        }
    }

    /// The wrapped connection.
    pub fn inner(&self) -> &C {
        &self.conn
    }

    /// Number of statements currently cached.
    pub async fn len(&self) -> usize {
        self.statements.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.statements.read().await.is_empty()
    }

    /// Return the cached statement for `sql`, preparing it on first use.
    ///
    /// Concurrent callers asking for the same text wait for a single preparation. A failed
    /// preparation is returned to the caller and not cached.
    ///
    /// # Errors
    /// Returns the error reported by the wrapped connection's `prepare`.
    pub async fn get_statement(&self, sql: &str) -> Result<Arc<C::Statement>, SqlComposeError> {
        if let Some(stmt) = self.statements.read().await.get(sql) {
            return Ok(Arc::clone(stmt));
        }

        let mut statements = self.statements.write().await;
        if let Some(stmt) = statements.get(sql) {
            return Ok(Arc::clone(stmt));
        }
        let stmt = Arc::new(self.conn.prepare(sql).await?);
        statements.insert(sql.to_owned(), Arc::clone(&stmt));
        tracing::debug!(sql, cached = statements.len(), "statement cached");
        Ok(stmt)
    }

    /// Close and forget every cached statement.
    ///
    /// Every statement is closed even if some fail; the failures are reported together.
    ///
    /// # Errors
    /// Returns [`SqlComposeError::CloseStatements`] holding each close failure.
    pub async fn close(&self) -> Result<(), SqlComposeError> {
        let drained: Vec<(String, Arc<C::Statement>)> =
            self.statements.write().await.drain().collect();
        tracing::debug!(count = drained.len(), "closing cached statements");

        let mut errors = Vec::new();
        for (sql, stmt) in drained {
            if let Err(err) = stmt.close().await {
                tracing::warn!(%sql, error = %err, "failed to close cached statement");
                errors.push(err);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SqlComposeError::CloseStatements(errors))
        }
    }
}

impl<C: Preparer + fmt::Debug> fmt::Debug for StmtCache<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StmtCache")
            .field("conn", &self.conn)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<C: Preparer> Queryer for StmtCache<C> {
    type Rows = <C::Statement as PreparedStatement>::Rows;

    async fn query(&self, sql: &str, args: &[Arg]) -> Result<Self::Rows, SqlComposeError> {
        let stmt = self.get_statement(sql).await?;
        stmt.query(args).await
    }
}

#[async_trait]
impl<C: Preparer> Executor for StmtCache<C> {
    async fn exec(&self, sql: &str, args: &[Arg]) -> Result<ExecResult, SqlComposeError> {
        let stmt = self.get_statement(sql).await?;
        stmt.exec(args).await
    }
}
