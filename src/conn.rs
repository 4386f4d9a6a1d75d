//! Connection contracts consumed by the execution engine.
//!
//! Raw connections, transactions, [`crate::HookConn`] and [`crate::StmtCache`] all implement
//! these, so they can be stacked freely.

use async_trait::async_trait;

use crate::error::SqlComposeError;
use crate::row::Row;
use crate::types::Arg;

/// Outcome of a statement executed without reading rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Rowid of the most recent insert on the connection, or `None` when the statement
    /// changed no rows. SQLite does not reset it for `UPDATE` or `DELETE`, so only read it
    /// after an `INSERT`.
    pub last_insert_id: Option<i64>,
}

/// A server-side cursor over a result set.
///
/// Dropping the cursor releases it, whether or not every row was read.
#[async_trait]
pub trait RowCursor: Send {
    fn columns(&self) -> &[String];

    /// Advance to the next row, `None` once the result set is exhausted.
    async fn next_row(&mut self) -> Result<Option<Row>, SqlComposeError>;
}

#[async_trait]
pub trait Queryer: Send + Sync {
    type Rows: RowCursor;

    /// Run a statement that returns rows. `args` holds one value per `?` in `sql`.
    async fn query(&self, sql: &str, args: &[Arg]) -> Result<Self::Rows, SqlComposeError>;
}

#[async_trait]
pub trait Executor: Send + Sync {
    /// Run a statement for its side effects.
    async fn exec(&self, sql: &str, args: &[Arg]) -> Result<ExecResult, SqlComposeError>;
}

#[async_trait]
pub trait PreparedStatement: Send + Sync {
    type Rows: RowCursor;

    fn sql(&self) -> &str;

    async fn query(&self, args: &[Arg]) -> Result<Self::Rows, SqlComposeError>;

    async fn exec(&self, args: &[Arg]) -> Result<ExecResult, SqlComposeError>;

    /// Release the statement. Using it afterwards is an error.
    async fn close(&self) -> Result<(), SqlComposeError>;
}

#[async_trait]
pub trait Preparer: Send + Sync {
    type Statement: PreparedStatement;

    async fn prepare(&self, sql: &str) -> Result<Self::Statement, SqlComposeError>;
}

#[async_trait]
impl<Q: Queryer + ?Sized> Queryer for &Q {
    type Rows = Q::Rows;

    async fn query(&self, sql: &str, args: &[Arg]) -> Result<Self::Rows, SqlComposeError> {
        (**self).query(sql, args).await
    }
}

#[async_trait]
impl<E: Executor + ?Sized> Executor for &E {
    async fn exec(&self, sql: &str, args: &[Arg]) -> Result<ExecResult, SqlComposeError> {
        (**self).exec(sql, args).await
    }
}

#[async_trait]
impl<P: Preparer + ?Sized> Preparer for &P {
    type Statement = P::Statement;

    async fn prepare(&self, sql: &str) -> Result<Self::Statement, SqlComposeError> {
        (**self).prepare(sql).await
    }
}
