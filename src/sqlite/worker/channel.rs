use rusqlite::types::Value;
use tokio::sync::{mpsc, oneshot};

use crate::conn::ExecResult;
use crate::error::SqlComposeError;
use crate::row::Row;

/// Transaction a command runs under; `None` is auto-commit mode.
pub(crate) type Scope = Option<u64>;

pub(crate) type Reply<T> = oneshot::Sender<Result<T, SqlComposeError>>;

/// Which statement a query or exec runs.
pub(crate) enum Source {
    Sql(String),
    Prepared(u64),
}

/// An open result set streamed from the worker one row at a time.
pub(crate) struct Cursor {
    pub(crate) columns: Vec<String>,
    pub(crate) rows: mpsc::Receiver<Result<Row, SqlComposeError>>,
}

pub(crate) enum Command {
    Batch {
        scope: Scope,
        sql: String,
        respond_to: Reply<()>,
    },
    Query {
        scope: Scope,
        source: Source,
        params: Vec<Value>,
        respond_to: Reply<Cursor>,
    },
    Exec {
        scope: Scope,
        source: Source,
        params: Vec<Value>,
        respond_to: Reply<ExecResult>,
    },
    Prepare {
        scope: Scope,
        sql: String,
        respond_to: Reply<u64>,
    },
    Finalize {
        id: u64,
        respond_to: Reply<()>,
    },
    Begin {
        respond_to: Reply<u64>,
    },
    Commit {
        tx_id: u64,
        respond_to: Reply<()>,
    },
    Rollback {
        tx_id: u64,
        respond_to: Reply<()>,
    },
    Shutdown,
}

/// Reply channel whose receiver is already gone, for fire-and-forget commands.
pub(crate) fn detached<T>() -> Reply<T> {
    oneshot::channel().0
}
