use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread;

use rusqlite::types::Value;
use tokio::sync::oneshot;

use crate::conn::ExecResult;
use crate::error::SqlComposeError;
use crate::sqlite::config::SqliteOptions;

use super::channel::{Command, Cursor, Reply, Scope, Source, detached};
use super::dispatcher::run_sqlite_worker;

static NEXT_WORKER_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to the thread that owns one `rusqlite::Connection`.
pub(crate) struct SqliteWorker {
    sender: Sender<Command>,
    id: u64,
}

impl SqliteWorker {
    /// Open the database on a fresh worker thread and wait until it is usable.
    pub(crate) async fn spawn(options: SqliteOptions) -> Result<Self, SqlComposeError> {
        let (sender, receiver) = mpsc::channel::<Command>();
        let (ready_tx, ready_rx) = oneshot::channel();
        let id = NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed);
        let db_path = options.db_path.clone();

        thread::Builder::new()
            .name(format!("sqlite-worker-{id}"))
            .spawn(move || {
                let conn = match options.open() {
                    Ok(conn) => conn,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                if ready_tx.send(Ok(())).is_ok() {
                    run_sqlite_worker(&conn, &receiver);
                }
            })
            .map_err(|err| {
                SqlComposeError::ConnectionError(format!(
                    "failed to spawn SQLite worker thread: {err}"
                ))
            })?;

        ready_rx
            .await
            .map_err(|_| connection_error("SQLite worker exited while opening the database"))??;
        tracing::debug!(worker = id, %db_path, "sqlite worker started");
        Ok(Self { sender, id })
    }

    fn send_command(&self, command: Command) -> Result<(), SqlComposeError> {
        self.sender
            .send(command)
            .map_err(|_| connection_error("SQLite worker closed"))
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> Command,
        drop_message: &'static str,
    ) -> Result<T, SqlComposeError> {
        let (tx, rx) = oneshot::channel();
        self.send_command(build(tx))?;
        rx.await.map_err(|_| connection_error(drop_message))?
    }

    pub(crate) async fn batch(&self, scope: Scope, sql: String) -> Result<(), SqlComposeError> {
        self.request(
            |respond_to| Command::Batch {
                scope,
                sql,
                respond_to,
            },
            "SQLite worker dropped while executing batch",
        )
        .await
    }

    pub(crate) async fn query(
        &self,
        scope: Scope,
        source: Source,
        params: Vec<Value>,
    ) -> Result<Cursor, SqlComposeError> {
        self.request(
            |respond_to| Command::Query {
                scope,
                source,
                params,
                respond_to,
            },
            "SQLite worker dropped while opening cursor",
        )
        .await
    }

    pub(crate) async fn exec(
        &self,
        scope: Scope,
        source: Source,
        params: Vec<Value>,
    ) -> Result<ExecResult, SqlComposeError> {
        self.request(
            |respond_to| Command::Exec {
                scope,
                source,
                params,
                respond_to,
            },
            "SQLite worker dropped while executing statement",
        )
        .await
    }

    pub(crate) async fn prepare(&self, scope: Scope, sql: String) -> Result<u64, SqlComposeError> {
        self.request(
            |respond_to| Command::Prepare {
                scope,
                sql,
                respond_to,
            },
            "SQLite worker dropped while preparing statement",
        )
        .await
    }

    pub(crate) async fn finalize(&self, id: u64) -> Result<(), SqlComposeError> {
        self.request(
            |respond_to| Command::Finalize { id, respond_to },
            "SQLite worker dropped while finalizing statement",
        )
        .await
    }

    /// Queue a finalize without waiting for it.
    pub(crate) fn finalize_detached(&self, id: u64) {
        let _ = self.send_command(Command::Finalize {
            id,
            respond_to: detached(),
        });
    }

    pub(crate) async fn begin(&self) -> Result<u64, SqlComposeError> {
        self.request(
            |respond_to| Command::Begin { respond_to },
            "SQLite worker dropped while beginning transaction",
        )
        .await
    }

    pub(crate) async fn commit(&self, tx_id: u64) -> Result<(), SqlComposeError> {
        self.request(
            |respond_to| Command::Commit { tx_id, respond_to },
            "SQLite worker dropped while committing transaction",
        )
        .await
    }

    pub(crate) async fn rollback(&self, tx_id: u64) -> Result<(), SqlComposeError> {
        self.request(
            |respond_to| Command::Rollback { tx_id, respond_to },
            "SQLite worker dropped while rolling back transaction",
        )
        .await
    }

    /// Queue a rollback without waiting for it.
    pub(crate) fn rollback_detached(&self, tx_id: u64) {
        let _ = self.send_command(Command::Rollback {
            tx_id,
            respond_to: detached(),
        });
    }
}

impl fmt::Debug for SqliteWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteWorker").field("id", &self.id).finish()
    }
}

impl Drop for SqliteWorker {
    fn drop(&mut self) {
        let _ = self.sender.send(Command::Shutdown);
    }
}

fn connection_error(message: &str) -> SqlComposeError {
    SqlComposeError::ConnectionError(message.into())
}
