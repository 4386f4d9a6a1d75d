use std::collections::HashMap;
use std::sync::mpsc::Receiver;

use rusqlite::types::Value;

use crate::conn::ExecResult;
use crate::error::SqlComposeError;
use crate::sqlite::query::{drain_statement, stream_statement};

use super::channel::{Command, Cursor, Reply, Scope, Source};

/// Connection-owned state of one worker thread.
///
/// Prepared statements and the open transaction borrow the connection, so all of them live
/// in the worker's stack frame and never cross a thread boundary.
struct WorkerState<'conn> {
    conn: &'conn rusqlite::Connection,
    statements: HashMap<u64, rusqlite::Statement<'conn>>,
    next_statement_id: u64,
    tx: Option<(u64, rusqlite::Transaction<'conn>)>,
    next_tx_id: u64,
}

pub(super) fn run_sqlite_worker(conn: &rusqlite::Connection, receiver: &Receiver<Command>) {
    let mut state = WorkerState {
        conn,
        statements: HashMap::new(),
        next_statement_id: 1,
        tx: None,
        next_tx_id: 1,
    };

    while let Ok(command) = receiver.recv() {
        match command {
            Command::Shutdown => break,
            Command::Batch {
                scope,
                sql,
                respond_to,
            } => {
                let _ = respond_to.send(state.batch(scope, &sql));
            }
            Command::Query {
                scope,
                source,
                params,
                respond_to,
            } => state.query(scope, source, &params, respond_to),
            Command::Exec {
                scope,
                source,
                params,
                respond_to,
            } => {
                let _ = respond_to.send(state.exec(scope, source, &params));
            }
            Command::Prepare {
                scope,
                sql,
                respond_to,
            } => {
                let _ = respond_to.send(state.prepare(scope, &sql));
            }
            Command::Finalize { id, respond_to } => {
                let _ = respond_to.send(state.finalize(id));
            }
            Command::Begin { respond_to } => {
                let _ = respond_to.send(state.begin());
            }
            Command::Commit { tx_id, respond_to } => {
                let _ = respond_to.send(state.finish(tx_id, true));
            }
            Command::Rollback { tx_id, respond_to } => {
                let _ = respond_to.send(state.finish(tx_id, false));
            }
        }
    }

    tracing::debug!(
        statements = state.statements.len(),
        open_tx = state.tx.is_some(),
        "sqlite worker shutting down"
    );
}

impl<'conn> WorkerState<'conn> {
    fn active_tx(&self) -> Scope {
        self.tx.as_ref().map(|(id, _)| *id)
    }

    fn check_scope(&self, scope: Scope) -> Result<(), SqlComposeError> {
        match (self.active_tx(), scope) {
            (None, None) => Ok(()),
            (Some(active), Some(requested)) if active == requested => Ok(()),
            (Some(_), None) => Err(tx_in_progress_error()),
            (None, Some(requested)) => Err(SqlComposeError::ExecutionError(format!(
                "SQLite transaction {requested} is no longer active"
            ))),
            (Some(active), Some(requested)) => Err(SqlComposeError::ExecutionError(format!(
                "SQLite transaction mismatch: active {active}, requested {requested}"
            ))),
        }
    }

    fn batch(&self, scope: Scope, sql: &str) -> Result<(), SqlComposeError> {
        self.check_scope(scope)?;
        if scope.is_some() {
            self.conn.execute_batch(sql)?;
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.commit()?;
        Ok(())
    }

    fn statement(&mut self, id: u64) -> Result<&mut rusqlite::Statement<'conn>, SqlComposeError> {
        self.statements.get_mut(&id).ok_or_else(|| unknown_statement(id))
    }

    fn query(
        &mut self,
        scope: Scope,
        source: Source,
        params: &[Value],
        respond_to: Reply<Cursor>,
    ) {
        if let Err(err) = self.check_scope(scope) {
            let _ = respond_to.send(Err(err));
            return;
        }
        match source {
            Source::Sql(sql) => match self.conn.prepare(&sql) {
                Ok(mut stmt) => stream_statement(&mut stmt, params, respond_to),
                Err(err) => {
                    let _ = respond_to.send(Err(err.into()));
                }
            },
            Source::Prepared(id) => match self.statement(id) {
                Ok(stmt) => stream_statement(stmt, params, respond_to),
                Err(err) => {
                    let _ = respond_to.send(Err(err));
                }
            },
        }
    }

    fn exec(
        &mut self,
        scope: Scope,
        source: Source,
        params: &[Value],
    ) -> Result<ExecResult, SqlComposeError> {
        self.check_scope(scope)?;
        let conn = self.conn;
        match source {
            Source::Sql(sql) => {
                let mut stmt = conn.prepare(&sql)?;
                drain_statement(conn, &mut stmt, params)
            }
            Source::Prepared(id) => {
                let stmt = self.statement(id)?;
                drain_statement(conn, stmt, params)
            }
        }
    }

    fn prepare(&mut self, scope: Scope, sql: &str) -> Result<u64, SqlComposeError> {
        self.check_scope(scope)?;
        let stmt = self.conn.prepare(sql)?;
        let id = self.next_statement_id;
        self.next_statement_id = self.next_statement_id.saturating_add(1);
        self.statements.insert(id, stmt);
        tracing::debug!(id, sql, "sqlite statement prepared");
        Ok(id)
    }

    fn finalize(&mut self, id: u64) -> Result<(), SqlComposeError> {
        let stmt = self.statements.remove(&id).ok_or_else(|| unknown_statement(id))?;
        stmt.finalize()?;
        Ok(())
    }

    fn begin(&mut self) -> Result<u64, SqlComposeError> {
        if self.tx.is_some() {
            return Err(SqlComposeError::ExecutionError(
                "SQLite transaction already in progress".into(),
            ));
        }
        let tx = self.conn.unchecked_transaction()?;
        let tx_id = self.next_tx_id;
        self.next_tx_id = self.next_tx_id.saturating_add(1);
        self.tx = Some((tx_id, tx));
        Ok(tx_id)
    }

    fn finish(&mut self, tx_id: u64, commit: bool) -> Result<(), SqlComposeError> {
        self.check_scope(Some(tx_id))?;
        let Some((_, tx)) = self.tx.take() else {
            return Err(SqlComposeError::ExecutionError(
                "No active SQLite transaction".into(),
            ));
        };
        if commit {
            tx.commit()?;
        } else {
            tx.rollback()?;
        }
        Ok(())
    }
}

fn tx_in_progress_error() -> SqlComposeError {
    SqlComposeError::ExecutionError(
        "SQLite transaction in progress; operation not permitted".into(),
    )
}

fn unknown_statement(id: u64) -> SqlComposeError {
    SqlComposeError::ExecutionError(format!("SQLite statement {id} is closed or unknown"))
}
