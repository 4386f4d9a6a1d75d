//! The dedicated thread that owns a `SQLite` connection.
//!
//! Commands arrive over a std channel and are answered through `oneshot` replies. An open
//! cursor streams through a bounded tokio channel, and the worker serves nothing else until
//! that cursor is exhausted or dropped.

mod channel;
mod dispatcher;
mod manager;

pub(crate) use channel::{Cursor, Reply, Scope, Source};
pub(crate) use manager::SqliteWorker;
