//! Reflection-free SQL composition, row scanning and prepared-statement caching.
//!
//! - [`Query`] builds SQL text and positional `?` arguments incrementally, and inlines one
//!   query into another when it is passed as an argument.
//! - [`scan_row`], [`scan_rows`], [`iter_rows`] and [`exec`] run a query against anything that
//!   implements the connection contracts and hand each row to a [`Scannable`] destination.
//! - [`StmtCache`] prepares each distinct SQL text once, safely across tasks.
//!
//! Record types opt in by implementing [`Scannable`] and [`Insertable`], by hand or with
//! [`record!`].
//!
//! ```rust,no_run
//! use sql_compose::prelude::*;
//!
//! #[derive(Debug, Default, Clone)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! record!(User { id, name }, generated = [id]);
//!
//! # async fn demo() -> Result<(), SqlComposeError> {
//! let conn = SqliteConnection::open(SqliteOptions::in_memory()).await?;
//! conn.exec_batch("create table users (id integer primary key, name text not null)")
//!     .await?;
//!
//! let new = [User { id: 0, name: "alice".into() }];
//! exec(&conn, "insert into users ?", args![insert_sql(&new)]).await?;
//!
//! let mut users = Vec::<User>::new();
//! scan_rows(&conn, append(&mut users), "select * from users where name = ?", args!["alice"])
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod conn;
mod crud;
mod error;
mod executor;
mod hook;
mod json;
mod macros;
mod naming;
mod query;
mod row;
mod scan;
mod stmt_cache;
mod types;

pub mod prelude;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use conn::{ExecResult, Executor, PreparedStatement, Preparer, Queryer, RowCursor};
pub use crud::{Insertable, Updatable, in_sql, insert_sql, update_sql};
pub use error::SqlComposeError;
pub use executor::{RowIter, exec, iter_rows, scan_row, scan_rows};
pub use hook::{HookConn, LogFn, OpKind, with_log_fn};
pub use json::Json;
pub use naming::to_snake_case;
pub use query::{Query, SqlFragment};
pub use row::Row;
pub use scan::{
    Append, AppendBoxed, AppendValue, ScanTarget, Scannable, SetValue, Values, append,
    append_boxed, append_value, set_value,
};
pub use stmt_cache::StmtCache;
pub use types::{Arg, FromValue, NamedArg, RowValues, ToValue};

#[cfg(feature = "sqlite")]
pub use sqlite::{
    SqliteConnection, SqliteOptions, SqliteOptionsBuilder, SqliteRows, SqliteStatement,
    SqliteTransaction,
};
