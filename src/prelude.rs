//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types, functions and macros
//! to make it easier to get started with the library.

pub use crate::{
    Arg, ExecResult, Executor, FromValue, Insertable, Json, PreparedStatement, Preparer, Query,
    Queryer, Row, RowCursor, RowValues, Scannable, SqlComposeError, StmtCache, append,
    append_value, exec, in_sql, insert_sql, iter_rows, scan_row, scan_rows, set_value,
    update_sql,
};
pub use crate::{args, record, values};

#[cfg(feature = "sqlite")]
pub use crate::{SqliteConnection, SqliteOptions, SqliteTransaction};
