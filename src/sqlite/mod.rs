// SQLite backend: a worker-thread connection implementing every connection contract.
//
// - config: connection options and builder
// - params: argument conversion into rusqlite values
// - query: row extraction and statement driving on the worker thread
// - worker: the thread owning the rusqlite connection
// - connection, transaction, prepared, rows: the async handles callers hold

pub mod config;
pub mod connection;
pub mod params;
pub mod prepared;
pub mod query;
pub mod rows;
pub mod transaction;
mod worker;

pub use config::{SqliteOptions, SqliteOptionsBuilder};
pub use connection::SqliteConnection;
pub use prepared::SqliteStatement;
pub use rows::SqliteRows;
pub use transaction::SqliteTransaction;
