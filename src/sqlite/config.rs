use std::time::Duration;

use crate::error::SqlComposeError;

use super::connection::SqliteConnection;

const MEMORY_PATH: &str = ":memory:";

/// Options for opening a `SQLite` connection.
#[derive(Debug, Clone)]
pub struct SqliteOptions {
    pub db_path: String,
    /// Switch file databases to WAL journaling. Ignored for in-memory databases.
    pub wal: bool,
    pub busy_timeout: Duration,
    pub foreign_keys: bool,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            wal: true,
            busy_timeout: Duration::from_secs(5),
            foreign_keys: true,
        }
    }

    /// A private in-memory database, discarded when the connection closes.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MEMORY_PATH)
    }

    #[must_use]
    pub fn with_wal(mut self, wal: bool) -> Self {
        self.wal = wal;
        self
    }

    #[must_use]
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    #[must_use]
    pub fn with_foreign_keys(mut self, foreign_keys: bool) -> Self {
        self.foreign_keys = foreign_keys;
        self
    }

    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.db_path == MEMORY_PATH
    }

    /// Open the database and apply the connection pragmas. Runs on the worker thread.
    pub(crate) fn open(&self) -> Result<rusqlite::Connection, SqlComposeError> {
        let conn = rusqlite::Connection::open(&self.db_path)?;
        conn.busy_timeout(self.busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", self.foreign_keys)?;
        if self.wal && !self.is_in_memory() {
            let mode: String =
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
            tracing::debug!(db_path = %self.db_path, %mode, "sqlite journal mode set");
        }
        Ok(conn)
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            opts: SqliteOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn wal(mut self, wal: bool) -> Self {
        self.opts.wal = wal;
        self
    }

    #[must_use]
    pub fn busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.opts.busy_timeout = busy_timeout;
        self
    }

    #[must_use]
    pub fn foreign_keys(mut self, foreign_keys: bool) -> Self {
        self.opts.foreign_keys = foreign_keys;
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }

    /// Open a [`SqliteConnection`] with these options.
    ///
    /// # Errors
    ///
    /// Returns `SqlComposeError` if the worker thread cannot start or the database cannot be
    /// opened.
    pub async fn build(self) -> Result<SqliteConnection, SqlComposeError> {
        SqliteConnection::open(self.finish()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = SqliteOptionsBuilder::new("app.db").finish();
        assert!(opts.wal && opts.foreign_keys);
        assert_eq!(opts.busy_timeout, Duration::from_secs(5));
        assert!(!opts.is_in_memory());
        assert!(SqliteOptions::in_memory().is_in_memory());
    }

    #[test]
    fn builder_overrides() {
        let opts = SqliteOptionsBuilder::new("app.db")
            .wal(false)
            .foreign_keys(false)
            .busy_timeout(Duration::from_millis(250))
            .finish();
        assert!(!opts.wal && !opts.foreign_keys);
        assert_eq!(opts.busy_timeout, Duration::from_millis(250));
    }
}
