use thiserror::Error;

#[cfg(feature = "sqlite")]
use rusqlite;

#[derive(Debug, Error)]
pub enum SqlComposeError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// A single-row fetch matched nothing.
    #[error("no rows in result set")]
    NoRows,

    #[error("unknown column name {0:?}")]
    UnknownColumn(String),

    #[error("Scan error: {0}")]
    ScanError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    /// Every failure collected while closing a statement cache.
    #[error("closing statements: {}", join_errors(.0))]
    CloseStatements(Vec<SqlComposeError>),
}

impl SqlComposeError {
    /// True for the "no rows" sentinel returned by [`crate::scan_row`].
    #[must_use]
    pub fn is_no_rows(&self) -> bool {
        matches!(self, Self::NoRows)
    }
}

fn join_errors(errors: &[SqlComposeError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
