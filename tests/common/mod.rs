#![allow(dead_code)]

use sql_compose::{Json, SqlComposeError, SqliteConnection, record};
use tempfile::TempDir;

pub const SCHEMA: &str = "
    CREATE TABLE tasks (
        id   INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        age  INTEGER NOT NULL,
        tags TEXT
    );
";

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub tags: Json<Vec<String>>,
}

record!(Task { id, name, age, tags }, generated = [id]);

impl Task {
    pub fn new(name: &str, age: i64, tags: &[&str]) -> Self {
        Self {
            id: 0,
            name: name.to_owned(),
            age,
            tags: Json(tags.iter().map(|t| (*t).to_owned()).collect()),
        }
    }
}

/// Route library tracing to the test output; `RUST_LOG=sql_compose=debug` shows it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Open a file-backed database with the `tasks` table. Keep the `TempDir` alive for the
/// duration of the test.
pub async fn open_db() -> Result<(TempDir, SqliteConnection), SqlComposeError> {
    init_tracing();
    let dir = tempfile::tempdir()
        .map_err(|err| SqlComposeError::ConnectionError(format!("tempdir: {err}")))?;
    let path = dir.path().join("tasks.db");
    let conn = SqliteConnection::builder(path.to_string_lossy())
        .build()
        .await?;
    conn.exec_batch(SCHEMA).await?;
    Ok((dir, conn))
}

/// `open_db` plus three tasks named `a`, `b` and `c` with ids 1 to 3.
pub async fn seeded_db() -> Result<(TempDir, SqliteConnection), SqlComposeError> {
    let (dir, conn) = open_db().await?;
    conn.exec_batch(
        "INSERT INTO tasks (name, age, tags) VALUES
            ('a', 10, '[\"x\"]'),
            ('b', 20, '[]'),
            ('c', 30, NULL);",
    )
    .await?;
    Ok((dir, conn))
}

pub async fn count_tasks<Q: sql_compose::Queryer>(db: &Q) -> Result<i64, SqlComposeError> {
    let mut count = 0_i64;
    sql_compose::scan_row(
        db,
        &mut sql_compose::values![&mut count],
        "SELECT COUNT(*) FROM tasks",
        [],
    )
    .await?;
    Ok(count)
}
